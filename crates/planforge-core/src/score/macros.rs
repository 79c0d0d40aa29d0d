//! Declarative macros shared by the field-based score types.

/// Generates ordering, arithmetic and the level-wise `Score` helpers.
///
/// Fields are listed from most to least important; the constructor takes
/// them in the same order.
macro_rules! impl_score_ops {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                std::cmp::Ordering::Equal
                    $( .then_with(|| self.$field.cmp(&other.$field)) )+
            }
        }

        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl std::ops::Add for $type {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                $type::$ctor( $(self.$field + other.$field),+ )
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                $type::$ctor( $(self.$field - other.$field),+ )
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            fn neg(self) -> Self {
                $type::$ctor( $(-self.$field),+ )
            }
        }

        impl std::ops::AddAssign for $type {
            fn add_assign(&mut self, other: Self) {
                *self = *self + other;
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(<$type as $crate::score::Score>::zero(), |acc, s| acc + s)
            }
        }
    };
}

/// Generates `to_level_numbers`, `from_level_numbers`, `scaled` and `abs`
/// inside an `impl Score` block.
macro_rules! impl_score_levels {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        fn to_level_numbers(&self) -> Vec<i64> {
            vec![ $(self.$field),+ ]
        }

        fn from_level_numbers(levels: &[i64]) -> Option<Self> {
            let mut iter = levels.iter().copied();
            let score = $type::$ctor( $( { let _ = stringify!($field); iter.next()? } ),+ );
            if iter.next().is_some() {
                return None;
            }
            Some(score)
        }

        fn scaled(&self, factor: i64) -> Self {
            $type::$ctor( $(self.$field * factor),+ )
        }

        fn abs(&self) -> Self {
            $type::$ctor( $(self.$field.abs()),+ )
        }
    };
}

/// Generates `Display` and `FromStr` for the `"-1hard/0soft"` format.
///
/// A score with a single unlabelled level prints as a bare integer.
macro_rules! impl_score_text {
    ($type:ident { $($field:ident => $suffix:literal),+ } => $ctor:ident) => {
        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let parts: Vec<String> = vec![ $(format!("{}{}", self.$field, $suffix)),+ ];
                f.write_str(&parts.join("/"))
            }
        }

        impl std::str::FromStr for $type {
            type Err = $crate::score::ScoreParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let text = s.trim();
                let mut parts = text.split('/');
                $(
                    let $field = {
                        let part = parts.next().ok_or_else(|| $crate::score::ScoreParseError {
                            message: format!("{} '{}' is missing the {} level", stringify!($type), text, stringify!($field)),
                        })?.trim();
                        let number = part.strip_suffix($suffix).ok_or_else(|| $crate::score::ScoreParseError {
                            message: format!("{} level '{}' must end with '{}'", stringify!($field), part, $suffix),
                        })?;
                        number.parse::<i64>().map_err(|e| $crate::score::ScoreParseError {
                            message: format!("invalid {} level '{}': {}", stringify!($field), number, e),
                        })?
                    };
                )+
                if parts.next().is_some() {
                    return Err($crate::score::ScoreParseError {
                        message: format!("{} '{}' has too many levels", stringify!($type), text),
                    });
                }
                Ok($type::$ctor($($field),+))
            }
        }
    };
}
