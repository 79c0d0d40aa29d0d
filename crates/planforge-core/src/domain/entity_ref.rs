use std::fmt;

/// Address of an entity or fact: descriptor class plus position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub descriptor_index: usize,
    pub entity_index: usize,
}

impl EntityRef {
    #[inline]
    pub const fn new(descriptor_index: usize, entity_index: usize) -> Self {
        Self {
            descriptor_index,
            entity_index,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.descriptor_index, self.entity_index)
    }
}
