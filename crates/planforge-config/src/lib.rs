//! Configuration system for planforge.
//!
//! Solver behavior (environment mode, termination, phases, acceptors,
//! foragers and move selectors) is described declaratively and loaded
//! from TOML or YAML.
//!
//! # Examples
//!
//! ```
//! use planforge_config::{PhaseConfig, SolverConfig};
//! use std::time::Duration;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     random_seed = 7
//!
//!     [termination]
//!     seconds_spent_limit = 30
//!
//!     [[phases]]
//!     type = "construction_heuristic"
//!
//!     [[phases]]
//!     type = "local_search"
//!     step_candidate_limit = 500
//!     [phases.acceptor]
//!     type = "late_acceptance"
//!     late_acceptance_size = 400
//!     [phases.move_selector]
//!     type = "union_move_selector"
//!     selection_order = "random"
//!     selectors = [
//!         { type = "change_move_selector" },
//!         { type = "swap_move_selector" },
//!     ]
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! assert_eq!(config.phases.len(), 2);
//! assert!(matches!(config.phases[1], PhaseConfig::LocalSearch(_)));
//! ```
//!
//! Fall back to defaults when the file is missing:
//!
//! ```
//! use planforge_config::SolverConfig;
//!
//! let config = SolverConfig::load("solver.toml").unwrap_or_default();
//! assert!(config.phases.is_empty());
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main solver configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverConfig {
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Seed for the shared random source. Reproducible modes default to 0.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Threads used to score candidate moves within a step.
    #[serde(default)]
    pub move_thread_count: MoveThreadCount,

    #[serde(default)]
    pub termination: Option<TerminationConfig>,

    #[serde(default)]
    pub phases: Vec<PhaseConfig>,
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    pub fn with_termination(mut self, termination: TerminationConfig) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_move_thread_count(mut self, count: MoveThreadCount) -> Self {
        self.move_thread_count = count;
        self
    }

    pub fn with_phase(mut self, phase: PhaseConfig) -> Self {
        self.phases.push(phase);
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.as_ref().and_then(|t| t.time_limit())
    }

    /// Seed actually used by the solver, if any.
    ///
    /// Non-reproducible mode ignores the seed so every run differs.
    pub fn effective_seed(&self) -> Option<u64> {
        match self.environment_mode {
            EnvironmentMode::NonReproducible => None,
            _ => Some(self.random_seed.unwrap_or(0)),
        }
    }

    /// Checks structural rules serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let MoveThreadCount::Count(0) = self.move_thread_count {
            return Err(invalid("move_thread_count must be at least 1"));
        }
        for (index, phase) in self.phases.iter().enumerate() {
            phase
                .validate()
                .map_err(|e| invalid(format!("phase {}: {}", index, message(e))))?;
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

fn message(error: ConfigError) -> String {
    match error {
        ConfigError::Invalid(m) => m,
        other => other.to_string(),
    }
}

/// Environment mode controlling reproducibility and integrity checking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Random source seeded from the OS.
    NonReproducible,

    /// Fixed seed, no extra checks.
    #[default]
    Reproducible,

    /// Fixed seed, score integrity checked after every step.
    FastAssert,

    /// Fixed seed, score and undo integrity checked after every candidate.
    FullAssert,
}

impl EnvironmentMode {
    pub fn is_reproducible(&self) -> bool {
        !matches!(self, EnvironmentMode::NonReproducible)
    }

    /// Step-level integrity checks.
    pub fn is_asserted(&self) -> bool {
        matches!(self, EnvironmentMode::FastAssert | EnvironmentMode::FullAssert)
    }

    /// Candidate-level integrity checks.
    pub fn is_fully_asserted(&self) -> bool {
        matches!(self, EnvironmentMode::FullAssert)
    }
}

/// Move thread count for parallel candidate scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveThreadCount {
    /// Use available parallelism.
    Auto,

    /// Single-threaded evaluation.
    #[default]
    None,

    /// Specific number of threads.
    Count(usize),
}

impl MoveThreadCount {
    /// Resolves to a concrete thread count, 1 meaning sequential.
    pub fn resolve(&self) -> usize {
        match self {
            MoveThreadCount::None => 1,
            MoveThreadCount::Count(n) => (*n).max(1),
            MoveThreadCount::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Termination configuration. Any configured limit ends solving.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    pub seconds_spent_limit: Option<u64>,

    pub milliseconds_spent_limit: Option<u64>,

    /// Score text such as `"0hard/-10soft"`, parsed against the solution's score type.
    pub best_score_limit: Option<String>,

    pub step_count_limit: Option<u64>,

    pub unimproved_step_count_limit: Option<u64>,
}

impl TerminationConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        let millis = self.seconds_spent_limit.unwrap_or(0) * 1000
            + self.milliseconds_spent_limit.unwrap_or(0);
        if millis > 0 {
            Some(Duration::from_millis(millis))
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &TerminationConfig::default()
    }
}

/// Phase configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseConfig {
    ConstructionHeuristic(ConstructionHeuristicConfig),

    LocalSearch(LocalSearchConfig),
}

impl PhaseConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            PhaseConfig::ConstructionHeuristic(_) => Ok(()),
            PhaseConfig::LocalSearch(ls) => ls.validate(),
        }
    }
}

/// Construction heuristic configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ConstructionHeuristicConfig {
    #[serde(default)]
    pub construction_heuristic_type: ConstructionHeuristicType,

    #[serde(default)]
    pub pick_early_type: ConstructionPickEarlyType,

    /// Restricts construction to one entity class.
    pub entity_class: Option<String>,

    /// Restricts construction to one variable.
    pub variable_name: Option<String>,

    pub termination: Option<TerminationConfig>,
}

/// Order in which construction visits uninitialized entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionHeuristicType {
    /// Entities in their original order.
    #[default]
    FirstFit,

    /// Most difficult entities first, by each variable's difficulty
    /// comparator.
    FirstFitDecreasing,
}

/// When construction stops evaluating values for an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionPickEarlyType {
    /// Evaluate every value and keep the best (best fit).
    #[default]
    Never,

    /// Take the first value that does not worsen the score (first fit).
    FirstNonDeterioratingScore,

    /// Take the first value whose score is feasible.
    FirstFeasibleScore,
}

/// Local search configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LocalSearchConfig {
    pub acceptor: Option<AcceptorConfig>,

    pub forager: Option<ForagerConfig>,

    pub move_selector: Option<MoveSelectorConfig>,

    pub termination: Option<TerminationConfig>,

    #[serde(default)]
    pub no_accepted_move_policy: NoAcceptedMovePolicy,

    /// Upper bound on candidates drawn per step.
    pub step_candidate_limit: Option<usize>,
}

impl LocalSearchConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.step_candidate_limit == Some(0) {
            return Err(invalid("step_candidate_limit must be at least 1"));
        }
        if let Some(AcceptorConfig::LateAcceptance(la)) = &self.acceptor {
            if la.late_acceptance_size == Some(0) {
                return Err(invalid("late_acceptance_size must be at least 1"));
            }
        }
        if let Some(forager) = &self.forager {
            if forager.accepted_count_limit == Some(0) {
                return Err(invalid("accepted_count_limit must be at least 1"));
            }
        }
        if let Some(selector) = &self.move_selector {
            selector.validate()?;
        }
        Ok(())
    }
}

/// What a local search phase does when a step accepts no candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoAcceptedMovePolicy {
    /// End the phase.
    #[default]
    Terminate,

    /// Count an empty step and try again; requires a termination.
    Continue,
}

/// Acceptor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AcceptorConfig {
    /// Accept candidates that do not worsen the last step score.
    HillClimbing,

    /// Accept every candidate.
    AcceptAll,

    LateAcceptance(LateAcceptanceConfig),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LateAcceptanceConfig {
    pub late_acceptance_size: Option<usize>,
}

/// Forager configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ForagerConfig {
    #[serde(default)]
    pub pick: ForagerPickType,

    /// Quit the step once this many candidates were accepted.
    pub accepted_count_limit: Option<usize>,
}

/// How the winner of a step is chosen among accepted candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForagerPickType {
    FirstAccepted,

    #[default]
    BestScore,

    /// Uniformly random among accepted candidates.
    Probabilistic,
}

/// Order in which a selector yields its elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOrder {
    /// Take the parent's order. A root selector resolves to `Random`.
    #[default]
    Inherit,

    /// Deterministic iteration that ends when exhausted.
    Original,

    /// Independent random draws that never end.
    Random,

    /// A fresh permutation per step, each element once.
    Shuffled,
}

impl SelectionOrder {
    /// Resolves `Inherit` against the parent's resolved order.
    pub fn resolve(self, inherited: SelectionOrder) -> SelectionOrder {
        match self {
            SelectionOrder::Inherit => {
                if inherited == SelectionOrder::Inherit {
                    SelectionOrder::Random
                } else {
                    inherited
                }
            }
            other => other,
        }
    }

    pub fn is_random(&self) -> bool {
        matches!(self, SelectionOrder::Random)
    }
}

/// Move selector configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveSelectorConfig {
    ChangeMoveSelector(ChangeMoveConfig),

    SwapMoveSelector(SwapMoveConfig),

    UnionMoveSelector(UnionMoveSelectorConfig),

    CartesianProductMoveSelector(CartesianProductConfig),
}

impl MoveSelectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            MoveSelectorConfig::ChangeMoveSelector(_) | MoveSelectorConfig::SwapMoveSelector(_) => {
                Ok(())
            }
            MoveSelectorConfig::UnionMoveSelector(union) => {
                if union.selectors.is_empty() {
                    return Err(invalid("union_move_selector needs at least one child"));
                }
                if let Some(weights) = &union.weights {
                    if weights.len() != union.selectors.len() {
                        return Err(invalid(format!(
                            "union_move_selector has {} weights for {} children",
                            weights.len(),
                            union.selectors.len()
                        )));
                    }
                    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(invalid("union weights must be finite and non-negative"));
                    }
                }
                union.selectors.iter().try_for_each(|s| s.validate())
            }
            MoveSelectorConfig::CartesianProductMoveSelector(cartesian) => {
                if cartesian.selectors.is_empty() {
                    return Err(invalid(
                        "cartesian_product_move_selector needs at least one child",
                    ));
                }
                cartesian.selectors.iter().try_for_each(|s| s.validate())
            }
        }
    }
}

/// Change move configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ChangeMoveConfig {
    pub entity_class: Option<String>,

    pub variable_name: Option<String>,

    #[serde(default)]
    pub selection_order: SelectionOrder,
}

/// Swap move configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SwapMoveConfig {
    pub entity_class: Option<String>,

    pub variable_name: Option<String>,

    #[serde(default)]
    pub selection_order: SelectionOrder,
}

/// Union move selector configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UnionMoveSelectorConfig {
    pub selectors: Vec<MoveSelectorConfig>,

    #[serde(default)]
    pub selection_order: SelectionOrder,

    /// Relative child weights for random selection. Equal when absent.
    pub weights: Option<Vec<f64>>,
}

/// Cartesian product move selector configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CartesianProductConfig {
    pub selectors: Vec<MoveSelectorConfig>,

    #[serde(default)]
    pub selection_order: SelectionOrder,
}
