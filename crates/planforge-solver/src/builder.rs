//! Builder module for constructing solver components from configuration
//!
//! This module provides the wiring between configuration types and
//! the actual solver implementation. Variables are looked up by entity class
//! and variable name in a [`SolverDomain`]; any name that matches nothing is
//! a configuration error raised before solving starts.

use std::str::FromStr;

use tracing::debug;

use planforge_config::{
    AcceptorConfig, ConfigError, ConstructionHeuristicConfig, ConstructionHeuristicType,
    ForagerConfig, ForagerPickType, LocalSearchConfig, MoveSelectorConfig, PhaseConfig,
    SelectionOrder, SolverConfig, TerminationConfig,
};
use planforge_core::{PlanningSolution, Result, SolverError};
use planforge_scoring::ScoreDirector;

use crate::heuristic::selector::{
    CartesianMoveSelector, ChangeMoveSelector, MoveSelector, SwapMoveSelector, UnionMoveSelector,
    UnionWeights,
};
use crate::heuristic::variable::{PlanningValue, VariableDefinition};
use crate::phase::construction::ConstructionHeuristicPhase;
use crate::phase::localsearch::{
    AcceptAllAcceptor, Acceptor, BestScoreForager, FirstAcceptedForager, Forager,
    HillClimbingAcceptor, LateAcceptanceAcceptor, LocalSearchPhase, ParallelEvaluator,
    ProbabilisticForager,
};
use crate::phase::Phase;
use crate::solver::Solver;
use crate::termination::{
    BestScoreTermination, OrTermination, StepCountTermination, Termination, TimeTermination,
    UnimprovedStepCountTermination,
};

/// Late acceptance history length when the config leaves it open.
pub const DEFAULT_LATE_ACCEPTANCE_SIZE: usize = 400;

/// The planning variables a configuration may refer to.
///
/// # Example
///
/// ```
/// use planforge_core::{PlanningSolution, SimpleScore, ValueRange};
/// use planforge_solver::builder::SolverDomain;
/// use planforge_solver::heuristic::{PlanningVariable, VariableDefinition};
///
/// #[derive(Clone, Debug)]
/// struct Plan { slots: Vec<Option<u8>>, score: Option<SimpleScore> }
///
/// impl PlanningSolution for Plan {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<SimpleScore> { self.score }
///     fn set_score(&mut self, score: Option<SimpleScore>) { self.score = score; }
///     fn entity_count(&self, _: usize) -> usize { self.slots.len() }
/// }
///
/// let domain = SolverDomain::new().with_variable(VariableDefinition::new(
///     "Slot",
///     PlanningVariable::new(0, "value", |p: &Plan, i| p.slots[i], |p: &mut Plan, i, v| p.slots[i] = v),
///     ValueRange::listed(vec![1, 2, 3]),
/// ));
///
/// assert_eq!(domain.select(Some("Slot"), None).unwrap().len(), 1);
/// assert!(domain.select(Some("Room"), None).is_err());
/// ```
pub struct SolverDomain<S, V> {
    variables: Vec<VariableDefinition<S, V>>,
}

impl<S: PlanningSolution, V: PlanningValue> SolverDomain<S, V> {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
        }
    }

    pub fn with_variable(mut self, definition: VariableDefinition<S, V>) -> Self {
        self.variables.push(definition);
        self
    }

    pub fn variables(&self) -> &[VariableDefinition<S, V>] {
        &self.variables
    }

    /// Definitions matching both filters, in declaration order.
    ///
    /// An absent filter matches everything.
    pub fn select(
        &self,
        entity_class: Option<&str>,
        variable_name: Option<&str>,
    ) -> Result<Vec<&VariableDefinition<S, V>>> {
        let selected: Vec<_> = self
            .variables
            .iter()
            .filter(|d| entity_class.map_or(true, |c| d.entity_class == c))
            .filter(|d| variable_name.map_or(true, |n| d.variable.name() == n))
            .collect();
        if selected.is_empty() {
            return Err(SolverError::configuration(format!(
                "no planning variable matches entity_class {:?} and variable_name {:?}",
                entity_class, variable_name
            )));
        }
        Ok(selected)
    }
}

impl<S: PlanningSolution, V: PlanningValue> Default for SolverDomain<S, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, V: std::fmt::Debug> std::fmt::Debug for SolverDomain<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverDomain")
            .field("variables", &self.variables)
            .finish()
    }
}

fn config_error(error: ConfigError) -> SolverError {
    match error {
        ConfigError::Invalid(message) => SolverError::Configuration(message),
        other => SolverError::Configuration(other.to_string()),
    }
}

/// Builder for constructing acceptors from configuration.
pub struct AcceptorBuilder;

impl AcceptorBuilder {
    /// Builds an acceptor from configuration.
    pub fn build<S: PlanningSolution>(config: &AcceptorConfig) -> Box<dyn Acceptor<S>> {
        match config {
            AcceptorConfig::HillClimbing => Box::new(HillClimbingAcceptor::new()),
            AcceptorConfig::AcceptAll => Box::new(AcceptAllAcceptor::new()),
            AcceptorConfig::LateAcceptance(la_config) => {
                let size = la_config
                    .late_acceptance_size
                    .unwrap_or(DEFAULT_LATE_ACCEPTANCE_SIZE);
                Box::new(LateAcceptanceAcceptor::<S>::new(size))
            }
        }
    }
}

/// Builder for constructing foragers from configuration.
pub struct ForagerBuilder;

impl ForagerBuilder {
    pub fn build<S: PlanningSolution>(config: &ForagerConfig) -> Box<dyn Forager<S>> {
        match config.pick {
            ForagerPickType::FirstAccepted => Box::new(FirstAcceptedForager::new()),
            ForagerPickType::BestScore => {
                Box::new(BestScoreForager::new(config.accepted_count_limit))
            }
            ForagerPickType::Probabilistic => {
                Box::new(ProbabilisticForager::new(config.accepted_count_limit))
            }
        }
    }
}

/// Builder for move selectors.
pub struct MoveSelectorBuilder;

impl MoveSelectorBuilder {
    /// Builds a root selector; `Inherit` at the root resolves to `Random`.
    pub fn build<S: PlanningSolution, V: PlanningValue>(
        config: &MoveSelectorConfig,
        domain: &SolverDomain<S, V>,
    ) -> Result<MoveSelector<S, V>> {
        config.validate().map_err(config_error)?;
        Self::build_child(config, domain, SelectionOrder::Inherit)
    }

    /// Every variable changed in original order, one full scan per step.
    pub fn default_selector<S: PlanningSolution, V: PlanningValue>(
        domain: &SolverDomain<S, V>,
    ) -> Result<MoveSelector<S, V>> {
        let children = domain
            .select(None, None)?
            .into_iter()
            .map(|d| ChangeMoveSelector::new(d, SelectionOrder::Original).into())
            .collect();
        Ok(Self::union_of(children, SelectionOrder::Original))
    }

    fn build_child<S: PlanningSolution, V: PlanningValue>(
        config: &MoveSelectorConfig,
        domain: &SolverDomain<S, V>,
        inherited: SelectionOrder,
    ) -> Result<MoveSelector<S, V>> {
        match config {
            MoveSelectorConfig::ChangeMoveSelector(change) => {
                let order = change.selection_order.resolve(inherited);
                let children = domain
                    .select(change.entity_class.as_deref(), change.variable_name.as_deref())?
                    .into_iter()
                    .map(|d| ChangeMoveSelector::new(d, order).into())
                    .collect();
                Ok(Self::union_of(children, order))
            }
            MoveSelectorConfig::SwapMoveSelector(swap) => {
                let order = swap.selection_order.resolve(inherited);
                let children = domain
                    .select(swap.entity_class.as_deref(), swap.variable_name.as_deref())?
                    .into_iter()
                    .map(|d| SwapMoveSelector::new(d.variable, order).into())
                    .collect();
                Ok(Self::union_of(children, order))
            }
            MoveSelectorConfig::UnionMoveSelector(union) => {
                let order = union.selection_order.resolve(inherited);
                let children = union
                    .selectors
                    .iter()
                    .map(|child| Self::build_child(child, domain, order))
                    .collect::<Result<Vec<_>>>()?;
                let mut selector = UnionMoveSelector::new(children, order);
                if let Some(weights) = &union.weights {
                    selector = selector.with_weights(UnionWeights::Fixed(weights.clone()));
                }
                Ok(selector.into())
            }
            MoveSelectorConfig::CartesianProductMoveSelector(cartesian) => {
                let order = cartesian.selection_order.resolve(inherited);
                let children = cartesian
                    .selectors
                    .iter()
                    .map(|child| Self::build_child(child, domain, order))
                    .collect::<Result<Vec<_>>>()?;
                Ok(CartesianMoveSelector::new(children, order).into())
            }
        }
    }

    /// A single child is used as is.
    fn union_of<S: PlanningSolution, V: PlanningValue>(
        mut children: Vec<MoveSelector<S, V>>,
        order: SelectionOrder,
    ) -> MoveSelector<S, V> {
        if children.len() == 1 {
            if let Some(only) = children.pop() {
                return only;
            }
        }
        UnionMoveSelector::new(children, order).into()
    }
}

/// Builder for terminations.
pub struct TerminationBuilder;

impl TerminationBuilder {
    /// OR of every configured limit, or `None` when nothing is set.
    pub fn build<S: PlanningSolution>(
        config: &TerminationConfig,
    ) -> Result<Option<Box<dyn Termination<S::Score>>>> {
        let mut children: Vec<Box<dyn Termination<S::Score>>> = Vec::new();
        if let Some(limit) = config.time_limit() {
            children.push(Box::new(TimeTermination::new(limit)));
        }
        if let Some(steps) = config.step_count_limit {
            children.push(Box::new(StepCountTermination::new(steps)));
        }
        if let Some(steps) = config.unimproved_step_count_limit {
            children.push(Box::new(UnimprovedStepCountTermination::new(steps)));
        }
        if let Some(text) = &config.best_score_limit {
            let target = S::Score::from_str(text).map_err(|e| {
                SolverError::configuration(format!("best_score_limit {:?}: {}", text, e))
            })?;
            children.push(Box::new(BestScoreTermination::new(target)));
        }

        if children.len() > 1 {
            return Ok(Some(Box::new(OrTermination::new(children))));
        }
        Ok(children.pop())
    }

    fn build_optional<S: PlanningSolution>(
        config: Option<&TerminationConfig>,
    ) -> Result<Option<Box<dyn Termination<S::Score>>>> {
        match config {
            Some(config) => Self::build::<S>(config),
            None => Ok(None),
        }
    }
}

/// Builder for phases.
pub struct PhaseBuilder;

impl PhaseBuilder {
    pub fn construction_heuristic<S: PlanningSolution, V: PlanningValue>(
        config: &ConstructionHeuristicConfig,
        domain: &SolverDomain<S, V>,
    ) -> Result<ConstructionHeuristicPhase<S, V>> {
        let definitions: Vec<VariableDefinition<S, V>> = domain
            .select(config.entity_class.as_deref(), config.variable_name.as_deref())?
            .into_iter()
            .cloned()
            .collect();
        let phase = match config.construction_heuristic_type {
            ConstructionHeuristicType::FirstFit => ConstructionHeuristicPhase::new(&definitions),
            ConstructionHeuristicType::FirstFitDecreasing => {
                ConstructionHeuristicPhase::decreasing_difficulty(&definitions)?
            }
        };
        let mut phase = phase.with_pick_early(config.pick_early_type);
        if let Some(termination) = TerminationBuilder::build_optional::<S>(config.termination.as_ref())? {
            phase = phase.with_termination(termination);
        }
        Ok(phase)
    }

    /// Missing parts default to hill climbing, a best-score forager and
    /// [`MoveSelectorBuilder::default_selector`].
    pub fn local_search<S: PlanningSolution, V: PlanningValue>(
        config: &LocalSearchConfig,
        domain: &SolverDomain<S, V>,
        move_thread_count: usize,
    ) -> Result<LocalSearchPhase<S, V>> {
        let move_selector = match &config.move_selector {
            Some(selector) => MoveSelectorBuilder::build(selector, domain)?,
            None => MoveSelectorBuilder::default_selector(domain)?,
        };
        let acceptor = match &config.acceptor {
            Some(acceptor) => AcceptorBuilder::build(acceptor),
            None => AcceptorBuilder::build(&AcceptorConfig::HillClimbing),
        };
        let forager = ForagerBuilder::build(&config.forager.clone().unwrap_or_default());

        let mut phase = LocalSearchPhase::from_parts(move_selector, acceptor, forager)
            .with_no_accepted_move_policy(config.no_accepted_move_policy);
        if let Some(limit) = config.step_candidate_limit {
            phase = phase.with_step_candidate_limit(limit);
        }
        if let Some(termination) = TerminationBuilder::build_optional::<S>(config.termination.as_ref())? {
            phase = phase.with_termination(termination);
        }
        if move_thread_count > 1 {
            phase = phase.with_parallel_evaluator(ParallelEvaluator::new(move_thread_count)?);
        }
        Ok(phase)
    }

    pub fn build<S, V, D>(
        config: &PhaseConfig,
        domain: &SolverDomain<S, V>,
        move_thread_count: usize,
    ) -> Result<Box<dyn Phase<S, D>>>
    where
        S: PlanningSolution,
        V: PlanningValue,
        D: ScoreDirector<S> + Clone,
    {
        let phase: Box<dyn Phase<S, D>> = match config {
            PhaseConfig::ConstructionHeuristic(ch) => {
                Box::new(Self::construction_heuristic(ch, domain)?)
            }
            PhaseConfig::LocalSearch(ls) => {
                Box::new(Self::local_search(ls, domain, move_thread_count)?)
            }
        };
        phase.validate()?;
        Ok(phase)
    }
}

/// Builds a ready-to-run solver from `config`.
///
/// A config without phases gets a construction heuristic followed by a
/// default local search.
pub fn build_solver<S, V, D>(config: &SolverConfig, domain: &SolverDomain<S, V>) -> Result<Solver<S, D>>
where
    S: PlanningSolution,
    V: PlanningValue,
    D: ScoreDirector<S> + Clone,
{
    config.validate().map_err(config_error)?;

    let defaults;
    let phases = if config.phases.is_empty() {
        defaults = vec![
            PhaseConfig::ConstructionHeuristic(ConstructionHeuristicConfig::default()),
            PhaseConfig::LocalSearch(LocalSearchConfig::default()),
        ];
        &defaults
    } else {
        &config.phases
    };

    let move_thread_count = config.move_thread_count.resolve();
    let mut solver = Solver::new().with_environment_mode(config.environment_mode);
    if let Some(seed) = config.random_seed {
        solver = solver.with_random_seed(seed);
    }
    if let Some(termination) = TerminationBuilder::build_optional::<S>(config.termination.as_ref())? {
        solver = solver.with_termination(termination);
    }
    for phase in phases {
        solver = solver.with_phase(PhaseBuilder::build(phase, domain, move_thread_count)?);
    }

    debug!(
        event = "solver_built",
        phases = solver.phase_count(),
        variables = domain.variables().len(),
        move_thread_count,
    );
    Ok(solver)
}
