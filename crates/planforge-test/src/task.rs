//! A two-variable task model.
//!
//! Each task carries a `priority` and a `worker`. The score rewards tasks
//! whose worker matches their priority, which keeps expected scores easy to
//! compute by hand.

use planforge_core::{PlanningSolution, SimpleScore};
use planforge_scoring::SimpleScoreDirector;

pub const TASK: usize = 0;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Task {
    pub priority: Option<i64>,
    pub worker: Option<i64>,
    pub pinned: bool,
}

#[derive(Clone, Debug, Default)]
pub struct TaskSolution {
    pub tasks: Vec<Task>,
    pub score: Option<SimpleScore>,
}

impl TaskSolution {
    pub fn new(tasks: Vec<Task>) -> Self {
        TaskSolution { tasks, score: None }
    }

    /// `n` unpinned tasks with nothing assigned.
    pub fn empty(n: usize) -> Self {
        Self::new(vec![Task::default(); n])
    }
}

impl PlanningSolution for TaskSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<SimpleScore> {
        self.score
    }

    fn set_score(&mut self, score: Option<SimpleScore>) {
        self.score = score;
    }

    fn entity_count(&self, descriptor_index: usize) -> usize {
        if descriptor_index == TASK {
            self.tasks.len()
        } else {
            0
        }
    }

    fn is_pinned(&self, _: usize, entity_index: usize) -> bool {
        self.tasks.get(entity_index).is_some_and(|t| t.pinned)
    }
}

pub fn get_priority(s: &TaskSolution, idx: usize) -> Option<i64> {
    s.tasks.get(idx).and_then(|t| t.priority)
}

pub fn set_priority(s: &mut TaskSolution, idx: usize, v: Option<i64>) {
    if let Some(task) = s.tasks.get_mut(idx) {
        task.priority = v;
    }
}

pub fn get_worker(s: &TaskSolution, idx: usize) -> Option<i64> {
    s.tasks.get(idx).and_then(|t| t.worker)
}

pub fn set_worker(s: &mut TaskSolution, idx: usize, v: Option<i64>) {
    if let Some(task) = s.tasks.get_mut(idx) {
        task.worker = v;
    }
}

/// One point per task whose worker equals its priority.
pub fn matching_tasks(s: &TaskSolution) -> SimpleScore {
    let matches = s
        .tasks
        .iter()
        .filter(|t| t.priority.is_some() && t.priority == t.worker)
        .count();
    SimpleScore::of(matches as i64)
}

pub type TaskDirector = SimpleScoreDirector<TaskSolution, fn(&TaskSolution) -> SimpleScore>;

pub fn create_task_director(solution: TaskSolution) -> TaskDirector {
    SimpleScoreDirector::new(solution, matching_tasks as fn(&TaskSolution) -> SimpleScore)
}
