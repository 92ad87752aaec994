//! Filter Projector: the visible, filtered view of the task collection.
//!
//! The view is a pure function of the collection and three criteria (text query,
//! completion status, priority). [`FilterProjector`] recomputes it whenever a
//! criterion is set or the store's collection changes, and publishes it on a watch
//! channel.

use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};
use tokio::sync::watch;
use tracing::debug;

use crate::error::{TaskError, TaskResult};
use crate::models::{Task, TaskPriority};

/// Completion status criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatusFilter {
    #[default]
    All,
    /// Not yet completed
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

/// Priority criterion: every priority, or exactly one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(TaskPriority),
}

impl PriorityFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(priority) => task.priority == priority,
        }
    }
}

impl From<TaskPriority> for PriorityFilter {
    fn from(priority: TaskPriority) -> Self {
        PriorityFilter::Only(priority)
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityFilter::All => f.write_str("all"),
            PriorityFilter::Only(priority) => write!(f, "{}", priority),
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(PriorityFilter::All);
        }
        TaskPriority::from_str(s)
            .map(PriorityFilter::Only)
            .map_err(|_| TaskError::Validation(format!("Unknown priority filter: {}", s)))
    }
}

/// The three criteria applied together
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    /// Case-insensitive substring of title or description; empty matches everything
    pub query: String,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
}

impl FilterCriteria {
    /// True when any criterion differs from its default
    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }

    fn matches_query(&self, needle: &str, task: &Task) -> bool {
        if needle.is_empty() {
            return true;
        }
        task.title.to_lowercase().contains(needle)
            || task
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(needle))
    }
}

/// Filter `tasks` by `criteria`, keeping the source order.
///
/// Stages run in a fixed order: query, then status, then priority.
pub fn project(tasks: &[Task], criteria: &FilterCriteria) -> Vec<Task> {
    let needle = criteria.query.to_lowercase();

    tasks
        .iter()
        .filter(|task| criteria.matches_query(&needle, task))
        .filter(|task| criteria.status.matches(task))
        .filter(|task| criteria.priority.matches(task))
        .cloned()
        .collect()
}

/// Counts for the "Showing X of Y tasks" line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    pub shown: usize,
    pub total: usize,
}

impl fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Showing {} of {} tasks", self.shown, self.total)
    }
}

/// Keeps a filtered view of a task collection up to date.
///
/// Owns the criteria; each setter replaces exactly one criterion and recomputes once.
pub struct FilterProjector {
    source: watch::Receiver<Vec<Task>>,
    criteria: FilterCriteria,
    view: watch::Sender<Vec<Task>>,
    total: usize,
    recomputations: u64,
}

impl FilterProjector {
    /// Project `source` (usually [`TaskStore::subscribe`](crate::TaskStore::subscribe))
    /// with default criteria.
    pub fn new(source: watch::Receiver<Vec<Task>>) -> Self {
        let mut projector = Self {
            source,
            criteria: FilterCriteria::default(),
            view: watch::Sender::new(Vec::new()),
            total: 0,
            recomputations: 0,
        };
        projector.recompute();
        projector
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.criteria.query = query.into();
        self.recompute();
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.criteria.status = status;
        self.recompute();
    }

    pub fn set_priority(&mut self, priority: impl Into<PriorityFilter>) {
        self.criteria.priority = priority.into();
        self.recompute();
    }

    /// Parse and set the status; unknown values are rejected and leave the criterion as is
    pub fn set_status_str(&mut self, status: &str) -> TaskResult<()> {
        let status = StatusFilter::from_str(status)
            .map_err(|_| TaskError::Validation(format!("Unknown status filter: {}", status)))?;
        self.set_status(status);
        Ok(())
    }

    /// Parse and set the priority; unknown values are rejected and leave the criterion as is
    pub fn set_priority_str(&mut self, priority: &str) -> TaskResult<()> {
        let priority = PriorityFilter::from_str(priority)?;
        self.set_priority(priority);
        Ok(())
    }

    /// Replace all criteria at once (one recomputation)
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.recompute();
    }

    /// Reset every criterion to its default in one step
    pub fn clear_all(&mut self) {
        self.set_criteria(FilterCriteria::default());
    }

    /// Recompute if the source changed since the last recomputation
    pub fn refresh(&mut self) -> bool {
        if matches!(self.source.has_changed(), Ok(true)) {
            self.recompute();
            return true;
        }
        false
    }

    /// Wait for the source collection to change, then recompute.
    ///
    /// Fails once the store has been dropped.
    pub async fn changed(&mut self) -> TaskResult<()> {
        self.source
            .changed()
            .await
            .map_err(|_| TaskError::Internal("task collection closed".to_string()))?;
        self.recompute();
        Ok(())
    }

    /// Recompute on every source change until the collection is dropped.
    ///
    /// Consumes the projector, so set criteria first; view subscribers keep
    /// receiving each recomputed view.
    pub async fn run(mut self) {
        while self.changed().await.is_ok() {}
        debug!("Task collection closed, projector stopped");
    }

    /// Current filtered view, recomputed first if the source changed
    pub fn visible(&mut self) -> Vec<Task> {
        self.refresh();
        self.view.borrow().clone()
    }

    /// Receiver that observes every recomputed view
    pub fn subscribe(&self) -> watch::Receiver<Vec<Task>> {
        self.view.subscribe()
    }

    pub fn is_filtered(&self) -> bool {
        self.criteria.is_active()
    }

    pub fn summary(&mut self) -> FilterSummary {
        self.refresh();
        FilterSummary {
            shown: self.view.borrow().len(),
            total: self.total,
        }
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    fn recompute(&mut self) {
        let (view, total) = {
            let tasks = self.source.borrow_and_update();
            (project(&tasks, &self.criteria), tasks.len())
        };

        debug!(
            shown = view.len(),
            total,
            query = %self.criteria.query,
            status = %self.criteria.status,
            priority = %self.criteria.priority,
            "Recomputed task view"
        );

        self.total = total;
        self.recomputations += 1;
        self.view.send_replace(view);
    }
}
