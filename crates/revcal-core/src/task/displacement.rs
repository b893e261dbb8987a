//! Moving tasks out of blocked date windows.
//!
//! Three passes run in a fixed order, since each reads the dates left by the
//! previous one:
//!
//! 1. **Push-past**: tasks inside an uncapped window (conference, activity
//!    day) move to the first day after it that is outside every uncapped
//!    window displacing their type.
//! 2. **Redistribution**: tasks inside a capped window (vacation) are spread
//!    over the days after it, at most `capacity` tasks of the window's types
//!    per day, skipping blocked days. Windows are handled in start order.
//! 3. **Collision avoidance**: task types limited to one task per day get
//!    later duplicates moved to the next free, unblocked day.
//!
//! Every forward scan gives up after `max_horizon_days` with
//! [`DisplacementError::NoFreeDate`]. Re-running on resolved tasks moves
//! nothing.
//!
//! # Usage
//! ```rust,ignore
//! use revcal_core::task::displacement::{DisplacementPolicy, DisplacementResolver};
//!
//! let resolver = DisplacementResolver::with_policy(policy);
//! let report = resolver.resolve(&mut tasks)?;
//! ```

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::BlockedRange;
use crate::error::{DisplacementError, Result, ValidationError};
use crate::task::{Task, TaskType};

/// Default search horizon for a free date.
pub const DEFAULT_MAX_HORIZON_DAYS: u32 = 730;

/// Which windows to clear and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplacementPolicy {
    /// Blocked windows; capacity decides push-past vs redistribution
    #[serde(default)]
    pub blocked: Vec<BlockedRange>,
    /// Task types allowed at most once per day
    #[serde(default = "default_unique_day_types")]
    pub unique_day_types: Vec<TaskType>,
    /// Days a forward scan may cover before failing
    #[serde(default = "default_max_horizon_days")]
    pub max_horizon_days: u32,
}

fn default_unique_day_types() -> Vec<TaskType> {
    vec![TaskType::FullLengthExam]
}

fn default_max_horizon_days() -> u32 {
    DEFAULT_MAX_HORIZON_DAYS
}

impl Default for DisplacementPolicy {
    fn default() -> Self {
        Self {
            blocked: Vec::new(),
            unique_day_types: default_unique_day_types(),
            max_horizon_days: DEFAULT_MAX_HORIZON_DAYS,
        }
    }
}

impl DisplacementPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a blocked window.
    pub fn with_blocked(mut self, range: BlockedRange) -> Self {
        self.blocked.push(range);
        self
    }

    /// Replace the one-per-day task types.
    pub fn with_unique_day_types(mut self, types: Vec<TaskType>) -> Self {
        self.unique_day_types = types;
        self
    }

    /// Set the forward scan limit.
    pub fn with_max_horizon_days(mut self, days: u32) -> Self {
        self.max_horizon_days = days;
        self
    }

    /// Reject settings that can never find a free date.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_horizon_days == 0 {
            return Err(ValidationError::InvalidValue {
                field: "max_horizon_days".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(range) = self.blocked.iter().find(|r| r.capacity == Some(0)) {
            return Err(ValidationError::InvalidValue {
                field: "capacity".to_string(),
                message: format!("blocked range {} has a capacity of 0", range.range),
            });
        }
        Ok(())
    }
}

/// Pass that moved a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveReason {
    PushPast,
    Redistribution,
    Collision,
}

/// A single date change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMove {
    pub task_id: String,
    pub task_type: TaskType,
    pub topic: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub reason: MoveReason,
}

/// Every move made by one resolve run, in the order applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplacementReport {
    pub moves: Vec<TaskMove>,
}

impl DisplacementReport {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Moves made by one pass.
    pub fn by_reason(&self, reason: MoveReason) -> impl Iterator<Item = &TaskMove> {
        self.moves.iter().filter(move |m| m.reason == reason)
    }
}

/// Applies a [`DisplacementPolicy`] to a task list.
pub struct DisplacementResolver {
    policy: DisplacementPolicy,
}

impl DisplacementResolver {
    /// Create a resolver with the default policy (no blocked windows).
    pub fn new() -> Self {
        Self {
            policy: DisplacementPolicy::default(),
        }
    }

    /// Create a resolver with a custom policy.
    pub fn with_policy(policy: DisplacementPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &DisplacementPolicy {
        &self.policy
    }

    /// Run all three passes, updating task dates in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy is invalid or a task finds no free date
    /// within the horizon. On error `tasks` is left unchanged.
    pub fn resolve(&self, tasks: &mut [Task]) -> Result<DisplacementReport> {
        self.policy.validate()?;

        let mut working = tasks.to_vec();
        let mut report = DisplacementReport::default();

        self.push_past(&mut working, &mut report)?;
        self.redistribute(&mut working, &mut report)?;
        self.avoid_collisions(&mut working, &mut report)?;

        tasks.clone_from_slice(&working);

        tracing::info!(
            tasks = tasks.len(),
            moved = report.len(),
            "displacement resolved"
        );
        Ok(report)
    }

    fn push_past(&self, tasks: &mut [Task], report: &mut DisplacementReport) -> Result<(), DisplacementError> {
        let windows: Vec<&BlockedRange> = self
            .policy
            .blocked
            .iter()
            .filter(|r| r.is_push_past())
            .collect();
        if windows.is_empty() {
            return Ok(());
        }

        let inside = |task_type: TaskType, date: NaiveDate| {
            windows
                .iter()
                .find(|r| r.displaces(task_type) && r.contains(date))
                .copied()
        };

        for task in tasks.iter_mut() {
            let Some(window) = inside(task.task_type, task.date) else {
                continue;
            };
            let task_type = task.task_type;
            let start = next_day(window.range.end());
            let to = self.scan_forward(task, start, |date| inside(task_type, date).is_none())?;
            apply_move(task, to, MoveReason::PushPast, report);
        }
        Ok(())
    }

    fn redistribute(&self, tasks: &mut [Task], report: &mut DisplacementReport) -> Result<(), DisplacementError> {
        let mut windows: Vec<&BlockedRange> = self
            .policy
            .blocked
            .iter()
            .filter(|r| r.capacity.is_some())
            .collect();
        windows.sort_by_key(|r| r.range.start());

        for window in windows {
            let Some(capacity) = window.capacity else {
                continue;
            };
            let end = window.range.end();

            let mut occupancy: HashMap<NaiveDate, usize> = HashMap::new();
            for task in tasks.iter().filter(|t| t.date > end && window.displaces(t.task_type)) {
                *occupancy.entry(task.date).or_default() += 1;
            }

            let mut displaced: Vec<usize> = tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| window.displaces(t.task_type) && window.contains(t.date))
                .map(|(i, _)| i)
                .collect();
            displaced.sort_by_key(|&i| tasks[i].date);

            for i in displaced {
                let to = self.scan_forward(&tasks[i], next_day(end), |date| {
                    occupancy.get(&date).copied().unwrap_or(0) < capacity && !self.is_blocked(date)
                })?;
                *occupancy.entry(to).or_default() += 1;
                apply_move(&mut tasks[i], to, MoveReason::Redistribution, report);
            }
        }
        Ok(())
    }

    fn avoid_collisions(&self, tasks: &mut [Task], report: &mut DisplacementReport) -> Result<(), DisplacementError> {
        let mut seen_types = HashSet::new();
        for &task_type in &self.policy.unique_day_types {
            if !seen_types.insert(task_type) {
                continue;
            }

            let mut of_type: Vec<usize> = tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| t.task_type == task_type)
                .map(|(i, _)| i)
                .collect();
            of_type.sort_by_key(|&i| tasks[i].date);

            let mut claimed: HashSet<NaiveDate> = HashSet::new();
            for i in of_type {
                if claimed.insert(tasks[i].date) {
                    continue;
                }
                let to = self.scan_forward(&tasks[i], next_day(tasks[i].date), |date| {
                    !claimed.contains(&date) && !self.blocks_type(task_type, date)
                })?;
                claimed.insert(to);
                apply_move(&mut tasks[i], to, MoveReason::Collision, report);
            }
        }
        Ok(())
    }

    /// First date from `start` accepted by `accept`, within the horizon.
    fn scan_forward<F>(&self, task: &Task, start: NaiveDate, mut accept: F) -> Result<NaiveDate, DisplacementError>
    where
        F: FnMut(NaiveDate) -> bool,
    {
        let horizon = self.policy.max_horizon_days;
        (0..horizon as i64)
            .map(|offset| start + Duration::days(offset))
            .find(|date| accept(*date))
            .ok_or_else(|| DisplacementError::NoFreeDate {
                task_id: task.id.clone(),
                task_type: task.task_type,
                from: task.date,
                horizon_days: horizon,
            })
    }

    fn is_blocked(&self, date: NaiveDate) -> bool {
        self.policy.blocked.iter().any(|r| r.contains(date))
    }

    fn blocks_type(&self, task_type: TaskType, date: NaiveDate) -> bool {
        self.policy
            .blocked
            .iter()
            .any(|r| r.displaces(task_type) && r.contains(date))
    }
}

impl Default for DisplacementResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date + Duration::days(1)
}

fn apply_move(task: &mut Task, to: NaiveDate, reason: MoveReason, report: &mut DisplacementReport) {
    tracing::debug!(
        task_id = %task.id,
        task_type = %task.task_type,
        from = %task.date,
        to = %to,
        ?reason,
        "task displaced"
    );
    report.moves.push(TaskMove {
        task_id: task.id.clone(),
        task_type: task.task_type,
        topic: task.topic.clone(),
        from: task.date,
        to,
        reason,
    });
    task.date = to;
}
