//! Blocked date windows for task displacement.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DateRange;
use crate::task::TaskType;

/// Default per-day ceiling when redistributing tasks out of a vacation.
pub const DEFAULT_VACATION_CAPACITY: usize = 6;

/// Why a window is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePurpose {
    /// Busy window; displaced tasks are pushed just past its end
    Conference,
    /// Time off; displaced tasks are spread after it under a daily cap
    Vacation,
    /// Single reserved day from the activity calendar
    Activity,
}

/// A closed date interval that certain task types must not stay in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedRange {
    pub range: DateRange,
    pub purpose: RangePurpose,
    /// Task types moved out of this window
    pub task_types: Vec<TaskType>,
    /// `None` pushes tasks past the window; `Some(n)` spreads them at most
    /// `n` per day after it
    pub capacity: Option<usize>,
}

impl BlockedRange {
    pub fn new(
        range: DateRange,
        purpose: RangePurpose,
        task_types: Vec<TaskType>,
        capacity: Option<usize>,
    ) -> Self {
        Self {
            range,
            purpose,
            task_types,
            capacity,
        }
    }

    /// Conference window: full push-past, no daily cap.
    pub fn conference(range: DateRange, task_types: Vec<TaskType>) -> Self {
        Self::new(range, RangePurpose::Conference, task_types, None)
    }

    /// Vacation window: redistribution with the default daily cap.
    pub fn vacation(range: DateRange, task_types: Vec<TaskType>) -> Self {
        Self::new(
            range,
            RangePurpose::Vacation,
            task_types,
            Some(DEFAULT_VACATION_CAPACITY),
        )
    }

    /// Reserved activity day: every task type is pushed past it.
    pub fn activity_day(date: NaiveDate) -> Self {
        Self::new(
            DateRange::day(date),
            RangePurpose::Activity,
            TaskType::ALL.to_vec(),
            None,
        )
    }

    /// Override the daily cap.
    pub fn with_capacity(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.range.contains(date)
    }

    /// Whether tasks of `task_type` must leave this window.
    pub fn displaces(&self, task_type: TaskType) -> bool {
        self.task_types.contains(&task_type)
    }

    pub fn is_push_past(&self) -> bool {
        self.capacity.is_none()
    }
}
