//! Completion tracking for day items.
//!
//! A day can list the same topic twice, so the key carries the item's slot
//! within its day as well as date, type and topic.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::DateRange;
use crate::schedule::DayRecord;
use crate::task::TaskType;

/// Identity of one item on one day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompletionKey {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    pub topic: String,
    pub slot: usize,
}

impl CompletionKey {
    pub fn new(
        date: NaiveDate,
        task_type: Option<TaskType>,
        topic: impl Into<String>,
        slot: usize,
    ) -> Self {
        Self {
            date,
            task_type,
            topic: topic.into(),
            slot,
        }
    }
}

/// Keys for every item in `records`, in record order.
pub fn keys_for(records: &[DayRecord]) -> Vec<CompletionKey> {
    records
        .iter()
        .flat_map(|record| {
            record.items.iter().enumerate().map(move |(slot, item)| {
                CompletionKey::new(record.date, item.task_type, item.topic.clone(), slot)
            })
        })
        .collect()
}

/// Set of completed items. Serializes as a sorted list of keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progress {
    done: BTreeSet<CompletionKey>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip an item; returns the new state.
    pub fn toggle(&mut self, key: CompletionKey) -> bool {
        if self.done.remove(&key) {
            false
        } else {
            self.done.insert(key);
            true
        }
    }

    pub fn set_done(&mut self, key: CompletionKey, done: bool) {
        if done {
            self.done.insert(key);
        } else {
            self.done.remove(&key);
        }
    }

    pub fn is_done(&self, key: &CompletionKey) -> bool {
        self.done.contains(key)
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    /// Completed items dated inside `window`.
    pub fn done_in(&self, window: DateRange) -> impl Iterator<Item = &CompletionKey> {
        self.done.iter().filter(move |k| window.contains(k.date))
    }

    /// Share of `records` items that are done; 0.0 when there are none.
    pub fn completion_ratio(&self, records: &[DayRecord]) -> f64 {
        let keys = keys_for(records);
        if keys.is_empty() {
            return 0.0;
        }
        let done = keys.iter().filter(|k| self.is_done(k)).count();
        done as f64 / keys.len() as f64
    }
}
