//! Schedule types produced by the rotation scheduler.
//!
//! A [`Schedule`] is an ordered list of [`ScheduleEntry`] values, one per
//! calendar day. Each day is either reserved for an [`Activity`] or carries
//! zero or more topics. [`DayRecord`] is the flattened form handed to
//! rendering and export.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::Activity;
use crate::task::{Task, TaskType};
use crate::topic::Topic;

/// What happens on a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DayPlan {
    /// Reserved day; no topics
    Activity(Activity),
    /// Topics assigned to the day, in slot order
    Topics(Vec<Topic>),
}

/// One calendar day of a generated schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub plan: DayPlan,
}

impl ScheduleEntry {
    pub fn activity(date: NaiveDate, activity: Activity) -> Self {
        Self {
            date,
            plan: DayPlan::Activity(activity),
        }
    }

    pub fn topics(date: NaiveDate, topics: Vec<Topic>) -> Self {
        Self {
            date,
            plan: DayPlan::Topics(topics),
        }
    }

    /// Topics assigned to this day (empty for activity days).
    pub fn assigned(&self) -> &[Topic] {
        match &self.plan {
            DayPlan::Topics(topics) => topics,
            DayPlan::Activity(_) => &[],
        }
    }

    pub fn activity_label(&self) -> Option<&Activity> {
        match &self.plan {
            DayPlan::Activity(activity) => Some(activity),
            DayPlan::Topics(_) => None,
        }
    }
}

/// Ordered sequence of day entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.date == date)
    }

    /// Every `(topic, date)` assignment, skipping activity days.
    pub fn assignments(&self) -> impl Iterator<Item = (&Topic, NaiveDate)> {
        self.entries
            .iter()
            .flat_map(|e| e.assigned().iter().map(move |t| (t, e.date)))
    }

    /// Dates reserved for an activity.
    pub fn activity_days(&self) -> impl Iterator<Item = (NaiveDate, &Activity)> {
        self.entries
            .iter()
            .filter_map(|e| e.activity_label().map(|a| (e.date, a)))
    }

    /// Flatten into export records.
    pub fn to_records(&self) -> Vec<DayRecord> {
        self.entries
            .iter()
            .map(|entry| match &entry.plan {
                DayPlan::Activity(activity) => DayRecord::activity(entry.date, activity.clone()),
                DayPlan::Topics(topics) => DayRecord {
                    date: entry.date,
                    activity: None,
                    items: topics
                        .iter()
                        .map(|t| DayItem {
                            task_type: None,
                            topic: t.as_str().to_string(),
                        })
                        .collect(),
                },
            })
            .collect()
    }
}

/// One line on a day: an optional task type and the topic text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayItem {
    pub task_type: Option<TaskType>,
    pub topic: String,
}

/// Per-day record consumed by rendering and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<Activity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<DayItem>,
}

impl DayRecord {
    pub fn activity(date: NaiveDate, activity: Activity) -> Self {
        Self {
            date,
            activity: Some(activity),
            items: Vec::new(),
        }
    }
}

/// Group dated tasks into day records, adding activity days.
///
/// Days with neither tasks nor an activity are omitted. Within a day, tasks
/// keep their input order.
pub fn records_from_tasks(
    tasks: &[Task],
    activities: impl IntoIterator<Item = (NaiveDate, Activity)>,
) -> Vec<DayRecord> {
    let mut by_date: BTreeMap<NaiveDate, DayRecord> = BTreeMap::new();

    for (date, activity) in activities {
        by_date.insert(date, DayRecord::activity(date, activity));
    }

    for task in tasks {
        let record = by_date.entry(task.date).or_insert_with(|| DayRecord {
            date: task.date,
            activity: None,
            items: Vec::new(),
        });
        record.items.push(DayItem {
            task_type: Some(task.task_type),
            topic: task.topic.clone(),
        });
    }

    by_date.into_values().collect()
}
