//! Dated study tasks.
//!
//! The task-list variant of the planner works on flat [`Task`] records rather
//! than per-day topic lists. Tasks come from three places:
//! - a tabular upload ([`TaskRow`]), one column per [`TaskType`]
//! - review derivation from study dates ([`derive_reviews`])
//! - a rotation schedule ([`tasks_from_schedule`])

pub mod displacement;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::schedule::Schedule;

/// Kind of task. Determines category colour and which shifting rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskType {
    #[serde(rename = "Study Date")]
    StudyDate,
    #[serde(rename = "1-Day Review")]
    OneDayReview,
    #[serde(rename = "3-Day Review")]
    ThreeDayReview,
    #[serde(rename = "7-Day Review")]
    SevenDayReview,
    #[serde(rename = "14-Day Review")]
    FourteenDayReview,
    #[serde(rename = "30-Day Review")]
    ThirtyDayReview,
    #[serde(rename = "Topic Review")]
    TopicReview,
    #[serde(rename = "Full Length Exam")]
    FullLengthExam,
}

impl TaskType {
    pub const ALL: [TaskType; 8] = [
        TaskType::StudyDate,
        TaskType::OneDayReview,
        TaskType::ThreeDayReview,
        TaskType::SevenDayReview,
        TaskType::FourteenDayReview,
        TaskType::ThirtyDayReview,
        TaskType::TopicReview,
        TaskType::FullLengthExam,
    ];

    /// Spaced-review types, in offset order.
    pub const REVIEWS: [TaskType; 5] = [
        TaskType::OneDayReview,
        TaskType::ThreeDayReview,
        TaskType::SevenDayReview,
        TaskType::FourteenDayReview,
        TaskType::ThirtyDayReview,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskType::StudyDate => "Study Date",
            TaskType::OneDayReview => "1-Day Review",
            TaskType::ThreeDayReview => "3-Day Review",
            TaskType::SevenDayReview => "7-Day Review",
            TaskType::FourteenDayReview => "14-Day Review",
            TaskType::ThirtyDayReview => "30-Day Review",
            TaskType::TopicReview => "Topic Review",
            TaskType::FullLengthExam => "Full Length Exam",
        }
    }

    /// Days after the study date for spaced-review types.
    pub fn offset_days(&self) -> Option<i64> {
        match self {
            TaskType::OneDayReview => Some(1),
            TaskType::ThreeDayReview => Some(3),
            TaskType::SevenDayReview => Some(7),
            TaskType::FourteenDayReview => Some(14),
            TaskType::ThirtyDayReview => Some(30),
            _ => None,
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskType {
    type Err = ValidationError;

    /// Accepts the display label ("1-Day Review") case-insensitively, or the
    /// same label with `_`/`-` for spaces ("full_length_exam").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        TaskType::ALL
            .iter()
            .copied()
            .find(|t| normalize(t.label()) == wanted)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "task_type".to_string(),
                message: format!("unknown task type '{s}'"),
            })
    }
}

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c.to_ascii_lowercase() })
        .collect()
}

/// A dated unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default = "generate_id")]
    pub id: String,
    pub topic: String,
    pub task_type: TaskType,
    pub date: NaiveDate,
}

fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Task {
    /// Create a task with a fresh identifier.
    pub fn new(topic: impl Into<String>, task_type: TaskType, date: NaiveDate) -> Self {
        Self {
            id: generate_id(),
            topic: topic.into(),
            task_type,
            date,
        }
    }

    /// Replace the generated identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// One row of an uploaded task table.
///
/// Columns other than `Topic` are matched against task type labels; unknown
/// columns are ignored. Blank or missing cells mean "no task of that type".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRow {
    #[serde(rename = "Topic", alias = "topic")]
    pub topic: String,
    #[serde(flatten)]
    pub columns: BTreeMap<String, Option<String>>,
}

impl TaskRow {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            columns: BTreeMap::new(),
        }
    }

    /// Set a task type column to a date.
    pub fn with_date(mut self, task_type: TaskType, date: NaiveDate) -> Self {
        self.columns
            .insert(task_type.label().to_string(), Some(date.to_string()));
        self
    }
}

/// Expand table rows into one task per `(topic, type, date)` triple.
///
/// Blank cells are dropped. Tasks are emitted row by row, columns in
/// [`TaskType::ALL`] order.
///
/// # Errors
///
/// Returns an error if a non-blank cell is not an ISO `YYYY-MM-DD` date.
pub fn expand_rows(rows: &[TaskRow]) -> Result<Vec<Task>, ValidationError> {
    let mut tasks = Vec::new();

    for row in rows {
        let topic = row.topic.trim();
        if topic.is_empty() {
            continue;
        }

        let mut cells: Vec<(TaskType, &str)> = Vec::new();
        for (column, value) in &row.columns {
            let Ok(task_type) = column.parse::<TaskType>() else {
                tracing::debug!(column = %column, "ignoring unknown task column");
                continue;
            };
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                cells.push((task_type, value));
            }
        }
        cells.sort_by_key(|(task_type, _)| *task_type);

        for (task_type, value) in cells {
            let date = parse_date(value).map_err(|message| ValidationError::InvalidValue {
                field: format!("{topic} / {task_type}"),
                message,
            })?;
            tasks.push(Task::new(topic, task_type, date));
        }
    }

    Ok(tasks)
}

/// Parse an ISO date, tolerating a trailing time component.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let day = value.split(['T', ' ']).next().unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| format!("invalid date '{value}': {e}"))
}

/// Generate spaced-review tasks from every `Study Date` task.
///
/// Each review lands `offset_days` after its study date. Non-review types in
/// `review_types` are ignored.
pub fn derive_reviews(tasks: &[Task], review_types: &[TaskType]) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.task_type == TaskType::StudyDate)
        .flat_map(|study| {
            review_types.iter().filter_map(move |review| {
                review
                    .offset_days()
                    .map(|days| Task::new(study.topic.clone(), *review, study.date + Duration::days(days)))
            })
        })
        .collect()
}

/// Convert rotation output into `Topic Review` tasks.
///
/// Ids are name-based UUIDs of `(date, slot, topic)`, so the same schedule
/// always yields the same ids.
pub fn tasks_from_schedule(schedule: &Schedule) -> Vec<Task> {
    schedule
        .entries()
        .iter()
        .flat_map(|entry| {
            entry.assigned().iter().enumerate().map(move |(slot, topic)| {
                let name = format!("{}|{}|{}", entry.date, slot, topic.as_str());
                let id = uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, name.as_bytes());
                Task::new(topic.as_str(), TaskType::TopicReview, entry.date).with_id(id.to_string())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleEntry;
    use crate::topic::Topic;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    #[test]
    fn task_type_parses_labels_and_snake_case() {
        assert_eq!("1-Day Review".parse::<TaskType>().unwrap(), TaskType::OneDayReview);
        assert_eq!("full_length_exam".parse::<TaskType>().unwrap(), TaskType::FullLengthExam);
        assert_eq!("study date".parse::<TaskType>().unwrap(), TaskType::StudyDate);
        assert!("Homework".parse::<TaskType>().is_err());
    }

    #[test]
    fn task_type_serializes_with_label() {
        let json = serde_json::to_string(&TaskType::SevenDayReview).unwrap();
        assert_eq!(json, "\"7-Day Review\"");
    }

    #[test]
    fn expand_rows_drops_blanks() {
        let json = r#"[
            {"Topic": "Bio 1-2", "Study Date": "2025-06-02", "1-Day Review": "2025-06-03", "3-Day Review": null},
            {"Topic": "Physics 7", "Study Date": "", "7-Day Review": "2025-06-10T00:00:00", "Notes": "x"}
        ]"#;
        let rows: Vec<TaskRow> = serde_json::from_str(json).unwrap();
        let tasks = expand_rows(&rows).unwrap();

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].task_type, TaskType::StudyDate);
        assert_eq!(tasks[1].task_type, TaskType::OneDayReview);
        assert_eq!(tasks[2].topic, "Physics 7");
        assert_eq!(tasks[2].date, d(6, 10));
    }

    #[test]
    fn expand_rows_rejects_bad_dates() {
        let mut row = TaskRow::new("Bio 1-2");
        row.columns
            .insert("Study Date".to_string(), Some("June 2".to_string()));
        let err = expand_rows(&[row]).unwrap_err();
        assert!(err.to_string().contains("Bio 1-2"));
    }

    #[test]
    fn derive_reviews_uses_offsets() {
        let study = vec![Task::new("Bio 1-2", TaskType::StudyDate, d(6, 2))];
        let reviews = derive_reviews(&study, &TaskType::REVIEWS);
        let dates: Vec<_> = reviews.iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![d(6, 3), d(6, 5), d(6, 9), d(6, 16), d(7, 2)]);
    }

    #[test]
    fn tasks_from_schedule_preserves_slot_order() {
        let mut schedule = Schedule::new();
        schedule.push(ScheduleEntry::topics(
            d(7, 8),
            vec![Topic::new("Bio 1-2"), Topic::new("Physics 7")],
        ));
        let tasks = tasks_from_schedule(&schedule);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].topic, "Physics 7");
        assert!(tasks.iter().all(|t| t.task_type == TaskType::TopicReview));
        assert_ne!(tasks[0].id, tasks[1].id);
    }

    #[test]
    fn tasks_from_schedule_ids_are_stable() {
        let mut schedule = Schedule::new();
        schedule.push(ScheduleEntry::topics(
            d(7, 8),
            vec![Topic::new("Bio 1-2"), Topic::new("Physics 7")],
        ));
        schedule.push(ScheduleEntry::topics(d(7, 9), vec![Topic::new("Bio 1-2")]));

        let first = tasks_from_schedule(&schedule);
        let second = tasks_from_schedule(&schedule);
        assert_eq!(first, second);
        assert_ne!(first[0].id, first[2].id);
        assert!(uuid::Uuid::parse_str(&first[0].id).is_ok());
    }

    #[test]
    fn task_id_defaults_when_missing() {
        let task: Task = serde_json::from_str(
            r#"{"topic": "Bio 1-2", "task_type": "Study Date", "date": "2025-06-02"}"#,
        )
        .unwrap();
        assert!(!task.id.is_empty());
    }
}
