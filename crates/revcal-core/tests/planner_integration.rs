//! Integration tests for the planning pipeline.
//!
//! Drives the public API the way the CLI does: config -> planner -> records,
//! and the standalone rotation/displacement pieces on the worked examples.

use chrono::NaiveDate;
use indoc::indoc;
use revcal_core::calendar::week_window;
use revcal_core::progress::keys_for;
use revcal_core::task::{derive_reviews, expand_rows};
use revcal_core::{
    BlockedRange, Config, DateRange, DisplacementPolicy, DisplacementResolver, MoveReason,
    Planner, Progress, Task, TaskRow, TaskType,
};

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, day).unwrap()
}

// ============================================================================
// Planner
// ============================================================================

const SUMMER: &str = indoc! {r#"
    topics = ["Gen chem 1-2", "Gen chem 3-4", "Physics 1-2", "Physics 3-4", "Bio 1-2", "Bio 3-4"]

    [schedule]
    start_date = "2025-07-07"
    end_date = "2025-08-03"
    topics_per_day = 3
    skip_weekends = true

    [optimizer]
    trials = 8

    [fixed]
    "2025-07-08" = ["Bio 1-2"]

    [[activities]]
    label = "FL Practice Exam"
    date = "2025-07-16"

    [[blocked]]
    purpose = "conference"
    start = "2025-07-21"
    end = "2025-07-22"
"#};

#[test]
fn planner_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SUMMER).unwrap();

    let config = Config::load_from(&path).unwrap();
    let output = Planner::from_config(&config).unwrap().plan().unwrap();

    assert_eq!(output.schedule.len(), 28);
    let fixed_day = output.schedule.get(d(7, 8)).unwrap();
    assert_eq!(fixed_day.assigned()[0].as_str(), "Bio 1-2");

    // Nothing left inside the conference or on activity days.
    for task in &output.tasks {
        assert!(task.date < d(7, 21) || task.date > d(7, 22));
    }
    for record in &output.records {
        if record.activity.is_some() {
            assert!(record.items.is_empty(), "{} has items", record.date);
        }
    }
    assert!(output
        .moves
        .iter()
        .all(|m| m.reason == MoveReason::PushPast && m.to == d(7, 23)));

    // Records stay inside the window.
    assert_eq!(output.records.first().unwrap().date, d(7, 7));
    assert!(output.records.iter().all(|r| DateRange::new(d(7, 7), d(8, 3))
        .unwrap()
        .contains(r.date)));
}

#[test]
fn plan_output_serializes() {
    let config: Config = toml::from_str(SUMMER).unwrap();
    let output = Planner::from_config(&config).unwrap().plan().unwrap();
    let json = serde_json::to_value(&output).unwrap();

    assert_eq!(json["range"]["start"], "2025-07-07");
    assert!(json["summary"]["average_gap"].is_number());
    assert_eq!(json["topics"].as_array().unwrap().len(), 6);
}

#[test]
fn progress_tracks_a_week_of_the_plan() {
    let config: Config = toml::from_str(SUMMER).unwrap();
    let output = Planner::from_config(&config).unwrap().plan().unwrap();

    let mut progress = Progress::new();
    let week = week_window(d(7, 7));
    for key in keys_for(&output.records) {
        if week.contains(key.date) {
            progress.toggle(key);
        }
    }

    // Mon-Fri with three topics each
    assert_eq!(progress.done_in(week).count(), 15);
    let ratio = progress.completion_ratio(&output.records);
    assert!(ratio > 0.0 && ratio < 1.0);
}

// ============================================================================
// Displacement on tabular input
// ============================================================================

#[test]
fn rows_reviews_and_vacation() {
    let rows = vec![
        TaskRow::new("Bio 1-2").with_date(TaskType::StudyDate, d(6, 1)),
        TaskRow::new("Bio 3-4").with_date(TaskType::StudyDate, d(6, 2)),
    ];
    let mut tasks = expand_rows(&rows).unwrap();
    let reviews = derive_reviews(&tasks, &TaskType::REVIEWS);
    assert_eq!(reviews.len(), 10);
    tasks.extend(reviews);

    // 1-Day reviews land on 06-02 and 06-03; a vacation over both moves them.
    let policy = DisplacementPolicy::new().with_blocked(BlockedRange::vacation(
        DateRange::new(d(6, 2), d(6, 3)).unwrap(),
        vec![TaskType::OneDayReview, TaskType::ThreeDayReview],
    ));
    let report = DisplacementResolver::with_policy(policy)
        .resolve(&mut tasks)
        .unwrap();

    assert_eq!(report.by_reason(MoveReason::Redistribution).count(), 2);
    for task in tasks.iter().filter(|t| t.task_type == TaskType::OneDayReview) {
        assert_eq!(task.date, d(6, 4));
    }
    // Study dates stay put even when inside the window.
    let study: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.task_type == TaskType::StudyDate)
        .collect();
    assert_eq!(study[1].date, d(6, 2));
}

#[test]
fn exams_never_share_a_day() {
    let mut tasks = vec![
        Task::new("FL 1", TaskType::FullLengthExam, d(6, 10)),
        Task::new("FL 2", TaskType::FullLengthExam, d(6, 10)),
        Task::new("FL 3", TaskType::FullLengthExam, d(6, 11)),
    ];
    let report = DisplacementResolver::new().resolve(&mut tasks).unwrap();

    assert_eq!(report.len(), 2);
    let mut dates: Vec<NaiveDate> = tasks.iter().map(|t| t.date).collect();
    dates.sort();
    assert_eq!(dates, vec![d(6, 10), d(6, 11), d(6, 12)]);
}
