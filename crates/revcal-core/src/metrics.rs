//! Spacing metrics for generated schedules.
//!
//! - [`average_gap`]: mean days between consecutive exposures of a topic
//! - [`min_review_count`]: fewest exposures of any scheduled topic
//! - [`topic_metrics`]: per-topic table for display and export

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::days_between;
use crate::schedule::Schedule;
use crate::topic::Topic;

/// Dates each topic was assigned on, sorted ascending.
fn dates_by_topic(schedule: &Schedule) -> BTreeMap<&Topic, Vec<NaiveDate>> {
    let mut by_topic: BTreeMap<&Topic, Vec<NaiveDate>> = BTreeMap::new();
    for (topic, date) in schedule.assignments() {
        by_topic.entry(topic).or_default().push(date);
    }
    for dates in by_topic.values_mut() {
        dates.sort_unstable();
    }
    by_topic
}

/// Sum of consecutive day differences and how many there are.
fn gap_totals(dates: &[NaiveDate]) -> (i64, usize) {
    dates.windows(2).fold((0, 0), |(sum, count), pair| {
        (sum + days_between(pair[0], pair[1]), count + 1)
    })
}

/// Mean re-exposure gap across all topics, in days.
///
/// Returns `f64::INFINITY` when no topic is scheduled more than once.
pub fn average_gap(schedule: &Schedule) -> f64 {
    let (total, count) = dates_by_topic(schedule)
        .values()
        .map(|dates| gap_totals(dates))
        .fold((0i64, 0usize), |(t, c), (gt, gc)| (t + gt, c + gc));

    if count == 0 {
        f64::INFINITY
    } else {
        total as f64 / count as f64
    }
}

/// Fewest exposures of any topic that appears at least once.
///
/// Returns 0 for a schedule without topic assignments.
pub fn min_review_count(schedule: &Schedule) -> usize {
    dates_by_topic(schedule)
        .values()
        .map(Vec::len)
        .min()
        .unwrap_or(0)
}

/// Review statistics for a single topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMetrics {
    pub topic: Topic,
    pub review_count: usize,
    /// `None` when the topic appears fewer than twice
    pub average_gap: Option<f64>,
    pub first_seen: Option<NaiveDate>,
    pub last_seen: Option<NaiveDate>,
}

/// Per-topic table in catalog order.
///
/// Catalog topics never scheduled appear with a count of 0. Scheduled topics
/// missing from the catalog (fixed assignments) are appended after it.
pub fn topic_metrics(schedule: &Schedule, catalog: &[Topic]) -> Vec<TopicMetrics> {
    let mut by_topic = dates_by_topic(schedule);

    let mut table: Vec<TopicMetrics> = catalog
        .iter()
        .map(|topic| {
            let dates = by_topic.remove(topic).unwrap_or_default();
            build_row(topic.clone(), &dates)
        })
        .collect();

    table.extend(
        by_topic
            .into_iter()
            .map(|(topic, dates)| build_row(topic.clone(), &dates)),
    );
    table
}

fn build_row(topic: Topic, dates: &[NaiveDate]) -> TopicMetrics {
    let (total, count) = gap_totals(dates);
    TopicMetrics {
        topic,
        review_count: dates.len(),
        average_gap: (count > 0).then(|| total as f64 / count as f64),
        first_seen: dates.first().copied(),
        last_seen: dates.last().copied(),
    }
}

/// Summary of a schedule's spacing quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacingSummary {
    /// Mean re-exposure gap in days; `None` stands for "no topic repeats"
    pub average_gap: Option<f64>,
    pub min_review_count: usize,
    pub scheduled_topics: usize,
    pub total_assignments: usize,
}

impl SpacingSummary {
    pub fn of(schedule: &Schedule) -> Self {
        let gap = average_gap(schedule);
        Self {
            average_gap: gap.is_finite().then_some(gap),
            min_review_count: min_review_count(schedule),
            scheduled_topics: dates_by_topic(schedule).len(),
            total_assignments: schedule.assignments().count(),
        }
    }
}
