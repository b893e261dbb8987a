//! Topic rotation scheduler.
//!
//! Assigns a fixed pool of topics to calendar days:
//! - Skips days the [`DayClassifier`] reserves for an activity
//! - Force-includes fixed per-date topics
//! - Fills the remaining slots least-recently-seen first, with seeded
//!   random tie-breaking (shuffle, then stable sort on last-seen date)
//! - Never places two topics of the same subject on one day

pub mod optimizer;

pub use optimizer::{OptimizationResult, OptimizerConfig, SpacingOptimizer, TrialOutcome};

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::calendar::{DateRange, DayClassifier};
use crate::schedule::{Schedule, ScheduleEntry};
use crate::topic::{dedup_topics, Topic};

/// Rotation scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Topics assigned per day
    pub per_day: usize,
    /// Topics forced onto specific dates
    #[serde(default)]
    pub fixed_assignments: BTreeMap<NaiveDate, Vec<Topic>>,
    /// Per-date replacement for `per_day`
    #[serde(default)]
    pub quota_overrides: BTreeMap<NaiveDate, usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            per_day: 4,
            fixed_assignments: BTreeMap::new(),
            quota_overrides: BTreeMap::new(),
        }
    }
}

impl SchedulerConfig {
    pub fn new(per_day: usize) -> Self {
        Self {
            per_day,
            ..Default::default()
        }
    }

    /// Force `topics` onto `date`.
    pub fn with_fixed(mut self, date: NaiveDate, topics: Vec<Topic>) -> Self {
        self.fixed_assignments.insert(date, topics);
        self
    }

    /// Use a different quota on `date`.
    pub fn with_quota(mut self, date: NaiveDate, per_day: usize) -> Self {
        self.quota_overrides.insert(date, per_day);
        self
    }

    /// Quota in effect on `date`.
    pub fn quota(&self, date: NaiveDate) -> usize {
        self.quota_overrides
            .get(&date)
            .copied()
            .unwrap_or(self.per_day)
    }
}

/// Least-recently-seen topic rotation over a date range.
#[derive(Debug, Clone)]
pub struct RotationScheduler {
    topics: Vec<Topic>,
    config: SchedulerConfig,
}

impl RotationScheduler {
    /// Create a scheduler with the default quota of four topics per day.
    ///
    /// Empty and duplicate topics are dropped.
    pub fn new(topics: Vec<Topic>) -> Self {
        Self::with_config(topics, SchedulerConfig::default())
    }

    /// Create with custom config.
    pub fn with_config(topics: Vec<Topic>, config: SchedulerConfig) -> Self {
        Self {
            topics: dedup_topics(topics),
            config,
        }
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Generate a schedule for every date in `range`.
    ///
    /// Output is fully determined by the inputs and `seed`. Days where too
    /// few distinct subjects are available get fewer topics than the quota.
    pub fn generate<C>(&self, range: DateRange, classifier: &C, seed: u64) -> Schedule
    where
        C: DayClassifier + ?Sized,
    {
        let mut rng = Mcg128Xsl64::seed_from_u64(seed);
        let mut last_seen: HashMap<&Topic, NaiveDate> =
            self.topics.iter().map(|t| (t, NaiveDate::MIN)).collect();
        let mut schedule = Schedule::new();

        for date in range.days() {
            // 1. Reserved day
            if let Some(activity) = classifier.activity(date) {
                schedule.push(ScheduleEntry::activity(date, activity));
                continue;
            }

            // 2. Fixed topics
            let fixed: &[Topic] = self
                .config
                .fixed_assignments
                .get(&date)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            for topic in fixed {
                if let Some(seen) = last_seen.get_mut(topic) {
                    *seen = date;
                }
            }

            let mut day_topics: Vec<Topic> = fixed.to_vec();

            // 3. Remaining slots
            let slots = self.config.quota(date).saturating_sub(fixed.len());
            if slots > 0 {
                let picked = self.pick(fixed, slots, &last_seen, &mut rng);
                for topic in &picked {
                    last_seen.insert(*topic, date);
                }
                day_topics.extend(picked.into_iter().cloned());
            }

            schedule.push(ScheduleEntry::topics(date, day_topics));
        }

        schedule
    }

    /// Greedy least-recently-seen selection for one day.
    fn pick<'a>(
        &'a self,
        fixed: &[Topic],
        slots: usize,
        last_seen: &HashMap<&'a Topic, NaiveDate>,
        rng: &mut Mcg128Xsl64,
    ) -> Vec<&'a Topic> {
        // 4. Shuffle, then stable sort by last seen
        let mut pool: Vec<&Topic> = self.topics.iter().filter(|t| !fixed.contains(*t)).collect();
        pool.shuffle(rng);
        pool.sort_by_key(|t| last_seen.get(*t).copied().unwrap_or(NaiveDate::MIN));

        // 5. One topic per subject per day
        let mut subjects: HashSet<&str> = fixed.iter().map(Topic::subject).collect();
        let mut picked = Vec::with_capacity(slots);
        for topic in pool {
            if picked.len() == slots {
                break;
            }
            if subjects.insert(topic.subject()) {
                picked.push(topic);
            }
        }
        picked
    }
}
