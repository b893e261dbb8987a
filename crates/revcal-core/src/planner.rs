//! End-to-end planning pipeline.
//!
//! Optimizes a rotation over the configured window, turns it into dated
//! review tasks, displaces those out of blocked windows and builds the day
//! records and metrics a renderer needs.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::calendar::{ActivityCalendar, BlockedRange, DateRange};
use crate::error::{Result, ValidationError};
use crate::metrics::{topic_metrics, SpacingSummary, TopicMetrics};
use crate::schedule::{records_from_tasks, DayRecord, Schedule};
use crate::scheduler::{OptimizerConfig, RotationScheduler, SpacingOptimizer};
use crate::storage::Config;
use crate::task::displacement::{DisplacementPolicy, DisplacementResolver, TaskMove};
use crate::task::{tasks_from_schedule, Task};
use crate::topic::Topic;

/// Everything produced by one planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutput {
    pub range: DateRange,
    pub best_seed: u64,
    pub trials: usize,
    /// Rotation before displacement
    pub schedule: Schedule,
    /// Review tasks after displacement
    pub tasks: Vec<Task>,
    pub moves: Vec<TaskMove>,
    pub records: Vec<DayRecord>,
    pub summary: SpacingSummary,
    pub topics: Vec<TopicMetrics>,
}

/// Validated planning inputs.
#[derive(Debug, Clone)]
pub struct Planner {
    range: DateRange,
    calendar: ActivityCalendar,
    scheduler: RotationScheduler,
    optimizer: OptimizerConfig,
    policy: DisplacementPolicy,
}

impl Planner {
    /// Build a planner, rejecting incomplete or inconsistent settings.
    ///
    /// # Errors
    ///
    /// Returns an error for missing or inverted date ranges, an empty topic
    /// catalog, zero quota, zero trials or a zero capacity.
    pub fn from_config(config: &Config) -> Result<Self> {
        let range = config.date_range()?;
        let catalog = config.catalog();
        if catalog.is_empty() {
            return Err(ValidationError::EmptyCollection("topics".to_string()).into());
        }
        if config.optimizer.trials == 0 {
            return Err(ValidationError::InvalidValue {
                field: "optimizer.trials".to_string(),
                message: "at least one trial is required".to_string(),
            }
            .into());
        }

        let policy = config.displacement_policy()?;
        policy.validate()?;

        Ok(Self {
            range,
            calendar: config.activity_calendar()?,
            scheduler: RotationScheduler::with_config(catalog, config.scheduler_config()?),
            optimizer: config.optimizer.clone(),
            policy,
        })
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn catalog(&self) -> &[Topic] {
        self.scheduler.topics()
    }

    /// Run the full pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if a displaced task finds no free date.
    pub fn plan(&self) -> Result<PlanOutput> {
        tracing::info!(range = %self.range, trials = self.optimizer.trials, "planning");

        let optimizer = SpacingOptimizer::with_config(self.optimizer.clone());
        let best = optimizer.optimize(&self.scheduler, self.range, &self.calendar)?;

        let mut tasks = tasks_from_schedule(&best.schedule);
        let report = DisplacementResolver::with_policy(self.resolve_policy(&best.schedule))
            .resolve(&mut tasks)?;
        tasks.sort_by_key(|t| t.date);

        let activities: Vec<_> = best
            .schedule
            .activity_days()
            .map(|(date, activity)| (date, activity.clone()))
            .collect();
        let records = records_from_tasks(&tasks, activities);

        let output = PlanOutput {
            range: self.range,
            best_seed: best.best_seed,
            trials: best.trials,
            summary: SpacingSummary::of(&best.schedule),
            topics: topic_metrics(&best.schedule, self.scheduler.topics()),
            schedule: best.schedule,
            tasks,
            moves: report.moves,
            records,
        };

        tracing::info!(
            best_seed = output.best_seed,
            tasks = output.tasks.len(),
            moves = output.moves.len(),
            "plan ready"
        );
        Ok(output)
    }

    /// Configured policy plus one push-past window per activity day.
    ///
    /// Days after the range are classified too, up to the displacement
    /// horizon, so a task pushed past the last day still avoids weekends and
    /// other reserved days.
    fn resolve_policy(&self, schedule: &Schedule) -> DisplacementPolicy {
        let mut policy = self.policy.clone();
        policy
            .blocked
            .extend(schedule.activity_days().map(|(date, _)| BlockedRange::activity_day(date)));

        let end = self.range.end();
        let horizon = Duration::days(i64::from(self.policy.max_horizon_days));
        let tail = end
            .succ_opt()
            .zip(end.checked_add_signed(horizon))
            .and_then(|(start, last)| DateRange::new(start, last).ok());
        if let Some(tail) = tail {
            policy.blocked.extend(
                self.calendar
                    .activity_days(tail)
                    .into_iter()
                    .map(BlockedRange::activity_day),
            );
        }
        policy
    }
}
