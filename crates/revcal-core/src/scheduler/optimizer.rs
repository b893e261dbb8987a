//! Monte Carlo search for well-spaced rotation schedules.
//!
//! Runs the [`RotationScheduler`] once per seed, scores each candidate by
//! average re-exposure gap (lower is better) and minimum per-topic review
//! count (higher breaks ties), and keeps the best one.

use serde::{Deserialize, Serialize};

use super::RotationScheduler;
use crate::calendar::{DateRange, DayClassifier};
use crate::error::ValidationError;
use crate::metrics::{average_gap, min_review_count};
use crate::schedule::Schedule;

/// Configuration for the spacing search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Number of seeded trials to evaluate
    pub trials: usize,

    /// Seed of the first trial; trial `i` uses `base_seed + i`
    pub base_seed: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            trials: 200,
            base_seed: 0,
        }
    }
}

/// Score of a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub seed: u64,
    pub average_gap: f64,
    pub min_review_count: usize,
}

impl TrialOutcome {
    /// Whether `self` should replace `best`.
    ///
    /// Strictly lower gap wins; an exactly equal gap needs a strictly higher
    /// minimum review count.
    pub fn beats(&self, best: &TrialOutcome) -> bool {
        self.average_gap < best.average_gap
            || (self.average_gap == best.average_gap
                && self.min_review_count > best.min_review_count)
    }
}

/// Best schedule found by the search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub schedule: Schedule,
    /// `f64::INFINITY` when no topic repeats
    #[serde(with = "finite_or_null")]
    pub average_gap: f64,
    pub min_review_count: usize,
    pub best_seed: u64,
    pub trials: usize,
}

/// Spacing optimizer over seeded rotation runs.
pub struct SpacingOptimizer {
    config: OptimizerConfig,
}

impl SpacingOptimizer {
    /// Create an optimizer with default config.
    pub fn new() -> Self {
        Self {
            config: OptimizerConfig::default(),
        }
    }

    /// Create an optimizer with custom config.
    pub fn with_config(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Evaluate every trial and return the best schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the trial count is zero.
    pub fn optimize<C>(
        &self,
        scheduler: &RotationScheduler,
        range: DateRange,
        classifier: &C,
    ) -> Result<OptimizationResult, ValidationError>
    where
        C: DayClassifier + Sync + ?Sized,
    {
        if self.config.trials == 0 {
            return Err(ValidationError::InvalidValue {
                field: "trials".to_string(),
                message: "at least one trial is required".to_string(),
            });
        }

        let outcomes = self.score_trials(scheduler, range, classifier);

        // Sequential reduction in seed order keeps ties on the earliest seed.
        let mut best = outcomes[0];
        for outcome in &outcomes[1..] {
            if outcome.beats(&best) {
                best = *outcome;
            }
        }

        tracing::info!(
            trials = self.config.trials,
            best_seed = best.seed,
            average_gap = best.average_gap,
            min_review_count = best.min_review_count,
            "spacing search finished"
        );

        Ok(OptimizationResult {
            schedule: scheduler.generate(range, classifier, best.seed),
            average_gap: best.average_gap,
            min_review_count: best.min_review_count,
            best_seed: best.seed,
            trials: self.config.trials,
        })
    }

    fn seeds(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.config.trials as u64).map(move |i| self.config.base_seed.wrapping_add(i))
    }

    #[cfg(not(feature = "parallel"))]
    fn score_trials<C>(
        &self,
        scheduler: &RotationScheduler,
        range: DateRange,
        classifier: &C,
    ) -> Vec<TrialOutcome>
    where
        C: DayClassifier + Sync + ?Sized,
    {
        self.seeds()
            .map(|seed| run_trial(scheduler, range, classifier, seed))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn score_trials<C>(
        &self,
        scheduler: &RotationScheduler,
        range: DateRange,
        classifier: &C,
    ) -> Vec<TrialOutcome>
    where
        C: DayClassifier + Sync + ?Sized,
    {
        use rayon::prelude::*;

        let seeds: Vec<u64> = self.seeds().collect();
        seeds
            .par_iter()
            .map(|&seed| run_trial(scheduler, range, classifier, seed))
            .collect()
    }
}

impl Default for SpacingOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate and score one candidate.
fn run_trial<C>(
    scheduler: &RotationScheduler,
    range: DateRange,
    classifier: &C,
    seed: u64,
) -> TrialOutcome
where
    C: DayClassifier + ?Sized,
{
    let candidate = scheduler.generate(range, classifier, seed);
    let outcome = TrialOutcome {
        seed,
        average_gap: average_gap(&candidate),
        min_review_count: min_review_count(&candidate),
    };
    tracing::debug!(
        seed,
        average_gap = outcome.average_gap,
        min_review_count = outcome.min_review_count,
        "trial scored"
    );
    outcome
}

/// JSON has no infinity; write it as `null` and read `null` back as infinity.
mod finite_or_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
