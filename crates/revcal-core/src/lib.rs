//! # revcal Core Library
//!
//! This library provides the scheduling logic for a study-review calendar.
//! The `revcal-cli` binary is a thin front end over the same core library.
//!
//! ## Architecture
//!
//! - **Rotation**: seeded greedy assignment of topics to days, least recently
//!   reviewed first, one topic per subject per day
//! - **Optimizer**: Monte Carlo search over rotation seeds for the smallest
//!   average re-review gap
//! - **Displacement**: moves dated tasks out of blocked windows
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`RotationScheduler`]: one rotation run over a date range
//! - [`SpacingOptimizer`]: best-of-N search over seeds
//! - [`DisplacementResolver`]: push-past, redistribution, collision passes
//! - [`Planner`]: the whole pipeline driven by a [`Config`]

pub mod calendar;
pub mod error;
pub mod metrics;
pub mod planner;
pub mod progress;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod task;
pub mod topic;

pub use calendar::{
    Activity, ActivityCalendar, BlockedRange, DateRange, DayClassifier, RangePurpose,
};
pub use error::{ConfigError, CoreError, DisplacementError, ValidationError};
pub use metrics::{SpacingSummary, TopicMetrics};
pub use planner::{PlanOutput, Planner};
pub use progress::{CompletionKey, Progress};
pub use schedule::{DayItem, DayPlan, DayRecord, Schedule, ScheduleEntry};
pub use scheduler::{
    OptimizationResult, OptimizerConfig, RotationScheduler, SchedulerConfig, SpacingOptimizer,
};
pub use storage::Config;
pub use task::displacement::{
    DisplacementPolicy, DisplacementReport, DisplacementResolver, MoveReason, TaskMove,
};
pub use task::{Task, TaskRow, TaskType};
pub use topic::Topic;
