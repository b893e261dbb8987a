use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use revcal_core::metrics::{topic_metrics, SpacingSummary, TopicMetrics};
use revcal_core::{
    ActivityCalendar, DateRange, OptimizationResult, OptimizerConfig, RotationScheduler, Schedule,
    SchedulerConfig, SpacingOptimizer,
};
use serde::Serialize;

use super::{format_gap, load_topics, print_json, print_schedule, CliResult};

#[derive(Args)]
pub struct WindowArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,
    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,
    /// Topics per day
    #[arg(long, default_value_t = 4)]
    per_day: usize,
    /// Mark Saturdays and Sundays as weekend days
    #[arg(long)]
    skip_weekends: bool,
    /// Topic list file, one topic per line
    #[arg(long)]
    topics: Option<PathBuf>,
    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    window: WindowArgs,
    /// Shuffle seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Args)]
pub struct OptimizeArgs {
    #[command(flatten)]
    window: WindowArgs,
    /// Number of seeded trials
    #[arg(long, default_value_t = 200)]
    trials: usize,
    /// Seed of the first trial
    #[arg(long, default_value_t = 0)]
    base_seed: u64,
}

#[derive(Serialize)]
struct GenerateOutput<'a> {
    seed: u64,
    summary: &'a SpacingSummary,
    schedule: &'a Schedule,
}

#[derive(Serialize)]
struct OptimizeOutput<'a> {
    result: &'a OptimizationResult,
    topics: Vec<TopicMetrics>,
}

struct Prepared {
    range: DateRange,
    calendar: ActivityCalendar,
    scheduler: RotationScheduler,
}

fn prepare(window: &WindowArgs) -> Result<Prepared, Box<dyn std::error::Error>> {
    if window.per_day == 0 {
        return Err("--per-day must be at least 1".into());
    }
    Ok(Prepared {
        range: DateRange::new(window.start, window.end)?,
        calendar: ActivityCalendar::new().with_weekends(window.skip_weekends),
        scheduler: RotationScheduler::with_config(
            load_topics(window.topics.as_deref())?,
            SchedulerConfig::new(window.per_day),
        ),
    })
}

pub fn run_generate(args: GenerateArgs) -> CliResult {
    let prepared = prepare(&args.window)?;
    let schedule = prepared
        .scheduler
        .generate(prepared.range, &prepared.calendar, args.seed);
    let summary = SpacingSummary::of(&schedule);

    if args.window.json {
        return print_json(&GenerateOutput {
            seed: args.seed,
            summary: &summary,
            schedule: &schedule,
        });
    }

    print_schedule(&schedule);
    println!();
    println!(
        "seed {}, average gap {}, min reviews {}",
        args.seed,
        format_gap(summary.average_gap),
        summary.min_review_count
    );
    Ok(())
}

pub fn run_optimize(args: OptimizeArgs) -> CliResult {
    let prepared = prepare(&args.window)?;
    let optimizer = SpacingOptimizer::with_config(OptimizerConfig {
        trials: args.trials,
        base_seed: args.base_seed,
    });
    let result = optimizer.optimize(&prepared.scheduler, prepared.range, &prepared.calendar)?;

    if args.window.json {
        return print_json(&OptimizeOutput {
            result: &result,
            topics: topic_metrics(&result.schedule, prepared.scheduler.topics()),
        });
    }

    print_schedule(&result.schedule);
    println!();
    let summary = SpacingSummary::of(&result.schedule);
    println!(
        "best seed {} of {} trials, average gap {}, min reviews {}",
        result.best_seed,
        result.trials,
        format_gap(summary.average_gap),
        result.min_review_count
    );
    Ok(())
}
