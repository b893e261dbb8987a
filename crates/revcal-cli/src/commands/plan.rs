use std::path::PathBuf;

use clap::Args;
use revcal_core::Planner;

use super::{format_gap, load_config, print_json, CliResult};

#[derive(Args)]
pub struct PlanArgs {
    /// Config file (defaults to the one in the data directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: PlanArgs) -> CliResult {
    let config = load_config(args.config.as_deref())?;
    let output = Planner::from_config(&config)?.plan()?;

    if args.json {
        return print_json(&output);
    }

    for record in &output.records {
        if let Some(activity) = &record.activity {
            println!("{}  [{}]", record.date, activity);
            continue;
        }
        let topics: Vec<&str> = record.items.iter().map(|i| i.topic.as_str()).collect();
        println!("{}  {}", record.date, topics.join(", "));
    }

    println!();
    println!(
        "best seed {} of {} trials, average gap {}, min reviews {}",
        output.best_seed,
        output.trials,
        format_gap(output.summary.average_gap),
        output.summary.min_review_count
    );
    if !output.moves.is_empty() {
        println!("{} task(s) displaced", output.moves.len());
    }
    Ok(())
}
