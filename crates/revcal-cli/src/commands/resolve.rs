use std::path::PathBuf;

use clap::Args;
use revcal_core::task::{derive_reviews, expand_rows};
use revcal_core::{DisplacementResolver, Task, TaskMove, TaskRow, TaskType};
use serde::Serialize;

use super::{load_config, print_json, CliResult};

#[derive(Args)]
pub struct ResolveArgs {
    /// JSON file with a list of tasks or topic rows
    file: PathBuf,
    /// Config file supplying the blocked windows
    #[arg(long)]
    config: Option<PathBuf>,
    /// Add spaced reviews for every study date before resolving
    #[arg(long)]
    derive_reviews: bool,
}

/// Parse a task list (`{id?, topic, task_type, date}`) or topic rows
/// (`{Topic, <type label>: date}`).
///
/// Any element carrying a `task_type` key makes the whole file a task list,
/// so a malformed task is reported instead of being read as a row.
fn parse_tasks(text: &str) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let items = value
        .as_array()
        .ok_or("expected a JSON array of tasks or rows")?;

    let is_task_list = items
        .iter()
        .any(|item| item.get("task_type").is_some());

    if is_task_list {
        Ok(serde_json::from_value(value)?)
    } else {
        let rows: Vec<TaskRow> = serde_json::from_value(value)?;
        Ok(expand_rows(&rows)?)
    }
}

#[derive(Serialize)]
struct ResolveOutput {
    tasks: Vec<Task>,
    moves: Vec<TaskMove>,
}

pub fn run(args: ResolveArgs) -> CliResult {
    let config = load_config(args.config.as_deref())?;
    let policy = config.displacement_policy()?;

    let text = std::fs::read_to_string(&args.file)?;
    let mut tasks = parse_tasks(&text)?;
    if args.derive_reviews {
        let reviews = derive_reviews(&tasks, &TaskType::REVIEWS);
        tasks.extend(reviews);
    }

    let report = DisplacementResolver::with_policy(policy).resolve(&mut tasks)?;
    tasks.sort_by_key(|t| (t.date, t.task_type));

    print_json(&ResolveOutput {
        tasks,
        moves: report.moves,
    })
}
