use std::path::PathBuf;

use clap::Args;
use revcal_core::topic::distinct_subjects;
use revcal_core::Topic;
use serde::Serialize;

use super::{load_topics, print_json, CliResult};

#[derive(Args)]
pub struct TopicsArgs {
    /// Topic list file (defaults to the built-in catalog)
    #[arg(long)]
    file: Option<PathBuf>,
    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct TopicLine<'a> {
    topic: &'a Topic,
    subject: &'a str,
}

pub fn run(args: TopicsArgs) -> CliResult {
    let topics = load_topics(args.file.as_deref())?;

    if args.json {
        let lines: Vec<TopicLine> = topics
            .iter()
            .map(|topic| TopicLine {
                topic,
                subject: topic.subject(),
            })
            .collect();
        return print_json(&lines);
    }

    for topic in &topics {
        println!("{:<28} {}", topic.as_str(), topic.subject());
    }
    println!();
    println!("{} topics, {} subjects", topics.len(), distinct_subjects(&topics));
    Ok(())
}
