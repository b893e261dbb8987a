use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "revcal-cli", version, about = "Study-review calendar planner")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline from the config file
    Plan(commands::plan::PlanArgs),
    /// Generate one rotation with a fixed seed
    Generate(commands::rotation::GenerateArgs),
    /// Search seeds for the best-spaced rotation
    Optimize(commands::rotation::OptimizeArgs),
    /// Move tasks out of blocked windows
    Resolve(commands::resolve::ResolveArgs),
    /// Show the topic catalog
    Topics(commands::topics::TopicsArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Plan(args) => commands::plan::run(args),
        Commands::Generate(args) => commands::rotation::run_generate(args),
        Commands::Optimize(args) => commands::rotation::run_optimize(args),
        Commands::Resolve(args) => commands::resolve::run(args),
        Commands::Topics(args) => commands::topics::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "revcal-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
