use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands {
    automod::dir!(pub "src/commands");
}
mod outline;
mod util;

#[derive(Parser)]
#[command(name = "dpp", version, about = "Digital Product Passport utilities")]
struct Cli {
    /// Configuration file (defaults to the nearest dpp-view.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Pretty print JSON output
    #[arg(long, global = true)]
    pretty: bool,
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse passport data against its schema into a property tree
    Parse(commands::parse::Args),
    /// Split a passport into one tab per top-level section
    Tabs(commands::tabs::Args),
    /// Extract headline metrics from passport data
    Metrics(commands::metrics::Args),
    /// Render passport tabs as an outline or a render tree
    Render(commands::render::Args),
    /// Compute composition shares and pie-chart arcs
    Composition(commands::composition::Args),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = util::Context {
        config: util::load_config(cli.config.as_deref())?,
        pretty: cli.pretty,
    };

    match cli.command {
        Commands::Parse(args) => commands::parse::run(args, &ctx),
        Commands::Tabs(args) => commands::tabs::run(args, &ctx),
        Commands::Metrics(args) => commands::metrics::run(args, &ctx),
        Commands::Render(args) => commands::render::run(args, &ctx),
        Commands::Composition(args) => commands::composition::run(args, &ctx),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
