//! cleo — watch history to graph, graph to HTML.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cleo_cli::{commands, validate};
use cleo_core::CleoConfig;

#[derive(Parser, Debug)]
#[command(name = "cleo")]
#[command(version, about = "Build a graph from a watch-history export and render it")]
struct Args {
    /// Log progress to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a watch-history.json export into the graph store
    Import {
        /// Path to watch-history.json from Google Takeout
        history: PathBuf,

        /// SQLite database to create or update [default: cleo_graph.db]
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Generate an HTML graph report from the graph store
    Report {
        /// SQLite database to read [default: cleo_graph.db]
        #[arg(long)]
        db: Option<PathBuf>,

        /// HTML file to write [default: graph_report.html]
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check the schema and edge endpoints of a graph store
    Validate {
        /// SQLite database to check [default: cleo_graph.db]
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CleoConfig::from_env()?;

    match args.command {
        Command::Import { history, db } => {
            let config = config.with_db_path(db);
            let summary = commands::import(&history, &config)?;
            println!("{}", commands::import_message(&summary, &config.db_path));
        }
        Command::Report { db, out } => {
            let config = config.with_db_path(db).with_report_path(out);
            let report_path = commands::report(&config)?;
            println!("Report generated at {}", report_path.display());
        }
        Command::Validate { db } => {
            let config = config.with_db_path(db);
            let report = validate::validate(&config.db_path);
            validate::print_report(&report);
            if !report.is_healthy() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
