//! Lineage CLI - ancestry queries over line-oriented DAG descriptions.

mod query;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "lineage")]
#[command(about = "Ancestry queries over line-oriented DAG descriptions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: Format,
}

/// How query results are rendered.
#[derive(Clone, Copy, ValueEnum)]
pub enum Format {
    /// Plain text, one entry per line
    Text,
    /// Sorted JSON for stable machine-readable output
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print nodes with no outgoing edges
    Leaves {
        /// Path to the graph description (use - for stdin)
        input: String,
    },

    /// Print the ancestor closure of every node
    Ancestors {
        /// Path to the graph description (use - for stdin)
        input: String,

        /// Restrict output to a single node
        #[arg(long)]
        node: Option<String>,
    },

    /// Print the node(s) whose ancestor-set size best splits the graph
    Bisect {
        /// Path to the graph description (use - for stdin)
        input: String,
    },

    /// Validate the description and report the graph shape
    Check {
        /// Path to the graph description (use - for stdin)
        input: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Helper to format engine errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(engine_err) = err.downcast_ref::<lineage_core::Error>() {
            anyhow::anyhow!("{}", engine_err.with_hint())
        } else {
            err
        }
    };

    let result = match cli.command {
        Commands::Leaves { input } => query::leaves(&input, cli.format),

        Commands::Ancestors { input, node } => {
            query::ancestors(&input, node.as_deref(), cli.format)
        }

        Commands::Bisect { input } => query::bisect(&input, cli.format),

        Commands::Check { input } => query::check(&input, cli.format),
    };

    result.map_err(format_error)
}
