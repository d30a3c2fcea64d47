mod analyze;
mod export;
mod report;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::analyze::AnalyzeOptions;

#[derive(Debug, Parser)]
#[command(name = "pulse-cli")]
#[command(about = "Campaign sentiment and influence analysis for social posts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch posts for a query, analyze them and write the outputs
    Analyze {
        /// Search query (keyword, hashtag or X search operators)
        #[arg(long, short)]
        query: String,

        /// Maximum number of posts to fetch
        #[arg(long)]
        count: Option<usize>,

        /// Only posts on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Read posts from a JSON file instead of the X API
        #[arg(long)]
        input: Option<PathBuf>,

        /// Number of topic clusters
        #[arg(long)]
        clusters: Option<usize>,

        /// Number of keywords and hashtags to keep
        #[arg(long)]
        top_n: Option<usize>,

        /// Directory for analysis.json, report.md and influence_graph.json
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Skip the markdown report
        #[arg(long)]
        no_report: bool,
    },
    /// Print the effective configuration (secrets redacted)
    Config,
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = pulse_core::load_app_config()?;
    init_tracing(&config.log_level);

    match cli.command {
        Some(Commands::Analyze {
            query,
            count,
            since,
            input,
            clusters,
            top_n,
            output_dir,
            no_report,
        }) => {
            let options = AnalyzeOptions {
                query,
                count,
                since,
                input,
                clusters,
                top_n,
                output_dir,
                write_report: !no_report,
            };
            analyze::run_analyze(&config, options).await?;
        }
        Some(Commands::Config) => println!("{config:#?}"),
        None => println!("pulse-cli: run `pulse-cli analyze --query <QUERY>` or `pulse-cli --help`"),
    }

    Ok(())
}
