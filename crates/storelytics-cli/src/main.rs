mod reviews_file;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use storelytics_analysis::{AnalyzeRequest, CollectRequest, ReviewPipeline};
use tracing_subscriber::EnvFilter;

use crate::reviews_file::read_reviews_file;

#[derive(Debug, Parser)]
#[command(name = "storelytics-cli")]
#[command(about = "App Store review collection and analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print catalog metadata for an app
    Info {
        /// Numeric app id, optionally prefixed with "id"
        app_id: String,

        #[arg(long, default_value = "us")]
        country: String,
    },
    /// Print the most recent reviews for an app
    Reviews {
        app_id: String,

        #[arg(long, default_value = "us")]
        country: String,
    },
    /// Collect reviews, clean them, and print a summary
    Collect {
        app_id: String,

        #[arg(long, default_value = "us")]
        country: String,

        /// Maximum number of reviews to collect
        #[arg(long, default_value_t = 300)]
        limit: usize,

        /// Keep emoji characters in cleaned text
        #[arg(long)]
        keep_emojis: bool,

        /// Preserve letter case in cleaned text
        #[arg(long)]
        keep_case: bool,

        /// Drop cleaned reviews with fewer tokens than this
        #[arg(long, default_value_t = 3)]
        min_tokens: usize,

        /// Append the raw reviews to a dated JSONL file under the data dir
        #[arg(long)]
        save_raw: bool,
    },
    /// Score sentiment and print negative phrases and insights
    Analyze {
        /// App id; echoed unchanged when --reviews-file is given
        app_id: String,

        #[arg(long, default_value = "us")]
        country: String,

        #[arg(long, default_value_t = 300)]
        limit: usize,

        /// Analyze reviews from a JSON array or JSONL file instead of the catalog
        #[arg(long)]
        reviews_file: Option<PathBuf>,

        #[arg(long, default_value_t = 1)]
        ngram_min: usize,

        #[arg(long, default_value_t = 2)]
        ngram_max: usize,

        #[arg(long, default_value_t = 2)]
        min_df: usize,

        /// Number of negative phrases to report
        #[arg(long, default_value_t = 20)]
        top_k: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = storelytics_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let pipeline = ReviewPipeline::from_app_config(&config)?.with_attached_snapshots();

    match cli.command {
        Commands::Info { app_id, country } => {
            print_json(&pipeline.app_info(&app_id, &country).await?)
        }
        Commands::Reviews { app_id, country } => {
            print_json(&pipeline.recent_reviews(&app_id, &country).await?)
        }
        Commands::Collect {
            app_id,
            country,
            limit,
            keep_emojis,
            keep_case,
            min_tokens,
            save_raw,
        } => {
            let req = CollectRequest {
                country,
                review_limit: limit,
                keep_emojis,
                lowercase: !keep_case,
                min_tokens,
                save_raw,
                ..CollectRequest::for_app(app_id)
            };
            print_json(&pipeline.collect_and_preprocess(&req).await?)
        }
        Commands::Analyze {
            app_id,
            country,
            limit,
            reviews_file,
            ngram_min,
            ngram_max,
            min_df,
            top_k,
        } => {
            let reviews_override = reviews_file
                .as_deref()
                .map(read_reviews_file)
                .transpose()?;
            let req = AnalyzeRequest {
                country,
                review_limit: limit,
                ngram_range: vec![ngram_min, ngram_max],
                min_df,
                top_k_phrases: top_k,
                reviews_override,
                ..AnalyzeRequest::for_app(app_id)
            };
            print_json(&pipeline.analyze(&req).await?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}
