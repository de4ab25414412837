//! Job board crawler CLI
//!
//! Local entry point for counting, listing and inspecting postings.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use jobcrawler::{
    config,
    error::Result,
    models::{Categories, JobPosting},
    pipeline,
    services::{DateNormalizer, ListingClient, ListingParser, ListingSource},
    utils::log,
};

const DEFAULT_FORMAT: &str = "[{date}] {company} - {title} ({url})";

/// jobcrawler - gamejob.co.kr posting crawler
#[derive(Parser, Debug)]
#[command(
    name = "jobcrawler",
    version,
    about = "Crawls game industry job postings"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml", global = true)]
    config: PathBuf,

    /// Job category id to filter on; repeat for several (overrides config)
    #[arg(long = "category", global = true)]
    categories: Vec<u32>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print how many postings match the category filter
    Count,

    /// Fetch and print a single listing page
    Page {
        /// 1-based page number
        #[arg(default_value_t = 1)]
        page: u32,

        /// Output template ({id}, {company}, {title}, {date}, {url})
        #[arg(long, default_value = DEFAULT_FORMAT)]
        format: String,
    },

    /// Crawl every listing page
    List {
        /// Also write all postings as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output template ({id}, {company}, {title}, {date}, {url})
        #[arg(long, default_value = DEFAULT_FORMAT)]
        format: String,
    },

    /// Extract named iframe bodies from a posting's detail page
    #[cfg(feature = "browser")]
    Frames {
        /// Posting id
        #[arg(long, required_unless_present = "url", conflicts_with = "url")]
        id: Option<String>,

        /// Detail page URL
        #[arg(long)]
        url: Option<String>,

        /// Frame name; repeat for several (defaults to browser.frame_names)
        #[arg(short, long = "frame")]
        frames: Vec<String>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_postings(postings: &[JobPosting], template: &str) {
    for posting in postings {
        println!("{}", posting.format(template));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let overrides = (!cli.categories.is_empty()).then(|| Categories::from(cli.categories.clone()));
    let config = Arc::new(config::load_with_overrides(&cli.config, overrides)?);
    let categories = config.filter.categories.clone();

    match cli.command {
        Command::Count => {
            let client = ListingClient::new(Arc::clone(&config))?;
            let count = client.fetch_count(&categories).await?;
            println!("{count}");
        }

        Command::Page { page, format } => {
            let client = ListingClient::new(Arc::clone(&config))?;
            let parser = ListingParser::new(
                config.site.clone(),
                &config.parser,
                DateNormalizer::default(),
            )?;
            let markup = client.fetch_page(&categories, page).await?;
            print_postings(&parser.parse(&markup)?, &format);
        }

        Command::List { output, format } => {
            let outcome = pipeline::run_crawler(Arc::clone(&config), &categories, |_, postings| {
                print_postings(postings, &format)
            })
            .await?;

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&outcome.postings)?;
                std::fs::write(&path, json)?;
                log::success(&format!(
                    "Wrote {} postings to {}",
                    outcome.postings.len(),
                    path.display()
                ));
            }
        }

        #[cfg(feature = "browser")]
        Command::Frames { id, url, frames } => {
            let detail_url = match (id, url) {
                (Some(id), _) => config.site.detail_url(&id)?,
                (None, Some(url)) => url,
                (None, None) => {
                    return Err(jobcrawler::error::AppError::config(
                        "Either --id or --url is required",
                    ));
                }
            };

            for frame in pipeline::run_frames(&config, &detail_url, &frames).await? {
                println!("<!-- frame: {} -->", frame.name);
                println!("{}", frame.html);
            }
        }

        Command::Validate => {
            log::success(&format!("Config OK ({})", cli.config.display()));
        }
    }

    Ok(())
}
