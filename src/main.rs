mod error;
mod index;
mod model;
mod output;
mod parser;
mod scraper;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use index::PageKind;
use scraper::ScrapeOptions;

#[derive(Parser)]
#[command(
    name = "cfn_scraper",
    about = "Extract CloudFormation resource schemas from the AWS user guide"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every resource page in a listing and write the records as JSON
    Run {
        /// Which family of reference pages to scrape
        #[arg(short, long, value_enum, default_value = "templates")]
        kind: PageKind,
        /// Max pages to scrape (default: all listed)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Pages fetched at once
        #[arg(short, long, default_value_t = scraper::CONCURRENCY)]
        concurrency: usize,
        /// Documentation root the listing and page references are relative to
        #[arg(long, env = "CFN_DOCS_BASE_URL", default_value = index::BASE_URL)]
        base_url: String,
        /// Output file (default: templateresources.json / resourceproperties.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write pages that produced no record to this file
        #[arg(long)]
        failures: Option<PathBuf>,
    },
    /// Print the resource page references found in a listing
    List {
        #[arg(short, long, value_enum, default_value = "templates")]
        kind: PageKind,
        #[arg(long, env = "CFN_DOCS_BASE_URL", default_value = index::BASE_URL)]
        base_url: String,
    },
    /// Extract a single saved page and print its record
    Inspect {
        /// Saved HTML page
        file: PathBuf,
        #[arg(short, long, value_enum, default_value = "templates")]
        kind: PageKind,
        /// Page reference used to derive the title anchor (default: file name)
        #[arg(short, long)]
        reference: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            kind,
            limit,
            concurrency,
            base_url,
            output,
            failures,
        } => {
            let client = scraper::build_client(Duration::from_secs(scraper::REQUEST_TIMEOUT_SECS))?;
            let mut pages = index::fetch_resource_pages(&client, &base_url, kind).await?;
            if let Some(n) = limit {
                pages.truncate(n);
            }
            if pages.is_empty() {
                println!("No resource pages found in {}.", kind.listing_page());
                return Ok(());
            }

            println!("Scraping {} pages...", pages.len());
            let opts = ScrapeOptions {
                base_url,
                concurrency,
                max_retries: scraper::MAX_RETRIES,
                profile: kind.profile(),
            };
            let outcome = scraper::scrape_pages(&client, pages, &opts).await?;

            let out_path = output.unwrap_or_else(|| PathBuf::from(kind.default_output()));
            output::write_file(&out_path, &outcome.records)?;
            info!("Wrote {} records to {}", outcome.records.len(), out_path.display());

            if let Some(path) = failures {
                output::write_file(&path, &output::failure_rows(&outcome.failures))?;
                info!("Wrote {} failures to {}", outcome.failures.len(), path.display());
            }

            println!(
                "Done: {} records, {} pages skipped.",
                outcome.records.len(),
                outcome.failures.len()
            );
            Ok(())
        }
        Commands::List { kind, base_url } => {
            let client = scraper::build_client(Duration::from_secs(scraper::REQUEST_TIMEOUT_SECS))?;
            let pages = index::fetch_resource_pages(&client, &base_url, kind).await?;
            for page in &pages {
                println!("{}", page);
            }
            Ok(())
        }
        Commands::Inspect {
            file,
            kind,
            reference,
        } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Could not read {}", file.display()))?;
            let reference = match reference {
                Some(r) => r,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("Input path has no file name")?,
            };
            let source_url = index::page_url(index::BASE_URL, &reference);

            match parser::process_page(&html, &reference, &source_url, &kind.profile()) {
                Ok(record) => {
                    println!("{}", output::to_json(&record)?);
                    Ok(())
                }
                Err(e) => bail!("{}: {}", reference, e),
            }
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
