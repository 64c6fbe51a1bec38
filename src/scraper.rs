use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::error::{FetchError, PageError, PageFailure};
use crate::index::page_url;
use crate::model::ResourceRecord;
use crate::parser::{self, extract::PageProfile};

pub const CONCURRENCY: usize = 10;
pub const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Knobs for one scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub base_url: String,
    pub concurrency: usize,
    pub max_retries: u32,
    pub profile: PageProfile,
}

/// A resource page as it came back from the network.
pub struct FetchedPage {
    pub index: usize,
    pub reference: String,
    pub url: String,
    pub html: Result<String, FetchError>,
}

/// Records in listing order plus every page that produced none.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    pub records: Vec<ResourceRecord>,
    pub failures: Vec<PageFailure>,
}

pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// GET `url` and return the body, treating non-success statuses as errors.
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let request_err = |source| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(request_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(request_err)
}

async fn fetch_with_retry(
    client: &reqwest::Client,
    url: &str,
    max_retries: u32,
) -> Result<String, FetchError> {
    let mut attempt = 0;
    loop {
        match fetch_html(client, url).await {
            Err(e) if e.is_retryable() && attempt < max_retries => {
                let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                warn!(
                    "{} (attempt {}/{}), backing off {:.1}s",
                    e,
                    attempt + 1,
                    max_retries,
                    backoff.as_secs_f64()
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Fetch pages concurrently, at most `concurrency` in flight.
///
/// Results arrive in completion order and are returned sorted by their
/// position in `references`.
pub async fn fetch_pages(
    client: &reqwest::Client,
    references: Vec<String>,
    opts: &ScrapeOptions,
) -> Result<Vec<FetchedPage>> {
    let concurrency = opts.concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let total = references.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    // Channel: workers send pages, the loop below collects them
    let (tx, mut rx) = tokio::sync::mpsc::channel::<FetchedPage>(concurrency * 2);

    let mut expected = Vec::with_capacity(total);
    for (index, reference) in references.into_iter().enumerate() {
        let client = client.clone();
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();
        let url = page_url(&opts.base_url, &reference);
        let max_retries = opts.max_retries;
        expected.push((reference.clone(), url.clone()));

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let html = fetch_with_retry(&client, &url, max_retries).await;
            let _ = tx
                .send(FetchedPage {
                    index,
                    reference,
                    url,
                    html,
                })
                .await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut pages = Vec::with_capacity(total);
    while let Some(page) = rx.recv().await {
        pb.inc(1);
        pages.push(page);
    }
    pb.finish_and_clear();

    Ok(fill_missing(pages, expected))
}

/// Sort `pages` by index and add an `Incomplete` failure for every
/// expected page whose task never reported back.
///
/// `expected[i]` is the `(reference, url)` of the page at index `i`.
fn fill_missing(mut pages: Vec<FetchedPage>, expected: Vec<(String, String)>) -> Vec<FetchedPage> {
    let mut seen = vec![false; expected.len()];
    for page in &pages {
        if let Some(slot) = seen.get_mut(page.index) {
            *slot = true;
        }
    }

    for (index, (reference, url)) in expected.into_iter().enumerate() {
        if seen[index] {
            continue;
        }
        warn!("No result for page {} ({})", index, reference);
        pages.push(FetchedPage {
            index,
            reference,
            html: Err(FetchError::Incomplete { url: url.clone() }),
            url,
        });
    }

    pages.sort_by_key(|p| p.index);
    pages
}

/// Extract every fetched page in parallel. Order follows `pages`.
pub fn extract_pages(pages: Vec<FetchedPage>, profile: &PageProfile) -> Result<ScrapeOutcome> {
    let pb = ProgressBar::new(pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let results: Vec<_> = pages
        .into_par_iter()
        .map(|page| {
            let result = page.html.map_err(PageError::from).and_then(|html| {
                parser::process_page(&html, &page.reference, &page.url, profile)
                    .map_err(PageError::from)
            });
            pb.inc(1);
            (page.index, page.reference, result)
        })
        .collect();

    pb.finish_and_clear();
    Ok(join_ordered(results))
}

/// Sort per-page results back into listing order and split them into
/// records and failures.
pub fn join_ordered(
    mut results: Vec<(usize, String, Result<ResourceRecord, PageError>)>,
) -> ScrapeOutcome {
    results.sort_by_key(|(index, _, _)| *index);

    let mut outcome = ScrapeOutcome::default();
    for (index, reference, result) in results {
        match result {
            Ok(record) => {
                info!("Scraped {}", record.name);
                outcome.records.push(record);
            }
            Err(error) => {
                warn!("Skipping {}: {}", reference, error);
                outcome.failures.push(PageFailure {
                    index,
                    reference,
                    error,
                });
            }
        }
    }
    outcome
}

/// Fetch then extract every referenced page.
pub async fn scrape_pages(
    client: &reqwest::Client,
    references: Vec<String>,
    opts: &ScrapeOptions,
) -> Result<ScrapeOutcome> {
    let total = references.len();

    let t_fetch = Instant::now();
    let pages = fetch_pages(client, references, opts).await?;
    let fetched = pages.iter().filter(|p| p.html.is_ok()).count();
    info!(
        "Fetched {} pages ({} ok, {} errors) in {:.1}s",
        total,
        fetched,
        total - fetched,
        t_fetch.elapsed().as_secs_f64()
    );

    let t_extract = Instant::now();
    let outcome = extract_pages(pages, &opts.profile)?;
    info!(
        "Extracted {} records ({} failures) in {:.1}s",
        outcome.records.len(),
        outcome.failures.len(),
        t_extract.elapsed().as_secs_f64()
    );

    Ok(outcome)
}
