use thiserror::Error;

/// Retrieval failure for the listing page or a single resource page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("fetch task for {url} ended without a result")]
    Incomplete { url: String },
}

impl FetchError {
    /// Rate limiting and server errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Request { source, .. } => source.is_timeout() || source.is_connect(),
            FetchError::Incomplete { .. } => false,
        }
    }
}

/// Reasons a loaded page produced no record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("could not locate resource name")]
    MissingName,

    #[error("could not locate properties of resource: {resource}")]
    EmptyProperties { resource: String },

    #[error("definition list #{block} of {resource} has {terms} terms but {bodies} descriptions")]
    MalformedBlock {
        resource: String,
        block: usize,
        terms: usize,
        bodies: usize,
    },
}

/// Everything that can go wrong for one page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// A per-page failure tagged with where it came from.
#[derive(Debug, Error)]
#[error("{reference}: {error}")]
pub struct PageFailure {
    pub index: usize,
    pub reference: String,
    #[source]
    pub error: PageError,
}
