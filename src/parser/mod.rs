pub mod blocks;
pub mod dom;
pub mod extract;
pub mod fields;
pub mod text;

use tracing::debug;

use crate::error::ExtractError;
use crate::model::ResourceRecord;
use dom::Document;
use extract::PageProfile;

const PAGE_SUFFIX: &str = ".html";

/// Parse one fetched page and extract its resource record.
///
/// The document is created and dropped inside this call, so callers can run
/// it from any thread.
pub fn process_page(
    html: &str,
    reference: &str,
    source_url: &str,
    profile: &PageProfile,
) -> Result<ResourceRecord, ExtractError> {
    let anchor = anchor_id(reference);
    debug!("Extracting {} (anchor #{})", reference, anchor);
    let doc = Document::from(html);
    extract::extract(&doc, &anchor, source_url, profile)
}

/// In-page id of the element naming the resource: the page file name
/// without its extension, e.g. `./aws-resource-s3-bucket.html#x` ->
/// `aws-resource-s3-bucket`.
pub fn anchor_id(reference: &str) -> String {
    let path = reference
        .split(['#', '?'])
        .next()
        .unwrap_or(reference);
    let file = path.rsplit('/').next().unwrap_or(path);
    file.strip_suffix(PAGE_SUFFIX).unwrap_or(file).to_string()
}
