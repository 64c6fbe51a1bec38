use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::info;

use crate::parser::dom::{self, Document};
use crate::parser::extract::PageProfile;
use crate::scraper;

pub const BASE_URL: &str = "http://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/";

const TOPIC_TITLE_SELECTOR: &str = ".topictitle";

/// The two families of reference pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageKind {
    /// Template resource reference pages, with samples and return values.
    Templates,
    /// Resource property type pages.
    Properties,
}

impl PageKind {
    pub fn listing_page(self) -> &'static str {
        match self {
            PageKind::Templates => "aws-template-resource-type-ref.html",
            PageKind::Properties => "aws-product-property-reference.html",
        }
    }

    pub fn profile(self) -> PageProfile {
        match self {
            PageKind::Templates => PageProfile::TEMPLATE_RESOURCE,
            PageKind::Properties => PageProfile::RESOURCE_PROPERTY,
        }
    }

    pub fn default_output(self) -> &'static str {
        match self {
            PageKind::Templates => "templateresources.json",
            PageKind::Properties => "resourceproperties.json",
        }
    }
}

/// Join a listing-relative reference onto the documentation base URL.
pub fn page_url(base_url: &str, reference: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return reference.to_string();
    }
    let base = base_url.trim_end_matches('/');
    let path = reference.trim_start_matches("./").trim_start_matches('/');
    format!("{}/{}", base, path)
}

/// Fetch the listing page for `kind` and return its resource page references.
///
/// Failure here is fatal for the run: without the listing nothing can be scraped.
pub async fn fetch_resource_pages(
    client: &reqwest::Client,
    base_url: &str,
    kind: PageKind,
) -> Result<Vec<String>> {
    let url = page_url(base_url, kind.listing_page());
    info!("Fetching listing page: {}", url);

    let html = scraper::fetch_html(client, &url)
        .await
        .with_context(|| format!("Could not fetch listing page {}", url))?;

    let doc = Document::from(html.as_str());
    let pages = enumerate_resource_pages(&doc);
    info!("Resource pages in listing: {}", pages.len());
    Ok(pages)
}

/// Links listed next to the topic titles of a listing page, in document order.
///
/// List items without a child carrying `href` are skipped.
pub fn enumerate_resource_pages(doc: &Document) -> Vec<String> {
    let mut pages = Vec::new();

    for title in dom::find_all(doc, TOPIC_TITLE_SELECTOR) {
        for sibling in dom::element_siblings(&title) {
            for item in dom::select_all(&sibling, "li") {
                let href = dom::children(&item)
                    .iter()
                    .find_map(|child| dom::attr(child, "href"));
                if let Some(href) = href {
                    pages.push(href);
                }
            }
        }
    }

    pages
}
