//! Web fallback searcher: ordered search endpoints, scraped result links,
//! article summaries.
//!
//! Third stop of the cascade. Each endpoint is tried in order: fetch the
//! search page, take the first result heading wrapped in a link, fetch that
//! article, and summarize its opening paragraphs. Endpoint failures are
//! classified ([`EndpointError`]) and logged, never surfaced to the caller;
//! the stage reports a tri-state [`WebLookup`] so the resolver never has to
//! string-match a sentinel message.

use async_trait::async_trait;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{info, warn};

/// Browser-like UA: several of the default endpoints reject obvious bots.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.3";

/// Number of leading `<p>` elements concatenated into the article summary.
const SUMMARY_PARAGRAPHS: usize = 5;

/// Outcome of the whole web stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebLookup {
    /// An endpoint produced a summarized article.
    Found(String),
    /// Endpoints answered but none yielded a usable result.
    NotFound,
    /// Every endpoint failed outright (network, non-2xx, bad HTML).
    TransientError,
}

/// Per-endpoint failure classification. `Network` and `Parse` mean the
/// endpoint itself misbehaved; `NoResult` means it answered with nothing
/// usable. All three skip to the next endpoint.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No result heading with an enclosing link")]
    NoResult,
}

/// How the query text is attached to an endpoint's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStyle {
    /// Percent-encoded query appended to the base URL.
    PathSuffix,
    /// Query sent as a named query-string parameter.
    Param(String),
}

/// One search endpoint: a base URL plus its query join style. The list is
/// configuration, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEndpoint {
    pub base: String,
    pub style: QueryStyle,
}

impl SearchEndpoint {
    pub fn path(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            style: QueryStyle::PathSuffix,
        }
    }

    pub fn query(base: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            style: QueryStyle::Param(param.into()),
        }
    }

    /// Build the search URL with the query percent-encoded. Raw concatenation
    /// would let special characters corrupt the URL.
    fn request_url(&self, query: &str) -> Result<Url, EndpointError> {
        match &self.style {
            QueryStyle::Param(name) => Url::parse_with_params(&self.base, &[(name.as_str(), query)]),
            QueryStyle::PathSuffix => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
                Url::parse(&format!("{}{}", self.base, encoded))
            }
        }
        .map_err(|e| EndpointError::Parse(format!("bad request url: {e}")))
    }
}

/// The ordered default list, mirroring the sources the service has always
/// consulted.
pub fn default_endpoints() -> Vec<SearchEndpoint> {
    vec![
        SearchEndpoint::path("https://en.wikipedia.org/wiki/Special:Search/"),
        SearchEndpoint::query("https://www.geeksforgeeks.org/search/", "q"),
        SearchEndpoint::query("https://www.w3schools.com/search/searchresults.asp", "q"),
        SearchEndpoint::query("https://stackoverflow.com/search", "q"),
    ]
}

/// Seam for the resolver: the web stage as a mockable dependency.
#[async_trait]
pub trait WebSource: Send + Sync {
    async fn search(&self, query: &str) -> WebLookup;
}

/// Live implementation over an ordered endpoint list.
pub struct WebSearcher {
    client: reqwest::Client,
    endpoints: Vec<SearchEndpoint>,
}

impl WebSearcher {
    pub fn new(endpoints: Vec<SearchEndpoint>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, endpoints }
    }

    async fn try_endpoint(
        &self,
        endpoint: &SearchEndpoint,
        query: &str,
    ) -> Result<String, EndpointError> {
        let url = endpoint.request_url(query)?;
        let html = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let article_url = first_result_link(&html, &url).ok_or(EndpointError::NoResult)?;
        let article_html = self
            .client
            .get(article_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let summary = summarize_paragraphs(&article_html, SUMMARY_PARAGRAPHS);
        if summary.is_empty() {
            return Err(EndpointError::NoResult);
        }
        Ok(format!("Here's what I found: {}", summary))
    }
}

#[async_trait]
impl WebSource for WebSearcher {
    async fn search(&self, query: &str) -> WebLookup {
        let mut answered_empty = false;
        for endpoint in &self.endpoints {
            match self.try_endpoint(endpoint, query).await {
                Ok(answer) => {
                    info!(target: "csbot::web", endpoint = %endpoint.base, "Web result found");
                    return WebLookup::Found(answer);
                }
                Err(EndpointError::NoResult) => {
                    answered_empty = true;
                    info!(target: "csbot::web", endpoint = %endpoint.base, "No usable result - trying next endpoint");
                }
                Err(e) => {
                    warn!(target: "csbot::web", endpoint = %endpoint.base, error = %e, "Endpoint failed - trying next endpoint");
                }
            }
        }
        if answered_empty {
            WebLookup::NotFound
        } else {
            WebLookup::TransientError
        }
    }
}

/// First `h3` (document order) whose nearest enclosing `<a>` carries `href`;
/// relative hrefs resolve against the page URL.
fn first_result_link(html: &str, page_url: &Url) -> Option<Url> {
    let doc = Html::parse_document(html);
    let heading_sel = Selector::parse("h3").unwrap_or_else(|_| unreachable!());
    for heading in doc.select(&heading_sel) {
        let anchor = heading
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "a");
        if let Some(href) = anchor.and_then(|a| a.value().attr("href")) {
            if let Ok(resolved) = page_url.join(href) {
                return Some(resolved);
            }
        }
    }
    None
}

/// Text of the first `limit` paragraphs, whitespace-normalized and joined.
fn summarize_paragraphs(html: &str, limit: usize) -> String {
    let doc = Html::parse_document(html);
    let para_sel = Selector::parse("p").unwrap_or_else(|_| unreachable!());
    let joined = doc
        .select(&para_sel)
        .take(limit)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
