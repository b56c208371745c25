//! # Recent 10-K/10-Q filings from SEC EDGAR.
//!
//! ```text
//! GET browse-edgar atom feed ── missing ──► FilingsReport { error: "no_feed" }
//!   └─ for each <entry>:
//!        GET filing index page ─► primary document (first .htm/.html/.txt in the table)
//!          └─ GET primary document ─► plain text ─► sections + summary
//! ```
//!
//! Per-filing failures never fail the fetch: the entry is kept with whatever was found.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::markup::{self, html_to_text};
use super::{HttpClient, SourceError};
use crate::summarize::Summarize;

const FEED_URL: &str = "https://www.sec.gov/cgi-bin/browse-edgar";
const SEC_ROOT: &str = "https://www.sec.gov";
const SECTION_CHARS: usize = 5000;
const BASELINE_CHARS: usize = 800;

static SECTION_MARKERS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("Business", r"(?i)ITEM\s+1\.?\s+BUSINESS"),
        ("Risk Factors", r"(?i)ITEM\s+1A\.?\s+RISK\s+FACTORS"),
        ("MD&A", r"(?i)ITEM\s+7\.?\s+MANAGEMENT['\x{2019}]S\s+DISCUSSION"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).unwrap()))
    .collect()
});

/// One filing from the feed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    pub title: Option<String>,
    pub filing_page: Option<String>,
    pub primary_doc: Option<String>,
    pub updated: Option<String>,
    /// Section name → text, each capped at 5000 characters.
    pub sections: BTreeMap<String, String>,
    pub summary: Option<String>,
}

/// Filings for one ticker.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingsReport {
    pub ticker: String,
    pub filings: Vec<Filing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// EDGAR fetcher. Cheap to clone.
#[derive(Clone)]
pub struct FilingsSource {
    http: HttpClient,
    summarizer: Option<Arc<dyn Summarize>>,
}

impl FilingsSource {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            summarizer: None,
        }
    }

    /// Summarize each filing with the model instead of the 800-char excerpt.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarize>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Fetches up to `limit` recent filings.
    pub async fn fetch(
        &self,
        ticker: &str,
        limit: usize,
        ctx: &CancellationToken,
    ) -> Result<FilingsReport, SourceError> {
        let ticker = ticker.to_uppercase();
        let xml = match self
            .http
            .get_text(&feed_url(&ticker, limit), Some("application/atom+xml"), ctx)
            .await
        {
            Ok(xml) if !xml.trim().is_empty() => xml,
            Ok(_) => return Ok(no_feed(ticker)),
            Err(SourceError::Canceled) => return Err(SourceError::Canceled),
            Err(e) => {
                tracing::debug!(%ticker, error = %e, "filings feed unavailable");
                return Ok(no_feed(ticker));
            }
        };

        let mut filings = parse_feed(&xml);
        for filing in &mut filings {
            if ctx.is_cancelled() {
                return Err(SourceError::Canceled);
            }
            self.enrich(filing, ctx).await;
        }

        Ok(FilingsReport {
            ticker,
            filings,
            error: None,
        })
    }

    async fn enrich(&self, filing: &mut Filing, ctx: &CancellationToken) {
        let Some(page_url) = filing.filing_page.clone() else {
            return;
        };
        let page = match self.http.get_text(&page_url, None, ctx).await {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!(url = %page_url, error = %e, "filing index unavailable");
                return;
            }
        };
        filing.primary_doc = primary_document(&page);
        let Some(doc_url) = filing.primary_doc.as_deref() else {
            return;
        };

        let doc = match self.http.get_text_with_retries(doc_url, None, 1, ctx).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!(url = %doc_url, error = %e, "primary document unavailable");
                return;
            }
        };
        let text = html_to_text(&doc);
        filing.sections = extract_sections(&text);

        let baseline = markup::head_chars(&text, BASELINE_CHARS);
        filing.summary = match &self.summarizer {
            Some(summarizer) => match summarizer.summarize_filing(baseline).await {
                Ok(s) => Some(s),
                Err(e) => {
                    tracing::debug!(url = %doc_url, error = %e, "filing summary failed");
                    None
                }
            },
            None => Some(baseline.to_string()),
        };
    }
}

fn no_feed(ticker: String) -> FilingsReport {
    FilingsReport {
        ticker,
        filings: Vec::new(),
        error: Some("no_feed".to_string()),
    }
}

/// Atom feed URL for the 10-* filings of `ticker`.
pub fn feed_url(ticker: &str, limit: usize) -> String {
    let count = limit.to_string();
    match reqwest::Url::parse_with_params(
        FEED_URL,
        &[
            ("action", "getcompany"),
            ("CIK", ticker),
            ("type", "10-%"),
            ("owner", "exclude"),
            ("count", count.as_str()),
            ("output", "atom"),
        ],
    ) {
        Ok(url) => url.into(),
        Err(_) => FEED_URL.to_string(),
    }
}

/// Parses the Atom feed entries (title, link, updated).
pub fn parse_feed(xml: &str) -> Vec<Filing> {
    let field = |entry: &str, tag: &str| {
        markup::element(entry, tag)
            .map(|s| markup::unescape(s).trim().to_string())
            .filter(|s| !s.is_empty())
    };
    markup::blocks(xml, "entry")
        .into_iter()
        .map(|entry| Filing {
            title: field(entry, "title"),
            filing_page: markup::attribute(entry, "link", "href").map(markup::unescape),
            updated: field(entry, "updated"),
            ..Filing::default()
        })
        .collect()
}

/// First `.htm`, `.html` or `.txt` link in the third column of the document table.
pub fn primary_document(page: &str) -> Option<String> {
    let table = document_table(page)?;
    let href = markup::blocks(table, "tr").into_iter().find_map(|row| {
        let cells = markup::blocks(row, "td");
        let cell = *cells.get(2)?;
        let href = markup::attribute(cell, "a", "href")?;
        let lower = href.to_ascii_lowercase();
        [".htm", ".html", ".txt"]
            .iter()
            .any(|ext| lower.ends_with(ext))
            .then_some(href)
    })?;

    if href.starts_with("http") {
        Some(href.to_string())
    } else {
        Some(format!("{SEC_ROOT}{href}"))
    }
}

fn document_table(page: &str) -> Option<&str> {
    let lower = page.to_ascii_lowercase();
    let start = lower
        .find("class=\"tablefile\"")
        .or_else(|| lower.find("summary=\"document format files\""))?;
    let open = lower[..start].rfind("<table")?;
    let close = lower[start..].find("</table>")? + start;
    Some(&page[open..close])
}

/// Splits a filing into its Business / Risk Factors / MD&A items.
pub fn extract_sections(text: &str) -> BTreeMap<String, String> {
    let mut spans: Vec<(&str, usize)> = SECTION_MARKERS
        .iter()
        .filter_map(|(name, re)| re.find(text).map(|m| (*name, m.start())))
        .collect();
    spans.sort_by_key(|(_, start)| *start);

    spans
        .iter()
        .enumerate()
        .map(|(i, (name, start))| {
            let end = spans.get(i + 1).map_or(text.len(), |(_, next)| *next);
            let snippet = text[*start..end].trim();
            (name.to_string(), markup::head_chars(snippet, SECTION_CHARS).to_string())
        })
        .collect()
}
