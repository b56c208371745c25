//! # Company news from the Google News RSS search.
//!
//! ```text
//! NewsQuery ──► feed_url() ──► GET (rss) ──► parse_feed() ──► [summarize] ──► Vec<NewsItem>
//! ```
//!
//! Each item keeps an extractive summary (description text, 240 chars + `…`). With a
//! summarizer attached, the summary is replaced by the model's answer for
//! `"<title>. <description>"`; a failed call keeps the extractive one.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::markup::{self, clean_text};
use super::{HttpClient, SourceError};
use crate::summarize::Summarize;

const SEARCH_URL: &str = "https://news.google.com/rss/search";
const SUMMARY_CHARS: usize = 240;

/// One news article.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: Option<String>,
    pub source: Option<String>,
    /// RFC 3339 when the feed date parses, the raw feed value otherwise.
    pub published: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
}

/// What to search for.
#[derive(Clone, Debug)]
pub struct NewsQuery {
    pub ticker: String,
    /// Broadens recall with `"<company>" OR <ticker>`.
    pub company: Option<String>,
    /// Look-back window in days.
    pub days: u32,
    pub max_items: usize,
}

impl NewsQuery {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            company: None,
            days: 7,
            max_items: 15,
        }
    }

    /// Search terms without the time window.
    pub fn terms(&self) -> String {
        match self.company.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("\"{name}\" OR {}", self.ticker),
            _ => self.ticker.clone(),
        }
    }

    /// Full feed URL, query encoded.
    pub fn feed_url(&self) -> String {
        let q = format!("{} when:{}d", self.terms(), self.days);
        match reqwest::Url::parse_with_params(
            SEARCH_URL,
            &[("q", q.as_str()), ("hl", "en-US"), ("gl", "US"), ("ceid", "US:en")],
        ) {
            Ok(url) => url.into(),
            Err(_) => SEARCH_URL.to_string(),
        }
    }
}

/// News fetcher. Cheap to clone.
#[derive(Clone)]
pub struct NewsSource {
    http: HttpClient,
    summarizer: Option<Arc<dyn Summarize>>,
}

impl NewsSource {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            summarizer: None,
        }
    }

    /// Replace extractive summaries with model output.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarize>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub async fn fetch(
        &self,
        query: &NewsQuery,
        ctx: &CancellationToken,
    ) -> Result<Vec<NewsItem>, SourceError> {
        let url = query.feed_url();
        let xml = self
            .http
            .get_text(&url, Some("application/rss+xml"), ctx)
            .await?;
        let mut items = parse_feed(&xml, query.max_items);
        tracing::debug!(ticker = %query.ticker, items = items.len(), "news feed parsed");

        if let Some(summarizer) = &self.summarizer {
            summarize_items(&mut items, summarizer.as_ref()).await;
        }
        Ok(items)
    }
}

/// Parses an RSS 2.0 document into at most `max_items` items.
pub fn parse_feed(xml: &str, max_items: usize) -> Vec<NewsItem> {
    markup::blocks(xml, "item")
        .into_iter()
        .take(max_items)
        .map(parse_item)
        .collect()
}

fn parse_item(item: &str) -> NewsItem {
    let text = |tag: &str| {
        markup::element(item, tag)
            .map(|raw| clean_text(&markup::unescape(raw)))
            .filter(|s| !s.is_empty())
    };

    let description = text("description");
    let published = markup::element(item, "pubDate")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|raw| normalize_date(raw).unwrap_or_else(|| raw.to_string()));

    NewsItem {
        title: text("title"),
        source: text("source"),
        published,
        link: markup::element(item, "link")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        summary: description.map(|d| markup::truncate_with_ellipsis(&d, SUMMARY_CHARS)),
    }
}

fn normalize_date(raw: &str) -> Option<String> {
    let parsed = DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()?;
    Some(
        parsed
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

/// Replaces each item's summary with the model's, keeping the old one on failure.
pub async fn summarize_items(items: &mut [NewsItem], summarizer: &dyn Summarize) {
    for item in items.iter_mut() {
        let basis = match (item.title.as_deref(), item.summary.as_deref()) {
            (Some(t), Some(s)) => format!("{t}. {s}"),
            (Some(t), None) => t.to_string(),
            (None, Some(s)) => format!(". {s}"),
            (None, None) => continue,
        };
        let basis = basis.trim();
        if basis.is_empty() {
            continue;
        }
        match summarizer.summarize(basis).await {
            Ok(text) if !text.trim().is_empty() => item.summary = Some(text.trim().to_string()),
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "news summary failed, keeping extract"),
        }
    }
}
