//! # Data sources.
//!
//! HTTP fetchers for the three providers a report is built from. Each one is a plain
//! async method; turning a fetch into a supervised task is the report layer's job.
//!
//! | Source                   | Provider                       | Output             |
//! |--------------------------|--------------------------------|--------------------|
//! | [`FundamentalsSource`]   | Yahoo Finance quoteSummary     | [`Fundamentals`]   |
//! | [`NewsSource`]           | Google News RSS search         | `Vec<`[`NewsItem`]`>` |
//! | [`FilingsSource`]        | SEC EDGAR Atom feed            | [`FilingsReport`]  |
//!
//! All of them share one [`HttpClient`] built from [`SourcesConfig`].

mod config;
mod error;
mod filings;
mod fundamentals;
mod http;
pub mod markup;
mod news;

pub use config::SourcesConfig;
pub use error::SourceError;
pub use filings::{Filing, FilingsReport, FilingsSource};
pub use fundamentals::{Financials, Fundamentals, FundamentalsSource, Identity, Price, Valuation};
pub use http::HttpClient;
pub use news::{NewsItem, NewsQuery, NewsSource, summarize_items};
