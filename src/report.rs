//! # Company report: the sources run under the supervisor.
//!
//! ```text
//! GatherOptions ──► Gatherer::tasks() ──► [fundamentals, news, (filings)]
//!                                              │
//!                       Supervisor::run_parallel (one timeout per source)
//!                                              │
//!                                   ResultMap<Payload> ──► finish()
//!                                                           └─ cluster news titles (optional,
//!                                                              strictly after the run)
//! ```
//!
//! Source errors become [`TaskError::Fail`] at the task boundary, so one unreachable
//! provider only marks its own entry as failed.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cluster::{self, DEFAULT_THRESHOLD};
use crate::core::{ResultMap, Supervisor};
use crate::error::{RunError, TaskError};
use crate::sources::{
    FilingsReport, FilingsSource, Fundamentals, FundamentalsSource, HttpClient, NewsItem,
    NewsQuery, NewsSource, SourceError, markup,
};
use crate::summarize::Summarize;
use crate::tasks::TaskSpec;

/// Result-map name of the fundamentals task.
pub const FUNDAMENTALS: &str = "fundamentals";
/// Result-map name of the news task.
pub const NEWS: &str = "news";
/// Result-map name of the filings task.
pub const FILINGS: &str = "filings";

const CLUSTER_TITLES_CHARS: usize = 1000;

/// Value produced by one source task.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Fundamentals(Fundamentals),
    News(Vec<NewsItem>),
    Filings(FilingsReport),
}

impl Payload {
    /// The fundamentals, if this came from the fundamentals task.
    pub fn as_fundamentals(&self) -> Option<&Fundamentals> {
        match self {
            Payload::Fundamentals(f) => Some(f),
            _ => None,
        }
    }

    /// The news items, if this came from the news task.
    pub fn as_news(&self) -> Option<&[NewsItem]> {
        match self {
            Payload::News(items) => Some(items),
            _ => None,
        }
    }

    /// The filings report, if this came from the filings task.
    pub fn as_filings(&self) -> Option<&FilingsReport> {
        match self {
            Payload::Filings(f) => Some(f),
            _ => None,
        }
    }
}

/// What to gather for one report.
#[derive(Clone, Debug)]
pub struct GatherOptions {
    /// Ticker symbol, e.g. `AAPL`.
    pub ticker: String,
    /// Company name used to broaden the news search.
    pub company: Option<String>,
    /// News look-back window in days.
    pub days: u32,
    /// Maximum number of news items kept.
    pub max_news: usize,
    /// Adds the filings task.
    pub include_filings: bool,
    /// Maximum number of filings fetched.
    pub filings_limit: usize,
    /// Groups near-identical headlines after the run.
    pub cluster: bool,
    /// Per-task timeouts.
    pub fundamentals_timeout: Duration,
    pub news_timeout: Duration,
    pub filings_timeout: Duration,
}

impl GatherOptions {
    /// Defaults: 7 days, 20 news items, no filings (limit 2), no clustering,
    /// timeouts 20s / 25s / 40s.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            company: None,
            days: 7,
            max_news: 20,
            include_filings: false,
            filings_limit: 2,
            cluster: false,
            fundamentals_timeout: Duration::from_secs(20),
            news_timeout: Duration::from_secs(25),
            filings_timeout: Duration::from_secs(40),
        }
    }

    /// The news search these options describe.
    pub fn news_query(&self) -> NewsQuery {
        NewsQuery {
            ticker: self.ticker.clone(),
            company: self.company.clone(),
            days: self.days,
            max_items: self.max_news,
        }
    }
}

/// A group of near-identical headlines.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub title: String,
    pub size: usize,
    pub summary: Option<String>,
    pub items: Vec<NewsItem>,
}

/// Everything gathered for one ticker.
#[derive(Debug, Serialize)]
pub struct Report {
    pub ticker: String,
    pub results: ResultMap<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_clusters: Option<Vec<ClusterSummary>>,
}

impl Report {
    pub fn fundamentals(&self) -> Option<&Fundamentals> {
        self.results.value(FUNDAMENTALS)?.as_fundamentals()
    }

    pub fn news(&self) -> Option<&[NewsItem]> {
        self.results.value(NEWS)?.as_news()
    }

    pub fn filings(&self) -> Option<&FilingsReport> {
        self.results.value(FILINGS)?.as_filings()
    }
}

/// Builds the per-source tasks and post-processes their results. Cheap to clone.
#[derive(Clone)]
pub struct Gatherer {
    fundamentals: FundamentalsSource,
    news: NewsSource,
    filings: FilingsSource,
    summarizer: Option<Arc<dyn Summarize>>,
}

impl Gatherer {
    pub fn new(http: HttpClient) -> Self {
        Self {
            fundamentals: FundamentalsSource::new(http.clone()),
            news: NewsSource::new(http.clone()),
            filings: FilingsSource::new(http),
            summarizer: None,
        }
    }

    /// Summarize news items, filings and news clusters with `summarizer`.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarize>) -> Self {
        self.news = self.news.with_summarizer(Arc::clone(&summarizer));
        self.filings = self.filings.with_summarizer(Arc::clone(&summarizer));
        self.summarizer = Some(summarizer);
        self
    }

    /// One task per requested source.
    pub fn tasks(&self, opts: &GatherOptions) -> Vec<TaskSpec<Payload>> {
        let mut tasks = Vec::with_capacity(3);

        let source = self.fundamentals.clone();
        let ticker = opts.ticker.clone();
        tasks.push(TaskSpec::new(FUNDAMENTALS, opts.fundamentals_timeout, move |ctx| async move {
            let f = source.fetch(&ticker, &ctx).await.map_err(into_task_error)?;
            Ok::<_, TaskError>(Payload::Fundamentals(f))
        }));

        let source = self.news.clone();
        let query = opts.news_query();
        tasks.push(TaskSpec::new(NEWS, opts.news_timeout, move |ctx| async move {
            let items = source.fetch(&query, &ctx).await.map_err(into_task_error)?;
            Ok::<_, TaskError>(Payload::News(items))
        }));

        if opts.include_filings {
            let source = self.filings.clone();
            let ticker = opts.ticker.clone();
            let limit = opts.filings_limit;
            tasks.push(TaskSpec::new(FILINGS, opts.filings_timeout, move |ctx| async move {
                let report = source
                    .fetch(&ticker, limit, &ctx)
                    .await
                    .map_err(into_task_error)?;
                Ok::<_, TaskError>(Payload::Filings(report))
            }));
        }
        tasks
    }

    /// Runs every source under `supervisor` and assembles the report.
    pub async fn gather(
        &self,
        supervisor: &Supervisor,
        opts: &GatherOptions,
    ) -> Result<Report, RunError> {
        let results = supervisor.run_parallel(self.tasks(opts)).await?;
        Ok(self.finish(results, opts).await)
    }

    /// Post-processing after the run: optional news clustering.
    pub async fn finish(&self, results: ResultMap<Payload>, opts: &GatherOptions) -> Report {
        let news_clusters = match results.value(NEWS).and_then(Payload::as_news) {
            Some(items) if opts.cluster && !items.is_empty() => {
                Some(self.cluster_news(items.to_vec()).await)
            }
            _ => None,
        };
        Report {
            ticker: opts.ticker.to_uppercase(),
            results,
            news_clusters,
        }
    }

    /// Groups near-duplicate headlines, summarizing each group when a model is attached.
    pub async fn cluster_news(&self, items: Vec<NewsItem>) -> Vec<ClusterSummary> {
        let clusters = cluster::cluster_by_title(items, |i| i.title.as_deref(), DEFAULT_THRESHOLD);

        let mut out = Vec::with_capacity(clusters.len());
        for c in clusters {
            let summary = match &self.summarizer {
                Some(summarizer) => summarize_cluster(summarizer.as_ref(), &c.items).await,
                None => None,
            };
            out.push(ClusterSummary {
                title: c.title,
                size: c.items.len(),
                summary,
                items: c.items,
            });
        }
        out
    }
}

async fn summarize_cluster(summarizer: &dyn Summarize, items: &[NewsItem]) -> Option<String> {
    let joined = items
        .iter()
        .map(|i| i.title.as_deref().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(". ");
    let titles = markup::head_chars(&joined, CLUSTER_TITLES_CHARS);
    if titles.is_empty() {
        return None;
    }
    match summarizer.summarize(titles).await {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::debug!(error = %e, "cluster summary failed");
            None
        }
    }
}

fn into_task_error(err: SourceError) -> TaskError {
    match err {
        SourceError::Canceled => TaskError::Canceled,
        other => TaskError::fail(other),
    }
}
