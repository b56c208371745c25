use std::time::Duration;

use clap::Parser;
use gathervisor::GatherOptions;
use gathervisor::summarize::SummarizerConfig;

/// Gather fundamentals, news and filings for a ticker in parallel.
#[derive(Parser, Debug)]
#[command(name = "gather", version, about, long_about = None)]
pub struct Args {
    /// Ticker symbol, e.g. AAPL, MSFT, TSLA.
    #[arg(long)]
    pub ticker: String,

    /// Company name to broaden the news search.
    #[arg(long)]
    pub company: Option<String>,

    /// Days to look back for news.
    #[arg(long, default_value_t = 7)]
    pub days: u32,

    /// Maximum number of news items.
    #[arg(long, default_value_t = 20)]
    pub max_news: usize,

    /// Summarize news, filings and clusters with a local Ollama model.
    #[arg(long)]
    pub summarize: bool,

    /// Ollama model name.
    #[arg(long, default_value = "mistral:latest")]
    pub ollama_model: String,

    /// Ollama base URL.
    #[arg(long, default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Also fetch recent 10-K/10-Q filings from SEC EDGAR.
    #[arg(long)]
    pub include_filings: bool,

    /// Number of filings to fetch.
    #[arg(long, default_value_t = 2)]
    pub filings_limit: usize,

    /// Group near-duplicate news headlines.
    #[arg(long)]
    pub cluster: bool,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Print every heartbeat after the run.
    #[arg(long)]
    pub timeline: bool,
}

impl Args {
    pub fn options(&self) -> GatherOptions {
        GatherOptions {
            company: self.company.clone(),
            days: self.days,
            max_news: self.max_news,
            include_filings: self.include_filings,
            filings_limit: self.filings_limit,
            cluster: self.cluster,
            ..GatherOptions::new(self.ticker.clone())
        }
    }

    pub fn summarizer_config(&self) -> SummarizerConfig {
        SummarizerConfig {
            base_url: self.ollama_url.clone(),
            model: self.ollama_model.clone(),
            timeout: Duration::from_secs(20),
        }
    }
}
