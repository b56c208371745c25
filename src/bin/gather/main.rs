//! `gather`: fetch fundamentals, news and (optionally) filings for one ticker in parallel,
//! each source under its own timeout, and print the merged report.
//!
//! ```text
//! gather --ticker AAPL --include-filings --cluster
//! RUST_LOG=gathervisor=debug gather --ticker MSFT --json
//! ```

mod cli;
mod render;
mod signal;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gathervisor::sources::{HttpClient, SourcesConfig};
use gathervisor::summarize::OllamaClient;
use gathervisor::{Gatherer, LogWriter, Subscribe, Supervisor, SupervisorConfig, Timeline};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let http = HttpClient::new(SourcesConfig::default()).context("building HTTP client")?;
    let mut gatherer = Gatherer::new(http);
    if args.summarize {
        let ollama = OllamaClient::new(args.summarizer_config()).context("building Ollama client")?;
        gatherer = gatherer.with_summarizer(Arc::new(ollama));
    }

    let timeline = Arc::new(Timeline::new());
    let mut subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    if args.timeline {
        subscribers.push(timeline.clone());
    }
    let sup = Supervisor::builder(SupervisorConfig::default())
        .with_subscribers(subscribers)
        .build();

    let opts = args.options();
    let report = {
        let run = gatherer.gather(&sup, &opts);
        tokio::pin!(run);
        tokio::select! {
            res = &mut run => res?,
            sig = signal::interrupted() => {
                match sig {
                    Ok(sig) => {
                        tracing::warn!(signal = %sig, "interrupt received, cancelling running sources");
                        sup.cancel();
                    }
                    Err(err) => tracing::warn!(error = %err, "signal handlers unavailable"),
                }
                run.await?
            }
        }
    };
    sup.shutdown().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::report(&report, &opts));
    }
    if args.timeline {
        print!("{}", render::timeline(&timeline.snapshot()));
    }
    Ok(())
}
