//! Human-readable report output.

use std::fmt::{Display, Write};

use gathervisor::report::ClusterSummary;
use gathervisor::sources::{FilingsReport, Fundamentals, NewsItem};
use gathervisor::{GatherOptions, Heartbeat, Report};

fn or_na<T: Display>(v: Option<T>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

pub fn report(report: &Report, opts: &GatherOptions) -> String {
    let mut out = String::new();
    if let Some(f) = report.fundamentals() {
        fundamentals(&mut out, f);
    }
    if let Some(items) = report.news() {
        news(&mut out, items, opts.days);
    }
    if let Some(filings) = report.filings() {
        filings_section(&mut out, filings);
    }
    if let Some(clusters) = &report.news_clusters {
        clusters_section(&mut out, clusters);
    }
    results(&mut out, report);
    out
}

fn fundamentals(out: &mut String, f: &Fundamentals) {
    let id = &f.identity;
    let _ = writeln!(out, "\n=== Fundamentals for {} ===", f.ticker);
    let _ = writeln!(out, "Name: {}", or_na(id.name.as_deref()));
    let _ = writeln!(
        out,
        "Sector: {} | Industry: {} | Exchange: {}",
        or_na(id.sector.as_deref()),
        or_na(id.industry.as_deref()),
        or_na(id.exchange.as_deref())
    );
    let _ = writeln!(
        out,
        "Price: {} {}",
        or_na(f.price.last),
        f.price.currency.as_deref().unwrap_or_default()
    );
    let v = &f.valuation;
    let _ = writeln!(
        out,
        "Valuation -> Market Cap: {} | TTM P/E: {} | Fwd P/E: {} | P/B: {}",
        or_na(v.market_cap),
        or_na(v.trailing_pe),
        or_na(v.forward_pe),
        or_na(v.price_to_book)
    );
    let fin = &f.financials;
    let _ = writeln!(
        out,
        "Financials -> Revenue: {} | Net Income: {} | Free Cash Flow: {}",
        or_na(fin.revenue),
        or_na(fin.net_income),
        or_na(fin.free_cash_flow)
    );
}

fn news(out: &mut String, items: &[NewsItem], days: u32) {
    let _ = writeln!(out, "\n=== Recent News (last {days} days) ===");
    if items.is_empty() {
        let _ = writeln!(out, "No news found.");
    }
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "\n{}. {}", i + 1, or_na(item.title.as_deref()));
        if let Some(source) = &item.source {
            let _ = writeln!(out, "   Source: {source}");
        }
        if let Some(published) = &item.published {
            let _ = writeln!(out, "   Published: {published}");
        }
        if let Some(summary) = &item.summary {
            let _ = writeln!(out, "   Summary: {summary}");
        }
        let _ = writeln!(out, "   Link: {}", or_na(item.link.as_deref()));
    }
}

fn filings_section(out: &mut String, report: &FilingsReport) {
    let _ = writeln!(out, "\n=== Filings for {} ===", report.ticker);
    if let Some(err) = &report.error {
        let _ = writeln!(out, "Unavailable ({err}).");
        return;
    }
    for filing in &report.filings {
        let _ = writeln!(out, "\n- {}", or_na(filing.title.as_deref()));
        if let Some(updated) = &filing.updated {
            let _ = writeln!(out, "  Updated: {updated}");
        }
        if let Some(doc) = &filing.primary_doc {
            let _ = writeln!(out, "  Document: {doc}");
        }
        if !filing.sections.is_empty() {
            let names: Vec<&str> = filing.sections.keys().map(String::as_str).collect();
            let _ = writeln!(out, "  Sections: {}", names.join(", "));
        }
        if let Some(summary) = &filing.summary {
            let _ = writeln!(out, "  Summary: {summary}");
        }
    }
}

fn clusters_section(out: &mut String, clusters: &[ClusterSummary]) {
    let _ = writeln!(out, "\n=== News Clusters ===");
    for c in clusters {
        let _ = writeln!(out, "- [{}] {}", c.size, c.title);
        if let Some(summary) = &c.summary {
            let _ = writeln!(out, "    {summary}");
        }
    }
}

fn results(out: &mut String, report: &Report) {
    let _ = writeln!(out, "\n=== Supervisor Results ===");
    for name in report.results.names() {
        let line = match report.results.error(name) {
            None => "OK".to_string(),
            Some(err) => format!("ERROR: {err}"),
        };
        let _ = writeln!(out, "- {name}: {line}");
    }
    if let Some(clusters) = &report.news_clusters {
        let _ = writeln!(out, "- news_clusters: {} clusters", clusters.len());
    }
}

pub fn timeline(beats: &[Heartbeat]) -> String {
    let mut out = String::from("\n=== Heartbeats ===\n");
    for beat in beats {
        let _ = writeln!(out, "[{:>4}] {beat}", beat.seq);
    }
    out
}
