// Report rendering for search outcomes and cache statistics

use crate::cache::CacheStats;
use crate::search::SearchOutcome;
use chrono::DateTime;
use colored::Colorize;
use serde_json::{Value, json};
use std::fmt::Write;
use std::str::FromStr;

const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("Unknown report format: {}", other)),
        }
    }
}

pub fn not_found_message(max_depth: usize) -> String {
    format!("No path found within {} links in each direction", max_depth)
}

/// JSON report: `path` + `stats` on
/// success, `error` + `stats` otherwise.
pub fn render_json(outcome: &SearchOutcome, max_depth: usize) -> Value {
    match &outcome.path {
        Some(path) => json!({
            "path": path,
            "stats": outcome.stats,
        }),
        None => json!({
            "error": not_found_message(max_depth),
            "stats": outcome.stats,
        }),
    }
}

/// JSON body for a search that never started, such as an unknown title.
pub fn render_json_error(message: &str) -> Value {
    json!({ "error": message })
}

pub fn render_text(outcome: &SearchOutcome, max_depth: usize) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "{}\n", DIVIDER);

    match &outcome.path {
        Some(path) => {
            let degrees = path.len().saturating_sub(1);
            let _ = writeln!(
                report,
                "# Path ({} {}):",
                degrees,
                if degrees == 1 { "link" } else { "links" }
            );
            for (idx, title) in path.iter().enumerate() {
                let _ = writeln!(report, "  {}. {}", idx + 1, title.bright_white());
            }
            let chain: Vec<String> = path.iter().map(|t| t.cyan().to_string()).collect();
            let _ = writeln!(report, "\n  {}", chain.join(" → "));
        }
        None => {
            let _ = writeln!(report, "{} {}", "✗".red().bold(), not_found_message(max_depth));
        }
    }

    let stats = &outcome.stats;
    let _ = writeln!(report, "\n# Stats:");
    let _ = writeln!(report, "  Articles explored: {}", stats.articles_explored);
    let _ = writeln!(report, "  Time taken: {:.2}s", stats.time_taken_seconds);
    let _ = writeln!(report, "  Cache hits: {}", stats.cache_hits);
    let _ = writeln!(report, "  Cache misses: {}", stats.cache_misses);
    let _ = writeln!(report, "  API calls: {}", stats.api_calls);
    let _ = writeln!(report, "\n{}", DIVIDER);

    report
}

fn format_timestamp(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string())
}

pub fn render_cache_stats(stats: &CacheStats) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "# Link cache:");
    let _ = writeln!(report, "  Articles cached: {}", stats.articles);
    let _ = writeln!(report, "  Links stored: {}", stats.links);
    let _ = writeln!(report, "  Stale entries: {}", stats.stale);
    let _ = writeln!(report, "  Oldest fetch: {}", format_timestamp(stats.oldest_fetch));
    let _ = writeln!(report, "  Newest fetch: {}", format_timestamp(stats.newest_fetch));
    report
}
