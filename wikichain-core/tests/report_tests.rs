// Tests for report rendering

use wikichain_core::report::{
    ReportFormat, not_found_message, render_cache_stats, render_json, render_json_error,
    render_text,
};
use wikichain_core::{CacheStats, SearchOutcome, SearchStats};

fn sample_stats() -> SearchStats {
    SearchStats {
        articles_explored: 42,
        time_taken_seconds: 1.25,
        cache_hits: 10,
        cache_misses: 11,
        api_calls: 31,
    }
}

fn found_outcome() -> SearchOutcome {
    SearchOutcome {
        path: Some(vec![
            "Kevin Bacon".to_string(),
            "Footloose".to_string(),
            "Dance".to_string(),
        ]),
        stats: sample_stats(),
    }
}

fn missing_outcome() -> SearchOutcome {
    SearchOutcome {
        path: None,
        stats: sample_stats(),
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_parse() {
    assert_eq!("text".parse::<ReportFormat>(), Ok(ReportFormat::Text));
    assert_eq!("json".parse::<ReportFormat>(), Ok(ReportFormat::Json));
}

#[test]
fn test_report_format_case_insensitive() {
    assert_eq!("TEXT".parse::<ReportFormat>(), Ok(ReportFormat::Text));
    assert_eq!("Json".parse::<ReportFormat>(), Ok(ReportFormat::Json));
}

#[test]
fn test_report_format_invalid() {
    assert!("csv".parse::<ReportFormat>().is_err());
    assert!("".parse::<ReportFormat>().is_err());
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_found() {
    let json = render_json(&found_outcome(), 4);

    assert_eq!(json["path"][0], "Kevin Bacon");
    assert_eq!(json["path"][2], "Dance");
    assert_eq!(json["stats"]["articlesExplored"], 42);
    assert_eq!(json["stats"]["timeTakenSeconds"], 1.25);
    assert_eq!(json["stats"]["cacheHits"], 10);
    assert_eq!(json["stats"]["cacheMisses"], 11);
    assert_eq!(json["stats"]["apiCalls"], 31);
    assert!(json.get("error").is_none());
}

#[test]
fn test_json_report_not_found() {
    let json = render_json(&missing_outcome(), 4);

    assert_eq!(
        json["error"],
        "No path found within 4 links in each direction"
    );
    assert_eq!(json["stats"]["articlesExplored"], 42);
    assert!(json.get("path").is_none());
}

#[test]
fn test_json_error_report() {
    let json = render_json_error("Article not found: Qwzxv");

    assert_eq!(json, serde_json::json!({ "error": "Article not found: Qwzxv" }));
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_found() {
    colored::control::set_override(false);
    let report = render_text(&found_outcome(), 4);

    assert!(report.contains("# Path (2 links):"));
    assert!(report.contains("1. Kevin Bacon"));
    assert!(report.contains("3. Dance"));
    assert!(report.contains("Kevin Bacon → Footloose → Dance"));
    assert!(report.contains("Articles explored: 42"));
    assert!(report.contains("Time taken: 1.25s"));
    assert!(report.contains("Cache hits: 10"));
    assert!(report.contains("Cache misses: 11"));
    assert!(report.contains("API calls: 31"));
}

#[test]
fn test_text_report_single_link() {
    colored::control::set_override(false);
    let outcome = SearchOutcome {
        path: Some(vec!["A".to_string(), "B".to_string()]),
        stats: SearchStats::default(),
    };

    assert!(render_text(&outcome, 4).contains("# Path (1 link):"));
}

#[test]
fn test_text_report_not_found() {
    colored::control::set_override(false);
    let report = render_text(&missing_outcome(), 3);

    assert!(report.contains(&not_found_message(3)));
    assert!(report.contains("Articles explored: 42"));
    assert!(!report.contains("# Path"));
}

// ============================================================================
// Cache Stats Report Tests
// ============================================================================

#[test]
fn test_cache_stats_report() {
    let stats = CacheStats {
        articles: 3,
        links: 120,
        stale: 1,
        oldest_fetch: Some(0),
        newest_fetch: None,
    };

    let report = render_cache_stats(&stats);
    assert!(report.contains("Articles cached: 3"));
    assert!(report.contains("Links stored: 120"));
    assert!(report.contains("Stale entries: 1"));
    assert!(report.contains("Oldest fetch: 1970-01-01 00:00:00 UTC"));
    assert!(report.contains("Newest fetch: never"));
}
