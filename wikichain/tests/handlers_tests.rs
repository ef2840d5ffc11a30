use serde_json::json;
use tempfile::TempDir;
use url::Url;
use wikichain::commands::command_argument_builder;
use wikichain::handlers::*;
use wikichain_core::LinkCache;
use wikichain_core::report::ReportFormat;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_options(args: &[&str]) -> SearchOptions {
    let argv = ["wikichain", "search"].iter().chain(args.iter()).copied();
    let matches = command_argument_builder().try_get_matches_from(argv).unwrap();
    let search = matches.subcommand_matches("search").unwrap();
    SearchOptions::from_matches(search, false).unwrap()
}

async fn mount_page(server: &MockServer, query: &str, title: &str) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("titles", query))
        .and(query_param("redirects", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": { "1": { "pageid": 1, "ns": 0, "title": title } } }
        })))
        .mount(server)
        .await;
}

async fn mount_missing(server: &MockServer, query: &str) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("titles", query))
        .and(query_param("redirects", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": { "-1": { "ns": 0, "title": query, "missing": "" } } }
        })))
        .mount(server)
        .await;
}

async fn mount_links(server: &MockServer, title: &str, links: &[&str]) {
    let links: Vec<_> = links.iter().map(|l| json!({ "ns": 0, "title": l })).collect();
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("titles", title))
        .and(query_param("prop", "links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": { "1": { "pageid": 1, "ns": 0, "title": title, "links": links } } }
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Input Handling Tests
// ============================================================================

#[test]
fn test_validate_titles_trims() {
    assert_eq!(
        validate_titles("  Kevin Bacon ", "Dance\n"),
        Ok(("Kevin Bacon".to_string(), "Dance".to_string()))
    );
}

#[test]
fn test_validate_titles_rejects_blank() {
    let expected = Err("Both start and end articles are required".to_string());
    assert_eq!(validate_titles("", "Dance"), expected);
    assert_eq!(validate_titles("Kevin Bacon", "   "), expected);
}

#[test]
fn test_database_path_joins_file_name() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().to_str().unwrap();

    assert_eq!(database_path(dir), temp_dir.path().join("wikichain.db"));
}

#[test]
fn test_database_path_expands_tilde() {
    let db_path = database_path("~/.config/wikichain/");
    assert!(!db_path.starts_with("~"));
    assert!(db_path.ends_with(".config/wikichain/wikichain.db"));
}

// ============================================================================
// Argument Parsing Tests
// ============================================================================

#[test]
fn test_search_options_defaults() {
    let options = search_options(&["Kevin Bacon", "Dance"]);

    assert_eq!(options.from, "Kevin Bacon");
    assert_eq!(options.to, "Dance");
    assert_eq!(options.max_depth, 4);
    assert_eq!(options.concurrency, 1);
    assert_eq!(options.timeout_secs, 10);
    assert_eq!(options.format, ReportFormat::Text);
    assert!(options.show_progress);
    assert!(options.cache_path.unwrap().ends_with("wikichain.db"));
    assert_eq!(options.api_url.host_str(), Some("en.wikipedia.org"));
}

#[test]
fn test_search_options_overrides() {
    let options = search_options(&[
        "A",
        "B",
        "--max-depth",
        "2",
        "-c",
        "8",
        "--no-cache",
        "--format",
        "json",
        "--api-url",
        "http://localhost:8080/w/api.php",
    ]);

    assert_eq!(options.max_depth, 2);
    assert_eq!(options.concurrency, 8);
    assert!(options.cache_path.is_none());
    assert_eq!(options.format, ReportFormat::Json);
    assert!(!options.show_progress);
    assert_eq!(
        options.api_url,
        Url::parse("http://localhost:8080/w/api.php").unwrap()
    );
}

#[test]
fn test_search_requires_both_titles() {
    let result = command_argument_builder().try_get_matches_from(["wikichain", "search", "A"]);
    assert!(result.is_err());
}

#[test]
fn test_cache_requires_subcommand() {
    let result = command_argument_builder().try_get_matches_from(["wikichain", "cache"]);
    assert!(result.is_err());
}

// ============================================================================
// Init / Cache Stats Tests
// ============================================================================

#[test]
fn test_handle_init_creates_database() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("nested").join("cache");

    let db_path = handle_init(dir.to_str().unwrap(), false).unwrap();
    assert!(LinkCache::exists(&db_path));
}

#[test]
fn test_handle_init_keeps_entries_without_force() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().to_str().unwrap();

    let db_path = handle_init(dir, false).unwrap();
    let cache = LinkCache::open(&db_path).unwrap();
    cache.store("Alpha", &["Beta".to_string()]).unwrap();
    cache.close().unwrap();

    handle_init(dir, false).unwrap();
    let cache = LinkCache::open(&db_path).unwrap();
    assert!(cache.lookup("Alpha").unwrap().is_some());
}

#[test]
fn test_handle_init_force_recreates_database() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().to_str().unwrap();

    let db_path = handle_init(dir, false).unwrap();
    let cache = LinkCache::open(&db_path).unwrap();
    cache.store("Alpha", &["Beta".to_string()]).unwrap();
    cache.close().unwrap();

    handle_init(dir, true).unwrap();
    let cache = LinkCache::open(&db_path).unwrap();
    assert_eq!(cache.lookup("Alpha").unwrap(), None);
}

#[test]
fn test_cache_stats_missing_database() {
    let temp_dir = TempDir::new().unwrap();
    let err = handle_cache_stats(temp_dir.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("wikichain init"));
}

#[test]
fn test_cache_stats_after_init() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().to_str().unwrap();
    handle_init(dir, false).unwrap();

    let stats = handle_cache_stats(dir).unwrap();
    assert_eq!(stats.articles, 0);
    assert_eq!(stats.links, 0);
}

// ============================================================================
// Search Handler Tests
// ============================================================================

#[tokio::test]
async fn test_handle_search_rejects_blank_titles() {
    let mut options = search_options(&["A", "B", "--no-cache"]);
    options.from = "   ".to_string();

    let err = handle_search(options).await.unwrap_err();
    assert_eq!(err.to_string(), "Both start and end articles are required");
}

#[tokio::test]
async fn test_handle_search_unknown_article() {
    let server = MockServer::start().await;
    mount_missing(&server, "Qwzxv").await;

    let api_url = format!("{}/w/api.php", server.uri());
    let options = search_options(&["Qwzxv", "Beta", "--no-cache", "--api-url", api_url.as_str()]);

    let err = handle_search(options).await.unwrap_err();
    assert_eq!(err.to_string(), "Article not found: Qwzxv");
}

#[tokio::test]
async fn test_json_errors_keep_report_shape() {
    let mut options = search_options(&["A", "B", "--no-cache", "--format", "json"]);
    options.to = String::new();
    let err = handle_search(options).await.unwrap_err();

    let body: serde_json::Value =
        serde_json::from_str(&render_error(ReportFormat::Json, &err)).unwrap();
    assert_eq!(body, json!({ "error": "Both start and end articles are required" }));

    colored::control::set_override(false);
    assert_eq!(
        render_error(ReportFormat::Text, &err),
        "✗ Both start and end articles are required"
    );
}

#[tokio::test]
async fn test_handle_search_resolves_and_caches() {
    let server = MockServer::start().await;
    mount_page(&server, "alpha", "Alpha").await;
    mount_page(&server, "beta", "Beta").await;
    mount_links(&server, "Alpha", &["Beta", "Gamma"]).await;

    let temp_dir = TempDir::new().unwrap();
    let api_url = format!("{}/w/api.php", server.uri());
    let options = search_options(&[
        "alpha",
        "beta",
        "--cache-dir",
        temp_dir.path().to_str().unwrap(),
        "--api-url",
        api_url.as_str(),
        "--format",
        "json",
    ]);

    let status = handle_search(options).await.unwrap();
    assert_eq!(status, SearchStatus::Found);

    let cache = LinkCache::open(&database_path(temp_dir.path().to_str().unwrap())).unwrap();
    assert_eq!(
        cache.lookup("Alpha").unwrap(),
        Some(vec!["Beta".to_string(), "Gamma".to_string()])
    );
}

#[tokio::test]
async fn test_handle_search_reports_not_found() {
    let server = MockServer::start().await;
    mount_page(&server, "Island", "Island").await;
    mount_page(&server, "Mainland", "Mainland").await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": {}, "backlinks": [] }
        })))
        .mount(&server)
        .await;

    let api_url = format!("{}/w/api.php", server.uri());
    let options = search_options(&[
        "Island",
        "Mainland",
        "--no-cache",
        "--api-url",
        api_url.as_str(),
        "--format",
        "json",
        "-d",
        "1",
    ]);

    let status = handle_search(options).await.unwrap();
    assert_eq!(status, SearchStatus::NotFound);
}
