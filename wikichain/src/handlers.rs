use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info, warn};
use url::Url;
use wikichain_client::client::DEFAULT_API_URL;
use wikichain_client::{ClientConfig, WikiClient};
use wikichain_core::report::{
    ReportFormat, render_cache_stats, render_json, render_json_error, render_text,
};
use wikichain_core::search::DEFAULT_MAX_DEPTH;
use wikichain_core::{CacheStats, LinkCache, SearchConfig, SearchEngine};

use crate::commands::DEFAULT_CACHE_DIR;

pub const DATABASE_FILE: &str = "wikichain.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Found,
    NotFound,
}

impl SearchStatus {
    pub fn exit_code(self) -> ExitCode {
        match self {
            SearchStatus::Found => ExitCode::SUCCESS,
            SearchStatus::NotFound => ExitCode::from(2),
        }
    }
}

/// Everything `wikichain search` needs, pulled out of the parsed arguments.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub from: String,
    pub to: String,
    pub max_depth: usize,
    pub concurrency: usize,
    /// Database file, or `None` with `--no-cache`.
    pub cache_path: Option<PathBuf>,
    pub api_url: Url,
    pub timeout_secs: u64,
    pub format: ReportFormat,
    pub show_progress: bool,
}

impl SearchOptions {
    pub fn from_matches(args: &ArgMatches, quiet: bool) -> Result<Self> {
        let from = args.get_one::<String>("FROM").cloned().unwrap_or_default();
        let to = args.get_one::<String>("TO").cloned().unwrap_or_default();
        let max_depth = *args.get_one::<usize>("max-depth").unwrap_or(&DEFAULT_MAX_DEPTH);
        let concurrency = *args.get_one::<usize>("concurrency").unwrap_or(&1);
        let timeout_secs = *args.get_one::<u64>("timeout").unwrap_or(&10);

        let cache_path = if args.get_flag("no-cache") {
            None
        } else {
            let dir = args
                .get_one::<String>("cache-dir")
                .map(String::as_str)
                .unwrap_or(DEFAULT_CACHE_DIR);
            Some(database_path(dir))
        };

        let api_url = match args.get_one::<Url>("api-url") {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_API_URL)?,
        };

        let format: ReportFormat = args
            .get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("text")
            .parse()
            .map_err(|e: String| anyhow!(e))?;

        Ok(Self {
            from,
            to,
            max_depth,
            concurrency,
            cache_path,
            api_url,
            timeout_secs,
            format,
            show_progress: format == ReportFormat::Text && !quiet,
        })
    }
}

/// Failure line for `err`: a JSON `error` body, or a `✗` line in text mode.
pub fn render_error(format: ReportFormat, err: &anyhow::Error) -> String {
    match format {
        ReportFormat::Json => render_json_error(&err.to_string()).to_string(),
        ReportFormat::Text => format!("{} {:#}", "✗".red().bold(), err),
    }
}

pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Expand `~` in `dir` and point at the database file inside it.
pub fn database_path(dir: &str) -> PathBuf {
    let expanded = shellexpand::tilde(dir);
    Path::new(expanded.as_ref()).join(DATABASE_FILE)
}

/// Trim both titles and reject blank ones.
pub fn validate_titles(from: &str, to: &str) -> Result<(String, String), String> {
    let (from, to) = (from.trim(), to.trim());
    if from.is_empty() || to.is_empty() {
        return Err("Both start and end articles are required".to_string());
    }
    Ok((from.to_string(), to.to_string()))
}

pub fn open_cache(db_path: &Path) -> Result<LinkCache> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    LinkCache::open(db_path).with_context(|| format!("Failed to open {}", db_path.display()))
}

fn close_cache(cache: Option<Arc<LinkCache>>) {
    let Some(cache) = cache else {
        return;
    };
    match Arc::try_unwrap(cache) {
        Ok(cache) => {
            if let Err(e) = cache.close() {
                warn!("Failed to close link cache: {}", e);
            }
        }
        Err(_) => warn!("Link cache still shared at shutdown"),
    }
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

async fn resolve_title(client: &WikiClient, input: &str) -> Result<String> {
    match client.resolve(input).await {
        Ok(Some(title)) => {
            if title != input {
                info!("Resolved {:?} to {:?}", input, title);
            }
            Ok(title)
        }
        Ok(None) => bail!("Article not found: {}", input),
        Err(e) => {
            warn!("Could not resolve {:?}: {}", input, e);
            bail!("Article not found: {}", input)
        }
    }
}

pub async fn handle_search(options: SearchOptions) -> Result<SearchStatus> {
    let (from, to) = validate_titles(&options.from, &options.to).map_err(|e| anyhow!(e))?;

    let client = WikiClient::with_config(ClientConfig {
        api_url: options.api_url.to_string(),
        timeout_secs: options.timeout_secs,
        ..ClientConfig::default()
    })?;

    let start = resolve_title(&client, &from).await?;
    let end = resolve_title(&client, &to).await?;

    // A broken cache only costs speed, never the search
    let cache = options
        .cache_path
        .as_deref()
        .and_then(|path| match open_cache(path) {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) => {
                warn!("Continuing without link cache: {:#}", e);
                None
            }
        });

    if options.format == ReportFormat::Text {
        println!("\n🔗 {} → {}", start.bright_white().bold(), end.bright_white().bold());
        println!("Max depth: {} per direction", options.max_depth);
        println!("Concurrency: {}", options.concurrency.max(1));
        match (&options.cache_path, &cache) {
            (Some(path), Some(_)) => println!("Cache: {}\n", path.display()),
            _ => println!("Cache: disabled\n"),
        }
    }

    let mut engine = SearchEngine::new(client).with_config(SearchConfig {
        max_depth: options.max_depth,
        concurrency: options.concurrency,
    });
    if let Some(cache) = &cache {
        engine = engine.with_cache(cache.clone());
    }

    let progress = options
        .show_progress
        .then(|| spinner(format!("Searching for a path from {} to {}...", start, end)));

    let outcome = engine.search(&start, &end).await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    drop(engine);
    close_cache(cache);

    match options.format {
        ReportFormat::Text => print!("{}", render_text(&outcome, options.max_depth)),
        ReportFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&render_json(&outcome, options.max_depth))?
        ),
    }

    Ok(if outcome.is_found() {
        SearchStatus::Found
    } else {
        SearchStatus::NotFound
    })
}

pub fn handle_init(path: &str, force: bool) -> Result<PathBuf> {
    let db_path = database_path(path);

    println!();
    print_divider();
    println!("{}", "  WIKICHAIN INITIALIZATION".bright_cyan().bold());
    print_divider();
    println!();

    if LinkCache::exists(&db_path) {
        if force {
            LinkCache::remove(&db_path)
                .with_context(|| format!("Failed to remove {}", db_path.display()))?;
            println!("{} Existing database removed", "✓".green().bold());
        } else {
            println!(
                "{} Keeping existing database (use --force to recreate it)",
                "→".blue()
            );
        }
    }

    println!("{} Opening database...", "→".blue());
    open_cache(&db_path)?.close()?;
    println!(
        "{} Database initialized: {}",
        "✓".green().bold(),
        db_path.display().to_string().bright_white()
    );
    println!();

    Ok(db_path)
}

pub fn handle_cache_stats(cache_dir: &str) -> Result<CacheStats> {
    let db_path = database_path(cache_dir);
    if !LinkCache::exists(&db_path) {
        bail!(
            "No link cache at {}; run `wikichain init` first",
            db_path.display()
        );
    }

    let cache = LinkCache::open(&db_path)?;
    let stats = cache.stats()?;
    cache.close()?;

    println!("Database: {}", db_path.display().to_string().bright_white());
    print!("{}", render_cache_stats(&stats));
    Ok(stats)
}
