use crate::cache::LinkCache;
use crate::path::{ParentMap, reconstruct_path};
use crate::stats::{LinkLookup, SearchStats};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use wikichain_client::LinkSource;

pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Links fetched for one frontier member, and where they came from.
type Fetched = (Vec<String>, LinkLookup);

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Levels expanded per direction.
    pub max_depth: usize,
    /// Fetches kept in flight within one expansion step.
    pub concurrency: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// `None` when the two ends did not meet within the depth bound.
    pub path: Option<Vec<String>>,
    pub stats: SearchStats,
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        self.path.is_some()
    }

    /// Number of links followed along the path.
    pub fn degrees(&self) -> Option<usize> {
        self.path.as_ref().map(|p| p.len().saturating_sub(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }
}

/// Exploration state for one end of the search.
#[derive(Debug)]
pub struct SearchSide {
    direction: Direction,
    frontier: BTreeSet<String>,
    visited: HashSet<String>,
    parents: ParentMap,
}

impl SearchSide {
    pub fn new(direction: Direction, origin: &str) -> Self {
        Self {
            direction,
            frontier: BTreeSet::from([origin.to_string()]),
            visited: HashSet::from([origin.to_string()]),
            parents: ParentMap::from([(origin.to_string(), None)]),
        }
    }

    pub fn frontier(&self) -> &BTreeSet<String> {
        &self.frontier
    }

    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    pub fn parents(&self) -> &ParentMap {
        &self.parents
    }

    /// Record `links` found while expanding `parent`. Titles seen before keep
    /// their original parent and do not re-enter the frontier.
    fn discover(&mut self, parent: &str, links: Vec<String>) {
        for link in links {
            if self.visited.insert(link.clone()) {
                self.parents.insert(link.clone(), Some(parent.to_string()));
                self.frontier.insert(link);
            }
        }
    }

    /// Lexicographically smallest title visited from both ends.
    pub fn meeting_point<'a>(&'a self, other: &'a SearchSide) -> Option<&'a str> {
        let (small, large) = if self.visited.len() <= other.visited.len() {
            (self, other)
        } else {
            (other, self)
        };

        small
            .visited
            .iter()
            .filter(|title| large.visited.contains(*title))
            .min()
            .map(String::as_str)
    }
}

/// Bidirectional breadth-first search over an article link graph.
///
/// The forward side follows outgoing links (through the cache when one is
/// attached), the backward side follows incoming links straight from the
/// source. Each iteration expands one full level forward, checks for a
/// meeting point, expands one full level backward and checks again.
pub struct SearchEngine<S> {
    source: S,
    cache: Option<Arc<LinkCache>>,
    config: SearchConfig,
}

impl<S: LinkSource> SearchEngine<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: None,
            config: SearchConfig::default(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<LinkCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Find a chain of links from `start` to `end`. Both must already be
    /// canonical titles.
    pub async fn search(&self, start: &str, end: &str) -> SearchOutcome {
        if start == end {
            return SearchOutcome {
                path: Some(vec![start.to_string()]),
                stats: SearchStats {
                    articles_explored: 1,
                    ..SearchStats::default()
                },
            };
        }

        let started = Instant::now();
        let mut stats = SearchStats::default();
        let mut forward = SearchSide::new(Direction::Forward, start);
        let mut backward = SearchSide::new(Direction::Backward, end);

        info!(
            "Searching {} -> {} (max depth {})",
            start, end, self.config.max_depth
        );

        for depth in 1..=self.config.max_depth {
            self.expand(&mut forward, &mut stats, depth, |title| {
                self.outgoing_links(title)
            })
            .await;
            if let Some(outcome) = Self::meet(&forward, &backward, &mut stats, started) {
                return outcome;
            }

            self.expand(&mut backward, &mut stats, depth, |title| {
                self.incoming_links(title)
            })
            .await;
            if let Some(outcome) = Self::meet(&forward, &backward, &mut stats, started) {
                return outcome;
            }

            if forward.frontier.is_empty() && backward.frontier.is_empty() {
                debug!("Both frontiers exhausted at depth {}", depth);
                break;
            }
        }

        stats.finish(started);
        info!(
            "No path found from {} to {} after exploring {} articles",
            start, end, stats.articles_explored
        );
        SearchOutcome { path: None, stats }
    }

    /// Expand every member of `side`'s frontier one level using `fetch`,
    /// replacing the frontier with the newly discovered titles.
    ///
    /// Fetches may overlap up to the configured concurrency, but results are
    /// merged in frontier order only after all of them have completed.
    async fn expand<F, Fut>(
        &self,
        side: &mut SearchSide,
        stats: &mut SearchStats,
        depth: usize,
        fetch: F,
    ) where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Fetched>,
    {
        let frontier = std::mem::take(&mut side.frontier);
        debug!(
            "Expanding {} frontier of {} at depth {}",
            side.direction.as_str(),
            frontier.len(),
            depth
        );

        let fetched: Vec<(String, Fetched)> = stream::iter(frontier)
            .map(|title| {
                let pending = fetch(title.clone());
                async move { (title, pending.await) }
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        for (title, (links, lookup)) in fetched {
            stats.record(lookup);
            side.discover(&title, links);
        }
    }

    fn meet(
        forward: &SearchSide,
        backward: &SearchSide,
        stats: &mut SearchStats,
        started: Instant,
    ) -> Option<SearchOutcome> {
        let meeting = forward.meeting_point(backward)?;
        let path = reconstruct_path(meeting, &forward.parents, &backward.parents);

        stats.finish(started);
        info!(
            "Met at {} with a path of {} links after exploring {} articles",
            meeting,
            path.len().saturating_sub(1),
            stats.articles_explored
        );

        Some(SearchOutcome {
            path: Some(path),
            stats: stats.clone(),
        })
    }

    async fn outgoing_links(&self, title: String) -> Fetched {
        let Some(cache) = &self.cache else {
            return (self.source.outgoing_links(&title).await, LinkLookup::Uncached);
        };

        match cache.lookup(&title) {
            Ok(Some(links)) => {
                debug!("Cache hit for {}", title);
                return (links, LinkLookup::CacheHit);
            }
            Ok(None) => debug!("Cache miss for {}", title),
            Err(e) => warn!("Cache lookup failed for {}: {}", title, e),
        }

        let links = self.source.outgoing_links(&title).await;
        if let Err(e) = cache.store(&title, &links) {
            warn!("Failed to cache links for {}: {}", title, e);
        }
        (links, LinkLookup::CacheMiss)
    }

    async fn incoming_links(&self, title: String) -> Fetched {
        (self.source.incoming_links(&title).await, LinkLookup::Uncached)
    }
}
