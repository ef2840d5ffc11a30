use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Where one outgoing or incoming link list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkLookup {
    /// Served from a fresh cache entry.
    CacheHit,
    /// Cache consulted but missing or stale, then fetched from the source.
    CacheMiss,
    /// Fetched straight from the source without consulting a cache.
    Uncached,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub articles_explored: usize,
    pub time_taken_seconds: f64,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub api_calls: usize,
}

impl SearchStats {
    pub fn record(&mut self, lookup: LinkLookup) {
        self.articles_explored += 1;
        match lookup {
            LinkLookup::CacheHit => self.cache_hits += 1,
            LinkLookup::CacheMiss => {
                self.cache_misses += 1;
                self.api_calls += 1;
            }
            LinkLookup::Uncached => self.api_calls += 1,
        }
    }

    /// Stamp the elapsed time, rounded to hundredths of a second.
    pub fn finish(&mut self, started: Instant) {
        let elapsed = started.elapsed().as_secs_f64();
        self.time_taken_seconds = (elapsed * 100.0).round() / 100.0;
    }
}
