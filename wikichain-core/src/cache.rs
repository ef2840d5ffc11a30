use rusqlite::{Connection, OptionalExtension, Result, params};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Entries older than this are treated exactly like missing ones.
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(90 * 24 * 60 * 60);

/// Source of "now" in Unix seconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Persistent store of outgoing-link lists keyed by canonical title.
///
/// The connection sits behind a mutex so one cache can be shared by several
/// searches running in the same process. Every [`store`](LinkCache::store)
/// runs as a single transaction while holding that mutex, so readers never
/// observe an article row without its links or a mix of old and new links.
///
/// An article whose fetched link list is empty is never written. Such an
/// article looks exactly like one that was never fetched and is refetched
/// on every search.
pub struct LinkCache {
    conn: Mutex<Connection>,
    clock: Clock,
    expiry_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub articles: i64,
    pub links: i64,
    pub stale: i64,
    pub oldest_fetch: Option<i64>,
    pub newest_fetch: Option<i64>,
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

impl LinkCache {
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    /// Delete the database file along with any WAL side files.
    pub fn remove(path: &Path) -> io::Result<()> {
        fs::remove_file(path)?;
        for suffix in ["-wal", "-shm"] {
            let mut side = path.as_os_str().to_owned();
            side.push(suffix);
            match fs::remove_file(&side) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let cache = LinkCache {
            conn: Mutex::new(conn),
            clock: Arc::new(current_timestamp),
            expiry_secs: DEFAULT_EXPIRY.as_secs() as i64,
        };
        cache.init_schema()?;
        Ok(cache)
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry_secs = expiry.as_secs() as i64;
        self
    }

    fn init_schema(&self) -> Result<()> {
        self.conn().execute_batch(
            "
            CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT UNIQUE NOT NULL,
    last_fetched INTEGER NOT NULL
);

-- Outgoing links, in the order the API returned them
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    target TEXT NOT NULL,

    FOREIGN KEY(article_id) REFERENCES articles(id) ON DELETE CASCADE,
    UNIQUE(article_id, position)
);

CREATE INDEX IF NOT EXISTS idx_links_article ON links(article_id);
CREATE INDEX IF NOT EXISTS idx_articles_last_fetched ON articles(last_fetched);
            ",
        )?;
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn now(&self) -> i64 {
        (self.clock)()
    }

    /// Cached outgoing links for `title`, or `None` if the title was never
    /// cached or its entry has gone stale.
    pub fn lookup(&self, title: &str) -> Result<Option<Vec<String>>> {
        let conn = self.conn();

        let entry: Option<(i64, i64)> = conn
            .query_row(
                "SELECT id, last_fetched FROM articles WHERE title = ?1",
                params![title],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((article_id, last_fetched)) = entry else {
            return Ok(None);
        };

        if self.now() - last_fetched >= self.expiry_secs {
            debug!("Cache entry for {} is stale", title);
            return Ok(None);
        }

        let mut stmt = conn.prepare_cached(
            "SELECT target FROM links WHERE article_id = ?1 ORDER BY position",
        )?;
        let links = stmt
            .query_map(params![article_id], |row| row.get(0))?
            .collect::<Result<Vec<String>>>()?;

        Ok(Some(links))
    }

    /// Replace whatever is cached for `title` with `links` and a fresh
    /// timestamp. Returns `false` without touching the database when `links`
    /// is empty.
    pub fn store(&self, title: &str, links: &[String]) -> Result<bool> {
        if links.is_empty() {
            return Ok(false);
        }

        let timestamp = self.now();
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        // Cascades to the old link rows
        tx.execute("DELETE FROM articles WHERE title = ?1", params![title])?;
        tx.execute(
            "INSERT INTO articles (title, last_fetched) VALUES (?1, ?2)",
            params![title, timestamp],
        )?;
        let article_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO links (article_id, position, target) VALUES (?1, ?2, ?3)",
            )?;
            for (position, target) in links.iter().enumerate() {
                stmt.execute(params![article_id, position as i64, target])?;
            }
        }

        tx.commit()?;
        debug!("Cached {} links for {}", links.len(), title);
        Ok(true)
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let stale_before = self.now() - self.expiry_secs;
        self.with_connection(|conn| {
            let (articles, oldest_fetch, newest_fetch) = conn.query_row(
                "SELECT COUNT(*), MIN(last_fetched), MAX(last_fetched) FROM articles",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;
            let links = conn.query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
            let stale = conn.query_row(
                "SELECT COUNT(*) FROM articles WHERE last_fetched <= ?1",
                params![stale_before],
                |row| row.get(0),
            )?;

            Ok(CacheStats {
                articles,
                links,
                stale,
                oldest_fetch,
                newest_fetch,
            })
        })
    }

    /// Run `f` against the underlying connection while holding the lock.
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        f(&self.conn())
    }

    pub fn close(self) -> Result<()> {
        let conn = self.conn.into_inner().unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, e)| e)
    }
}
