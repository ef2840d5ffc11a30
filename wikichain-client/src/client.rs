use crate::error::{ClientError, Result};
use crate::response::QueryResponse;
use crate::source::LinkSource;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Hard cap the API accepts for `bllimit` on a single page.
pub const BACKLINK_LIMIT: usize = 500;
const ARTICLE_NAMESPACE: &str = "0";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!(
                "WikiChain/{} (Educational project; contact@example.com)",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

/// MediaWiki API client used as the search's link source.
#[derive(Debug, Clone)]
pub struct WikiClient {
    client: Client,
    api_url: Url,
}

impl WikiClient {
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;

        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self { client, api_url })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    async fn query(&self, params: &[(&str, String)]) -> Result<QueryResponse> {
        debug!("GET {} {:?}", self.api_url, params);

        let response = self
            .client
            .get(self.api_url.clone())
            .query(&[("action", "query"), ("format", "json")])
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let parsed: QueryResponse = serde_json::from_str(&body)?;

        if let Some(error) = parsed.error {
            return Err(ClientError::ApiError {
                code: error.code,
                info: error.info,
            });
        }

        Ok(parsed)
    }

    /// Check the article exists and follow redirects to its canonical title.
    /// Returns `Ok(None)` when the page does not exist.
    pub async fn resolve(&self, title: &str) -> Result<Option<String>> {
        let params = [("titles", title.to_string()), ("redirects", "1".to_string())];
        let parsed = self.query(&params).await?;

        let resolved = parsed
            .query
            .pages
            .iter()
            .next()
            .filter(|(page_id, page)| page.exists(page_id))
            .map(|(_, page)| page.title.clone());

        debug!("Resolved {:?} -> {:?}", title, resolved);
        Ok(resolved)
    }

    /// All outgoing article links, following continuation until exhausted.
    pub async fn fetch_outgoing_links(&self, title: &str) -> Result<Vec<String>> {
        let mut links = Vec::new();
        let base = [
            ("titles", title.to_string()),
            ("prop", "links".to_string()),
            ("pllimit", "max".to_string()),
            ("plnamespace", ARTICLE_NAMESPACE.to_string()),
        ];
        let mut continuation: Vec<(String, String)> = Vec::new();
        let mut seen = HashSet::new();

        loop {
            let mut params: Vec<(&str, String)> = base.to_vec();
            params.extend(continuation.iter().map(|(k, v)| (k.as_str(), v.clone())));

            let parsed = self.query(&params).await?;
            for page in parsed.query.pages.into_values() {
                links.extend(page.links.into_iter().map(|link| link.title));
            }

            match parsed.continuation {
                Some(next) if !next.is_empty() => {
                    if !seen.insert(next.clone()) {
                        return Err(ClientError::StalledContinuation(title.to_string()));
                    }
                    continuation = next.into_iter().collect();
                }
                _ => break,
            }
        }

        debug!("{} outgoing links from {}", links.len(), title);
        Ok(links)
    }

    /// Up to [`BACKLINK_LIMIT`] incoming article links from a single page.
    pub async fn fetch_incoming_links(&self, title: &str) -> Result<Vec<String>> {
        let params = [
            ("list", "backlinks".to_string()),
            ("bltitle", title.to_string()),
            ("bllimit", BACKLINK_LIMIT.to_string()),
            ("blnamespace", ARTICLE_NAMESPACE.to_string()),
        ];
        let parsed = self.query(&params).await?;

        let links: Vec<String> = parsed
            .query
            .backlinks
            .into_iter()
            .map(|link| link.title)
            .collect();

        debug!("{} incoming links to {}", links.len(), title);
        Ok(links)
    }
}

impl LinkSource for WikiClient {
    async fn outgoing_links(&self, title: &str) -> Vec<String> {
        match self.fetch_outgoing_links(title).await {
            Ok(links) => links,
            Err(e) => {
                info!("Outgoing link fetch failed for {}: {}", title, e);
                Vec::new()
            }
        }
    }

    async fn incoming_links(&self, title: &str) -> Vec<String> {
        match self.fetch_incoming_links(title).await {
            Ok(links) => links,
            Err(e) => {
                info!("Incoming link fetch failed for {}: {}", title, e);
                Vec::new()
            }
        }
    }
}
