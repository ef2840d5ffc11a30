//! Wire models for the subset of the MediaWiki `action=query` API we use.
//!
//! Responses are requested with the default `formatversion=1`, where `pages`
//! is an object keyed by page id and missing pages get a negative id.

use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Default)]
pub struct QueryResponse {
    #[serde(default)]
    pub query: QueryPayload,
    /// Continuation parameters to send back verbatim on the next request.
    #[serde(default, rename = "continue")]
    pub continuation: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub error: Option<ApiErrorPayload>,
}

#[derive(Debug, Deserialize, Default)]
pub struct QueryPayload {
    #[serde(default)]
    pub pages: BTreeMap<String, PageItem>,
    #[serde(default)]
    pub backlinks: Vec<TitleItem>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PageItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub missing: Option<serde_json::Value>,
    #[serde(default)]
    pub invalid: Option<serde_json::Value>,
    #[serde(default)]
    pub links: Vec<TitleItem>,
}

impl PageItem {
    pub fn exists(&self, page_id: &str) -> bool {
        !page_id.starts_with('-') && self.missing.is_none() && self.invalid.is_none()
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct TitleItem {
    pub title: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiErrorPayload {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub info: String,
}
