use std::future::Future;

/// Something that can answer "which articles does this one link to" and
/// "which articles link here".
///
/// Both calls fail softly: a transport or protocol problem produces an empty
/// list instead of an error, so a single unreachable article never aborts a
/// search.
pub trait LinkSource {
    /// Outgoing links of `title` in the article namespace, all pages.
    fn outgoing_links(&self, title: &str) -> impl Future<Output = Vec<String>> + Send;

    /// Incoming links to `title` in the article namespace, single page.
    fn incoming_links(&self, title: &str) -> impl Future<Output = Vec<String>> + Send;
}
