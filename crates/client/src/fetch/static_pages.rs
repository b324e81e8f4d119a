//! In-memory page source for driving the resolver and pipeline without a network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::url::canonicalize;
use super::{PageFetcher, detect_interstitial};
use ladle_core::Error;
use ladle_core::config::DEFAULT_INTERSTITIAL_MARKERS;

/// Canned outcome for one URL.
#[derive(Debug, Clone)]
pub enum StaticPage {
    Html(String),
    Status(u16, String),
    Timeout,
}

/// A [`PageFetcher`] answering from a fixed URL map.
///
/// HTML bodies go through the same interstitial check as live fetches, and
/// unknown URLs answer 404. Every requested URL is recorded.
pub struct StaticFetcher {
    pages: HashMap<String, StaticPage>,
    markers: Vec<String>,
    requests: Mutex<Vec<String>>,
}

fn key(url: &str) -> String {
    canonicalize(url).map(|u| u.to_string()).unwrap_or_else(|_| url.trim().to_string())
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            markers: DEFAULT_INTERSTITIAL_MARKERS.iter().map(|s| s.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Serve `html` with status 200 for `url`.
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(key(url), StaticPage::Html(html.into()));
        self
    }

    /// Serve an arbitrary outcome for `url`.
    pub fn with_outcome(mut self, url: &str, page: StaticPage) -> Self {
        self.pages.insert(key(url), page);
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Default for StaticFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, Error> {
        let key = key(url);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(key.clone());
        }

        match self.pages.get(&key) {
            Some(StaticPage::Html(html)) => match detect_interstitial(html, &self.markers) {
                Some(marker) => Err(Error::blocked(key, marker, html)),
                None => Ok(html.clone()),
            },
            Some(StaticPage::Status(status, body)) => Err(Error::fetch_failed(*status, key, body)),
            Some(StaticPage::Timeout) => Err(Error::FetchTimeout { url: key, timeout_ms: 0 }),
            None => Err(Error::fetch_failed(404, key, "")),
        }
    }
}
