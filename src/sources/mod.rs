//! Content sources that feed the digest.
//!
//! Every source turns its slice of the configuration into a list of
//! [`DigestItem`]s; the shared section template turns those into the
//! markup fragment that lands in the digest.

pub mod github;
pub mod hackernews;
pub mod rss;
pub mod twitter;

use std::time::Duration;

use reqwest::Client;

use crate::error::FetchError;
use crate::render::render_section;

pub use github::GithubSource;
pub use hackernews::HackerNewsSource;
pub use rss::RssSource;
pub use twitter::TwitterSource;

/// Upper bound for every outbound HTTP request.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// One entry of a digest section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestItem {
    pub title: String,
    pub link: String,
    /// Snippet, score or author line shown next to the link
    pub detail: Option<String>,
    pub discussion_link: Option<String>,
}

impl DigestItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            detail: None,
            discussion_link: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_discussion(mut self, discussion_link: impl Into<String>) -> Self {
        self.discussion_link = Some(discussion_link.into());
        self
    }
}

#[allow(async_fn_in_trait)]
pub trait Source {
    /// Human readable name used in logs and placeholders.
    fn name(&self) -> &'static str;

    async fn fetch_items(&self, client: &Client) -> Result<Vec<DigestItem>, FetchError>;

    /// Fetch the current items and render them as an HTML fragment.
    async fn markup(&self, client: &Client) -> Result<String, FetchError> {
        let items = self.fetch_items(client).await?;
        Ok(render_section(&items)?)
    }
}

pub fn http_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent("Digestor/1.0 (Daily Digest)")
        .build()
}
