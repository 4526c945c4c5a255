use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::config::TwitterConfig;
use crate::error::FetchError;
use crate::sources::{DigestItem, Source};

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<Tweet>,
    #[serde(default)]
    pub includes: Includes,
}

#[derive(Debug, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub author_id: Option<String>,
    #[serde(default)]
    pub public_metrics: Metrics,
}

#[derive(Debug, Default, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub like_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

pub struct TwitterSource {
    config: TwitterConfig,
}

impl TwitterSource {
    pub fn new(config: TwitterConfig) -> Self {
        Self { config }
    }

    pub fn search_query(&self) -> String {
        let from = self
            .config
            .users
            .iter()
            .map(|user| format!("from:{}", user.trim_start_matches('@')))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!("({}) -is:retweet", from)
    }

    /// Recent search only accepts 10..=100 results per page.
    fn max_results(&self) -> u32 {
        self.config.max_results.clamp(10, 100)
    }

    /// Most liked first; tweets below `min_likes` are dropped.
    pub fn to_items(&self, response: SearchResponse) -> Vec<DigestItem> {
        let usernames: HashMap<&str, &str> = response
            .includes
            .users
            .iter()
            .map(|user| (user.id.as_str(), user.username.as_str()))
            .collect();

        let mut tweets: Vec<&Tweet> = response
            .data
            .iter()
            .filter(|tweet| tweet.public_metrics.like_count >= self.config.min_likes)
            .collect();
        tweets.sort_by(|a, b| b.public_metrics.like_count.cmp(&a.public_metrics.like_count));

        tweets
            .into_iter()
            .map(|tweet| {
                let username = tweet
                    .author_id
                    .as_deref()
                    .and_then(|id| usernames.get(id).copied())
                    .unwrap_or("i");
                let link = format!("https://twitter.com/{}/status/{}", username, tweet.id);
                DigestItem::new(tweet.text.trim(), link).with_detail(format!(
                    "@{} · {} likes",
                    username, tweet.public_metrics.like_count
                ))
            })
            .collect()
    }
}

impl Source for TwitterSource {
    fn name(&self) -> &'static str {
        "Twitter"
    }

    async fn fetch_items(&self, client: &Client) -> Result<Vec<DigestItem>, FetchError> {
        if self.config.bearer_token.is_empty() || self.config.users.is_empty() {
            info!("Twitter not configured, skipping");
            return Ok(Vec::new());
        }

        let query = self.search_query();
        let max_results = self.max_results().to_string();
        info!("Searching recent tweets: {}", query);

        let response: SearchResponse = client
            .get(format!(
                "{}/2/tweets/search/recent",
                self.config.api_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.config.bearer_token)
            .query(&[
                ("query", query.as_str()),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "public_metrics,author_id"),
                ("expansions", "author_id"),
                ("user.fields", "username"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let items = self.to_items(response);
        info!("Collected {} tweets", items.len());
        Ok(items)
    }
}
