use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::HackerNewsConfig;
use crate::error::FetchError;
use crate::sources::{DigestItem, Source};

const DISCUSSION_URL: &str = "https://news.ycombinator.com/item?id=";

#[derive(Debug, Deserialize)]
pub struct Story {
    pub id: u64,
    pub title: Option<String>,
    pub url: Option<String>,
    pub score: Option<u32>,
    pub by: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

pub struct HackerNewsSource {
    config: HackerNewsConfig,
}

impl HackerNewsSource {
    pub fn new(config: HackerNewsConfig) -> Self {
        Self { config }
    }

    fn matches_keywords(&self, title: &str) -> bool {
        if self.config.keywords.is_empty() {
            return true;
        }
        let title = title.to_lowercase();
        self.config
            .keywords
            .iter()
            .any(|keyword| title.contains(&keyword.to_lowercase()))
    }

    fn is_wanted(&self, story: &Story) -> bool {
        if story.deleted || story.dead {
            return false;
        }
        let Some(title) = story.title.as_deref() else {
            return false;
        };
        story.score.unwrap_or(0) >= self.config.min_score && self.matches_keywords(title)
    }

    /// Ask HN and other text posts have no `url`; their link is the discussion itself.
    pub fn to_item(story: &Story) -> DigestItem {
        let discussion = format!("{}{}", DISCUSSION_URL, story.id);
        let title = story.title.clone().unwrap_or_else(|| "Untitled".to_string());
        let detail = format!(
            "{} points by {}",
            story.score.unwrap_or(0),
            story.by.as_deref().unwrap_or("unknown")
        );

        match story.url.as_deref() {
            Some(url) if !url.is_empty() => DigestItem::new(title, url)
                .with_detail(detail)
                .with_discussion(discussion),
            _ => DigestItem::new(title, discussion).with_detail(detail),
        }
    }
}

impl Source for HackerNewsSource {
    fn name(&self) -> &'static str {
        "Hacker News"
    }

    async fn fetch_items(&self, client: &Client) -> Result<Vec<DigestItem>, FetchError> {
        let base = self.config.api_url.trim_end_matches('/');
        info!("Fetching Hacker News top stories");

        let ids: Vec<u64> = client
            .get(format!("{}/v0/topstories.json", base))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut items = Vec::new();
        for id in ids.into_iter().take(self.config.scan_limit) {
            if items.len() >= self.config.max_items {
                break;
            }

            // deleted ids come back as `null`
            let story: Option<Story> = client
                .get(format!("{}/v0/item/{}.json", base, id))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            match story {
                Some(story) if self.is_wanted(&story) => items.push(Self::to_item(&story)),
                _ => debug!("Skipping Hacker News item {}", id),
            }
        }

        info!("Collected {} Hacker News stories", items.len());
        Ok(items)
    }
}
