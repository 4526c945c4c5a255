use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// File name looked up in the home directory when `-c` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".digestor.json";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub mail: MailConfig,
    #[serde(default)]
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub rss: RssConfig,
    #[serde(default)]
    pub hackernews: HackerNewsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub from: String,
    pub to: String,
    pub host: String,
    pub user: String,
    pub password: String,
    /// SMTP submission port
    #[serde(default = "default_smtp_port")]
    pub port: u16,
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TwitterConfig {
    pub bearer_token: String,
    /// Accounts whose recent tweets go into the digest
    pub users: Vec<String>,
    pub max_results: u32,
    pub min_likes: u64,
    pub api_url: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            bearer_token: String::new(),
            users: Vec::new(),
            max_results: 10,
            min_likes: 0,
            api_url: "https://api.twitter.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GithubConfig {
    pub enabled: bool,
    pub language: Option<String>,
    /// Only repositories created within this many days are considered
    pub days: i64,
    pub max_items: u32,
    pub token: Option<String>,
    pub api_url: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: None,
            days: 7,
            max_items: 10,
            token: None,
            api_url: "https://api.github.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RssConfig {
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    #[serde(default = "default_max_items_per_feed")]
    pub max_items_per_feed: usize,
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            feeds: Vec::new(),
            max_items_per_feed: default_max_items_per_feed(),
        }
    }
}

fn default_max_items_per_feed() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub has_discussion: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HackerNewsConfig {
    pub max_items: usize,
    pub min_score: u32,
    /// Case-insensitive title filter; empty keeps every story
    pub keywords: Vec<String>,
    /// How many top story ids are inspected at most
    pub scan_limit: usize,
    pub api_url: String,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            max_items: 10,
            min_score: 0,
            keywords: Vec::new(),
            scan_limit: 30,
            api_url: "https://hacker-news.firebaseio.com".to_string(),
        }
    }
}

/// `$HOME/.digestor.json`, or the bare file name when no home directory is known.
pub fn default_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse config from a JSON string (useful for testing)
    pub fn from_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}
