use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::config::GithubConfig;
use crate::error::FetchError;
use crate::sources::{DigestItem, Source};

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<Repository>,
}

#[derive(Debug, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
}

/// Trending approximation: most starred repositories created recently.
pub struct GithubSource {
    config: GithubConfig,
}

impl GithubSource {
    pub fn new(config: GithubConfig) -> Self {
        Self { config }
    }

    /// First day of the window, or an error when `days` does not fit a date.
    pub fn since(&self, now: DateTime<Utc>) -> Result<NaiveDate, FetchError> {
        TimeDelta::try_days(self.config.days)
            .and_then(|window| now.checked_sub_signed(window))
            .map(|start| start.date_naive())
            .ok_or_else(|| {
                FetchError::InvalidConfig(format!(
                    "github.days = {} is out of range",
                    self.config.days
                ))
            })
    }

    pub fn search_query(&self, since: NaiveDate) -> String {
        let mut query = format!("created:>{}", since.format("%Y-%m-%d"));
        if let Some(language) = self.config.language.as_deref().filter(|l| !l.is_empty()) {
            query.push_str(" language:");
            query.push_str(language);
        }
        query
    }

    pub fn to_item(repo: &Repository) -> DigestItem {
        let detail = match repo.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => {
                format!("{} ★ {}", description, repo.stargazers_count)
            }
            _ => format!("★ {}", repo.stargazers_count),
        };
        DigestItem::new(repo.full_name.as_str(), repo.html_url.as_str()).with_detail(detail)
    }
}

impl Source for GithubSource {
    fn name(&self) -> &'static str {
        "GitHub"
    }

    async fn fetch_items(&self, client: &Client) -> Result<Vec<DigestItem>, FetchError> {
        if !self.config.enabled {
            return Ok(Vec::new());
        }

        let since = self.since(Utc::now())?;
        let query = self.search_query(since);
        info!("Searching GitHub repositories: {}", query);

        let per_page = self.config.max_items.to_string();
        let mut request = client
            .get(format!(
                "{}/search/repositories",
                self.config.api_url.trim_end_matches('/')
            ))
            .header("Accept", "application/vnd.github+json")
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ]);
        if let Some(token) = self.config.token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response: SearchResponse = request.send().await?.error_for_status()?.json().await?;

        let items: Vec<DigestItem> = response
            .items
            .iter()
            .take(self.config.max_items as usize)
            .map(Self::to_item)
            .collect();

        info!("Collected {} GitHub repositories", items.len());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(language: Option<&str>) -> GithubSource {
        GithubSource::new(GithubConfig {
            language: language.map(|l| l.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_search_query_without_language() {
        let since = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(source(None).search_query(since), "created:>2020-01-01");
    }

    #[test]
    fn test_search_query_with_language() {
        let since = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(
            source(Some("rust")).search_query(since),
            "created:>2020-01-01 language:rust"
        );
    }

    #[test]
    fn test_empty_language_is_ignored() {
        let since = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
        assert_eq!(source(Some("")).search_query(since), "created:>2021-12-31");
    }

    #[test]
    fn test_repository_item_detail() {
        let repo = Repository {
            full_name: "tokio-rs/tokio".to_string(),
            html_url: "https://github.com/tokio-rs/tokio".to_string(),
            description: Some("A runtime".to_string()),
            stargazers_count: 1200,
        };

        let item = GithubSource::to_item(&repo);
        assert_eq!(item.title, "tokio-rs/tokio");
        assert_eq!(item.detail.as_deref(), Some("A runtime ★ 1200"));
        assert_eq!(item.discussion_link, None);
    }

    #[test]
    fn test_repository_without_description() {
        let repo: Repository = serde_json::from_str(
            r#"{"full_name": "a/b", "html_url": "https://github.com/a/b", "description": null}"#,
        )
        .unwrap();

        let item = GithubSource::to_item(&repo);
        assert_eq!(item.detail.as_deref(), Some("★ 0"));
    }

    #[test]
    fn test_since_counts_back_days() {
        let now = NaiveDate::from_ymd_opt(2020, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();
        let since = source(None).since(now).unwrap();
        assert_eq!(since, NaiveDate::from_ymd_opt(2020, 2, 23).unwrap());
    }

    #[test]
    fn test_since_rejects_huge_window() {
        let source = GithubSource::new(GithubConfig {
            days: 1_000_000_000_000,
            ..Default::default()
        });
        let result = source.since(Utc::now());
        assert!(matches!(result, Err(FetchError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_days_fails_without_request() {
        let source = GithubSource::new(GithubConfig {
            days: 1_000_000_000,
            api_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        });
        let client = crate::sources::http_client().unwrap();

        let err = source.fetch_items(&client).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidConfig(_)));
        assert!(err.to_string().contains("1000000000"));
    }

    #[tokio::test]
    async fn test_disabled_source_makes_no_request() {
        let source = GithubSource::new(GithubConfig {
            enabled: false,
            api_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        });
        let client = crate::sources::http_client().unwrap();

        assert!(source.fetch_items(&client).await.unwrap().is_empty());
    }
}
