use std::path::Path;

use lettre::AsyncTransport;
use reqwest::Client;
use tracing::{error, info};

use crate::config::{Config, MailConfig};
use crate::error::{display_chain, Error};
use crate::mailer::{self, MailError};
use crate::render::{render_digest, unavailable_section, Sections};
use crate::sources::{
    http_client, GithubSource, HackerNewsSource, RssSource, Source, TwitterSource,
};

pub struct Digestor {
    config: Config,
    client: Client,
}

impl Digestor {
    pub fn new(config: Config) -> Result<Self, Error> {
        let client = http_client().map_err(Error::HttpClient)?;
        Ok(Self { config, client })
    }

    /// Fetch all four sources concurrently. A failing source is logged and
    /// its section is marked unavailable.
    pub async fn collect(&self) -> Sections {
        let twitter_source = TwitterSource::new(self.config.twitter.clone());
        let github_source = GithubSource::new(self.config.github.clone());
        let rss_source = RssSource::new(self.config.rss.clone());
        let hacker_news_source = HackerNewsSource::new(self.config.hackernews.clone());

        let (tweets, github, rss, hacker_news) = tokio::join!(
            section(&twitter_source, &self.client),
            section(&github_source, &self.client),
            section(&rss_source, &self.client),
            section(&hacker_news_source, &self.client),
        );

        Sections {
            tweets,
            github,
            rss,
            hacker_news,
        }
    }

    pub async fn compose(&self, today: &str) -> Result<String, Error> {
        let sections = self.collect().await;
        Ok(render_digest(today, &sections)?)
    }

    pub async fn run<T>(&self, transport: &T, today: &str) -> Result<(), Error>
    where
        T: AsyncTransport + Sync,
        T::Error: std::error::Error + Send + Sync + 'static,
    {
        let html = self.compose(today).await?;
        let message = mailer::compose(&self.config.mail, today, html)?;
        mailer::deliver(transport, message).await?;
        Ok(())
    }
}

async fn section<S: Source>(source: &S, client: &Client) -> String {
    match source.markup(client).await {
        Ok(markup) => markup,
        Err(e) => {
            error!("Failed to fetch {}: {}", source.name(), display_chain(&e));
            unavailable_section(source.name())
        }
    }
}

/// Load the configuration and run once over SMTP.
pub async fn run_from_file(path: &Path, today: &str) -> Result<(), Error> {
    run_with(path, today, mailer::smtp_transport).await
}

/// Load the configuration, then build the transport with `connect` and run.
/// Nothing touches the network until the configuration has loaded.
pub async fn run_with<T, F>(path: &Path, today: &str, connect: F) -> Result<(), Error>
where
    F: FnOnce(&MailConfig) -> Result<T, MailError>,
    T: AsyncTransport + Sync,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    let config = Config::load(path)?;
    info!("Loaded configuration from {}", path.display());

    let transport = connect(&config.mail)?;
    Digestor::new(config)?.run(&transport, today).await
}
