use std::path::PathBuf;

use thiserror::Error;

use crate::mailer::MailError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "Can not load config file {}, please edit your config file: ~/.digestor.json or provide -c your-config.json",
        .path.display()
    )]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Config file {} is not valid, please edit your config file: ~/.digestor.json or provide -c your-config.json",
        .path.display()
    )]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to create HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("mail-template rendering failed")]
    Render(#[from] askama::Error),

    #[error("sending digest failed")]
    Mail(#[from] MailError),
}

/// Failure of a single source; the orchestrator decides whether it is fatal.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed")]
    Http(#[from] reqwest::Error),

    #[error("malformed feed")]
    Feed(#[from] feed_rs::parser::ParseFeedError),

    #[error("failed to render section")]
    Render(#[from] askama::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// `err` followed by each of its sources, joined with `": "`.
pub fn display_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
