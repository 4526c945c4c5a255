//! Digestor - a daily content digest mailer
//!
//! This crate collects tweets, trending GitHub repositories, RSS feed items
//! and Hacker News stories, renders them into a single HTML digest and
//! sends it by email.

pub mod config;
pub mod error;
pub mod mailer;
pub mod pipeline;
pub mod render;
pub mod sources;

pub use config::Config;
pub use error::{Error, FetchError};
pub use pipeline::Digestor;
