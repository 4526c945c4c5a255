use std::collections::HashMap;

use feed_rs::parser;
use reqwest::Client;
use tracing::{error, info, warn};

use crate::config::{FeedConfig, RssConfig};
use crate::error::{display_chain, FetchError};
use crate::sources::{DigestItem, Source};

pub struct RssSource {
    config: RssConfig,
}

impl RssSource {
    pub fn new(config: RssConfig) -> Self {
        Self { config }
    }

    async fn fetch_feed(
        &self,
        client: &Client,
        feed: &FeedConfig,
    ) -> Result<Vec<DigestItem>, FetchError> {
        info!("Fetching feed: {} ({})", feed.name, feed.url);

        let response = client.get(&feed.url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        // feed_rs doesn't parse the RSS <comments> element
        let comments_map = if feed.has_discussion {
            Self::comments_by_link(&bytes)
        } else {
            HashMap::new()
        };

        let parsed = parser::parse(&bytes[..])?;

        let mut items = Vec::new();
        for entry in parsed.entries {
            if items.len() >= self.config.max_items_per_feed {
                break;
            }

            let title = entry
                .title
                .as_ref()
                .map(|t| t.content.trim().to_string())
                .unwrap_or_else(|| "Untitled".to_string());

            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();

            if link.is_empty() {
                warn!("Skipping entry with no link: {}", title);
                continue;
            }

            let mut item = DigestItem::new(title, link.as_str()).with_detail(feed.name.as_str());
            if feed.has_discussion {
                if let Some(discussion) =
                    Self::discussion_link(&entry, comments_map.get(&link))
                {
                    item = item.with_discussion(discussion);
                }
            }
            items.push(item);
        }

        info!("Collected {} items from feed '{}'", items.len(), feed.name);
        Ok(items)
    }

    /// Map each item's `<link>` to its `<comments>` URL, both decoded the
    /// way feed-rs decodes hrefs so lookups by entry link match.
    pub fn comments_by_link(xml_bytes: &[u8]) -> HashMap<String, String> {
        let Ok(xml) = std::str::from_utf8(xml_bytes) else {
            return HashMap::new();
        };

        item_blocks(xml)
            .filter_map(|item| {
                let link = element_text(item, "link")?;
                let comments = element_text(item, "comments")?;
                Some((link, comments))
            })
            .collect()
    }

    /// Raw `<comments>` wins over a `replies`/`comments` link relation.
    pub fn discussion_link(
        entry: &feed_rs::model::Entry,
        comments_from_xml: Option<&String>,
    ) -> Option<String> {
        if let Some(comments_url) = comments_from_xml {
            return Some(comments_url.clone());
        }

        entry
            .links
            .iter()
            .find(|link| {
                let rel = link.rel.as_deref().unwrap_or("").to_lowercase();
                rel == "replies" || rel == "comments"
            })
            .map(|link| link.href.clone())
    }
}

/// Bodies of every `<item>` element, with or without attributes.
fn item_blocks(xml: &str) -> impl Iterator<Item = &str> {
    xml.split("<item").skip(1).filter_map(|rest| {
        let body = after_open_tag(rest)?;
        Some(&body[..body.find("</item>").unwrap_or(body.len())])
    })
}

/// `rest` follows `<name`; returns the text after the opening tag's `>` if
/// the tag really is `name` (not a longer name or a self-closing tag).
fn after_open_tag(rest: &str) -> Option<&str> {
    let close = rest.find('>')?;
    let attrs = &rest[..close];
    if !attrs.is_empty() && !attrs.starts_with(char::is_whitespace) {
        return None;
    }
    if attrs.ends_with('/') {
        return None;
    }
    Some(&rest[close + 1..])
}

/// Decoded text of the first `<tag>` element in `xml`.
fn element_text(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);

    let mut search = xml;
    while let Some(pos) = search.find(&open) {
        let rest = &search[pos + open.len()..];
        if let Some(body) = after_open_tag(rest) {
            let end = body.find(&close)?;
            return Some(decode_text(body[..end].trim()));
        }
        search = rest;
    }
    None
}

/// CDATA content is taken verbatim; everything else has entities resolved.
fn decode_text(raw: &str) -> String {
    if let Some(inner) = raw
        .strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
    {
        return inner.trim().to_string();
    }

    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        decoded.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let entity = tail
            .find(';')
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|ch| (ch, semi)));
        match entity {
            Some((ch, semi)) => {
                decoded.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                decoded.push('&');
                rest = &tail[1..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = match name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => name.strip_prefix('#')?.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

impl Source for RssSource {
    fn name(&self) -> &'static str {
        "RSS"
    }

    /// A failing feed is logged and skipped; the source only fails when
    /// every configured feed failed.
    async fn fetch_items(&self, client: &Client) -> Result<Vec<DigestItem>, FetchError> {
        let mut items = Vec::new();
        let mut first_error = None;
        let mut failed = 0;

        for feed in &self.config.feeds {
            match self.fetch_feed(client, feed).await {
                Ok(feed_items) => items.extend(feed_items),
                Err(e) => {
                    error!("Failed to fetch feed '{}': {}", feed.name, display_chain(&e));
                    failed += 1;
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) if failed == self.config.feeds.len() => Err(e),
            _ => Ok(items),
        }
    }
}
