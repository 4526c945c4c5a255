use askama::Template;
use chrono::Local;

use crate::sources::DigestItem;

/// Markup fragments for the four digest slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    pub tweets: String,
    pub github: String,
    pub rss: String,
    pub hacker_news: String,
}

#[derive(Template)]
#[template(path = "digest.html")]
pub struct DigestTemplate<'a> {
    pub today: &'a str,
    pub tweets: &'a str,
    pub github: &'a str,
    pub rss: &'a str,
    pub hacker_news: &'a str,
}

#[derive(Template)]
#[template(path = "section.html")]
pub struct SectionTemplate<'a> {
    pub items: &'a [DigestItem],
}

/// Current local date, e.g. `Jan 2, 2006`.
pub fn today_string() -> String {
    Local::now().format("%b %-d, %Y").to_string()
}

/// Fragments are trusted markup and are inserted without escaping.
pub fn render_digest(today: &str, sections: &Sections) -> askama::Result<String> {
    DigestTemplate {
        today,
        tweets: &sections.tweets,
        github: &sections.github,
        rss: &sections.rss,
        hacker_news: &sections.hacker_news,
    }
    .render()
}

/// An empty item list renders as an empty fragment.
pub fn render_section(items: &[DigestItem]) -> askama::Result<String> {
    if items.is_empty() {
        return Ok(String::new());
    }
    SectionTemplate { items }.render()
}

pub fn unavailable_section(source_name: &str) -> String {
    format!(
        "<p class=\"unavailable\">{} is unavailable today.</p>",
        source_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_sections() -> Sections {
        Sections {
            tweets: "<A/>".to_string(),
            github: "<B/>".to_string(),
            rss: "<C/>".to_string(),
            hacker_news: "<D/>".to_string(),
        }
    }

    mod render_digest_tests {
        use super::*;

        #[test]
        fn test_fragments_are_inserted_verbatim() {
            let html = render_digest("Jan 1, 2020", &fixed_sections()).unwrap();

            assert!(html.contains("Jan 1, 2020"));
            for fragment in ["<A/>", "<B/>", "<C/>", "<D/>"] {
                assert!(html.contains(fragment), "missing {}", fragment);
            }
            assert!(!html.contains("&lt;A/&gt;"));
        }

        #[test]
        fn test_fragments_land_in_their_slots() {
            let html = render_digest("Jan 1, 2020", &fixed_sections()).unwrap();

            let slot = |id: &str, fragment: &str| {
                let start = html.find(&format!("id=\"{}\"", id)).unwrap();
                let end = start + html[start..].find("</div>").unwrap();
                html[start..end].contains(fragment)
            };
            assert!(slot("tweets", "<A/>"));
            assert!(slot("github", "<B/>"));
            assert!(slot("rss", "<C/>"));
            assert!(slot("hackernews", "<D/>"));
        }

        #[test]
        fn test_rendering_is_idempotent() {
            let first = render_digest("Jan 1, 2020", &fixed_sections()).unwrap();
            let second = render_digest("Jan 1, 2020", &fixed_sections()).unwrap();
            assert_eq!(first, second);
        }

        #[test]
        fn test_empty_sections_keep_their_headings() {
            let html = render_digest("Jan 1, 2020", &Sections::default()).unwrap();

            assert!(html.contains("<h2>Tweets</h2>"));
            assert!(html.contains("<h2>GitHub Trending</h2>"));
            assert!(html.contains("<h2>RSS</h2>"));
            assert!(html.contains("<h2>Hacker News</h2>"));
            assert!(html.contains("id=\"hackernews\""));
        }

        #[test]
        fn test_date_is_escaped() {
            let html = render_digest("<b>", &Sections::default()).unwrap();
            assert!(html.contains("&lt;b&gt;"));
        }
    }

    mod render_section_tests {
        use super::*;

        #[test]
        fn test_empty_items_render_nothing() {
            assert_eq!(render_section(&[]).unwrap(), "");
        }

        #[test]
        fn test_items_render_as_list() {
            let items = vec![
                DigestItem::new("First", "https://one.example.com").with_detail("12 points"),
                DigestItem::new("Second", "https://two.example.com")
                    .with_discussion("https://news.example.com/2"),
            ];

            let html = render_section(&items).unwrap();
            assert!(html.starts_with("<ul>"));
            assert_eq!(html.matches("<li>").count(), 2);
            assert!(html.contains(">First</a>"));
            assert!(html.contains("<small>12 points</small>"));
            assert!(html.contains(">discuss</a>"));
        }

        #[test]
        fn test_item_text_is_escaped() {
            let items = vec![DigestItem::new("<script>x</script>", "https://x.example.com")];

            let html = render_section(&items).unwrap();
            assert!(!html.contains("<script>"));
            assert!(html.contains("&lt;script&gt;"));
        }
    }

    #[test]
    fn test_unavailable_section_names_source() {
        assert_eq!(
            unavailable_section("RSS"),
            "<p class=\"unavailable\">RSS is unavailable today.</p>"
        );
    }

    #[test]
    fn test_today_string_format() {
        let today = today_string();
        assert!(chrono::NaiveDate::parse_from_str(&today, "%b %d, %Y").is_ok());
    }
}
