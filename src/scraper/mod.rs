//! Web scraper for podcast episode pages.
//!
//! The episode directory yields episode numbers, titles, and page URLs.
//! Each episode page carries the transcript as plain paragraphs inside a
//! `sqs-html-content` block headed "Read the Transcript", plus a
//! `datePublished` meta tag. A page without that meta tag is treated as a
//! failed fetch even when a transcript block parsed, so an episode never
//! ends up stored with a transcript but no date.

use crate::config::ScraperSettings;
use crate::error::{Result, SvarError};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// A directory entry for one episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRef {
    pub episode_number: i64,
    pub title: String,
    pub url: String,
}

/// The scrapeable content of one episode page.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodePage {
    /// Transcript paragraphs in page order; empty paragraphs are dropped.
    pub transcript: Vec<String>,
    /// Publication date exactly as the page declares it (ISO-8601 text).
    pub published_date: String,
}

/// Scraper for the podcast site.
pub struct PodcastScraper {
    client: reqwest::Client,
    base: Url,
    episode_link_regex: Regex,
}

impl PodcastScraper {
    /// Create a new scraper from settings.
    pub fn new(settings: &ScraperSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        let base = Url::parse(&settings.base_url)
            .map_err(|e| SvarError::Scrape(format!("Invalid base URL '{}': {}", settings.base_url, e)))?;

        // Only links that end in a bare episode number count as episodes;
        // crypto and other special pages use different URL shapes.
        let episode_link_regex = Regex::new(r"/podcast/(\d+)$").expect("Invalid regex");

        Ok(Self {
            client,
            base,
            episode_link_regex,
        })
    }

    /// Fetch and parse the episode directory.
    ///
    /// Returns episodes in ascending episode-number order, deduplicated.
    #[instrument(skip(self))]
    pub async fn fetch_episode_list(&self) -> Result<Vec<EpisodeRef>> {
        let url = format!("{}/podcast-directory", self.base.as_str().trim_end_matches('/'));
        let html = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let episodes = self.parse_directory(&html);
        info!("Found {} episodes", episodes.len());
        Ok(episodes)
    }

    /// Fetch one episode page and extract its transcript and date.
    ///
    /// Returns Ok(None) when the page is missing its publication date,
    /// which callers treat the same as a failed fetch.
    #[instrument(skip(self))]
    pub async fn fetch_episode_page(&self, url: &str) -> Result<Option<EpisodePage>> {
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let page = Self::parse_episode_page(&html);
        if page.is_none() {
            warn!("No published date meta tag found for {}", url);
        }
        Ok(page)
    }

    fn parse_directory(&self, html: &str) -> Vec<EpisodeRef> {
        let document = Html::parse_document(html);
        let anchor = Selector::parse("a[href]").expect("anchor selector");

        let mut episodes: BTreeMap<i64, EpisodeRef> = BTreeMap::new();

        for link in document.select(&anchor) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Some(caps) = self.episode_link_regex.captures(href) else {
                continue;
            };
            let Ok(episode_number) = caps[1].parse::<i64>() else {
                continue;
            };
            let Ok(url) = self.base.join(href) else {
                debug!("Skipping unjoinable episode link: {}", href);
                continue;
            };

            episodes.entry(episode_number).or_insert_with(|| EpisodeRef {
                episode_number,
                title: element_text(link),
                url: url.to_string(),
            });
        }

        episodes.into_values().collect()
    }

    fn parse_episode_page(html: &str) -> Option<EpisodePage> {
        let document = Html::parse_document(html);
        let content_div = Selector::parse("div.sqs-html-content").expect("content selector");
        let heading = Selector::parse("h2").expect("heading selector");
        let paragraph = Selector::parse("p").expect("paragraph selector");
        let date_meta = Selector::parse(r#"meta[itemprop="datePublished"]"#).expect("meta selector");

        let mut transcript = Vec::new();

        for div in document.select(&content_div) {
            let Some(h2) = div.select(&heading).next() else {
                continue;
            };
            if !element_text(h2).to_lowercase().contains("read the transcript") {
                continue;
            }

            for p in div.select(&paragraph) {
                let text = element_text(p);
                if !text.is_empty() {
                    transcript.push(text);
                }
            }
            break;
        }

        let published_date = document
            .select(&date_meta)
            .next()
            .and_then(|meta| meta.value().attr("content"))?
            .to_string();

        Some(EpisodePage {
            transcript,
            published_date,
        })
    }
}

/// Collect an element's text nodes, trimmed and joined by single spaces.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> PodcastScraper {
        PodcastScraper::new(&ScraperSettings::default()).unwrap()
    }

    const DIRECTORY_HTML: &str = r#"
        <html><body>
            <a href="/podcast/10">Episode 10: Markets</a>
            <a href="/podcast/3">Episode 3: <em>Bonds</em></a>
            <a href="/podcast/3">Episode 3 duplicate link</a>
            <a href="/podcast/12/bonus">Bonus page</a>
            <a href="/about">About</a>
            <a href="https://rationalreminder.ca/podcast/25">Episode 25</a>
        </body></html>
    "#;

    #[test]
    fn test_parse_directory_sorted_and_deduplicated() {
        let episodes = scraper().parse_directory(DIRECTORY_HTML);

        let numbers: Vec<i64> = episodes.iter().map(|e| e.episode_number).collect();
        assert_eq!(numbers, vec![3, 10, 25]);

        assert_eq!(episodes[0].title, "Episode 3: Bonds");
        assert_eq!(episodes[0].url, "https://rationalreminder.ca/podcast/3");
        assert_eq!(episodes[2].url, "https://rationalreminder.ca/podcast/25");
    }

    #[test]
    fn test_parse_directory_ignores_non_episode_links() {
        let episodes = scraper().parse_directory(
            r#"<a href="/podcast/7/transcript">Not an episode</a><a href="/blog/5">Post</a>"#,
        );
        assert!(episodes.is_empty());
    }

    const EPISODE_HTML: &str = r#"
        <html><head>
            <meta itemprop="datePublished" content="2023-11-02">
        </head><body>
            <div class="sqs-html-content">
                <h2>Show Notes</h2>
                <p>Links mentioned in this episode.</p>
            </div>
            <div class="sqs-html-content">
                <h2>Read The Transcript:</h2>
                <p>Welcome to the show.</p>
                <p></p>
                <p>Today we discuss <strong>index funds</strong> at length.</p>
            </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_episode_page_extracts_transcript_and_date() {
        let page = PodcastScraper::parse_episode_page(EPISODE_HTML).unwrap();

        assert_eq!(page.published_date, "2023-11-02");
        assert_eq!(
            page.transcript,
            vec![
                "Welcome to the show.".to_string(),
                "Today we discuss index funds at length.".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_date_fails_whole_page() {
        let html = r#"
            <div class="sqs-html-content">
                <h2>Read the transcript</h2>
                <p>Content that parses fine.</p>
            </div>
        "#;
        assert!(PodcastScraper::parse_episode_page(html).is_none());
    }

    #[test]
    fn test_page_without_transcript_block_still_returns_date() {
        let html = r#"
            <meta itemprop="datePublished" content="2024-01-15">
            <div class="sqs-html-content">
                <h2>Show Notes</h2>
                <p>No transcript here.</p>
            </div>
        "#;
        let page = PodcastScraper::parse_episode_page(html).unwrap();
        assert!(page.transcript.is_empty());
        assert_eq!(page.published_date, "2024-01-15");
    }
}
