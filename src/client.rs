//! HTTP layer for the Sanka streaming API.
//!
//! Endpoints return loosely-shaped JSON; responses are handed to
//! [`crate::normalize`] untouched. Transport failures and unparseable bodies
//! are the only errors this layer produces.

use anyhow::anyhow;
use log::{debug, warn};
use rand::{seq::SliceRandom, Rng};
use serde_json::Value;
use url::Url;

use crate::models::{AnimeDetail, ListItem, StreamResult};
use crate::normalize;
use crate::utils::{self, text};

pub const DEFAULT_BASE_URL: &str = "https://www.sankavollerei.com/anime/stream";

/// Recommend mode samples one of the first latest pages.
const RECOMMEND_MAX_PAGE: u16 = 5;

const BODY_EXCERPT_LEN: usize = 200;

pub struct SankaClient {
    base: Url,
}

impl Default for SankaClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL).unwrap()
    }
}

impl SankaClient {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base).map_err(|err| anyhow!("invalid base url {base}: {err}"))?;
        Ok(Self { base })
    }

    /// Latest releases, 1-based page.
    pub async fn latest(&self, page: u16) -> anyhow::Result<Vec<ListItem>> {
        let url = self.endpoint(&["latest", &page.to_string()])?;
        Ok(extract_cards(&self.fetch_json(url).await?))
    }

    /// Most watched titles, unpaginated.
    pub async fn popular(&self) -> anyhow::Result<Vec<ListItem>> {
        let url = self.endpoint(&["popular"])?;
        Ok(extract_cards(&self.fetch_json(url).await?))
    }

    pub async fn search(&self, query: &str) -> anyhow::Result<Vec<ListItem>> {
        let url = self.endpoint(&["search", query])?;
        Ok(extract_cards(&self.fetch_json(url).await?))
    }

    /// A shuffled random page of latest releases.
    pub async fn recommend(&self) -> anyhow::Result<Vec<ListItem>> {
        let page = rand::thread_rng().gen_range(1..=RECOMMEND_MAX_PAGE);
        let mut items = self.latest(page).await?;
        items.shuffle(&mut rand::thread_rng());
        Ok(items)
    }

    pub async fn anime(&self, slug: &str) -> anyhow::Result<AnimeDetail> {
        let url = self.endpoint(&["anime", slug])?;
        Ok(normalize::extract_detail(&self.fetch_json(url).await?))
    }

    pub async fn episode(&self, slug: &str) -> anyhow::Result<StreamResult> {
        let url = self.endpoint(&["episode", slug])?;
        let result = normalize::resolve_stream_url(&self.fetch_json(url).await?);

        if result.url().is_none() {
            warn!("no stream url found in episode payload (slug: {slug})");
        }

        Ok(result)
    }

    /// Joins path segments onto the base URL, percent-encoding each segment
    /// (search queries arrive unencoded).
    fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("base url cannot carry path segments"))?
            .extend(segments);
        Ok(url)
    }

    async fn fetch_json(&self, url: Url) -> anyhow::Result<Value> {
        debug!("GET {url}");

        let response = utils::create_json_client().get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("{url}: server responded with {status}"));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| {
            anyhow!(
                "{url}: malformed response ({err}): {}",
                text::truncate(&body, BODY_EXCERPT_LEN)
            )
        })
    }
}

fn extract_cards(payload: &Value) -> Vec<ListItem> {
    normalize::extract_list(payload)
        .iter()
        .map(normalize::extract_card)
        .collect()
}
