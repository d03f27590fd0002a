use serde::Serialize;

/// How a list item can be opened for watching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WatchTarget {
    /// A ready-to-open watch/stream URL found directly on the item.
    Direct(String),
    /// An identifier for a follow-up detail request.
    Slug(String),
    /// Neither present; the item is not actionable.
    None,
}

impl WatchTarget {
    pub fn is_none(&self) -> bool {
        matches!(self, WatchTarget::None)
    }
}

/// One entry of a list view (latest/popular/search results).
///
/// `episode_label` and `tag` are empty when the payload carries nothing
/// usable; `cover` and `title` always hold a renderable fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub cover: String,
    pub title: String,
    pub episode_label: String,
    pub tag: String,
    pub watch_target: WatchTarget,
}

/// Normalized detail view of a single anime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimeDetail {
    pub cover: String,
    pub title: String,
    pub synopsis: String,
    pub genres: Vec<String>,
    pub episodes: Vec<EpisodeRef>,
}

/// One episode reference inside [`AnimeDetail`], in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeRef {
    pub number: u32,
    pub slug: String,
}

/// Outcome of resolving an episode payload to a playable URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StreamResult {
    Found(String),
    NotFound,
}

impl StreamResult {
    pub fn url(&self) -> Option<&str> {
        match self {
            StreamResult::Found(url) => Some(url),
            StreamResult::NotFound => None,
        }
    }
}
