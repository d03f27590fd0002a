//! Tolerant projection of the Sanka API's loosely-shaped JSON payloads into
//! the crate's normalized records.
//!
//! The provider does not fix its response shapes, so every logical field is
//! resolved through an ordered table of candidate keys: the first key whose
//! value is present (non-null, and non-empty when a string) wins. All
//! operations here are total; a missing field degrades to a documented
//! default, never to an error.

use serde_json::Value;

use crate::models::{AnimeDetail, EpisodeRef, ListItem, StreamResult, WatchTarget};
use crate::utils::text;

pub const PLACEHOLDER_COVER: &str = "https://via.placeholder.com/300x450?text=No+Image";
pub const UNKNOWN_TITLE: &str = "Unknown title";
pub const NO_SYNOPSIS: &str = "No synopsis available.";

const LIST_WRAPPER_KEYS: &[&str] = &["data", "results", "items", "list", "anime", "animes"];

const COVER_KEYS: &[&str] = &["image", "thumbnail", "thumb", "poster", "cover", "coverImage"];
const TITLE_KEYS: &[&str] = &["title", "name", "judul", "animeTitle", "anime_title"];
const EPISODE_LABEL_KEYS: &[&str] = &["episode", "episodes", "current_episode", "ep", "epNum"];
const TAG_KEYS: &[&str] = &["type", "status", "category", "tag"];

// `link` counts as a direct watch URL, not a slug source. Slug derivation
// from its trailing path segment only kicks in when no URL-like key held a
// usable string.
const WATCH_URL_KEYS: &[&str] = &["watch_url", "stream_url", "url", "link", "episode_url"];
const SLUG_KEYS: &[&str] = &["slug", "animeSlug", "endpoint", "id"];

const SYNOPSIS_KEYS: &[&str] = &["synopsis", "description", "sinopsis", "summary"];
const GENRE_KEYS: &[&str] = &["genres", "genre"];
const EPISODE_LIST_KEYS: &[&str] = &["episodes", "list_episode", "episodeList"];
const EPISODE_NUMBER_KEYS: &[&str] = &["episode", "number", "ep"];
const EPISODE_SLUG_KEYS: &[&str] = &["slug", "slugEpisode", "endpoint"];

const STREAM_SOURCES_KEYS: &[&str] = &["sources", "streaming", "stream", "players", "download"];
const SOURCE_URL_KEYS: &[&str] = &["url", "file", "link"];
const STREAM_FALLBACK_KEYS: &[&str] = &["embed", "stream_url", "url"];

/// Extracts the item array from a list-style payload.
///
/// Precedence: a known wrapper key holding an array, the payload itself when
/// it already is an array, then the first array-valued field in the payload's
/// own key order. An empty result means "no data", not failure.
pub fn extract_list(payload: &Value) -> Vec<Value> {
    if let Some(items) = payload.as_array() {
        return items.clone();
    }

    if let Some(map) = payload.as_object() {
        for key in LIST_WRAPPER_KEYS {
            if let Some(items) = map.get(*key).and_then(Value::as_array) {
                return items.clone();
            }
        }

        for value in map.values() {
            if let Some(items) = value.as_array() {
                return items.clone();
            }
        }
    }

    Vec::new()
}

/// Projects one raw list item onto a flat card record.
pub fn extract_card(item: &Value) -> ListItem {
    ListItem {
        cover: first_scalar(item, COVER_KEYS).unwrap_or_else(|| PLACEHOLDER_COVER.into()),
        title: first_scalar(item, TITLE_KEYS).unwrap_or_else(|| UNKNOWN_TITLE.into()),
        episode_label: first_scalar(item, EPISODE_LABEL_KEYS).unwrap_or_default(),
        tag: first_scalar(item, TAG_KEYS).unwrap_or_default(),
        watch_target: extract_watch_target(item),
    }
}

/// Projects a detail payload onto [`AnimeDetail`], unwrapping one level of
/// `data`/`results` envelope when present.
pub fn extract_detail(payload: &Value) -> AnimeDetail {
    let root = unwrap_envelope(payload, &["data", "results"]);

    AnimeDetail {
        cover: first_scalar(root, COVER_KEYS).unwrap_or_else(|| PLACEHOLDER_COVER.into()),
        title: first_scalar(root, TITLE_KEYS).unwrap_or_else(|| UNKNOWN_TITLE.into()),
        synopsis: first_scalar(root, SYNOPSIS_KEYS).unwrap_or_else(|| NO_SYNOPSIS.into()),
        genres: extract_genres(root),
        episodes: extract_episodes(root),
    }
}

/// Resolves an episode payload to a playable URL.
///
/// Tries the first element of a sources-like collection, then the top-level
/// embed fields. Protocol-relative URLs are upgraded to https.
pub fn resolve_stream_url(payload: &Value) -> StreamResult {
    let root = unwrap_envelope(payload, &["data"]);

    let candidate = stream_source_url(root).or_else(|| first_scalar(root, STREAM_FALLBACK_KEYS));

    match candidate {
        Some(url) => StreamResult::Found(text::to_full_url(&url)),
        None => StreamResult::NotFound,
    }
}

fn extract_watch_target(item: &Value) -> WatchTarget {
    if let Some(url) = first_scalar(item, WATCH_URL_KEYS) {
        return WatchTarget::Direct(url);
    }

    if let Some(slug) = first_scalar(item, SLUG_KEYS) {
        return WatchTarget::Slug(slug);
    }

    if let Some(link) = item.get("link").and_then(Value::as_str) {
        if let Some(slug) = text::last_path_segment(link) {
            return WatchTarget::Slug(slug.into());
        }
    }

    WatchTarget::None
}

fn extract_genres(root: &Value) -> Vec<String> {
    match first_present(root, GENRE_KEYS) {
        Some(Value::Array(items)) => items.iter().filter_map(genre_name).collect(),
        // A scalar genre field becomes a single-element list.
        Some(other) => as_scalar_string(other).map(|genre| vec![genre]).unwrap_or_default(),
        None => Vec::new(),
    }
}

fn genre_name(item: &Value) -> Option<String> {
    match item {
        Value::Object(map) => map.get("name").and_then(as_scalar_string),
        other => as_scalar_string(other),
    }
}

fn extract_episodes(root: &Value) -> Vec<EpisodeRef> {
    let items = match first_present(root, EPISODE_LIST_KEYS).and_then(Value::as_array) {
        Some(items) => items,
        None => return Vec::new(),
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, episode)| EpisodeRef {
            number: episode_number(episode).unwrap_or(idx as u32 + 1),
            slug: episode_slug(episode).unwrap_or_default(),
        })
        .collect()
}

fn episode_number(episode: &Value) -> Option<u32> {
    match first_present(episode, EPISODE_NUMBER_KEYS)? {
        Value::Number(num) => num.as_u64().and_then(|num| u32::try_from(num).ok()),
        Value::String(label) => text::extract_digits(label),
        _ => None,
    }
}

fn episode_slug(episode: &Value) -> Option<String> {
    first_scalar(episode, EPISODE_SLUG_KEYS).or_else(|| {
        episode
            .get("url")
            .and_then(Value::as_str)
            .and_then(text::last_path_segment)
            .map(String::from)
    })
}

fn stream_source_url(root: &Value) -> Option<String> {
    let sources = first_present(root, STREAM_SOURCES_KEYS)?;

    // A non-array sources field is treated as a one-element collection.
    let first = match sources {
        Value::Array(items) => items.first()?,
        other => other,
    };

    match first {
        Value::Object(_) => first_scalar(first, SOURCE_URL_KEYS),
        other => as_scalar_string(other),
    }
}

/// Steps into the first envelope key holding an object or array, else stays
/// on the payload itself. One level only.
fn unwrap_envelope<'a>(payload: &'a Value, keys: &[&str]) -> &'a Value {
    payload
        .as_object()
        .and_then(|map| {
            keys.iter()
                .filter_map(|key| map.get(*key))
                .find(|value| value.is_object() || value.is_array())
        })
        .unwrap_or(payload)
}

/// The generic candidate-key resolver: first key in table order whose value
/// is present wins, even when that value later proves unusable for the field.
fn first_present<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = value.as_object()?;
    keys.iter().filter_map(|key| map.get(*key)).find(|value| is_present(value))
}

fn first_scalar(value: &Value, keys: &[&str]) -> Option<String> {
    first_present(value, keys).and_then(as_scalar_string)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}

fn as_scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn should_extract_list_from_known_wrapper_keys() {
        let items = json!([{"title": "a"}, {"title": "b"}]);

        for key in ["data", "results", "items", "list", "anime", "animes"] {
            let payload = json!({ key: items.clone() });
            assert_eq!(extract_list(&payload), items.as_array().unwrap().clone(), "key: {key}");
        }
    }

    #[test]
    fn should_prefer_wrapper_keys_in_table_order() {
        let payload = json!({
            "results": [{"title": "second"}],
            "data": [{"title": "first"}],
        });

        assert_eq!(extract_list(&payload), vec![json!({"title": "first"})]);
    }

    #[test]
    fn should_return_top_level_array_unchanged() {
        let payload = json!([{"a": 1}, {"b": 2}, {"c": 3}]);
        assert_eq!(extract_list(&payload), payload.as_array().unwrap().clone());
    }

    #[test]
    fn should_scan_unknown_keys_in_insertion_order() {
        let payload = json!({
            "page": 1,
            "payload": [{"title": "x"}],
            "extra": [{"title": "y"}],
        });

        assert_eq!(extract_list(&payload), vec![json!({"title": "x"})]);
    }

    #[test]
    fn should_return_empty_list_when_no_array_found() {
        assert!(extract_list(&json!({"page": 1, "total": 10})).is_empty());
        assert!(extract_list(&json!("nope")).is_empty());
        assert!(extract_list(&json!(null)).is_empty());
    }

    #[test]
    fn should_skip_wrapper_key_holding_non_array() {
        let payload = json!({
            "data": {"nested": true},
            "results": [{"title": "x"}],
        });

        assert_eq!(extract_list(&payload), vec![json!({"title": "x"})]);
    }

    #[test]
    fn should_extract_card_with_explicit_fields() {
        let card = extract_card(&json!({
            "title": "X",
            "poster": "https://img/x.jpg",
            "current_episode": 12,
            "status": "Ongoing",
            "slug": "x-anime",
        }));

        assert_eq!(card.title, "X");
        assert_eq!(card.cover, "https://img/x.jpg");
        assert_eq!(card.episode_label, "12");
        assert_eq!(card.tag, "Ongoing");
        assert_eq!(card.watch_target, WatchTarget::Slug("x-anime".into()));
    }

    #[test]
    fn should_fall_back_to_defaults_on_empty_item() {
        let card = extract_card(&json!({}));

        assert_eq!(card.title, UNKNOWN_TITLE);
        assert_eq!(card.cover, PLACEHOLDER_COVER);
        assert_eq!(card.episode_label, "");
        assert_eq!(card.tag, "");
        assert!(card.watch_target.is_none());
    }

    #[test]
    fn should_ignore_null_and_empty_candidates() {
        let card = extract_card(&json!({
            "image": null,
            "thumbnail": "",
            "thumb": "https://img/t.jpg",
            "title": "",
            "name": "Y",
        }));

        assert_eq!(card.cover, "https://img/t.jpg");
        assert_eq!(card.title, "Y");
    }

    #[test]
    fn should_treat_link_as_direct_watch_url() {
        let card = extract_card(&json!({"link": "https://x/y/abc123"}));
        assert_eq!(card.watch_target, WatchTarget::Direct("https://x/y/abc123".into()));
    }

    #[test]
    fn should_prefer_watch_url_over_slug() {
        let card = extract_card(&json!({
            "watch_url": "https://x/watch/1",
            "slug": "x-anime",
        }));

        assert_eq!(card.watch_target, WatchTarget::Direct("https://x/watch/1".into()));
    }

    #[test]
    fn should_derive_slug_from_link_when_urls_unusable() {
        // The URL chain resolves to the unusable watch_url object, no slug
        // keys exist: the link string still donates its trailing segment.
        let card = extract_card(&json!({
            "watch_url": {"nested": true},
            "link": "https://x/y/abc123",
        }));
        assert_eq!(card.watch_target, WatchTarget::Slug("abc123".into()));

        let card = extract_card(&json!({"id": 42}));
        assert_eq!(card.watch_target, WatchTarget::Slug("42".into()));
    }

    #[test]
    fn should_extract_detail_from_wrapped_payload() {
        let detail = extract_detail(&json!({
            "data": {
                "title": "Z",
                "cover": "https://img/z.jpg",
                "synopsis": "A story.",
                "genres": [{"name": "Action"}, "Drama"],
                "episodes": [
                    {"episode": 1, "slug": "z-ep-1"},
                    {"episode": 2, "url": "https://x/episode/z-ep-2/"},
                ],
            },
        }));

        assert_eq!(detail.title, "Z");
        assert_eq!(detail.cover, "https://img/z.jpg");
        assert_eq!(detail.synopsis, "A story.");
        assert_eq!(detail.genres, vec!["Action".to_owned(), "Drama".to_owned()]);
        assert_eq!(
            detail.episodes,
            vec![
                EpisodeRef { number: 1, slug: "z-ep-1".into() },
                EpisodeRef { number: 2, slug: "z-ep-2".into() },
            ]
        );
    }

    #[test]
    fn should_number_episodes_by_position_when_unnumbered() {
        let detail = extract_detail(&json!({"data": {"episodes": [{}, {}]}}));

        let numbers: Vec<_> = detail.episodes.iter().map(|ep| ep.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn should_parse_numeric_like_episode_labels() {
        let detail = extract_detail(&json!({
            "episodeList": [
                {"episode": "Episode 12"},
                {"ep": "finale"},
            ],
        }));

        assert_eq!(detail.episodes[0].number, 12);
        // No digits anywhere: 1-based position fallback.
        assert_eq!(detail.episodes[1].number, 2);
    }

    #[test]
    fn should_fall_back_to_position_on_oversized_episode_numbers() {
        let detail = extract_detail(&json!({
            "episodes": [
                {"episode": "99999999999"},
                {"episode": 99999999999u64},
                {"episode": -3},
            ],
        }));

        let numbers: Vec<_> = detail.episodes.iter().map(|ep| ep.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn should_accept_scalar_genre_field() {
        let detail = extract_detail(&json!({"genre": "Action"}));
        assert_eq!(detail.genres, vec!["Action".to_owned()]);
    }

    #[test]
    fn should_default_detail_fields() {
        let detail = extract_detail(&json!({}));

        assert_eq!(detail.title, UNKNOWN_TITLE);
        assert_eq!(detail.cover, PLACEHOLDER_COVER);
        assert_eq!(detail.synopsis, NO_SYNOPSIS);
        assert!(detail.genres.is_empty());
        assert!(detail.episodes.is_empty());
    }

    #[test]
    fn should_resolve_stream_url_from_sources() {
        let res = resolve_stream_url(&json!({
            "data": {"sources": [{"url": "//cdn.example/v.mp4"}]},
        }));

        assert_eq!(res, StreamResult::Found("https://cdn.example/v.mp4".into()));
    }

    #[test]
    fn should_resolve_stream_url_from_single_object_sources() {
        let res = resolve_stream_url(&json!({
            "streaming": {"file": "https://cdn.example/v.m3u8"},
        }));

        assert_eq!(res, StreamResult::Found("https://cdn.example/v.m3u8".into()));
    }

    #[test]
    fn should_resolve_stream_url_from_string_source() {
        let res = resolve_stream_url(&json!({
            "data": {"stream": "https://cdn.example/raw.mp4"},
        }));

        assert_eq!(res, StreamResult::Found("https://cdn.example/raw.mp4".into()));
    }

    #[test]
    fn should_fall_back_to_embed_fields() {
        let res = resolve_stream_url(&json!({
            "data": {"embed": "//player.example/e/42"},
        }));

        assert_eq!(res, StreamResult::Found("https://player.example/e/42".into()));
    }

    #[test]
    fn should_report_not_found_on_empty_payload() {
        assert_eq!(resolve_stream_url(&json!({"data": {}})), StreamResult::NotFound);
        assert_eq!(resolve_stream_url(&json!({})), StreamResult::NotFound);
        assert_eq!(resolve_stream_url(&json!(null)), StreamResult::NotFound);
    }

    #[test]
    fn should_normalize_idempotently() {
        let payload = json!({
            "data": [
                {"title": "a", "slug": "a-1"},
                {"judul": "b", "link": "https://x/b"},
            ],
        });

        let first: Vec<_> = extract_list(&payload).iter().map(extract_card).collect();
        let second: Vec<_> = extract_list(&payload).iter().map(extract_card).collect();
        assert_eq!(first, second);
    }
}
