//! Client and response-normalization layer for the Sanka anime-streaming
//! JSON API.
//!
//! The API's payload shapes are not contractually fixed, so the heart of the
//! crate is [`normalize`]: total functions that project arbitrary JSON onto
//! the typed records in [`models`] via ordered candidate-key tables.
//! [`client::SankaClient`] covers the HTTP endpoints and
//! [`session::BrowseSession`] the paging state of a list view.

pub mod client;
pub mod models;
pub mod normalize;
pub mod session;
mod utils;

pub use client::SankaClient;
pub use models::{AnimeDetail, EpisodeRef, ListItem, StreamResult, WatchTarget};
pub use session::{BrowseMode, BrowseSession, PageRequest};
