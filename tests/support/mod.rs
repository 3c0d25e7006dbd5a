//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use std::path::Path;
use std::sync::Arc;

use archiver_core::{
    ArchiverConfig, HttpClient, ListingClient, Materializer, NamingScheme, OutputLayout,
};
use serde_json::{Value, json};

/// Naming scheme with only the components given enabled.
pub fn scheme(show_date: bool, show_title: bool) -> NamingScheme {
    NamingScheme {
        show_date,
        show_score: false,
        show_subreddit: false,
        show_author: false,
        show_title,
    }
}

/// Config that names files by title only.
pub fn title_only_config() -> ArchiverConfig {
    ArchiverConfig {
        file_naming_scheme: scheme(false, true),
        ..ArchiverConfig::default()
    }
}

/// Materializer whose listing and downloads point at `base_url`.
pub fn materializer(config: ArchiverConfig, base_url: &str, out: &Path) -> Materializer {
    let layout = OutputLayout::new(out, config.separate_clean_nsfw);
    Materializer::new(
        Arc::new(config),
        layout,
        ListingClient::with_base_url(base_url).unwrap(),
        HttpClient::new().unwrap(),
    )
}

/// Wraps post objects in a listing envelope.
pub fn listing(posts: Vec<Value>, after: Option<&str>) -> Value {
    let children: Vec<Value> = posts
        .into_iter()
        .map(|data| json!({"kind": "t3", "data": data}))
        .collect();
    json!({"kind": "Listing", "data": {"after": after, "children": children}})
}

/// A self post named `t3_<id>` titled `title`.
pub fn self_post(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "name": format!("t3_{id}"),
        "title": title,
        "subreddit": "rust",
        "author": "ferris",
        "is_self": true,
        "selftext": format!("body of {title}"),
        "created_utc": 1_704_153_600.0
    })
}
