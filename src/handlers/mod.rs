pub mod auth;
pub mod games;
pub mod studies;

use serde_json::{Map, Value};

/// Keys in `body` that are not in the endpoint's allow-list.
pub(crate) fn unknown_fields(body: &Map<String, Value>, allowed: &[&str]) -> Vec<String> {
    body.keys()
        .filter(|key| !allowed.contains(&key.as_str()))
        .cloned()
        .collect()
}
