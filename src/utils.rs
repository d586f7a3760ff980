use std::collections::HashSet;

use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::http::Params;

/// Maximum number of ids accepted by the several-tracks / several-artists endpoints.
pub const MAX_BATCH_SIZE: usize = 50;

/// Maximum number of URIs accepted by one playlist-track addition.
pub const MAX_PLAYLIST_ADD_SIZE: usize = 100;

/// Random value sent as OAuth `state` and checked on the callback.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Splits `items` into consecutive chunks of at most `size` elements.
///
/// A `size` of zero is treated as one.
pub fn chunk<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    items
        .chunks(size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Short, fixed-length hash of a parameter map.
///
/// Returns `None` for absent or empty parameters so that parameter-less
/// requests keep a hash-free cache key. The map is a `BTreeMap`, so its JSON
/// form is canonical regardless of insertion order.
pub fn hash_params(params: Option<&Params>) -> Option<String> {
    let params = params.filter(|p| !p.is_empty())?;
    let canonical = serde_json::to_string(params).ok()?;
    let digest = Sha256::digest(canonical.as_bytes());
    Some(hex::encode(&digest[..8]))
}

/// Removes duplicate strings, keeping the first occurrence of each.
pub fn dedup_preserving_order<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
