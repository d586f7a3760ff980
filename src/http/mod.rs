//! # HTTP Module
//!
//! The layered capability stack every API call goes through:
//!
//! ```text
//! SpotifyClient / SpotifyAuth   (domain endpoints)
//!          ↓
//! CachedRequest                 (disk cache around GET)
//!          ↓
//! dyn Transport                 (RestClient over reqwest, or a test double)
//! ```
//!
//! Each layer owns the one below it instead of extending it, so a test can
//! put a mock [`Transport`] underneath the real cache and domain client.
//!
//! Transports hand back the decoded JSON body as a [`serde_json::Value`]; the
//! domain layer decodes it into typed structs. This is also what the cache
//! stores, so cache files contain the exact response body.

pub mod cache;
pub mod rest;

use std::{collections::BTreeMap, fmt};

use async_trait::async_trait;
use serde_json::Value;

use crate::Res;

pub use cache::{CachedRequest, DiskCache, cache_key};
pub use rest::RestClient;

/// Query or form parameters. Ordered so that hashing them is deterministic.
pub type Params = BTreeMap<String, String>;

/// Request body of a POST.
#[derive(Debug, Clone)]
pub enum Body {
    Json(Value),
    Form(Params),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Delete => "delete",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// Raw access to a remote JSON API relative to a base URL.
///
/// `path` is always relative to the transport's base URL and may carry a
/// query string of its own (pagination links do). Empty response bodies
/// decode to [`Value::Null`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, params: Option<&Params>) -> Res<Value>;

    async fn post(&self, path: &str, body: Body) -> Res<Value>;

    async fn delete(&self, path: &str) -> Res<Value>;
}
