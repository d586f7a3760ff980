#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rand::{Rng, distr::Alphanumeric};
use serde_json::{Value, json};

use genrify::{
    Res,
    errors::Error,
    http::{Body, Method, Params, Transport},
    logging::Logger,
    spotify::SpotifyClient,
    types::{Album, Artist, EnrichedTrack},
};

pub const API_URL: &str = "https://api.spotify.com/v1";

/// One request as seen by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub params: Option<Params>,
    pub body: Option<Value>,
}

impl Call {
    /// Ids of a batch lookup, split from the `ids` parameter.
    pub fn ids(&self) -> Vec<String> {
        self.params
            .as_ref()
            .and_then(|p| p.get("ids"))
            .map(|ids| ids.split(',').map(str::to_string).collect())
            .unwrap_or_default()
    }
}

type Handler = dyn Fn(&Call) -> Res<Value> + Send + Sync;

/// Transport double answering every request through a closure and recording it.
pub struct MockTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&Call) -> Res<Value> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: Method, path_prefix: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path.starts_with(path_prefix))
            .collect()
    }

    fn record(&self, call: Call) -> Res<Value> {
        let result = (self.handler)(&call);
        self.calls.lock().unwrap().push(call);
        result
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, params: Option<&Params>) -> Res<Value> {
        self.record(Call {
            method: Method::Get,
            path: path.to_string(),
            params: params.cloned(),
            body: None,
        })
    }

    async fn post(&self, path: &str, body: Body) -> Res<Value> {
        let body = match body {
            Body::Json(value) => value,
            Body::Form(params) => serde_json::to_value(params).unwrap(),
        };
        self.record(Call {
            method: Method::Post,
            path: path.to_string(),
            params: None,
            body: Some(body),
        })
    }

    async fn delete(&self, path: &str) -> Res<Value> {
        self.record(Call {
            method: Method::Delete,
            path: path.to_string(),
            params: None,
            body: None,
        })
    }
}

pub fn status_error(call: &Call, status: u16) -> Error {
    Error::Status {
        method: call.method.to_string(),
        path: call.path.clone(),
        status,
        body: "{}".to_string(),
    }
}

/// Fresh, not yet existing cache directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    std::env::temp_dir().join(format!("genrify-{}-{}", name, suffix))
}

pub fn client(transport: Arc<MockTransport>, cache_dir: &PathBuf) -> SpotifyClient {
    SpotifyClient::new(transport, API_URL, cache_dir.clone(), &Logger::root())
}

pub fn track_json(id: &str, artist_ids: &[&str]) -> Value {
    json!({
        "id": id,
        "name": format!("Track {}", id),
        "uri": format!("spotify:track:{}", id),
        "album": { "id": format!("album-{}", id), "name": format!("Album {}", id) },
        "artists": artist_ids
            .iter()
            .map(|a| json!({ "id": a, "name": format!("Artist {}", a) }))
            .collect::<Vec<_>>(),
    })
}

pub fn artist_json(id: &str, genres: &[&str]) -> Value {
    json!({
        "id": id,
        "name": format!("Artist {}", id),
        "genres": genres,
    })
}

pub fn artist(id: &str, genres: &[&str]) -> Artist {
    Artist {
        id: id.to_string(),
        name: format!("Artist {}", id),
        genres: Some(genres.iter().map(|s| s.to_string()).collect()),
    }
}

/// An artist the API reported without any genre field.
pub fn genreless(id: &str) -> Artist {
    Artist {
        id: id.to_string(),
        name: format!("Artist {}", id),
        genres: None,
    }
}

pub fn enriched(id: &str, artists: Vec<Artist>) -> EnrichedTrack {
    EnrichedTrack {
        id: id.to_string(),
        name: format!("Track {}", id),
        album: Album {
            id: format!("album-{}", id),
            name: format!("Album {}", id),
        },
        artists,
        uri: format!("spotify:track:{}", id),
    }
}

pub fn ids(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}{}", prefix, i)).collect()
}
