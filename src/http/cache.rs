use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    Res,
    http::{Body, Method, Params, Transport},
    logging::Logger,
    utils,
};

/// Characters that are replaced by `_` when a request path becomes a file name.
const UNSAFE_KEY_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Builds the cache key of a request.
///
/// The key is `<owner>.<method>.<path>` with the leading slash of `path`
/// dropped and path separators replaced, followed by `.<hash>` of the
/// parameters when there are any:
///
/// ```text
/// SpotifyClient.get.me_tracks_limit=50
/// SpotifyClient.get.tracks.4f1c2a9be03d7a51
/// ```
pub fn cache_key(owner: &str, method: Method, path: &str, params: Option<&Params>) -> String {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path: String = path
        .chars()
        .map(|c| if UNSAFE_KEY_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let mut key = format!("{}.{}.{}", owner, method.as_str(), path);
    if let Some(hash) = utils::hash_params(params) {
        key.push('.');
        key.push_str(&hash);
    }
    key
}

/// Read-through cache storing one pretty-printed JSON file per key.
///
/// Unreadable or undecodable files count as misses. There is no locking:
/// two processes sharing a directory simply overwrite each other's files.
pub struct DiskCache {
    dir: PathBuf,
    log: Logger,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>, log: Logger) -> Self {
        Self {
            dir: dir.into(),
            log,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Returns the cached value for `key`, or runs `producer` and caches its result.
    ///
    /// With `force_refresh` the cached file is ignored and overwritten. A
    /// failing producer leaves the cache untouched. A failed write is only
    /// logged; the fresh value is still returned.
    pub async fn cached_call<T, F, Fut>(&self, key: &str, producer: F, force_refresh: bool) -> Res<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Res<T>>,
    {
        if !force_refresh {
            if let Some(cached) = self.read::<T>(key).await {
                debug!(target: self.log.target(), "Using cache for {}", key);
                return Ok(cached);
            }
        }

        debug!(target: self.log.target(), "Fetching data for {}", key);
        let data = producer().await?;

        if let Err(e) = self.write(key, &data).await {
            warn!(target: self.log.target(), "Failed to write cache for {}: {}", key, e);
        }

        Ok(data)
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = async_fs::read_to_string(self.path_for(key)).await.ok()?;
        serde_json::from_str(&content).ok()
    }

    async fn write<T: Serialize>(&self, key: &str, data: &T) -> Res<()> {
        async_fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(data)?;
        async_fs::write(self.path_for(key), json).await?;
        Ok(())
    }
}

/// A [`Transport`] decorated with a [`DiskCache`] for GET requests.
///
/// `owner` names the domain client and prefixes every key, so two clients
/// sharing a cache directory never read each other's entries. POST and
/// DELETE are passed through untouched.
pub struct CachedRequest {
    owner: String,
    transport: Arc<dyn Transport>,
    cache: DiskCache,
}

impl CachedRequest {
    pub fn new(owner: impl Into<String>, transport: Arc<dyn Transport>, cache: DiskCache) -> Self {
        Self {
            owner: owner.into(),
            transport,
            cache,
        }
    }

    pub fn cache(&self) -> &DiskCache {
        &self.cache
    }

    pub fn key_for(&self, method: Method, path: &str, params: Option<&Params>) -> String {
        cache_key(&self.owner, method, path, params)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&Params>,
        force_refresh: bool,
    ) -> Res<T> {
        let key = self.key_for(Method::Get, path, params);
        let value: Value = self
            .cache
            .cached_call(&key, || self.transport.get(path, params), force_refresh)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Body) -> Res<T> {
        let value = self.transport.post(path, body).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn delete(&self, path: &str) -> Res<()> {
        self.transport.delete(path).await?;
        Ok(())
    }
}
