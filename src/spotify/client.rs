use std::{collections::HashSet, path::PathBuf, sync::Arc};

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    Res,
    errors::Error,
    http::{Body, CachedRequest, DiskCache, Params, RestClient, Transport},
    logging::Logger,
    types::{
        AddTrackToPlaylistRequest, Artist, CreatePlaylistRequest, GetSeveralArtistsResponse,
        GetSeveralTracksResponse, Paging, Playlist, Track, User,
    },
    utils::{MAX_BATCH_SIZE, MAX_PLAYLIST_ADD_SIZE},
};

/// Spotify Web API client used by the pipeline.
///
/// All GET endpoints go through the disk cache and take a `force_refresh`
/// flag that bypasses and overwrites the cached entry; playlist mutations are
/// sent straight to the transport. The client does not know how it authenticates:
/// the transport it is given already carries the bearer token.
pub struct SpotifyClient {
    request: CachedRequest,
    api_url: String,
    log: Logger,
}

impl SpotifyClient {
    /// Owner name used in log targets and cache keys.
    pub const NAME: &'static str = "SpotifyClient";

    /// Creates a client over an arbitrary transport.
    ///
    /// `api_url` is the base URL the transport resolves paths against. It is
    /// stripped from absolute pagination links before they are requested.
    pub fn new(
        transport: Arc<dyn Transport>,
        api_url: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
        log: &Logger,
    ) -> Self {
        let log = log.sub(Self::NAME);
        let cache = DiskCache::new(cache_dir, log.sub("Cache"));

        Self {
            request: CachedRequest::new(Self::NAME, transport, cache),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            log,
        }
    }

    /// Creates a client talking to `api_url` with a bearer token.
    pub fn with_token(
        api_url: &str,
        access_token: &str,
        cache_dir: impl Into<PathBuf>,
        log: &Logger,
    ) -> Self {
        let transport = RestClient::new(api_url, log.sub(Self::NAME)).with_bearer(access_token);
        Self::new(Arc::new(transport), api_url, cache_dir, log)
    }

    pub fn cache(&self) -> &DiskCache {
        self.request.cache()
    }

    /// Profile of the current user (`GET /me`).
    pub async fn me(&self, force_refresh: bool) -> Res<User> {
        self.request.get("/me", None, force_refresh).await
    }

    /// Full track records for at most [`MAX_BATCH_SIZE`] ids (`GET /tracks`).
    ///
    /// Ids the API does not know come back as `null` and are skipped.
    pub async fn get_tracks(&self, ids: &[String], force_refresh: bool) -> Res<Vec<Track>> {
        ensure_batch(ids.len(), MAX_BATCH_SIZE)?;

        let res: GetSeveralTracksResponse = self
            .request
            .get("/tracks", Some(&ids_param(ids)), force_refresh)
            .await?;

        Ok(self.present(res.tracks, "track"))
    }

    /// Full artist records for at most [`MAX_BATCH_SIZE`] ids (`GET /artists`).
    pub async fn get_artists(&self, ids: &[String], force_refresh: bool) -> Res<Vec<Artist>> {
        ensure_batch(ids.len(), MAX_BATCH_SIZE)?;

        let res: GetSeveralArtistsResponse = self
            .request
            .get("/artists", Some(&ids_param(ids)), force_refresh)
            .await?;

        Ok(self.present(res.artists, "artist"))
    }

    /// Creates a playlist owned by `user_id` (`POST /users/{id}/playlists`).
    pub async fn create_playlist(&self, user_id: &str, name: &str, public: bool) -> Res<Playlist> {
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: "Created automatically from the saved tracks library.".to_string(),
            public,
        };

        self.request
            .post(
                &format!("/users/{}/playlists", user_id),
                Body::Json(serde_json::to_value(body)?),
            )
            .await
    }

    /// Appends at most [`MAX_PLAYLIST_ADD_SIZE`] URIs to a playlist.
    pub async fn add_tracks_to_playlist(&self, playlist_id: &str, uris: &[String]) -> Res<()> {
        ensure_batch(uris.len(), MAX_PLAYLIST_ADD_SIZE)?;

        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };

        let _: Value = self
            .request
            .post(
                &format!("/playlists/{}/tracks", playlist_id),
                Body::Json(serde_json::to_value(body)?),
            )
            .await?;
        Ok(())
    }

    /// Removes a playlist from the user's library (`DELETE /playlists/{id}/followers`).
    pub async fn unfollow_playlist(&self, playlist_id: &str) -> Res<()> {
        self.request
            .delete(&format!("/playlists/{}/followers", playlist_id))
            .await
    }

    /// Collects the items of every page of a listing endpoint.
    ///
    /// Starts at `url` (absolute or relative to the API base) and follows
    /// `next` until it is `null`, keeping the order the API returned the items
    /// in. Every page is a cached GET; `force_refresh` bypasses the cache for
    /// all of them. A `next` link that was already requested in this run ends
    /// the iteration instead of looping forever.
    pub async fn iterate<T: DeserializeOwned>(&self, url: &str, force_refresh: bool) -> Res<Vec<T>> {
        let mut items: Vec<T> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut cursor = Some(url.to_string());

        while let Some(next) = cursor.take() {
            let path = self.relative(&next).to_string();
            if !visited.insert(path.clone()) {
                warn!(
                    target: self.log.target(),
                    "Pagination link {} was already requested, stopping",
                    next
                );
                break;
            }

            let page: Paging<T> = self.request.get(&path, None, force_refresh).await?;
            debug!(
                target: self.log.target(),
                "Page {} returned {} items",
                visited.len(),
                page.items.len()
            );

            items.extend(page.items);
            cursor = page.next;
        }

        Ok(items)
    }

    /// Strips the API base URL so cached calls are keyed by relative paths.
    pub fn relative<'a>(&self, url: &'a str) -> &'a str {
        url.strip_prefix(self.api_url.as_str()).unwrap_or(url)
    }

    fn present<T>(&self, entries: Vec<Option<T>>, kind: &str) -> Vec<T> {
        let total = entries.len();
        let present: Vec<T> = entries.into_iter().flatten().collect();
        if present.len() < total {
            warn!(
                target: self.log.target(),
                "{} of {} requested {}s were not returned by the API",
                total - present.len(),
                total,
                kind
            );
        }
        present
    }
}

fn ensure_batch(size: usize, limit: usize) -> Res<()> {
    if size > limit {
        return Err(Error::BatchTooLarge { size, limit });
    }
    Ok(())
}

fn ids_param(ids: &[String]) -> Params {
    let mut params = Params::new();
    params.insert("ids".to_string(), ids.join(","));
    params
}
