use std::time::Duration;

use log::{debug, info};
use tokio::time::sleep;

use crate::{
    Res,
    logging::Logger,
    spotify::SpotifyClient,
    types::{GenreGroup, Playlist, SimplifiedPlaylist},
    utils::{self, MAX_PLAYLIST_ADD_SIZE},
};

/// First page of the current user's playlists.
pub const PLAYLISTS_URL: &str = "/me/playlists?limit=50";

pub const DEFAULT_PREFIX: &str = "Genre: ";

pub fn managed_playlist_name(prefix: &str, genre: &str) -> String {
    format!("{}{} (Automated)", prefix, genre)
}

pub fn is_managed(prefix: &str, name: &str) -> bool {
    name.starts_with(prefix)
}

/// Writes genre groups into the user's library as playlists.
///
/// Every mutation is sent on its own and followed by `delay`.
pub struct PlaylistWriter<'a> {
    client: &'a SpotifyClient,
    prefix: String,
    delay: Duration,
    force_refresh: bool,
    log: Logger,
}

impl<'a> PlaylistWriter<'a> {
    pub fn new(client: &'a SpotifyClient, prefix: &str, delay: Duration, log: &Logger) -> Self {
        Self {
            client,
            prefix: prefix.to_string(),
            delay,
            force_refresh: false,
            log: log.sub("Playlists"),
        }
    }

    /// Refetch the current user's profile instead of reading it from the cache.
    pub fn force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    /// Unfollows every playlist whose name starts with the managed prefix.
    ///
    /// The playlist listing always bypasses the cache so playlists created by
    /// an earlier run are seen. Returns the number of unfollowed playlists.
    pub async fn unfollow_managed(&self) -> Res<usize> {
        let playlists: Vec<SimplifiedPlaylist> = self.client.iterate(PLAYLISTS_URL, true).await?;

        let mut removed = 0;
        for playlist in playlists.iter().filter(|p| is_managed(&self.prefix, &p.name)) {
            debug!(target: self.log.target(), "Unfollowing {} ({})", playlist.name, playlist.id);
            self.client.unfollow_playlist(&playlist.id).await?;
            sleep(self.delay).await;
            removed += 1;
        }

        info!(target: self.log.target(), "Unfollowed {} managed playlists", removed);
        Ok(removed)
    }

    /// Creates one private playlist per group and fills it with the group's tracks.
    pub async fn create(&self, groups: &[GenreGroup]) -> Res<Vec<Playlist>> {
        let user = self.client.me(self.force_refresh).await?;
        let mut created = Vec::with_capacity(groups.len());

        for group in groups {
            let name = managed_playlist_name(&self.prefix, &group.genre);
            let playlist = self.client.create_playlist(&user.id, &name, false).await?;

            let uris: Vec<String> = group.tracks.iter().map(|t| t.uri.clone()).collect();
            for chunk in utils::chunk(&uris, MAX_PLAYLIST_ADD_SIZE) {
                self.client.add_tracks_to_playlist(&playlist.id, &chunk).await?;
                sleep(self.delay).await;
            }

            info!(
                target: self.log.target(),
                "Created playlist {} with {} tracks",
                name,
                uris.len()
            );
            created.push(playlist);
            sleep(self.delay).await;
        }

        Ok(created)
    }
}
