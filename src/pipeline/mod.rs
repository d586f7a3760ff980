//! # Genre Pipeline
//!
//! Turns the saved-tracks library into genre groups and hands them to a sink.
//!
//! ```text
//! saved track ids → track batches → artist batches → enrichment
//!          ↓
//! genre grouping (threshold, largest first)
//!          ↓
//! sink: playlists in the user's library | JSON file
//! ```
//!
//! One [`PipelineOptions`] value describes a whole run; the two presets
//! [`PipelineOptions::playlists`] and [`PipelineOptions::export`] carry the
//! usual thresholds for each sink.

use std::{path::PathBuf, time::Duration};

use log::info;

use crate::{
    Res,
    logging::Logger,
    spotify::SpotifyClient,
    types::{GenreGroup, Playlist},
};

pub mod export;
pub mod genres;
pub mod library;
pub mod playlists;

pub use genres::{UNKNOWN_GENRE, bucket_by_genre, group_by_genre};
pub use library::{LibraryLoader, unique_artist_ids};
pub use playlists::{PlaylistWriter, managed_playlist_name};

/// Pause after each playlist mutation.
pub const MUTATION_DELAY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Playlist,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub threshold: usize,
    pub sink: Sink,
    pub playlist_prefix: String,
    pub unfollow_existing: bool,
    pub force_refresh: bool,
    pub mutation_delay: Duration,
}

impl PipelineOptions {
    pub fn playlists() -> Self {
        Self {
            threshold: genres::PLAYLIST_THRESHOLD,
            sink: Sink::Playlist,
            playlist_prefix: playlists::DEFAULT_PREFIX.to_string(),
            unfollow_existing: true,
            force_refresh: false,
            mutation_delay: MUTATION_DELAY,
        }
    }

    pub fn export(path: impl Into<PathBuf>) -> Self {
        Self {
            threshold: genres::EXPORT_THRESHOLD,
            sink: Sink::File(path.into()),
            ..Self::playlists()
        }
    }
}

/// What a sink did with the groups.
#[derive(Debug, Clone)]
pub enum Delivery {
    Playlists { unfollowed: usize, created: Vec<Playlist> },
    File(PathBuf),
}

pub struct Pipeline<'a> {
    client: &'a SpotifyClient,
    options: PipelineOptions,
    log: Logger,
}

impl<'a> Pipeline<'a> {
    pub fn new(client: &'a SpotifyClient, options: PipelineOptions, log: &Logger) -> Self {
        Self {
            client,
            options,
            log: log.sub("Pipeline"),
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Loads the library and groups it by genre.
    pub async fn collect(&self) -> Res<Vec<GenreGroup>> {
        let tracks = LibraryLoader::new(self.client, &self.log)
            .load(self.options.force_refresh)
            .await?;

        let groups = group_by_genre(&tracks, self.options.threshold);
        info!(
            target: self.log.target(),
            "{} genres have at least {} tracks",
            groups.len(),
            self.options.threshold
        );
        Ok(groups)
    }

    pub async fn deliver(&self, groups: &[GenreGroup]) -> Res<Delivery> {
        match &self.options.sink {
            Sink::Playlist => {
                let writer = PlaylistWriter::new(
                    self.client,
                    &self.options.playlist_prefix,
                    self.options.mutation_delay,
                    &self.log,
                )
                .force_refresh(self.options.force_refresh);

                let unfollowed = if self.options.unfollow_existing {
                    writer.unfollow_managed().await?
                } else {
                    0
                };
                let created = writer.create(groups).await?;
                Ok(Delivery::Playlists { unfollowed, created })
            }
            Sink::File(path) => {
                export::write_groups(path, groups).await?;
                info!(target: self.log.target(), "Wrote {} genres to {}", groups.len(), path.display());
                Ok(Delivery::File(path.clone()))
            }
        }
    }

    pub async fn run(&self) -> Res<Delivery> {
        let groups = self.collect().await?;
        self.deliver(&groups).await
    }
}
