use std::collections::HashMap;

use futures::future::try_join_all;
use log::{debug, info, warn};

use crate::{
    Res,
    logging::Logger,
    spotify::SpotifyClient,
    types::{Artist, EnrichedTrack, SavedTrack, Track},
    utils::{self, MAX_BATCH_SIZE},
};

/// First page of the saved-tracks listing.
pub const SAVED_TRACKS_URL: &str = "/me/tracks?limit=50";

/// Loads the saved-track library and enriches every track with its artists.
///
/// The stages run strictly one after another: saved track ids, track batch
/// fetch, artist batch fetch, enrichment. Inside a batch fetch all chunk
/// requests are in flight together and the first failing chunk fails the
/// whole stage.
pub struct LibraryLoader<'a> {
    client: &'a SpotifyClient,
    log: Logger,
}

impl<'a> LibraryLoader<'a> {
    pub fn new(client: &'a SpotifyClient, log: &Logger) -> Self {
        Self {
            client,
            log: log.sub("Library"),
        }
    }

    /// With `force_refresh` every stage bypasses the cache and overwrites it.
    pub async fn load(&self, force_refresh: bool) -> Res<Vec<EnrichedTrack>> {
        let ids = self.saved_track_ids(force_refresh).await?;
        info!(target: self.log.target(), "Library contains {} saved tracks", ids.len());

        let tracks = self.fetch_tracks(&ids, force_refresh).await?;
        let artist_ids = unique_artist_ids(&tracks);
        info!(
            target: self.log.target(),
            "Fetched {} tracks by {} distinct artists",
            tracks.len(),
            artist_ids.len()
        );

        let artists = self.fetch_artists(&artist_ids, force_refresh).await?;
        Ok(self.enrich(tracks, &artists))
    }

    /// Ids of all saved tracks, in the order the API lists them.
    ///
    /// Entries without an id (local files) are skipped.
    pub async fn saved_track_ids(&self, force_refresh: bool) -> Res<Vec<String>> {
        let saved: Vec<SavedTrack> = self.client.iterate(SAVED_TRACKS_URL, force_refresh).await?;
        let total = saved.len();

        let ids: Vec<String> = saved.into_iter().filter_map(|s| s.track.id).collect();
        if ids.len() < total {
            debug!(
                target: self.log.target(),
                "Skipped {} saved entries without an id",
                total - ids.len()
            );
        }

        Ok(ids)
    }

    /// Full track records for `ids`, fetched in concurrent chunks of 50.
    pub async fn fetch_tracks(&self, ids: &[String], force_refresh: bool) -> Res<Vec<Track>> {
        let chunks = utils::chunk(ids, MAX_BATCH_SIZE);
        debug!(target: self.log.target(), "Fetching {} track chunks", chunks.len());

        let batches =
            try_join_all(chunks.iter().map(|chunk| self.client.get_tracks(chunk, force_refresh)))
                .await?;
        Ok(batches.into_iter().flatten().collect())
    }

    /// Artist records for `ids`, fetched in concurrent chunks of 50, keyed by id.
    pub async fn fetch_artists(
        &self,
        ids: &[String],
        force_refresh: bool,
    ) -> Res<HashMap<String, Artist>> {
        let chunks = utils::chunk(ids, MAX_BATCH_SIZE);
        debug!(target: self.log.target(), "Fetching {} artist chunks", chunks.len());

        let batches =
            try_join_all(chunks.iter().map(|chunk| self.client.get_artists(chunk, force_refresh)))
                .await?;

        Ok(batches
            .into_iter()
            .flatten()
            .map(|artist| (artist.id.clone(), artist))
            .collect())
    }

    /// Replaces every track's artist stubs with the full records, keeping their order.
    ///
    /// An artist missing from `artists` keeps its stub data without genres.
    pub fn enrich(&self, tracks: Vec<Track>, artists: &HashMap<String, Artist>) -> Vec<EnrichedTrack> {
        tracks
            .into_iter()
            .map(|track| EnrichedTrack {
                artists: track
                    .artists
                    .into_iter()
                    .map(|stub| match artists.get(&stub.id) {
                        Some(artist) => artist.clone(),
                        None => {
                            warn!(
                                target: self.log.target(),
                                "No artist record for {} ({}), treating genres as unknown",
                                stub.name,
                                stub.id
                            );
                            Artist::from(stub)
                        }
                    })
                    .collect(),
                id: track.id,
                name: track.name,
                album: track.album,
                uri: track.uri,
            })
            .collect()
    }
}

/// Distinct artist ids across `tracks`, in order of first appearance.
pub fn unique_artist_ids(tracks: &[Track]) -> Vec<String> {
    utils::dedup_preserving_order(
        tracks
            .iter()
            .flat_map(|track| track.artists.iter().map(|artist| artist.id.clone())),
    )
}
