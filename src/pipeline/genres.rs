use std::collections::{HashMap, HashSet};

use crate::types::{EnrichedTrack, GenreGroup};

/// Bucket for tracks whose artist has no genre data.
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Minimum bucket size for playlist creation.
pub const PLAYLIST_THRESHOLD: usize = 25;

/// Minimum bucket size for the file export.
pub const EXPORT_THRESHOLD: usize = 100;

struct Bucket {
    group: GenreGroup,
    seen: HashSet<String>,
}

/// Groups tracks by the genres of their artists and keeps the large groups.
///
/// Every track is filed under every genre of every one of its artists, or
/// under [`UNKNOWN_GENRE`] for an artist without genres, so groups overlap.
/// Each group holds a track at most once, in first-seen order. Groups are
/// sorted by size, largest first; equally sized groups keep the order in
/// which their genre was first encountered. Groups smaller than `threshold`
/// are dropped.
pub fn group_by_genre(tracks: &[EnrichedTrack], threshold: usize) -> Vec<GenreGroup> {
    bucket_by_genre(tracks)
        .into_iter()
        .filter(|group| group.tracks.len() >= threshold)
        .collect()
}

/// Every genre group, sorted by size, without the threshold filter.
pub fn bucket_by_genre(tracks: &[EnrichedTrack]) -> Vec<GenreGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    let mut file = |genre: &str, track: &EnrichedTrack| {
        let position = *index.entry(genre.to_string()).or_insert_with(|| {
            buckets.push(Bucket {
                group: GenreGroup {
                    genre: genre.to_string(),
                    tracks: Vec::new(),
                },
                seen: HashSet::new(),
            });
            buckets.len() - 1
        });

        let bucket = &mut buckets[position];
        if bucket.seen.insert(track.id.clone()) {
            bucket.group.tracks.push(track.clone());
        }
    };

    for track in tracks {
        for artist in &track.artists {
            match artist.known_genres() {
                Some(genres) => genres.iter().for_each(|genre| file(genre, track)),
                None => file(UNKNOWN_GENRE, track),
            }
        }
    }

    let mut groups: Vec<GenreGroup> = buckets.into_iter().map(|b| b.group).collect();
    groups.sort_by(|a, b| b.tracks.len().cmp(&a.tracks.len()));
    groups
}
