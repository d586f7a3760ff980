use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
}

/// One page of a listing endpoint. `next` is an absolute URL or `null` on
/// the last page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    #[serde(default)]
    pub next: Option<String>,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrack {
    pub track: TrackId,
}

/// Local files saved to the library carry a `null` id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackId {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
}

impl Artist {
    /// Genre labels, or `None` when the API reported none at all.
    pub fn known_genres(&self) -> Option<&[String]> {
        match &self.genres {
            Some(genres) if !genres.is_empty() => Some(genres),
            _ => None,
        }
    }
}

impl From<ArtistRef> for Artist {
    fn from(stub: ArtistRef) -> Self {
        Artist {
            id: stub.id,
            name: stub.name,
            genres: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub album: Album,
    pub artists: Vec<ArtistRef>,
    pub uri: String,
}

/// A [`Track`] whose artist stubs were replaced by full artist records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedTrack {
    pub id: String,
    pub name: String,
    pub album: Album,
    pub artists: Vec<Artist>,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSeveralTracksResponse {
    pub tracks: Vec<Option<Track>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSeveralArtistsResponse {
    pub artists: Vec<Option<Artist>>,
}

#[derive(Debug, Clone)]
pub struct GenreGroup {
    pub genre: String,
    pub tracks: Vec<EnrichedTrack>,
}

#[derive(Tabled)]
pub struct GenreTableRow {
    pub genre: String,
    pub tracks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedPlaylist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedGenre {
    pub genre: String,
    pub tracks: Vec<ExportedTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedTrack {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub album: String,
    pub artists: Vec<String>,
}
