//! # Spotify Integration Module
//!
//! This module provides the interface to the Spotify Web API used by the
//! genre pipeline. It is split into the accounts side (authorization) and the
//! API side (library, artists, playlists).
//!
//! ## Architecture
//!
//! ```text
//! Pipeline (library loading, grouping, sinks)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authorization (authorization code flow, token exchange/refresh)
//!     └── Client (saved tracks, batch lookups, playlist mutations, pagination)
//!          ↓
//! HTTP Layer (CachedRequest → Transport)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! ### Authorization Module
//!
//! [`auth`] - Implements the authorization code flow with a client secret:
//! - **Browser Integration**: Opens the authorization page in the default browser
//! - **Local Callback Listener**: Short-lived HTTP listener for the redirect, bounded by a timeout
//! - **Token Exchange**: Trades the code (or a refresh token) for an access token
//!
//! ### Client Module
//!
//! [`client`] - Handles the Web API operations:
//! - **Pagination**: Follows `next` links until the listing is exhausted
//! - **Batch Lookups**: Several tracks / several artists, at most 50 ids per call
//! - **Playlist Operations**: Create, add tracks (100 per call), unfollow
//! - **Caching**: Every GET is served from the disk cache when possible
//!
//! ## API Coverage
//!
//! - `GET /me` - Current user profile
//! - `GET /me/tracks` - Saved tracks, paginated
//! - `GET /me/playlists` - User's playlists, paginated
//! - `GET /tracks?ids=` - Several tracks
//! - `GET /artists?ids=` - Several artists
//! - `POST /users/{user_id}/playlists` - Create playlist
//! - `POST /playlists/{playlist_id}/tracks` - Add tracks
//! - `DELETE /playlists/{playlist_id}/followers` - Unfollow playlist
//! - `POST /api/token` - Token exchange and refresh
//!
//! ## Error Handling
//!
//! Nothing is retried. A failed request is logged with its status and
//! response body and returned as an [`crate::errors::Error`], which ends the
//! run.

pub mod auth;
pub mod client;

pub use auth::{AuthConfig, SpotifyAuth};
pub use client::SpotifyClient;
