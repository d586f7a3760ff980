//! # CLI Module
//!
//! This module provides the command-line interface layer for genrify. It
//! implements the user-facing commands and coordinates between the Spotify
//! client, the genre pipeline and the user.
//!
//! ## Overview
//!
//! The commands cover:
//!
//! - **Authentication Management**: Authorization code flow for Spotify API access
//! - **Genre Playlists**: Recreating one playlist per large genre of the library
//! - **Genre Export**: Writing the genre groups to a JSON file
//! - **Genre Overview**: Listing genres and their track counts
//!
//! ## Command Categories
//!
//! ### Authentication
//!
//! - [`auth`] - Runs (or reuses) the Spotify authorization and stores the token
//!
//! ### Pipeline Runs
//!
//! - [`playlists`] - Unfollows previously generated playlists and creates new ones
//! - [`export`] - Writes the genre groups to a file instead of the account
//! - [`genres`] - Shows a table of the genres that pass the threshold
//!
//! ## Architecture Design
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Pipeline Layer (library loading, grouping, sinks)
//!     ↓
//! Spotify Layer (client, authorization)
//!     ↓
//! HTTP Layer (disk cache, transport)
//! ```
//!
//! Each command builds its own [`crate::logging::Logger`] and client, shows a
//! spinner while the library is loading, and prints a colored summary at the
//! end.
//!
//! ## Error Handling
//!
//! Nothing is retried. Any failure of a stage is printed with the `error!`
//! macro, which ends the process with exit code 1. Missing client
//! credentials are reported before the first network request.
//!
//! ## Usage Patterns
//!
//! ```bash
//! genrify auth                         # Authorize with Spotify
//! genrify genres                       # Inspect the genre distribution
//! genrify playlists --threshold 40     # Recreate the genre playlists
//! genrify export --output genres.json  # Dump the groups to a file
//! ```

mod auth;
mod export;
mod genres;
mod playlists;
mod session;

pub use auth::auth;
pub use export::export;
pub use genres::genres;
pub use playlists::playlists;
