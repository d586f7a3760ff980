//! Configuration management for the Genre Playlist Builder.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including Spotify API credentials, the OAuth callback listener and
//! the location of the response cache.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the current working directory
//! 3. `.env` file in the local data directory
//! 4. Application defaults (where applicable)
//!
//! Only the client credentials are required. Every other value falls back to a
//! default that works with a Spotify application registered with the redirect
//! URI `http://127.0.0.1:8888/callback`.

use std::{env, path::PathBuf, time::Duration};

use crate::{Res, errors::Error};

/// Scopes requested during authorization.
///
/// Reading the library and the user's playlists, and creating / modifying
/// public and private playlists.
pub const SPOTIFY_SCOPES: [&str; 6] = [
    "user-read-private",
    "user-read-email",
    "user-library-read",
    "playlist-read-private",
    "playlist-modify-public",
    "playlist-modify-private",
];

const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
/// The callback listener binds here; [`DEFAULT_REDIRECT_URI`] points at the same socket.
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 300;

/// Loads environment variables from `.env` files.
///
/// Looks for a `.env` file in the current working directory first and then in
/// the platform-specific local data directory under `genrify/.env`. Variables
/// that are already set are never overwritten, so the first source wins.
/// Missing files are not an error: the required credentials may just as well
/// come from the process environment.
///
/// # Directory Structure
///
/// The data directory file is looked up in:
/// - Linux: `~/.local/share/genrify/.env`
/// - macOS: `~/Library/Application Support/genrify/.env`
/// - Windows: `%LOCALAPPDATA%/genrify/.env`
///
/// # Errors
///
/// Returns an error if the data directory cannot be created.
///
/// # Example
///
/// ```
/// use genrify::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Res<()> {
    let _ = dotenv::dotenv();

    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)
            .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))?;
    }

    Ok(())
}

/// Returns the Spotify API client ID for authentication.
///
/// Retrieves the `SPOTIFY_CLIENT_ID` environment variable which contains the
/// client ID obtained when registering the application with Spotify's
/// developer platform.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the variable is not set or empty.
pub fn spotify_client_id() -> Res<String> {
    required("SPOTIFY_CLIENT_ID")
}

/// Returns the Spotify API client secret for authentication.
///
/// Retrieves the `SPOTIFY_CLIENT_SECRET` environment variable. The secret is
/// sent in the form body of the token exchange and must never be logged.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the variable is not set or empty.
pub fn spotify_client_secret() -> Res<String> {
    required("SPOTIFY_CLIENT_SECRET")
}

/// Returns the Spotify Web API base URL.
///
/// Reads `SPOTIFY_API_URL`, defaulting to `https://api.spotify.com/v1`.
/// Pagination links returned by the API are made relative by stripping this
/// prefix, so it must match what the API puts into `next`.
pub fn spotify_api_url() -> String {
    optional("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// Returns the Spotify accounts service base URL.
///
/// Reads `SPOTIFY_ACCOUNTS_URL`, defaulting to `https://accounts.spotify.com`.
/// The authorize page lives at `<url>/authorize`, the token endpoint at
/// `<url>/api/token`.
pub fn spotify_accounts_url() -> String {
    optional("SPOTIFY_ACCOUNTS_URL", DEFAULT_ACCOUNTS_URL)
}

/// Returns the address the OAuth callback listener binds to.
///
/// Reads `SERVER_ADDRESS`, defaulting to `127.0.0.1:8888`.
pub fn server_addr() -> String {
    optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Returns the Spotify OAuth redirect URI.
///
/// Reads `SPOTIFY_REDIRECT_URI`, defaulting to `http://127.0.0.1:8888/callback`.
/// This must match the redirect URI registered in the Spotify application
/// settings and point at [`server_addr`]. A `localhost` redirect only works
/// where the browser resolves `localhost` to the address the listener binds.
pub fn spotify_redirect_uri() -> String {
    optional("SPOTIFY_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Returns the directory holding cached API responses and the token.
///
/// Reads `GENRIFY_CACHE_DIR`, defaulting to `<data_local_dir>/genrify/cache`.
pub fn cache_dir() -> PathBuf {
    match env::var("GENRIFY_CACHE_DIR") {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => data_dir().join("cache"),
    }
}

/// Returns how long the authorization flow waits for the browser callback.
///
/// Reads `GENRIFY_AUTH_TIMEOUT` in seconds, defaulting to five minutes.
/// Unparsable values fall back to the default.
pub fn auth_timeout() -> Duration {
    let secs = env::var("GENRIFY_AUTH_TIMEOUT")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_AUTH_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("genrify");
    path
}

fn required(name: &str) -> Res<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Configuration(format!("{} must be set", name))),
    }
}

fn optional(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}
