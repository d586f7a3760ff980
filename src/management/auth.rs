use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, warn};

use crate::{
    Res,
    errors::Error,
    logging::Logger,
    spotify::SpotifyAuth,
    types::{Token, TokenResponse},
};

/// Seconds before the real expiry at which a token is already treated as expired.
const EXPIRY_MARGIN_SECS: u64 = 240;

pub struct TokenManager {
    token: Token,
    path: PathBuf,
    log: Logger,
}

impl TokenManager {
    pub fn new(token: Token, cache_dir: &Path, log: &Logger) -> Self {
        TokenManager {
            token,
            path: Self::token_path(cache_dir),
            log: log.sub("Token"),
        }
    }

    pub fn from_response(response: TokenResponse, cache_dir: &Path, log: &Logger) -> Self {
        Self::new(token_from_response(response, None), cache_dir, log)
    }

    pub async fn load(cache_dir: &Path, log: &Logger) -> Res<Self> {
        let content = async_fs::read_to_string(Self::token_path(cache_dir)).await?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(Self::new(token, cache_dir, log))
    }

    pub async fn persist(&self) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Values from a damaged `token.json` saturate instead of overflowing.
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp().max(0) as u64;
        let expires_at = self.token.obtained_at.saturating_add(self.token.expires_in);
        now.saturating_add(EXPIRY_MARGIN_SECS) >= expires_at
    }

    /// Refreshes the token through `auth` when it is about to expire.
    ///
    /// A rotated refresh token replaces the stored one; when the response
    /// carries none, the previous refresh token is kept.
    pub async fn ensure_fresh(&mut self, auth: &SpotifyAuth) -> Res<()> {
        if !self.is_expired() {
            return Ok(());
        }

        let Some(refresh_token) = self.token.refresh_token.clone() else {
            return Err(Error::Authorization(
                "stored token expired and has no refresh token".to_string(),
            ));
        };

        debug!(target: self.log.target(), "Refreshing expired access token");
        let response = auth.refresh(&refresh_token).await?;
        self.token = token_from_response(response, Some(refresh_token));

        if let Err(e) = self.persist().await {
            warn!(target: self.log.target(), "Failed to save refreshed token: {}", e);
        }
        Ok(())
    }

    pub fn access_token(&self) -> &str {
        &self.token.access_token
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }

    fn token_path(cache_dir: &Path) -> PathBuf {
        cache_dir.join("token.json")
    }
}

/// Returns a usable access token, authorizing in the browser only when needed.
///
/// A stored token is reused (refreshed if expired) unless `reauthorize` is
/// set. If there is no stored token, or refreshing fails, the full browser
/// flow runs and its token is persisted for the next run.
pub async fn access_token(
    auth: &SpotifyAuth,
    cache_dir: &Path,
    reauthorize: bool,
    log: &Logger,
) -> Res<String> {
    if !reauthorize {
        match TokenManager::load(cache_dir, log).await {
            Ok(mut manager) => match manager.ensure_fresh(auth).await {
                Ok(()) => return Ok(manager.access_token().to_string()),
                Err(e) => warn!(
                    target: manager.log.target(),
                    "Stored token unusable, authorizing again: {}",
                    e
                ),
            },
            Err(e) => debug!(target: log.target(), "No stored token: {}", e),
        }
    }

    let response = auth.get_token_response().await?;
    let manager = TokenManager::from_response(response, cache_dir, log);
    if let Err(e) = manager.persist().await {
        warn!(target: manager.log.target(), "Failed to save token: {}", e);
    }

    Ok(manager.access_token().to_string())
}

fn token_from_response(response: TokenResponse, previous_refresh: Option<String>) -> Token {
    Token {
        access_token: response.access_token,
        refresh_token: response.refresh_token.or(previous_refresh),
        scope: response.scope,
        expires_in: response.expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    }
}
