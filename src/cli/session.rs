use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    Res, config,
    logging::Logger,
    management,
    spotify::{AuthConfig, SpotifyAuth, SpotifyClient},
};

/// Obtains an access token, authorizing in the browser when needed.
///
/// Fails with a configuration error before any network traffic when the
/// client credentials are missing.
pub async fn access_token(reauthorize: bool, log: &Logger) -> Res<String> {
    let auth = SpotifyAuth::new(AuthConfig::from_env()?, log);
    management::access_token(&auth, &config::cache_dir(), reauthorize, log).await
}

/// Builds an authenticated API client backed by the disk cache.
pub async fn client(log: &Logger) -> Res<SpotifyClient> {
    let token = access_token(false, log).await?;
    Ok(SpotifyClient::with_token(
        &config::spotify_api_url(),
        &token,
        config::cache_dir(),
        log,
    ))
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb
}
