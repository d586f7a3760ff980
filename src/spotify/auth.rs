use std::{sync::Arc, time::Duration};

use log::debug;
use reqwest::Url;

use crate::{
    Res, config,
    errors::Error,
    http::{Body, Params, RestClient, Transport},
    logging::Logger,
    server::CallbackListener,
    types::TokenResponse,
    utils, warning,
};

/// Everything the authorization code flow needs to know.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub server_addr: String,
    pub accounts_url: String,
    pub scopes: Vec<String>,
    pub timeout: Duration,
}

impl AuthConfig {
    /// Builds the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `SPOTIFY_CLIENT_ID` or
    /// `SPOTIFY_CLIENT_SECRET` is missing. Nothing touches the network
    /// before this succeeds.
    pub fn from_env() -> Res<Self> {
        Ok(Self {
            client_id: config::spotify_client_id()?,
            client_secret: config::spotify_client_secret()?,
            redirect_uri: config::spotify_redirect_uri(),
            server_addr: config::server_addr(),
            accounts_url: config::spotify_accounts_url(),
            scopes: config::SPOTIFY_SCOPES.iter().map(|s| s.to_string()).collect(),
            timeout: config::auth_timeout(),
        })
    }
}

/// Client of the Spotify accounts service implementing the authorization
/// code flow with a client secret.
///
/// # Authentication Flow
///
/// 1. **Listener**: A local HTTP listener is bound to the configured address
/// 2. **Browser Launch**: The authorization URL (with a random `state`) is opened
/// 3. **User Authorization**: The user grants the requested scopes
/// 4. **Callback Handling**: The listener receives the code and shuts down
/// 5. **Token Exchange**: The code is exchanged for a token at `/api/token`
///
/// The wait for the browser is bounded by [`AuthConfig::timeout`], so an
/// abandoned login does not block the run forever.
pub struct SpotifyAuth {
    transport: Arc<dyn Transport>,
    config: AuthConfig,
    log: Logger,
}

impl SpotifyAuth {
    pub const NAME: &'static str = "SpotifyAuth";

    pub fn new(config: AuthConfig, log: &Logger) -> Self {
        let log = log.sub(Self::NAME);
        let transport = RestClient::new(format!("{}/api", config.accounts_url), log.clone());
        Self::with_transport(Arc::new(transport), config, &log)
    }

    pub fn with_transport(transport: Arc<dyn Transport>, config: AuthConfig, log: &Logger) -> Self {
        Self {
            transport,
            config,
            log: log.clone(),
        }
    }

    /// Builds the URL of Spotify's authorization page.
    ///
    /// # Example
    ///
    /// ```text
    /// https://accounts.spotify.com/authorize?client_id=...&response_type=code
    ///     &redirect_uri=http%3A%2F%2F127.0.0.1%3A8888%2Fcallback&scope=user-library-read+...&state=...
    /// ```
    pub fn authorize_url(&self, state: &str) -> Res<String> {
        let mut url = Url::parse(&format!("{}/authorize", self.config.accounts_url))
            .map_err(|e| Error::Configuration(format!("Invalid accounts URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", state);

        Ok(url.to_string())
    }

    /// Runs the browser round trip and returns the authorization code.
    pub async fn authorize(&self) -> Res<String> {
        let state = utils::generate_state();
        let listener =
            CallbackListener::bind(&self.config.server_addr, state.clone(), self.log.sub("Server"))
                .await?;

        let auth_url = self.authorize_url(&state)?;
        debug!(target: self.log.target(), "Opening {}", auth_url);

        if webbrowser::open(&auth_url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                auth_url
            )
        }

        listener.wait(self.config.timeout).await
    }

    /// Authorizes in the browser and exchanges the code for a token.
    pub async fn get_token_response(&self) -> Res<TokenResponse> {
        let code = self.authorize().await?;
        self.exchange_code(&code).await
    }

    /// Exchanges an authorization code for a token (`grant_type=authorization_code`).
    pub async fn exchange_code(&self, code: &str) -> Res<TokenResponse> {
        let form = self.form([
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ]);
        self.request_token(form).await
    }

    /// Trades a refresh token for a new access token (`grant_type=refresh_token`).
    pub async fn refresh(&self, refresh_token: &str) -> Res<TokenResponse> {
        let form = self.form([
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ]);
        self.request_token(form).await
    }

    fn form<const N: usize>(&self, fields: [(&str, &str); N]) -> Params {
        let mut params: Params = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        params.insert("client_id".to_string(), self.config.client_id.clone());
        params.insert("client_secret".to_string(), self.config.client_secret.clone());
        params
    }

    async fn request_token(&self, form: Params) -> Res<TokenResponse> {
        let value = self.transport.post("/token", Body::Form(form)).await?;
        Ok(serde_json::from_value(value)?)
    }
}
