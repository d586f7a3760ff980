use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use log::{debug, warn};
use tokio::sync::{Mutex, oneshot};

use crate::logging::Logger;

/// Authorization code on success, a human readable reason otherwise.
pub type CallbackOutcome = Result<String, String>;

/// Shared state of the callback route.
///
/// The sender is consumed by the first callback; later requests are answered
/// but not forwarded.
pub struct CallbackState {
    expected_state: String,
    sender: Mutex<Option<oneshot::Sender<CallbackOutcome>>>,
    log: Logger,
}

impl CallbackState {
    pub fn new(
        expected_state: String,
        sender: oneshot::Sender<CallbackOutcome>,
        log: Logger,
    ) -> Self {
        Self {
            expected_state,
            sender: Mutex::new(Some(sender)),
            log,
        }
    }

    /// Interprets the query parameters of a redirect.
    pub fn outcome(&self, params: &HashMap<String, String>) -> CallbackOutcome {
        if params.get("state") != Some(&self.expected_state) {
            return Err("state parameter does not match the authorization request".to_string());
        }

        if let Some(error) = params.get("error") {
            return Err(format!("authorization was denied: {}", error));
        }

        match params.get("code") {
            Some(code) if !code.is_empty() => Ok(code.clone()),
            _ => Err("redirect carried no authorization code".to_string()),
        }
    }
}

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<CallbackState>>,
) -> Html<&'static str> {
    let outcome = shared_state.outcome(&params);
    let target = shared_state.log.target();

    let Some(sender) = shared_state.sender.lock().await.take() else {
        debug!(target: target, "Ignoring repeated callback");
        return Html("<h4>Authorization already handled.</h4>");
    };

    let page = match &outcome {
        Ok(_) => {
            debug!(target: target, "Received authorization code");
            Html("<h2>Authentication successful.</h2><p>You can close this tab now.</p>")
        }
        Err(reason) => {
            warn!(target: target, "Authorization callback rejected: {}", reason);
            Html("<h4>Login failed.</h4><p>See the terminal for details.</p>")
        }
    };

    let _ = sender.send(outcome);
    page
}
