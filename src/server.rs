use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Duration};

use axum::{Extension, Router, routing::get};
use log::{debug, error};
use tokio::{sync::oneshot, task::JoinHandle};

use crate::{
    Res,
    api::{self, CallbackOutcome, CallbackState},
    errors::Error,
    logging::Logger,
};

/// How long a stopping listener may take to finish open connections.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// One-shot local HTTP listener receiving the OAuth redirect.
///
/// The listener runs from [`CallbackListener::bind`] until [`CallbackListener::wait`]
/// returns, whatever the outcome. Dropping it without waiting stops it too.
pub struct CallbackListener {
    local_addr: SocketAddr,
    receiver: oneshot::Receiver<CallbackOutcome>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    log: Logger,
}

impl CallbackListener {
    pub async fn bind(addr: &str, expected_state: String, log: Logger) -> Res<Self> {
        let addr = SocketAddr::from_str(addr)
            .map_err(|e| Error::Configuration(format!("Invalid server address {}: {}", addr, e)))?;

        let (sender, receiver) = oneshot::channel();
        let state = Arc::new(CallbackState::new(expected_state, sender, log.clone()));

        let app = Router::new()
            .route("/callback", get(api::callback))
            .layer(Extension(state));

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let serve_log = log.clone();
        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                error!(target: serve_log.target(), "Callback listener failed: {}", e);
            }
        });

        debug!(target: log.target(), "Listening on http://{}", local_addr);

        Ok(Self {
            local_addr,
            receiver,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
            log,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Waits for the redirect and returns the authorization code.
    ///
    /// Fails with [`Error::Authorization`] when the redirect reports an error,
    /// carries a wrong `state`, or does not arrive within `timeout`. The
    /// listener is shut down before returning in every case.
    pub async fn wait(mut self, timeout: Duration) -> Res<String> {
        let outcome = tokio::time::timeout(timeout, &mut self.receiver).await;
        self.stop().await;

        match outcome {
            Ok(Ok(Ok(code))) => Ok(code),
            Ok(Ok(Err(reason))) => Err(Error::Authorization(reason)),
            Ok(Err(_)) => Err(Error::Authorization(
                "callback listener stopped before receiving a redirect".to_string(),
            )),
            Err(_) => Err(Error::Authorization(format!(
                "no authorization callback received within {} seconds",
                timeout.as_secs()
            ))),
        }
    }

    async fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(mut handle) = self.handle.take() {
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await.is_err() {
                handle.abort();
            }
        }

        debug!(target: self.log.target(), "Callback listener stopped");
    }
}

impl Drop for CallbackListener {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
