use crate::{cli::session, error, logging::Logger, success};

pub async fn auth(force: bool) {
    let log = Logger::root();

    match session::access_token(force, &log).await {
        Ok(_) => success!("Authorized with Spotify."),
        Err(e) => error!("Authorization failed. Err: {}", e),
    }
}
