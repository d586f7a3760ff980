use crate::{
    cli::session,
    error, info,
    logging::Logger,
    pipeline::{Delivery, Pipeline, PipelineOptions},
    success,
};

pub async fn playlists(threshold: usize, prefix: String, keep_existing: bool, refresh: bool) {
    let log = Logger::root();
    let client = match session::client(&log).await {
        Ok(c) => c,
        Err(e) => error!("Cannot connect to Spotify. Err: {}", e),
    };

    let options = PipelineOptions {
        threshold,
        playlist_prefix: prefix,
        unfollow_existing: !keep_existing,
        force_refresh: refresh,
        ..PipelineOptions::playlists()
    };
    let pipeline = Pipeline::new(&client, options, &log);

    let pb = session::spinner("Loading saved tracks and artists...");
    let groups = match pipeline.collect().await {
        Ok(g) => g,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to load library. Err: {}", e)
        }
    };
    pb.finish_and_clear();

    if groups.is_empty() {
        info!("No genre has at least {} tracks.", threshold);
    }

    let pb = session::spinner(&format!("Writing {} genre playlists...", groups.len()));
    match pipeline.deliver(&groups).await {
        Ok(Delivery::Playlists {
            unfollowed,
            created,
        }) => {
            pb.finish_and_clear();
            if unfollowed > 0 {
                info!("Removed {} previously generated playlists.", unfollowed);
            }
            success!("Created {} playlists!", created.len());
        }
        Ok(Delivery::File(path)) => {
            pb.finish_and_clear();
            success!("Wrote genres to {}", path.display());
        }
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to write playlists. Err: {}", e)
        }
    }
}
