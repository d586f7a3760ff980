use std::path::PathBuf;

use crate::{
    cli::session,
    error,
    logging::Logger,
    pipeline::{Pipeline, PipelineOptions},
    success,
};

pub async fn export(threshold: usize, output: PathBuf, refresh: bool) {
    let log = Logger::root();
    let client = match session::client(&log).await {
        Ok(c) => c,
        Err(e) => error!("Cannot connect to Spotify. Err: {}", e),
    };

    let options = PipelineOptions {
        threshold,
        force_refresh: refresh,
        ..PipelineOptions::export(output.clone())
    };
    let pipeline = Pipeline::new(&client, options, &log);

    let pb = session::spinner("Grouping saved tracks by genre...");
    let groups = match pipeline.collect().await {
        Ok(g) => g,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to load library. Err: {}", e)
        }
    };
    pb.finish_and_clear();

    if let Err(e) = pipeline.deliver(&groups).await {
        error!("Cannot write {}. Err: {}", output.display(), e);
    }

    success!("Exported {} genres to {}", groups.len(), output.display());
}
