use tabled::Table;

use crate::{
    cli::session,
    error, info,
    logging::Logger,
    pipeline::{LibraryLoader, group_by_genre},
    types::GenreTableRow,
};

pub async fn genres(threshold: usize, refresh: bool) {
    let log = Logger::root();
    let client = match session::client(&log).await {
        Ok(c) => c,
        Err(e) => error!("Cannot connect to Spotify. Err: {}", e),
    };

    let pb = session::spinner("Loading saved tracks and artists...");
    let tracks = match LibraryLoader::new(&client, &log).load(refresh).await {
        Ok(t) => t,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to load library. Err: {}", e)
        }
    };
    pb.finish_and_clear();

    let groups = group_by_genre(&tracks, threshold);
    if groups.is_empty() {
        info!("No genre has at least {} tracks.", threshold);
        return;
    }

    let rows: Vec<GenreTableRow> = groups
        .into_iter()
        .map(|g| GenreTableRow {
            genre: g.genre,
            tracks: g.tracks.len(),
        })
        .collect();

    println!("{}", Table::new(rows));
}
