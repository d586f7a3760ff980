use std::path::Path;

use crate::{
    Res,
    types::{ExportedGenre, ExportedTrack, GenreGroup},
};

pub fn to_export(groups: &[GenreGroup]) -> Vec<ExportedGenre> {
    groups
        .iter()
        .map(|group| ExportedGenre {
            genre: group.genre.clone(),
            tracks: group
                .tracks
                .iter()
                .map(|track| ExportedTrack {
                    id: track.id.clone(),
                    name: track.name.clone(),
                    uri: track.uri.clone(),
                    album: track.album.name.clone(),
                    artists: track.artists.iter().map(|a| a.name.clone()).collect(),
                })
                .collect(),
        })
        .collect()
}

/// Writes `groups` to `path` as pretty-printed JSON, creating parent directories.
pub async fn write_groups(path: &Path, groups: &[GenreGroup]) -> Res<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        async_fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(&to_export(groups))?;
    async_fs::write(path, json).await?;
    Ok(())
}
