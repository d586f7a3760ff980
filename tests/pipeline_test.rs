mod common;

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use serde_json::{Value, json};

use common::{
    API_URL, MockTransport, artist_json, client, ids, status_error, temp_dir, track_json,
};
use genrify::{
    http::Method,
    logging::Logger,
    pipeline::{
        Delivery, LibraryLoader, Pipeline, PipelineOptions, Sink, UNKNOWN_GENRE,
        managed_playlist_name, unique_artist_ids,
    },
    types::{ExportedGenre, Track},
};

/// Answers the batch endpoints: every track has one artist `a<n % 3>`, whose
/// genre is `g<n % 3>`.
fn library_handler(call: &common::Call) -> genrify::Res<Value> {
    match call.path.as_str() {
        "/tracks" => Ok(json!({
            "tracks": call.ids().iter().map(|id| {
                let n: usize = id.trim_start_matches('t').parse().unwrap();
                let artist = format!("a{}", n % 3);
                track_json(id, &[artist.as_str()])
            }).collect::<Vec<_>>()
        })),
        "/artists" => Ok(json!({
            "artists": call.ids().iter().map(|id| {
                let genre = format!("g{}", id.trim_start_matches('a'));
                artist_json(id, &[genre.as_str()])
            }).collect::<Vec<_>>()
        })),
        other => panic!("unexpected request {}", other),
    }
}

fn stub_tracks(specs: &[(&str, &[&str])]) -> Vec<Track> {
    specs
        .iter()
        .map(|(id, artists)| serde_json::from_value(track_json(id, artists)).unwrap())
        .collect()
}

#[tokio::test]
async fn test_fetch_tracks_in_chunks_of_fifty() {
    let mock = MockTransport::new(library_handler);
    let client = client(mock.clone(), &temp_dir("chunks"));
    let loader = LibraryLoader::new(&client, &Logger::root());

    let requested = ids("t", 130);
    let tracks = loader.fetch_tracks(&requested, false).await.unwrap();

    // Every id fetched once, order kept
    let fetched: Vec<String> = tracks.into_iter().map(|t| t.id).collect();
    assert_eq!(fetched, requested);

    // Chunks are in flight together, so they may reach the transport in any order
    let mut sizes: Vec<usize> = mock.calls().iter().map(|c| c.ids().len()).collect();
    sizes.sort();
    assert_eq!(sizes, vec![30, 50, 50]);

    let mut all: Vec<String> = mock.calls().iter().flat_map(|c| c.ids()).collect();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 130);
}

#[tokio::test]
async fn test_one_failing_chunk_fails_the_fetch() {
    let mock = MockTransport::new(|call| {
        if call.ids().contains(&"t75".to_string()) {
            return Err(status_error(call, 502));
        }
        library_handler(call)
    });
    let client = client(mock.clone(), &temp_dir("chunk-failure"));
    let loader = LibraryLoader::new(&client, &Logger::root());

    let result = loader.fetch_tracks(&ids("t", 130), false).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_saved_track_ids_skip_local_files() {
    let mock = MockTransport::new(|_| {
        Ok(json!({
            "items": [
                { "track": { "id": "t1" } },
                { "track": { "id": null } },
                { "track": { "id": "t2" } },
            ],
            "next": null,
        }))
    });
    let client = client(mock, &temp_dir("local-files"));
    let loader = LibraryLoader::new(&client, &Logger::root());

    assert_eq!(loader.saved_track_ids(false).await.unwrap(), vec!["t1", "t2"]);
}

#[test]
fn test_unique_artist_ids_first_seen_order() {
    let tracks = stub_tracks(&[("t1", &["b", "a"]), ("t2", &["a", "c"]), ("t3", &["b"])]);
    assert_eq!(unique_artist_ids(&tracks), vec!["b", "a", "c"]);
}

#[tokio::test]
async fn test_enrich_keeps_order_and_falls_back_for_missing_artists() {
    let mock = MockTransport::new(|_| Ok(Value::Null));
    let client = client(mock, &temp_dir("enrich"));
    let loader = LibraryLoader::new(&client, &Logger::root());

    let tracks = stub_tracks(&[("t1", &["a", "missing"]), ("t2", &["b"])]);
    let mut lookup = HashMap::new();
    lookup.insert("a".to_string(), common::artist("a", &["rock"]));
    lookup.insert("b".to_string(), common::artist("b", &["jazz", "soul"]));

    let enriched = loader.enrich(tracks, &lookup);

    assert_eq!(enriched.len(), 2);
    assert_eq!(enriched[0].id, "t1");
    assert_eq!(enriched[0].artists[0].genres, Some(vec!["rock".to_string()]));
    assert_eq!(enriched[0].artists[1].id, "missing");
    assert_eq!(enriched[0].artists[1].genres, None);
    assert_eq!(enriched[1].artists[0].genres.as_ref().unwrap().len(), 2);

    // The fallback artist ends up under Unknown
    let groups = genrify::pipeline::group_by_genre(&enriched, 1);
    assert!(groups.iter().any(|g| g.genre == UNKNOWN_GENRE && g.tracks[0].id == "t1"));
}

fn library_with_saved_tracks(
    count: usize,
) -> impl Fn(&common::Call) -> genrify::Res<Value> + Send + Sync + 'static {
    move |call: &common::Call| match call.path.as_str() {
        "/me/tracks?limit=50" => Ok(json!({
            "items": (0..count).map(|i| json!({ "track": { "id": format!("t{}", i) } })).collect::<Vec<_>>(),
            "next": null,
        })),
        _ => library_handler(call),
    }
}

#[tokio::test]
async fn test_export_pipeline_writes_groups() {
    let mock = MockTransport::new(library_with_saved_tracks(9));
    let client = client(mock.clone(), &temp_dir("export-cache"));
    let output = temp_dir("export").join("genres.json");

    let options = PipelineOptions {
        threshold: 3,
        ..PipelineOptions::export(&output)
    };
    let pipeline = Pipeline::new(&client, options, &Logger::root());

    match pipeline.run().await.unwrap() {
        Delivery::File(path) => assert_eq!(path, output),
        other => panic!("unexpected delivery {:?}", other),
    }

    let content = std::fs::read_to_string(&output).unwrap();
    let exported: Vec<ExportedGenre> = serde_json::from_str(&content).unwrap();

    let genres: Vec<&str> = exported.iter().map(|g| g.genre.as_str()).collect();
    assert_eq!(genres, vec!["g0", "g1", "g2"]);
    assert_eq!(exported[0].tracks.len(), 3);
    assert_eq!(exported[0].tracks[0].id, "t0");
    assert_eq!(exported[0].tracks[0].album, "Album t0");
    assert_eq!(exported[0].tracks[0].artists, vec!["Artist a0"]);

    // Saved tracks, one track batch, one artist batch
    assert_eq!(mock.calls().len(), 3);
}

#[tokio::test]
async fn test_playlist_pipeline_replaces_managed_playlists() {
    let library = library_with_saved_tracks(390);
    let mock = MockTransport::new(move |call| match (call.method, call.path.as_str()) {
        (Method::Get, "/me") => Ok(json!({ "id": "u1", "display_name": "Someone" })),
        (Method::Get, "/me/playlists?limit=50") => Ok(json!({
            "items": [
                { "id": "old", "name": "Genre: g0 (Automated)" },
                { "id": "mine", "name": "Road trip" },
            ],
            "next": format!("{}/me/playlists?offset=50&limit=50", API_URL),
        })),
        (Method::Get, "/me/playlists?offset=50&limit=50") => Ok(json!({
            "items": [{ "id": "older", "name": "Genre: g9 (Automated)" }],
            "next": null,
        })),
        (Method::Delete, _) => Ok(Value::Null),
        (Method::Post, "/users/u1/playlists") => {
            let name = call.body.as_ref().unwrap()["name"].as_str().unwrap().to_string();
            Ok(json!({ "id": format!("new-{}", name), "name": name }))
        }
        (Method::Post, _) => Ok(json!({ "snapshot_id": "s" })),
        _ => library(call),
    });
    let client = client(mock.clone(), &temp_dir("playlists"));

    let options = PipelineOptions {
        threshold: 130,
        mutation_delay: Duration::ZERO,
        ..PipelineOptions::playlists()
    };
    assert_eq!(options.sink, Sink::Playlist);
    let pipeline = Pipeline::new(&client, options, &Logger::root());

    let (unfollowed, created) = match pipeline.run().await.unwrap() {
        Delivery::Playlists { unfollowed, created } => (unfollowed, created),
        other => panic!("unexpected delivery {:?}", other),
    };

    // Only playlists carrying the prefix are unfollowed
    assert_eq!(unfollowed, 2);
    let deleted: Vec<String> = mock.calls_to(Method::Delete, "/").into_iter().map(|c| c.path).collect();
    assert_eq!(deleted, vec!["/playlists/old/followers", "/playlists/older/followers"]);

    let names: Vec<String> = created.into_iter().map(|p| p.name).collect();
    assert_eq!(
        names,
        vec![
            managed_playlist_name("Genre: ", "g0"),
            managed_playlist_name("Genre: ", "g1"),
            managed_playlist_name("Genre: ", "g2"),
        ]
    );

    // 130 tracks per genre are added as 100 + 30
    let additions = mock.calls_to(Method::Post, "/playlists/");
    let sizes: Vec<usize> = additions
        .iter()
        .map(|c| c.body.as_ref().unwrap()["uris"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![100, 30, 100, 30, 100, 30]);
}

#[tokio::test]
async fn test_keep_existing_skips_unfollow() {
    let library = library_with_saved_tracks(3);
    let mock = MockTransport::new(move |call| match (call.method, call.path.as_str()) {
        (Method::Get, "/me") => Ok(json!({ "id": "u1", "display_name": null })),
        (Method::Post, "/users/u1/playlists") => Ok(json!({ "id": "p", "name": "x" })),
        (Method::Post, _) => Ok(json!({ "snapshot_id": "s" })),
        (Method::Get, _) => library(call),
        other => panic!("unexpected request {:?}", other),
    });
    let client = client(mock.clone(), &temp_dir("keep-existing"));

    let options = PipelineOptions {
        threshold: 1,
        unfollow_existing: false,
        mutation_delay: Duration::ZERO,
        ..PipelineOptions::playlists()
    };
    Pipeline::new(&client, options, &Logger::root()).run().await.unwrap();

    assert!(mock.calls_to(Method::Get, "/me/playlists").is_empty());
    assert!(mock.calls_to(Method::Delete, "/").is_empty());
    assert_eq!(mock.calls_to(Method::Post, "/users/").len(), 3);
}

#[tokio::test]
async fn test_forced_rerun_sees_new_account_and_genres() {
    let generation = Arc::new(AtomicUsize::new(0));
    let current = generation.clone();
    let mock = MockTransport::new(move |call| {
        let n = current.load(Ordering::SeqCst);
        match (call.method, call.path.as_str()) {
            (Method::Get, "/me") => Ok(json!({ "id": format!("user{}", n), "display_name": null })),
            (Method::Get, "/me/tracks?limit=50") => Ok(json!({
                "items": [{ "track": { "id": "t1" } }, { "track": { "id": "t2" } }],
                "next": null,
            })),
            (Method::Get, "/tracks") => Ok(json!({
                "tracks": call.ids().iter().map(|id| track_json(id, &["a1"])).collect::<Vec<_>>()
            })),
            (Method::Get, "/artists") => {
                let genre = if n == 0 { "rock" } else { "jazz" };
                Ok(json!({ "artists": [artist_json("a1", &[genre])] }))
            }
            (Method::Post, path) if path.starts_with("/users/") => {
                let name = call.body.as_ref().unwrap()["name"].as_str().unwrap().to_string();
                Ok(json!({ "id": format!("p{}", n), "name": name }))
            }
            (Method::Post, _) => Ok(json!({ "snapshot_id": "s" })),
            other => panic!("unexpected request {:?}", other),
        }
    });
    let client = client(mock.clone(), &temp_dir("forced-rerun"));

    let options = PipelineOptions {
        threshold: 1,
        unfollow_existing: false,
        force_refresh: true,
        mutation_delay: Duration::ZERO,
        ..PipelineOptions::playlists()
    };
    let pipeline = Pipeline::new(&client, options, &Logger::root());

    pipeline.run().await.unwrap();

    // Another account whose artist now carries a different genre
    generation.store(1, Ordering::SeqCst);
    let created = match pipeline.run().await.unwrap() {
        Delivery::Playlists { created, .. } => created,
        other => panic!("unexpected delivery {:?}", other),
    };

    let names: Vec<String> = created.into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec![managed_playlist_name("Genre: ", "jazz")]);

    let create_paths: Vec<String> = mock
        .calls_to(Method::Post, "/users/")
        .into_iter()
        .map(|c| c.path)
        .collect();
    assert_eq!(create_paths, vec!["/users/user0/playlists", "/users/user1/playlists"]);

    // Every lookup of both runs reached the transport
    assert_eq!(mock.calls().iter().filter(|c| c.path == "/me").count(), 2);
    assert_eq!(mock.calls_to(Method::Get, "/tracks").len(), 2);
    assert_eq!(mock.calls_to(Method::Get, "/artists").len(), 2);
}
