mod common;

use std::sync::{Arc, atomic::Ordering};

use common::{FakeMusic, expired_credential, fresh_credential};
use playlistbot::error::AssemblyError;
use playlistbot::management::PlaylistAssembler;
use playlistbot::types::{PlaylistOutcome, PlaylistRequest};

fn request(query: &str, count: u32) -> PlaylistRequest {
    PlaylistRequest {
        query: query.to_string(),
        count,
    }
}

#[tokio::test]
async fn test_build_playlist_runs_all_steps_in_order() {
    let music = Arc::new(FakeMusic::with_tracks(30));
    let assembler = PlaylistAssembler::new(music.clone(), true);
    let mut credential = fresh_credential("tok");

    let outcome = assembler
        .build_playlist(&mut credential, &request("80s rock", 25))
        .await
        .unwrap();

    match outcome {
        PlaylistOutcome::Created { playlist, tracks } => {
            assert_eq!(tracks, 25);
            assert_eq!(playlist.name, "80s rock");
            assert_eq!(playlist.url, "https://open.spotify.com/playlist/pl-user-tok");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert_eq!(
        music.calls(),
        vec![
            "search:tok:80s rock:25".to_string(),
            "who_am_i:tok".to_string(),
            "create:tok:user-tok:80s rock:true".to_string(),
            "add:tok:pl-user-tok:25".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_count_is_clamped_before_search() {
    let music = Arc::new(FakeMusic::with_tracks(80));
    let assembler = PlaylistAssembler::new(music.clone(), false);
    let mut credential = fresh_credential("tok");

    assembler
        .build_playlist(&mut credential, &request("jazz", 500))
        .await
        .unwrap();

    let calls = music.calls();
    assert_eq!(calls[0], "search:tok:jazz:50");
    assert_eq!(calls[2], "create:tok:user-tok:jazz:false");
}

#[tokio::test]
async fn test_expired_credential_is_refreshed_and_written_back() {
    let music = Arc::new(FakeMusic::with_tracks(3));
    let assembler = PlaylistAssembler::new(music.clone(), true);
    let mut credential = expired_credential("old");

    assembler
        .build_playlist(&mut credential, &request("kpop", 3))
        .await
        .unwrap();

    assert_eq!(credential.access_token, "refreshed");
    assert!(!credential.is_expired());
    let calls = music.calls();
    assert_eq!(calls[0], "refresh:refresh-old");
    assert_eq!(calls[1], "search:refreshed:kpop:3");
}

#[tokio::test]
async fn test_failed_refresh_returns_auth_expired_without_search() {
    let music = Arc::new(FakeMusic::with_tracks(3));
    music.refresh_fails.store(true, Ordering::SeqCst);
    let assembler = PlaylistAssembler::new(music.clone(), true);
    let mut credential = expired_credential("old");

    let result = assembler
        .build_playlist(&mut credential, &request("kpop", 3))
        .await;

    assert!(matches!(result, Err(AssemblyError::AuthExpired)));
    assert!(!music.called("search"));
    assert_eq!(credential.access_token, "old");
}

#[tokio::test]
async fn test_no_results_skips_playlist_creation() {
    let music = Arc::new(FakeMusic::with_tracks(0));
    let assembler = PlaylistAssembler::new(music.clone(), true);
    let mut credential = fresh_credential("tok");

    let outcome = assembler
        .build_playlist(&mut credential, &request("nothing matches this", 20))
        .await
        .unwrap();

    assert_eq!(outcome, PlaylistOutcome::NoResults);
    assert!(!music.called("create"));
    assert!(!music.called("add"));
}

#[tokio::test]
async fn test_search_failure_is_remote_unavailable() {
    let music = Arc::new(FakeMusic::with_tracks(3));
    music.search_fails.store(true, Ordering::SeqCst);
    let assembler = PlaylistAssembler::new(music.clone(), true);
    let mut credential = fresh_credential("tok");

    let result = assembler
        .build_playlist(&mut credential, &request("kpop", 3))
        .await;

    assert!(matches!(result, Err(AssemblyError::RemoteUnavailable(_))));
    assert!(!music.called("create"));
}

#[tokio::test]
async fn test_rejected_token_is_auth_expired() {
    let music = Arc::new(FakeMusic::with_tracks(3));
    music.search_unauthorized.store(true, Ordering::SeqCst);
    let assembler = PlaylistAssembler::new(music.clone(), true);
    let mut credential = fresh_credential("revoked");

    let result = assembler
        .build_playlist(&mut credential, &request("kpop", 3))
        .await;

    assert!(matches!(result, Err(AssemblyError::AuthExpired)));
}

#[tokio::test]
async fn test_create_failure_is_remote_unavailable() {
    let music = Arc::new(FakeMusic::with_tracks(3));
    music.create_fails.store(true, Ordering::SeqCst);
    let assembler = PlaylistAssembler::new(music.clone(), true);
    let mut credential = fresh_credential("tok");

    let result = assembler
        .build_playlist(&mut credential, &request("kpop", 3))
        .await;

    assert!(matches!(result, Err(AssemblyError::RemoteUnavailable(_))));
    assert!(!music.called("add"));
}

#[tokio::test]
async fn test_add_failure_is_partial_playlist_failure() {
    let music = Arc::new(FakeMusic::with_tracks(10));
    music.add_fails.store(true, Ordering::SeqCst);
    let assembler = PlaylistAssembler::new(music.clone(), true);
    let mut credential = fresh_credential("tok");

    let result = assembler
        .build_playlist(&mut credential, &request("kpop", 10))
        .await;

    match result {
        Err(AssemblyError::PartialPlaylistFailure {
            url,
            added,
            expected,
            ..
        }) => {
            assert_eq!(url, "https://open.spotify.com/playlist/pl-user-tok");
            assert_eq!(added, 0);
            assert_eq!(expected, 10);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_long_query_is_truncated_for_playlist_name() {
    let music = Arc::new(FakeMusic::with_tracks(1));
    let assembler = PlaylistAssembler::new(music.clone(), true);
    let mut credential = fresh_credential("tok");
    let query = "a".repeat(150);

    let outcome = assembler
        .build_playlist(&mut credential, &request(&query, 1))
        .await
        .unwrap();

    match outcome {
        PlaylistOutcome::Created { playlist, .. } => assert_eq!(playlist.name.len(), 100),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_description_is_single_line_and_bounded() {
    let music = Arc::new(FakeMusic::with_tracks(2));
    let assembler = PlaylistAssembler::new(music.clone(), true);
    let mut credential = fresh_credential("tok");
    let query = format!("kpop\nand\r\nmore {}", "b".repeat(4000));

    assembler
        .build_playlist(&mut credential, &request(&query, 2))
        .await
        .unwrap();

    let descriptions = music.descriptions.lock().unwrap();
    assert_eq!(descriptions.len(), 1);
    assert!(descriptions[0].starts_with("2 tracks for \"kpop and more b"));
    assert!(!descriptions[0].contains('\n'));
    assert!(!descriptions[0].contains('\r'));
    assert!(descriptions[0].chars().count() <= 300);
}
