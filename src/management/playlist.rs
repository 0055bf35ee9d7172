use std::sync::Arc;

use crate::{
    error::AssemblyError,
    spotify::MusicService,
    types::{Credential, PlaylistOutcome, PlaylistRequest},
    utils, warning,
};

/// Spotify accepts at most 100 URIs per add-items call.
const ADD_ITEMS_CHUNK: usize = 100;

/// Longest playlist name Spotify displays without truncation.
const MAX_PLAYLIST_NAME_CHARS: usize = 100;

/// Room left for the query inside Spotify's 300 character description.
const MAX_DESCRIPTION_QUERY_CHARS: usize = 200;

/// Turns a parsed request into a populated playlist.
///
/// Runs refresh → search → create → add against the music service. The
/// caller owns the credential and must hold the session lock while this
/// runs; a refreshed credential is written straight into it.
pub struct PlaylistAssembler {
    music: Arc<dyn MusicService>,
    public: bool,
}

impl PlaylistAssembler {
    pub fn new(music: Arc<dyn MusicService>, public: bool) -> Self {
        Self { music, public }
    }

    pub async fn build_playlist(
        &self,
        credential: &mut Credential,
        request: &PlaylistRequest,
    ) -> Result<PlaylistOutcome, AssemblyError> {
        if credential.is_expired() {
            match self.music.refresh(&credential.refresh_token).await {
                Ok(refreshed) => *credential = refreshed,
                Err(e) => {
                    warning!("Token refresh failed: {}", e);
                    return Err(AssemblyError::AuthExpired);
                }
            }
        }
        let token = credential.access_token.as_str();

        let tracks = self.music.search(token, &request.query, request.limit()).await?;
        if tracks.is_empty() {
            return Ok(PlaylistOutcome::NoResults);
        }

        let user = self.music.who_am_i(token).await?;
        let name = utils::truncate_chars(&request.query, MAX_PLAYLIST_NAME_CHARS);
        let description = format!(
            "{} tracks for \"{}\"",
            tracks.len(),
            utils::excerpt(&request.query, MAX_DESCRIPTION_QUERY_CHARS)
        );
        let playlist = self
            .music
            .create_playlist(token, &user.id, &name, &description, self.public)
            .await?;

        let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();
        let mut added = 0;
        for chunk in uris.chunks(ADD_ITEMS_CHUNK) {
            if let Err(e) = self.music.add_items(token, &playlist.id, chunk).await {
                return Err(AssemblyError::PartialPlaylistFailure {
                    url: playlist.url,
                    added,
                    expected: uris.len(),
                    source: e,
                });
            }
            added += chunk.len();
        }

        Ok(PlaylistOutcome::Created {
            playlist,
            tracks: added,
        })
    }
}
