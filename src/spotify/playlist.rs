use crate::{
    error::SpotifyResult,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, CreatedPlaylist, CurrentUser,
    },
};

use super::{SpotifyClient, check};

impl SpotifyClient {
    pub(crate) async fn current_user(&self, access_token: &str) -> SpotifyResult<CurrentUser> {
        let res = self
            .http_client
            .get(self.endpoint("me"))
            .bearer_auth(access_token)
            .send()
            .await?;

        Ok(check(res).await?.json().await?)
    }

    /// Creates an empty playlist owned by `owner_id`.
    pub(crate) async fn create_user_playlist(
        &self,
        access_token: &str,
        owner_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> SpotifyResult<CreatedPlaylist> {
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public,
            collaborative: false,
        };

        let res = self
            .http_client
            .post(self.endpoint(&format!("users/{owner_id}/playlists")))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        let created: CreatePlaylistResponse = check(res).await?.json().await?;
        Ok(CreatedPlaylist {
            id: created.id,
            name: created.name,
            url: created.external_urls.spotify,
        })
    }

    /// Appends tracks to a playlist. Spotify accepts at most 100 URIs per call.
    pub(crate) async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> SpotifyResult<()> {
        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };

        let res = self
            .http_client
            .post(self.endpoint(&format!("playlists/{playlist_id}/tracks")))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        let _: AddTrackToPlaylistResponse = check(res).await?.json().await?;
        Ok(())
    }
}
