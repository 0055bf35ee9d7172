use crate::{
    error::SpotifyResult,
    types::{MAX_SEARCH_LIMIT, SearchResponse, Track},
};

use super::{SpotifyClient, check};

impl SpotifyClient {
    /// Searches the catalog for tracks matching `query`.
    ///
    /// `limit` is clamped to the 1..=50 page size the endpoint accepts.
    /// Tracks come back in Spotify's relevance order.
    pub(crate) async fn search_tracks(
        &self,
        access_token: &str,
        query: &str,
        limit: u32,
    ) -> SpotifyResult<Vec<Track>> {
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT).to_string();
        let res = self
            .http_client
            .get(self.endpoint("search"))
            .bearer_auth(access_token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .send()
            .await?;

        let body: SearchResponse = check(res).await?.json().await?;
        Ok(body.tracks.items)
    }
}
