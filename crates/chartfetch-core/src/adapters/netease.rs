use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ensure_success, transport_error, DEFAULT_TIMEOUT_MS, DESKTOP_USER_AGENT};
use crate::chart_source::{settle, ChartRequest, ChartSource, FetchFuture};
use crate::crypto::weapi;
use crate::http_client::{HttpClient, HttpRequest};
use crate::{join_artists, rank_tracks, PlatformId, SourceError, TrackDraft, TrackRecord};

const PLATFORM: PlatformId = PlatformId::Netease;
const UPSTREAM_OK: i64 = 200;

/// Wire settings for the NetEase playlist detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeteaseConfig {
    pub base_url: String,
    pub user_agent: String,
    pub referer: String,
    pub timeout_ms: u64,
}

impl Default for NeteaseConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://music.163.com/weapi/v3/playlist/detail"),
            user_agent: String::from(DESKTOP_USER_AGENT),
            referer: String::from("https://music.163.com/"),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl NeteaseConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Plaintext body of a playlist detail call, before encryption.
///
/// Field order is part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistDetailPayload {
    pub id: String,
    pub offset: u32,
    pub total: bool,
    pub limit: u32,
    pub n: u32,
    pub csrf_token: String,
}

impl PlaylistDetailPayload {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            offset: 0,
            total: true,
            limit: 1000,
            n: 1000,
            csrf_token: String::new(),
        }
    }
}

/// Client for NetEase Cloud Music charts.
///
/// Charts are playlists. Every call encrypts a fresh
/// [`PlaylistDetailPayload`] into a weapi envelope and POSTs it as a form.
#[derive(Clone)]
pub struct NeteaseClient {
    http_client: Arc<dyn HttpClient>,
    config: NeteaseConfig,
    surface_failures: bool,
}

impl NeteaseClient {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            config: NeteaseConfig::default(),
            surface_failures: false,
        }
    }

    pub fn with_config(mut self, config: NeteaseConfig) -> Self {
        self.config = config;
        self
    }

    /// Return transport and parse failures instead of an empty list.
    pub fn surface_failures(mut self, enabled: bool) -> Self {
        self.surface_failures = enabled;
        self
    }

    pub fn config(&self) -> &NeteaseConfig {
        &self.config
    }

    fn build_request(&self, playlist_id: &str) -> Result<HttpRequest, SourceError> {
        let envelope = weapi(&PlaylistDetailPayload::new(playlist_id)).map_err(|error| {
            SourceError::internal(format!("netease payload encryption failed: {error}"))
        })?;

        Ok(HttpRequest::post(self.config.base_url.as_str())
            .with_header("user-agent", self.config.user_agent.as_str())
            .with_header("referer", self.config.referer.as_str())
            .with_form(&envelope.form_fields())
            .with_timeout_ms(self.config.timeout_ms))
    }

    async fn exchange(&self, req: &ChartRequest) -> Result<Vec<TrackRecord>, SourceError> {
        let request = self.build_request(req.chart_id.as_str())?;

        debug!(platform = PLATFORM.as_str(), chart_id = %req.chart_id, "posting playlist detail");
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(PLATFORM.as_str(), error))?;
        let body = ensure_success(PLATFORM.as_str(), response)?;

        let tracks = rank_tracks(parse_playlist(&body)?, req.limit);
        debug!(
            platform = PLATFORM.as_str(),
            chart_id = %req.chart_id,
            tracks = tracks.len(),
            "playlist parsed"
        );
        Ok(tracks)
    }
}

impl ChartSource for NeteaseClient {
    fn platform(&self) -> &str {
        PLATFORM.as_str()
    }

    fn fetch_top<'a>(&'a self, req: ChartRequest) -> FetchFuture<'a> {
        Box::pin(async move {
            let outcome = self.exchange(&req).await;
            settle(
                PLATFORM.as_str(),
                &req.chart_id,
                self.surface_failures,
                outcome,
            )
        })
    }
}

fn parse_playlist(body: &str) -> Result<Vec<TrackDraft>, SourceError> {
    let response: PlaylistResponse = serde_json::from_str(body)
        .map_err(|error| SourceError::parse(format!("failed to parse netease response: {error}")))?;

    if let Some(code) = response.code.filter(|code| *code != UPSTREAM_OK) {
        return Err(SourceError::empty_result(format!(
            "netease returned code {code}"
        )));
    }

    let tracks = response
        .playlist
        .and_then(|playlist| playlist.tracks)
        .ok_or_else(|| SourceError::parse("netease response has no playlist.tracks"))?;

    Ok(tracks
        .into_iter()
        .map(|track| {
            let artist = join_artists(
                track
                    .artists
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|artist| artist.name),
            );
            let album = track.album.and_then(|album| album.name).unwrap_or_default();
            TrackDraft::new(track.name.unwrap_or_default(), artist, album)
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct PlaylistResponse {
    code: Option<i64>,
    playlist: Option<Playlist>,
}

#[derive(Debug, Deserialize)]
struct Playlist {
    tracks: Option<Vec<PlaylistTrack>>,
}

#[derive(Debug, Deserialize)]
struct PlaylistTrack {
    name: Option<String>,
    #[serde(rename = "ar")]
    artists: Option<Vec<NamedRef>>,
    #[serde(rename = "al")]
    album: Option<NamedRef>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::RecordingHttpClient;
    use crate::crypto::ENC_SEC_KEY_WIDTH;
    use crate::http_client::{HttpError, HttpMethod, HttpResponse};
    use crate::{ChartId, SourceErrorKind};

    const PLAYLIST_BODY: &str = r#"{
        "code": 200,
        "playlist": {
            "id": 3778678,
            "tracks": [
                {"name": "孤勇者", "ar": [{"name": "陈奕迅"}], "al": {"name": "孤勇者"}},
                {"name": "合唱曲", "ar": [{"name": "A"}, {"name": "B"}], "al": {"name": "专辑"}},
                {"name": "无名", "ar": null, "al": null}
            ]
        }
    }"#;

    fn request(chart: &str, limit: usize) -> ChartRequest {
        ChartRequest::new(ChartId::parse(chart).expect("valid chart id"), limit)
            .expect("valid request")
    }

    fn form_value<'a>(body: &'a str, name: &str) -> Option<&'a str> {
        body.split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    #[test]
    fn payload_serializes_fields_in_wire_order() {
        let json = serde_json::to_string(&PlaylistDetailPayload::new("3778678"))
            .expect("payload serializes");
        assert_eq!(
            json,
            r#"{"id":"3778678","offset":0,"total":true,"limit":1000,"n":1000,"csrf_token":""}"#
        );
    }

    #[tokio::test]
    async fn posts_encrypted_form_with_required_headers() {
        let transport = Arc::new(RecordingHttpClient::replying(PLAYLIST_BODY));
        let client = NeteaseClient::new(transport.clone());

        client.fetch_top(request("3778678", 10)).await.expect("fetch");

        let requests = transport.recorded_requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.url, "https://music.163.com/weapi/v3/playlist/detail");
        assert_eq!(sent.header("referer"), Some("https://music.163.com/"));
        assert_eq!(sent.header("user-agent"), Some(DESKTOP_USER_AGENT));
        assert_eq!(
            sent.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );

        let body = sent.body.as_deref().expect("form body");
        assert!(body.starts_with("params="));
        assert!(form_value(body, "params").is_some_and(|params| !params.is_empty()));
        let enc_sec_key = form_value(body, "encSecKey").expect("encSecKey field");
        assert_eq!(enc_sec_key.len(), ENC_SEC_KEY_WIDTH);
    }

    #[tokio::test]
    async fn every_request_gets_a_fresh_envelope() {
        let transport = Arc::new(RecordingHttpClient::replying(PLAYLIST_BODY));
        let client = NeteaseClient::new(transport.clone());

        client.fetch_top(request("3778678", 1)).await.expect("first");
        client.fetch_top(request("3778678", 1)).await.expect("second");

        let requests = transport.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_ne!(requests[0].body, requests[1].body);
        assert_eq!(requests[0].headers, requests[1].headers);
    }

    #[tokio::test]
    async fn maps_tracks_joining_artists_and_truncating() {
        let client = NeteaseClient::new(Arc::new(RecordingHttpClient::replying(PLAYLIST_BODY)));

        let tracks = client.fetch_top(request("3778678", 10)).await.expect("fetch");
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].title(), "孤勇者");
        assert_eq!(tracks[1].artist(), "A / B");
        assert_eq!(tracks[2].artist(), "");
        assert_eq!(tracks[2].album(), "");

        let capped = client.fetch_top(request("3778678", 2)).await.expect("fetch");
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[1].rank(), 2);
    }

    #[tokio::test]
    async fn empty_track_array_is_an_empty_list() {
        let body = r#"{"code":200,"playlist":{"tracks":[]}}"#;
        let client = NeteaseClient::new(Arc::new(RecordingHttpClient::replying(body)))
            .surface_failures(true);

        let tracks = client.fetch_top(request("19723756", 10)).await.expect("fetch");
        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn zero_result_outcomes_never_raise_by_default() {
        let bodies = [
            Ok(HttpResponse::new(503, "busy")),
            Ok(HttpResponse::ok(r#"{"code":-460,"message":"cheating"}"#)),
            Ok(HttpResponse::ok(r#"{"code":200,"result":{}}"#)),
            Err(HttpError::new("timed out")),
        ];

        for response in bodies {
            let client = NeteaseClient::new(Arc::new(RecordingHttpClient::with_response(response)));
            let tracks = client
                .fetch_top(request("3778678", 10))
                .await
                .expect("swallowed");
            assert!(tracks.is_empty());
        }
    }

    #[tokio::test]
    async fn upstream_code_surfaces_as_empty_result() {
        let transport = RecordingHttpClient::with_response(Ok(HttpResponse::ok(
            r#"{"code":-460,"message":"cheating"}"#,
        )));
        let client = NeteaseClient::new(Arc::new(transport)).surface_failures(true);

        let error = client
            .fetch_top(request("3778678", 10))
            .await
            .expect_err("must surface");
        assert_eq!(error.kind(), SourceErrorKind::EmptyResult);
        assert!(error.message().contains("-460"));
    }
}
