use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::{ensure_success, transport_error, DEFAULT_TIMEOUT_MS, DESKTOP_USER_AGENT};
use crate::chart_source::{settle, ChartRequest, ChartSource, FetchFuture};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{rank_tracks, PlatformId, SourceError, TrackDraft, TrackRecord, UNKNOWN_ARTIST};

const PLATFORM: PlatformId = PlatformId::Kugou;

/// Start of the `global.features = [...]` assignment. The array is read by
/// the JSON parser from there.
static FEATURES_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"global\.features\s*=\s*")
        .unwrap_or_else(|e| panic!("BUG: invalid features regex pattern: {e}"))
});

/// Wire settings for the Kugou rank pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KugouConfig {
    pub base_url: String,
    pub user_agent: String,
    pub referer: String,
    pub timeout_ms: u64,
}

impl Default for KugouConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://www.kugou.com/yy/rank/home"),
            user_agent: String::from(DESKTOP_USER_AGENT),
            referer: String::from("https://www.kugou.com/"),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl KugouConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn page_url(&self, list_id: &str) -> String {
        format!(
            "{}/1-{}.html",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(list_id)
        )
    }
}

/// Client that scrapes Kugou rank pages.
///
/// The chart is embedded in the page as a `global.features = [...];`
/// assignment; each entry names its song as `"Artist - Title"`.
#[derive(Clone)]
pub struct KugouClient {
    http_client: Arc<dyn HttpClient>,
    config: KugouConfig,
    surface_failures: bool,
}

impl KugouClient {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            config: KugouConfig::default(),
            surface_failures: false,
        }
    }

    pub fn with_config(mut self, config: KugouConfig) -> Self {
        self.config = config;
        self
    }

    /// Return transport and parse failures instead of an empty list.
    pub fn surface_failures(mut self, enabled: bool) -> Self {
        self.surface_failures = enabled;
        self
    }

    pub fn config(&self) -> &KugouConfig {
        &self.config
    }

    async fn exchange(&self, req: &ChartRequest) -> Result<Vec<TrackRecord>, SourceError> {
        let request = HttpRequest::get(self.config.page_url(req.chart_id.as_str()))
            .with_header("user-agent", self.config.user_agent.as_str())
            .with_header("referer", self.config.referer.as_str())
            .with_timeout_ms(self.config.timeout_ms);

        debug!(platform = PLATFORM.as_str(), url = %request.url, "requesting rank page");
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(PLATFORM.as_str(), error))?;
        let html = ensure_success(PLATFORM.as_str(), response)?;

        let features = extract_features(&html)?;
        let tracks = rank_tracks(features.into_iter().map(Feature::into_draft), req.limit);
        debug!(
            platform = PLATFORM.as_str(),
            chart_id = %req.chart_id,
            tracks = tracks.len(),
            "rank page parsed"
        );
        Ok(tracks)
    }
}

impl ChartSource for KugouClient {
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

/// Splits a Kugou `FileName` into `(artist, title)` on the first `" - "`.
///
/// Without a separator the whole name is the title and the artist is
/// [`UNKNOWN_ARTIST`].
pub fn split_file_name(file_name: &str) -> (String, String) {
    let parts = file_name
        .splitn(2, " - ")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>();

    match parts.as_slice() {
        [artist, title] => ((*artist).to_owned(), (*title).to_owned()),
        [title] => (UNKNOWN_ARTIST.to_owned(), (*title).to_owned()),
        _ => (UNKNOWN_ARTIST.to_owned(), String::new()),
    }
}

fn extract_features(html: &str) -> Result<Vec<Feature>, SourceError> {
    let assignment = FEATURES_ASSIGNMENT
        .find(html)
        .ok_or_else(|| SourceError::parse("kugou page has no global.features array"))?;

    serde_json::Deserializer::from_str(&html[assignment.end()..])
        .into_iter::<Vec<Feature>>()
        .next()
        .ok_or_else(|| SourceError::parse("kugou global.features has no value"))?
        .map_err(|error| SourceError::parse(format!("failed to parse kugou features: {error}")))
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(rename = "FileName")]
    file_name: Option<String>,
    album_name: Option<String>,
}

impl Feature {
    fn into_draft(self) -> TrackDraft {
        let (artist, title) = split_file_name(self.file_name.as_deref().unwrap_or_default());
        TrackDraft::new(title, artist, self.album_name.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::RecordingHttpClient;
    use crate::http_client::HttpResponse;
    use crate::{ChartId, SourceErrorKind};

    fn page(features: &str) -> String {
        format!(
            "<html><script>\nvar global = global || {{}};\nglobal.features = {features};\nglobal.other = [1];\n</script></html>"
        )
    }

    fn request(chart: &str, limit: usize) -> ChartRequest {
        ChartRequest::new(ChartId::parse(chart).expect("valid chart id"), limit)
            .expect("valid request")
    }

    #[test]
    fn splits_artist_and_title_on_first_separator() {
        assert_eq!(
            split_file_name("Artist - Title"),
            (String::from("Artist"), String::from("Title"))
        );
        assert_eq!(
            split_file_name("A - B - C"),
            (String::from("A"), String::from("B - C"))
        );
    }

    #[test]
    fn name_without_separator_uses_unknown_artist() {
        assert_eq!(
            split_file_name("SoloTitleOnly"),
            (String::from(UNKNOWN_ARTIST), String::from("SoloTitleOnly"))
        );
        assert_eq!(
            split_file_name("Artist-Title"),
            (String::from(UNKNOWN_ARTIST), String::from("Artist-Title"))
        );
    }

    #[test]
    fn extraction_reads_only_the_features_array() {
        let html = page(r#"[{"FileName":"a - b"}]"#);
        let features = extract_features(&html).expect("features");
        assert_eq!(features.len(), 1);
    }

    #[tokio::test]
    async fn brackets_inside_file_names_do_not_end_the_array() {
        let html = page(
            r#"[{"FileName":"Artist - Mix [Live];Edit","album_name":"x];y"},{"FileName":"B - C"}]"#,
        );
        let client = KugouClient::new(Arc::new(RecordingHttpClient::replying(html)))
            .surface_failures(true);

        let tracks = client.fetch_top(request("8888", 10)).await.expect("fetch");

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title(), "Mix [Live];Edit");
        assert_eq!(tracks[0].album(), "x];y");
        assert_eq!(tracks[1].artist(), "B");
    }

    #[test]
    fn truncated_features_array_is_a_parse_error() {
        let html = "<script>global.features = [{\"FileName\":\"a - b\"}";
        let error = extract_features(html).expect_err("unterminated array");
        assert_eq!(error.kind(), SourceErrorKind::Parse);
    }

    #[tokio::test]
    async fn maps_features_with_album_and_caps_at_limit() {
        let html = page(
            r#"[
                {"FileName":"周杰伦 - 晴天","album_name":"叶惠美"},
                {"FileName":"纯音乐","album_name":""},
                {"FileName":"林俊杰 - 江南"}
            ]"#,
        );
        let transport = Arc::new(RecordingHttpClient::replying(html));
        let client = KugouClient::new(transport.clone());

        let tracks = client.fetch_top(request("8888", 2)).await.expect("fetch");

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].artist(), "周杰伦");
        assert_eq!(tracks[0].title(), "晴天");
        assert_eq!(tracks[0].album(), "叶惠美");
        assert_eq!(tracks[1].artist(), UNKNOWN_ARTIST);
        assert_eq!(tracks[1].rank(), 2);

        let requests = transport.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://www.kugou.com/yy/rank/home/1-8888.html"
        );
        assert_eq!(requests[0].header("user-agent"), Some(DESKTOP_USER_AGENT));
    }

    #[tokio::test]
    async fn page_without_features_is_swallowed_or_surfaced() {
        let html = "<html><body>no chart here</body></html>";

        let quiet = KugouClient::new(Arc::new(RecordingHttpClient::replying(html)));
        assert!(quiet
            .fetch_top(request("8888", 10))
            .await
            .expect("swallowed")
            .is_empty());

        let loud = KugouClient::new(Arc::new(RecordingHttpClient::replying(html)))
            .surface_failures(true);
        let error = loud
            .fetch_top(request("8888", 10))
            .await
            .expect_err("must surface");
        assert_eq!(error.kind(), SourceErrorKind::Parse);
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_failure() {
        let transport = RecordingHttpClient::with_response(Ok(HttpResponse::new(404, "")));
        let client = KugouClient::new(Arc::new(transport)).surface_failures(true);

        let error = client
            .fetch_top(request("6666", 10))
            .await
            .expect_err("must surface");
        assert_eq!(error.kind(), SourceErrorKind::Transport);
        assert!(error.message().contains("404"));
    }
}
