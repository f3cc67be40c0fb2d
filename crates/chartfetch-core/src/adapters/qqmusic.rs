use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use super::{ensure_success, transport_error, DEFAULT_TIMEOUT_MS, DESKTOP_USER_AGENT};
use crate::chart_source::{settle, ChartRequest, ChartSource, FetchFuture};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{
    join_artists, rank_tracks, PlatformId, SourceError, TrackDraft, TrackRecord, ValidationError,
};

const PLATFORM: PlatformId = PlatformId::QqMusic;

/// Wire settings for the QQ Music toplist endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QqMusicConfig {
    pub base_url: String,
    pub user_agent: String,
    pub referer: String,
    pub timeout_ms: u64,
}

impl Default for QqMusicConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://u.y.qq.com/cgi-bin/musicu.fcg"),
            user_agent: String::from(DESKTOP_USER_AGENT),
            referer: String::from("https://y.qq.com/"),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl QqMusicConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Client for QQ Music charts.
///
/// Chart ids are integers. The whole request travels as URL-encoded JSON in
/// the `data` query parameter of a single GET.
#[derive(Clone)]
pub struct QqMusicClient {
    http_client: Arc<dyn HttpClient>,
    config: QqMusicConfig,
    surface_failures: bool,
}

impl QqMusicClient {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            config: QqMusicConfig::default(),
            surface_failures: false,
        }
    }

    pub fn with_config(mut self, config: QqMusicConfig) -> Self {
        self.config = config;
        self
    }

    /// Return transport and parse failures instead of an empty list.
    pub fn surface_failures(mut self, enabled: bool) -> Self {
        self.surface_failures = enabled;
        self
    }

    pub fn config(&self) -> &QqMusicConfig {
        &self.config
    }

    fn build_request(
        &self,
        top_id: i64,
        limit: usize,
        now: OffsetDateTime,
    ) -> Result<HttpRequest, SourceError> {
        let date = now.date();
        let period = format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        );
        let query = ToplistQuery::new(top_id, limit, &period);
        let data = serde_json::to_string(&query).map_err(|error| {
            SourceError::internal(format!("qqmusic request serialization failed: {error}"))
        })?;
        let millis = now.unix_timestamp_nanos() / 1_000_000;

        let url = format!(
            "{}?_={millis}&data={}",
            self.config.base_url,
            urlencoding::encode(&data)
        );

        Ok(HttpRequest::get(url)
            .with_header("user-agent", self.config.user_agent.as_str())
            .with_header("referer", self.config.referer.as_str())
            .with_timeout_ms(self.config.timeout_ms))
    }

    async fn exchange(&self, top_id: i64, limit: usize) -> Result<Vec<TrackRecord>, SourceError> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let request = self.build_request(top_id, limit, now)?;

        debug!(platform = PLATFORM.as_str(), top_id, limit, "requesting toplist");
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(PLATFORM.as_str(), error))?;
        let body = ensure_success(PLATFORM.as_str(), response)?;

        let tracks = rank_tracks(parse_toplist(&body)?, limit);
        debug!(platform = PLATFORM.as_str(), top_id, tracks = tracks.len(), "toplist parsed");
        Ok(tracks)
    }
}

impl ChartSource for QqMusicClient {
    fn platform(&self) -> &str {
        PLATFORM.as_str()
    }

    fn fetch_top<'a>(&'a self, req: ChartRequest) -> FetchFuture<'a> {
        Box::pin(async move {
            let top_id = req.chart_id.as_integer().ok_or_else(|| {
                SourceError::from(ValidationError::NonNumericChartId {
                    platform: PLATFORM.as_str(),
                    value: req.chart_id.as_str().to_owned(),
                })
            })?;

            let outcome = self.exchange(top_id, req.limit).await;
            settle(
                PLATFORM.as_str(),
                &req.chart_id,
                self.surface_failures,
                outcome,
            )
        })
    }
}

fn parse_toplist(body: &str) -> Result<Vec<TrackDraft>, SourceError> {
    let response: ToplistResponse = serde_json::from_str(body)
        .map_err(|error| SourceError::parse(format!("failed to parse qqmusic response: {error}")))?;

    if response.code != 0 {
        return Err(SourceError::empty_result(format!(
            "qqmusic returned code {}",
            response.code
        )));
    }

    let data = response
        .detail
        .and_then(|detail| detail.data)
        .ok_or_else(|| SourceError::parse("qqmusic response has no detail.data"))?;

    if let Some(songs) = data.data.and_then(|toplist| toplist.song) {
        return Ok(songs
            .into_iter()
            .map(|song| {
                TrackDraft::new(
                    decode_text(song.title),
                    decode_text(song.singer_name),
                    String::new(),
                )
            })
            .collect());
    }

    if let Some(songs) = data.song_info_list {
        return Ok(songs
            .into_iter()
            .map(|song| {
                let artist = join_artists(
                    song.singer
                        .into_iter()
                        .map(|singer| decode_text(singer.name)),
                );
                let album = song.album.and_then(|album| album.name).unwrap_or_default();
                TrackDraft::new(decode_text(song.name), artist, album)
            })
            .collect());
    }

    Err(SourceError::parse(
        "qqmusic response carries neither data.song nor songInfoList",
    ))
}

fn decode_text(value: Option<String>) -> String {
    let value = value.unwrap_or_default();
    html_escape::decode_html_entities(value.trim()).into_owned()
}

#[derive(Debug, Serialize)]
struct ToplistQuery<'a> {
    comm: CommonParams,
    detail: ModuleCall<'a>,
}

impl<'a> ToplistQuery<'a> {
    fn new(top_id: i64, limit: usize, period: &'a str) -> Self {
        Self {
            comm: CommonParams::default(),
            detail: ModuleCall {
                module: "musicToplist.ToplistInfoServer",
                method: "GetDetail",
                param: ToplistParam {
                    top_id,
                    offset: 0,
                    num: limit,
                    period,
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct CommonParams {
    cv: u32,
    ct: u32,
    format: &'static str,
    #[serde(rename = "inCharset")]
    in_charset: &'static str,
    #[serde(rename = "outCharset")]
    out_charset: &'static str,
    notice: u8,
    platform: &'static str,
    #[serde(rename = "needNewCode")]
    need_new_code: u8,
    uin: u64,
    g_tk_new_20200303: u32,
    g_tk: u32,
}

impl Default for CommonParams {
    fn default() -> Self {
        Self {
            cv: 4_747_474,
            ct: 24,
            format: "json",
            in_charset: "utf-8",
            out_charset: "utf-8",
            notice: 0,
            platform: "yqq.json",
            need_new_code: 1,
            uin: 0,
            g_tk_new_20200303: 5381,
            g_tk: 5381,
        }
    }
}

#[derive(Debug, Serialize)]
struct ModuleCall<'a> {
    module: &'static str,
    method: &'static str,
    param: ToplistParam<'a>,
}

#[derive(Debug, Serialize)]
struct ToplistParam<'a> {
    #[serde(rename = "topId")]
    top_id: i64,
    offset: u32,
    num: usize,
    period: &'a str,
}

#[derive(Debug, Deserialize)]
struct ToplistResponse {
    #[serde(default)]
    code: i64,
    detail: Option<DetailEnvelope>,
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    data: Option<DetailData>,
}

#[derive(Debug, Deserialize)]
struct DetailData {
    data: Option<ToplistData>,
    #[serde(rename = "songInfoList")]
    song_info_list: Option<Vec<LegacySong>>,
}

#[derive(Debug, Deserialize)]
struct ToplistData {
    song: Option<Vec<ToplistSong>>,
}

#[derive(Debug, Deserialize)]
struct ToplistSong {
    title: Option<String>,
    #[serde(rename = "singerName")]
    singer_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacySong {
    name: Option<String>,
    #[serde(default)]
    singer: Vec<NamedRef>,
    album: Option<NamedRef>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: Option<String>,
}
