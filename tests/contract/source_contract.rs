use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use chartfetch_core::{
    ChartId, ChartRequest, ChartSource, HttpClient, HttpError, HttpFuture, HttpRequest,
    HttpResponse, KugouClient, NeteaseClient, PlatformId, QqMusicClient, SourceErrorKind,
    TrackRecord, UNKNOWN_ARTIST,
};

const QQ_TOPLIST: &str = include_str!("../fixtures/qqmusic_toplist.json");
const KUGOU_PAGE: &str = include_str!("../fixtures/kugou_rank_page.html");
const NETEASE_PLAYLIST: &str = include_str!("../fixtures/netease_playlist.json");

const FIXTURE_TRACKS: usize = 12;

/// Replies to every request with the same canned response.
struct CannedTransport(Result<HttpResponse, HttpError>);

impl HttpClient for CannedTransport {
    fn execute<'a>(&'a self, _request: HttpRequest) -> HttpFuture<'a> {
        let response = self.0.clone();
        Box::pin(async move { response })
    }
}

#[derive(Clone)]
struct SourceCase {
    id: PlatformId,
    chart: &'static str,
    source: Arc<dyn ChartSource>,
}

fn source_cases(
    transport: impl Fn(PlatformId) -> Arc<dyn HttpClient>,
    surface_failures: bool,
) -> Vec<SourceCase> {
    vec![
        SourceCase {
            id: PlatformId::QqMusic,
            chart: "26",
            source: Arc::new(
                QqMusicClient::new(transport(PlatformId::QqMusic))
                    .surface_failures(surface_failures),
            ),
        },
        SourceCase {
            id: PlatformId::Kugou,
            chart: "8888",
            source: Arc::new(
                KugouClient::new(transport(PlatformId::Kugou)).surface_failures(surface_failures),
            ),
        },
        SourceCase {
            id: PlatformId::Netease,
            chart: "3778678",
            source: Arc::new(
                NeteaseClient::new(transport(PlatformId::Netease))
                    .surface_failures(surface_failures),
            ),
        },
    ]
}

fn fixture_cases() -> Vec<SourceCase> {
    source_cases(
        |platform| {
            let body = match platform {
                PlatformId::QqMusic => QQ_TOPLIST,
                PlatformId::Kugou => KUGOU_PAGE,
                PlatformId::Netease => NETEASE_PLAYLIST,
            };
            Arc::new(CannedTransport(Ok(HttpResponse::ok(body))))
        },
        false,
    )
}

fn request(chart: &str, limit: usize) -> ChartRequest {
    ChartRequest::new(ChartId::parse(chart).expect("valid chart id"), limit)
        .expect("valid chart request")
}

fn assert_ranked(tracks: &[TrackRecord], limit: usize, context: &str) {
    assert!(
        tracks.len() <= limit,
        "{context}: {} tracks exceed limit {limit}",
        tracks.len()
    );
    for (index, track) in tracks.iter().enumerate() {
        assert_eq!(track.rank() as usize, index + 1, "{context}: rank sequence");
    }
}

#[test]
fn every_source_respects_limit_and_ranks_from_one() {
    for case in fixture_cases() {
        for limit in [1, 5, FIXTURE_TRACKS, 100] {
            let tracks = block_on(case.source.fetch_top(request(case.chart, limit)))
                .unwrap_or_else(|error| panic!("source '{}' failed: {error}", case.id));

            let context = format!("source '{}' limit {limit}", case.id);
            assert_ranked(&tracks, limit, &context);
            assert_eq!(tracks.len(), limit.min(FIXTURE_TRACKS), "{context}: count");
        }
    }
}

#[test]
fn every_source_reports_its_registry_key() {
    for case in fixture_cases() {
        assert_eq!(case.source.platform(), case.id.as_str());
    }
}

#[test]
fn every_source_yields_the_same_leading_track() {
    for case in fixture_cases() {
        let tracks = block_on(case.source.fetch_top(request(case.chart, 1)))
            .unwrap_or_else(|error| panic!("source '{}' failed: {error}", case.id));

        assert_eq!(tracks[0].title(), "晴天", "source '{}': title", case.id);
        assert_eq!(tracks[0].artist(), "周杰伦", "source '{}': artist", case.id);
    }
}

#[test]
fn album_and_artist_conventions_per_source() {
    let cases = fixture_cases();
    let fetch = |index: usize| {
        let case = &cases[index];
        block_on(case.source.fetch_top(request(case.chart, 100))).expect("fixture fetch")
    };

    let qq = fetch(0);
    assert!(qq.iter().all(|track| track.album().is_empty()));
    assert_eq!(qq[10].title(), "Rock & Roll");

    let kugou = fetch(1);
    assert_eq!(kugou[0].album(), "叶惠美");
    assert_eq!(kugou[8].artist(), UNKNOWN_ARTIST);
    assert_eq!(kugou[8].title(), "起风了");

    let netease = fetch(2);
    assert_eq!(netease[3].artist(), "陈奕迅 / Feat");
    assert_eq!(netease[5].title(), "Hello, World");
    assert_eq!(netease[5].album(), "Hello,world! / コントレイル");
}

#[test]
fn swallowed_failures_still_honor_the_contract() {
    let cases = source_cases(
        |_| Arc::new(CannedTransport(Err(HttpError::new("connection reset")))),
        false,
    );

    for case in cases {
        let tracks = block_on(case.source.fetch_top(request(case.chart, 10)))
            .unwrap_or_else(|error| panic!("source '{}' should swallow: {error}", case.id));
        assert!(tracks.is_empty(), "source '{}': empty list", case.id);
    }
}

#[test]
fn surfaced_failures_carry_a_retryable_kind() {
    let cases = source_cases(
        |_| Arc::new(CannedTransport(Ok(HttpResponse::new(503, "busy")))),
        true,
    );

    for case in cases {
        let error = block_on(case.source.fetch_top(request(case.chart, 10)))
            .expect_err("503 must surface");
        assert_eq!(
            error.kind(),
            SourceErrorKind::Transport,
            "source '{}': kind",
            case.id
        );
        assert!(error.retryable(), "source '{}': retryable", case.id);
    }
}

fn block_on<F: Future>(future: F) -> F::Output {
    let waker = noop_waker();
    let mut context = Context::from_waker(&waker);
    let mut future = Box::pin(future);

    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(output) => return output,
            Poll::Pending => std::thread::yield_now(),
        }
    }
}

fn noop_waker() -> Waker {
    // SAFETY: The vtable functions never dereference the data pointer.
    unsafe { Waker::from_raw(RawWaker::new(std::ptr::null(), &NOOP_WAKER_VTABLE)) }
}

unsafe fn noop_clone(_data: *const ()) -> RawWaker {
    RawWaker::new(std::ptr::null(), &NOOP_WAKER_VTABLE)
}

unsafe fn noop(_data: *const ()) {}

static NOOP_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(noop_clone, noop, noop, noop);
