//! Chart source trait and request/error types.
//!
//! This module defines the contract (`ChartSource`) every platform client
//! implements, the request it receives, and the structured error it may raise.
//!
//! # Failure policy
//!
//! A client that hits a transport or parse failure logs it and returns an empty
//! list, unless it was built with `surface_failures(true)`, in which case the
//! error is returned so [`fetch_with_retry`](crate::retry::fetch_with_retry) can
//! retry it and propagate it once attempts run out. Invalid input is always
//! returned immediately.
//!
//! # Example
//!
//! ```rust,ignore
//! use chartfetch_core::{ChartId, ChartRequest, ChartSource, NeteaseClient};
//!
//! async fn hot_songs(client: &NeteaseClient) -> Result<(), chartfetch_core::SourceError> {
//!     let request = ChartRequest::new(ChartId::parse("3778678")?, 100)?;
//!     for track in client.fetch_top(request).await? {
//!         println!("{:>3}. {} - {}", track.rank(), track.artist(), track.title());
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use tracing::warn;

use crate::{ChartId, TrackRecord, ValidationError};

/// Error classification used by the retry orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// DNS, connect, timeout or non-2xx status.
    Transport,
    /// Response body did not have the expected shape.
    Parse,
    /// Well-formed response that the platform flagged as carrying no records.
    EmptyResult,
    /// Chart id or limit rejected before any request was sent.
    InvalidInput,
    /// No client registered under the requested platform key.
    NotRegistered,
    Internal,
}

impl SourceErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Parse => "parse",
            Self::EmptyResult => "empty_result",
            Self::InvalidInput => "invalid_input",
            Self::NotRegistered => "not_registered",
            Self::Internal => "internal",
        }
    }
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transport,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Parse,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::EmptyResult,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidInput,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_registered(platform: &str) -> Self {
        Self {
            kind: SourceErrorKind::NotRegistered,
            message: format!("no chart source registered for platform '{platform}'"),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::Parse => "source.parse",
            SourceErrorKind::EmptyResult => "source.empty_result",
            SourceErrorKind::InvalidInput => "source.invalid_input",
            SourceErrorKind::NotRegistered => "source.not_registered",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_input(error.to_string())
    }
}

/// Request payload for a top-of-chart fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub chart_id: ChartId,
    pub limit: usize,
}

impl ChartRequest {
    pub fn new(chart_id: ChartId, limit: usize) -> Result<Self, SourceError> {
        if limit == 0 {
            return Err(ValidationError::ZeroLimit.into());
        }
        Ok(Self { chart_id, limit })
    }
}

/// Boxed future returned by [`ChartSource::fetch_top`].
pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<TrackRecord>, SourceError>> + Send + 'a>>;

/// Platform client contract.
///
/// Every implementation must return at most `req.limit` records, ranked
/// `1..=len` in platform order, and must not keep request state between
/// calls.
pub trait ChartSource: Send + Sync {
    /// Registry key of the platform this source talks to.
    fn platform(&self) -> &str;

    /// Fetches the top entries of one chart.
    ///
    /// # Errors
    ///
    /// Returns [`SourceErrorKind::InvalidInput`] when the chart id does not fit
    /// the platform. Transport and parse failures are only returned when the
    /// source surfaces failures; otherwise they produce an empty list.
    fn fetch_top<'a>(&'a self, req: ChartRequest) -> FetchFuture<'a>;
}

/// Applies a client's failure policy to the outcome of one exchange.
pub(crate) fn settle(
    platform: &str,
    chart_id: &ChartId,
    surface_failures: bool,
    outcome: Result<Vec<TrackRecord>, SourceError>,
) -> Result<Vec<TrackRecord>, SourceError> {
    match outcome {
        Ok(tracks) => Ok(tracks),
        Err(error) if !error.retryable() || surface_failures => Err(error),
        Err(error) => {
            warn!(
                platform,
                chart_id = %chart_id,
                error.kind = error.kind().as_str(),
                error.message = error.message(),
                "chart fetch failed; returning empty list"
            );
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> ChartId {
        ChartId::parse("26").expect("valid chart id")
    }

    #[test]
    fn zero_limit_is_invalid_input() {
        let err = ChartRequest::new(chart(), 0).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::InvalidInput);
        assert!(!err.retryable());
    }

    #[test]
    fn swallowed_failures_become_empty_lists() {
        let settled = settle(
            "kugou",
            &chart(),
            false,
            Err(SourceError::transport("connection refused")),
        )
        .expect("transport failure is swallowed");
        assert!(settled.is_empty());
    }

    #[test]
    fn surfaced_failures_keep_their_kind() {
        let err = settle("kugou", &chart(), true, Err(SourceError::parse("bad json")))
            .expect_err("must surface");
        assert_eq!(err.kind(), SourceErrorKind::Parse);
    }

    #[test]
    fn invalid_input_is_never_swallowed() {
        let err = settle(
            "qqmusic",
            &chart(),
            false,
            Err(SourceError::invalid_input("not numeric")),
        )
        .expect_err("must surface");
        assert_eq!(err.code(), "source.invalid_input");
    }
}
