//! Bounded retry with a fixed delay around [`ChartSource::fetch_top`].

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::chart_source::{ChartRequest, ChartSource, SourceErrorKind};
use crate::{SourceError, TrackRecord};

/// Configuration for [`fetch_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first. Zero behaves like one.
    pub max_retries: u32,
    /// Pause between consecutive attempts.
    pub retry_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryConfig {
    pub fn fixed(retry_delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    /// Single attempt, no delay.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 1,
            retry_delay: Duration::ZERO,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Classified result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    /// At least one record.
    Success(Vec<TrackRecord>),
    /// No error, but nothing usable.
    EmptySuccess,
    Failure(SourceError),
}

impl From<Result<Vec<TrackRecord>, SourceError>> for RetryOutcome {
    fn from(result: Result<Vec<TrackRecord>, SourceError>) -> Self {
        match result {
            Ok(tracks) if tracks.is_empty() => Self::EmptySuccess,
            Ok(tracks) => Self::Success(tracks),
            Err(error) if error.kind() == SourceErrorKind::EmptyResult => Self::EmptySuccess,
            Err(error) => Self::Failure(error),
        }
    }
}

/// Runs `source.fetch_top` until it yields records or attempts run out.
///
/// An empty attempt and a retryable failure both wait `retry_delay` and try
/// again. When the last attempt fails its error is returned; when it is
/// merely empty an empty list is returned. Non-retryable errors such as
/// invalid input return at once without using another attempt.
pub async fn fetch_with_retry(
    source: &dyn ChartSource,
    request: &ChartRequest,
    config: &RetryConfig,
) -> Result<Vec<TrackRecord>, SourceError> {
    let attempts = config.attempts();
    let platform = source.platform();

    for attempt in 1..=attempts {
        info!(
            platform,
            chart_id = %request.chart_id,
            attempt,
            attempts,
            "fetching chart"
        );

        match RetryOutcome::from(source.fetch_top(request.clone()).await) {
            RetryOutcome::Success(tracks) => {
                info!(platform, chart_id = %request.chart_id, attempt, tracks = tracks.len(), "chart fetched");
                return Ok(tracks);
            }
            RetryOutcome::EmptySuccess => {
                warn!(platform, chart_id = %request.chart_id, attempt, "attempt returned no tracks");
                if attempt == attempts {
                    warn!(platform, chart_id = %request.chart_id, attempts, "no tracks after all attempts");
                    return Ok(Vec::new());
                }
            }
            RetryOutcome::Failure(error) if !error.retryable() => {
                warn!(
                    platform,
                    chart_id = %request.chart_id,
                    error.code = error.code(),
                    error.message = error.message(),
                    "attempt failed with non-retryable error"
                );
                return Err(error);
            }
            RetryOutcome::Failure(error) => {
                warn!(
                    platform,
                    chart_id = %request.chart_id,
                    attempt,
                    error.code = error.code(),
                    error.message = error.message(),
                    "attempt failed"
                );
                if attempt == attempts {
                    warn!(platform, chart_id = %request.chart_id, attempts, "all attempts failed");
                    return Err(error);
                }
            }
        }

        debug!(
            platform,
            delay_ms = config.retry_delay.as_millis() as u64,
            "waiting before next attempt"
        );
        tokio::time::sleep(config.retry_delay).await;
    }

    Ok(Vec::new())
}
