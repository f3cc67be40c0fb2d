use thiserror::Error;

/// Validation and contract errors exposed by `chartfetch-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("chart id cannot be empty")]
    EmptyChartId,
    #[error("chart id '{value}' must be an integer for {platform}")]
    NonNumericChartId {
        platform: &'static str,
        value: String,
    },

    #[error("invalid platform '{value}', expected one of qqmusic, kugou, netease")]
    InvalidPlatform { value: String },

    #[error("result limit must be greater than zero")]
    ZeroLimit,
    #[error("track rank must be 1 or greater")]
    ZeroRank,

    #[error("unknown chart '{chart}' for platform '{platform}'")]
    UnknownChart { platform: String, chart: String },
}
