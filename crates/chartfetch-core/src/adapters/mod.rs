mod kugou;
mod netease;
mod qqmusic;

pub use kugou::{split_file_name, KugouClient, KugouConfig};
pub use netease::{NeteaseClient, NeteaseConfig, PlaylistDetailPayload};
pub use qqmusic::{QqMusicClient, QqMusicConfig};

use crate::http_client::{HttpError, HttpResponse};
use crate::SourceError;

/// Desktop browser identity sent by every platform client.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 10_000;

fn transport_error(platform: &str, error: HttpError) -> SourceError {
    if error.retryable() {
        SourceError::transport(format!("{platform} transport error: {}", error.message()))
    } else {
        SourceError::internal(format!("{platform} transport error: {}", error.message()))
    }
}

fn ensure_success(platform: &str, response: HttpResponse) -> Result<String, SourceError> {
    if !response.is_success() {
        return Err(SourceError::transport(format!(
            "{platform} upstream returned status {}",
            response.status
        )));
    }
    Ok(response.body)
}
