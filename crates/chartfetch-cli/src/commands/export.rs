//! Export built-in charts to CSV files.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use chartfetch_core::{PlatformId, TrackRecord};
use serde_json::json;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::cli::ExportArgs;
use crate::error::CliError;

use super::{parse_platform, CommandContext, CommandResult};

const CSV_HEADER: &str = "排名,歌名,歌手,专辑";
const UTF8_BOM: &str = "\u{feff}";

pub async fn run(args: &ExportArgs, context: &CommandContext) -> Result<CommandResult, CliError> {
    let platforms = match &args.platform {
        Some(name) => vec![parse_platform(name)?],
        None => PlatformId::ALL.to_vec(),
    };

    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let run_dir = args.output_dir.join(timestamp_folder(now));
    fs::create_dir_all(&run_dir)?;

    let mut items = Vec::new();
    let mut warnings = Vec::new();

    for platform in platforms {
        for chart in context.catalog.charts(platform) {
            let label = format!("{} - {}", platform.display_name(), chart.name);
            info!(platform = platform.as_str(), chart = chart.name, "exporting chart");

            let tracks = match context
                .registry
                .fetch(platform.as_str(), chart.id, args.limit, &context.retry)
                .await
            {
                Ok(tracks) => tracks,
                Err(error) => {
                    warn!(platform = platform.as_str(), chart = chart.name, error = %error, "export failed");
                    warnings.push(format!("{label} failed: {error}"));
                    continue;
                }
            };

            if tracks.is_empty() {
                warn!(platform = platform.as_str(), chart = chart.name, "no tracks, skipping");
                warnings.push(format!("{label} returned no tracks, skipped"));
                continue;
            }

            let path = run_dir.join(format!("{}_{}.csv", platform.display_name(), chart.name));
            write_csv(&path, &tracks)?;
            info!(file = %path.display(), tracks = tracks.len(), "chart exported");

            items.push(json!({
                "platform": platform.display_name(),
                "chart": chart.name,
                "tracks": tracks.len(),
                "file": path.display().to_string(),
            }));
        }
    }

    let exported = items.len();
    Ok(
        CommandResult::new(vec!["platform", "chart", "tracks", "file"], items)
            .with_meta("directory", run_dir.display().to_string())
            .with_meta("exported", exported)
            .with_warnings(warnings),
    )
}

fn timestamp_folder(now: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}_{:02}-{:02}-{:02}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

fn write_csv(path: &Path, tracks: &[TrackRecord]) -> Result<(), CliError> {
    fs::write(path, render_csv(tracks))?;
    Ok(())
}

/// UTF-8 CSV with a byte order mark so spreadsheet tools detect the encoding.
pub fn render_csv(tracks: &[TrackRecord]) -> String {
    let mut out = String::from(UTF8_BOM);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for track in tracks {
        out.push_str(&format!(
            "{},{},{},{}\n",
            track.rank(),
            sanitize_csv_field(track.title()),
            sanitize_csv_field(track.artist()),
            sanitize_csv_field(track.album())
        ));
    }

    out
}

/// Quotes a field containing a comma, quote or line break and doubles any
/// inner quotes.
pub fn sanitize_csv_field(text: &str) -> Cow<'_, str> {
    if text.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", text.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(text)
    }
}
