use crate::cli::FetchArgs;
use crate::error::CliError;

use super::{parse_platform, track_json, CommandContext, CommandResult};

pub async fn run(args: &FetchArgs, context: &CommandContext) -> Result<CommandResult, CliError> {
    let platform = parse_platform(&args.platform)?;
    let chart_id = context.catalog.resolve(platform, &args.chart)?;

    let tracks = context
        .registry
        .fetch(
            platform.as_str(),
            chart_id.as_str(),
            args.limit,
            &context.retry,
        )
        .await?;

    let mut result = CommandResult::new(
        vec!["rank", "title", "artist", "album"],
        tracks.iter().map(track_json).collect(),
    )
    .with_meta("platform", platform.display_name())
    .with_meta("chart_id", chart_id.as_str())
    .with_meta("tracks", tracks.len());

    if let Some(entry) = context.catalog.find(platform, chart_id.as_str()) {
        result = result.with_meta("chart", entry.name);
    }

    if tracks.is_empty() {
        result = result.with_warning(format!(
            "no tracks returned after {} attempt(s); see the debug log for details",
            context.retry.attempts()
        ));
    }

    Ok(result)
}
