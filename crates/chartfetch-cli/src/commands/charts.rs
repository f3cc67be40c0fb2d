use serde_json::json;

use crate::cli::ChartsArgs;
use crate::error::CliError;

use super::{parse_platform, CommandContext, CommandResult};

pub fn run(args: &ChartsArgs, context: &CommandContext) -> Result<CommandResult, CliError> {
    let filter = args.platform.as_deref().map(parse_platform).transpose()?;

    let items = context
        .catalog
        .entries()
        .iter()
        .filter(|entry| filter.is_none_or(|platform| entry.platform == platform))
        .map(|entry| {
            json!({
                "platform": entry.platform.as_str(),
                "display_name": entry.platform.display_name(),
                "chart": entry.name,
                "id": entry.id,
            })
        })
        .collect();

    Ok(CommandResult::new(
        vec!["platform", "display_name", "chart", "id"],
        items,
    ))
}
