use chartfetch_core::PlatformId;
use serde_json::json;

use super::{CommandContext, CommandResult};

pub fn run(context: &CommandContext) -> CommandResult {
    let items = context
        .registry
        .platforms()
        .into_iter()
        .map(|key| {
            let display_name = key
                .parse::<PlatformId>()
                .map(PlatformId::display_name)
                .unwrap_or(key);
            let charts = key
                .parse::<PlatformId>()
                .map(|platform| context.catalog.charts(platform).count())
                .unwrap_or(0);
            json!({
                "platform": key,
                "display_name": display_name,
                "charts": charts,
            })
        })
        .collect();

    CommandResult::new(vec!["platform", "display_name", "charts"], items)
}

#[cfg(test)]
mod tests {
    use chartfetch_core::{ChartCatalog, RetryConfig, SourceRegistryBuilder};

    use super::*;

    #[test]
    fn lists_registered_platforms_with_chart_counts() {
        let context = CommandContext {
            registry: SourceRegistryBuilder::new()
                .with_qqmusic_enabled(false)
                .build(),
            catalog: ChartCatalog::builtin(),
            retry: RetryConfig::default(),
        };

        let result = run(&context);

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0]["platform"], "kugou");
        assert_eq!(result.items[0]["display_name"], "酷狗音乐");
        assert_eq!(result.items[1]["charts"], 3);
    }
}
