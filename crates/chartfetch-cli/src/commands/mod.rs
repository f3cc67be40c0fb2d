mod charts;
mod export;
mod fetch;
mod platforms;

use std::time::Duration;

use chartfetch_core::{
    ChartCatalog, PlatformId, RetryConfig, SourceRegistry, SourceRegistryBuilder, TrackRecord,
};
use serde_json::{json, Map, Value};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Rows and metadata produced by one command, rendered by `output`.
#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    pub meta: Map<String, Value>,
    pub columns: Vec<&'static str>,
    pub items: Vec<Value>,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn new(columns: Vec<&'static str>, items: Vec<Value>) -> Self {
        Self {
            columns,
            items,
            ..Self::default()
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key.to_owned(), value.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Everything a command needs besides its own arguments.
pub struct CommandContext {
    pub registry: SourceRegistry,
    pub catalog: ChartCatalog,
    pub retry: RetryConfig,
}

impl CommandContext {
    pub fn from_cli(cli: &Cli) -> Self {
        let mut builder = SourceRegistryBuilder::new()
            .with_env()
            .surface_failures(true);
        if let Some(timeout_ms) = cli.timeout_ms {
            builder = builder.with_timeout_ms(timeout_ms);
        }

        Self {
            registry: builder.build(),
            catalog: ChartCatalog::builtin(),
            retry: RetryConfig::fixed(Duration::from_millis(cli.retry_delay_ms), cli.retries),
        }
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let context = CommandContext::from_cli(cli);

    match &cli.command {
        Command::Fetch(args) => fetch::run(args, &context).await,
        Command::Export(args) => export::run(args, &context).await,
        Command::Charts(args) => charts::run(args, &context),
        Command::Platforms => Ok(platforms::run(&context)),
    }
}

fn parse_platform(value: &str) -> Result<PlatformId, CliError> {
    Ok(value.parse::<PlatformId>()?)
}

fn track_json(track: &TrackRecord) -> Value {
    json!({
        "rank": track.rank(),
        "title": track.title(),
        "artist": track.artist(),
        "album": track.album(),
    })
}
