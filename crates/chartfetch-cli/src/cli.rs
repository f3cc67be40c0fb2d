//! CLI argument definitions for chartfetch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fetch` | Fetch one chart and print its tracks |
//! | `export` | Export every chart of one or all platforms to CSV |
//! | `charts` | List built-in charts |
//! | `platforms` | List registered platforms |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json, ndjson) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `10000` | Per-request timeout in ms |
//! | `--retries` | `3` | Attempts per chart, including the first |
//! | `--retry-delay-ms` | `1000` | Pause between attempts |
//! | `--log-file` | `debug_log.txt` | Debug log, truncated on start |
//! | `--no-log-file` | `false` | Disable the debug log |
//! | `-v` | warn | Repeat for info, debug, trace on stderr |
//!
//! # Examples
//!
//! ```bash
//! chartfetch fetch netease 热歌榜 --limit 20
//! chartfetch fetch qq 26 --format json --pretty
//! chartfetch export kugou
//! chartfetch export --output-dir ./out
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Fetch music charts from QQ Music, Kugou and NetEase Cloud Music.
#[derive(Debug, Parser)]
#[command(
    name = "chartfetch",
    author,
    version,
    about = "Cross-platform music chart fetcher",
    long_about = "chartfetch pulls ranked chart listings from QQ Music, Kugou and NetEase \
Cloud Music, normalizes them into rank/title/artist/album records and prints or exports them.\n\
\n\
Use 'chartfetch <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-request timeout in milliseconds (overrides CHARTFETCH_TIMEOUT_MS).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Attempts per chart, including the first.
    #[arg(long, global = true, default_value_t = 3)]
    pub retries: u32,

    /// Delay between attempts in milliseconds.
    #[arg(long, global = true, default_value_t = 1000)]
    pub retry_delay_ms: u64,

    /// Debug log file, truncated at start.
    #[arg(long, global = true, default_value = "debug_log.txt")]
    pub log_file: PathBuf,

    /// Do not write the debug log file.
    #[arg(long, global = true, default_value_t = false)]
    pub no_log_file: bool,

    /// Increase stderr log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table.
    Table,
    /// Single JSON object.
    Json,
    /// One JSON object per line.
    Ndjson,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch one chart.
    ///
    ///   chartfetch fetch netease 热歌榜
    ///   chartfetch fetch qq 62 --limit 10
    Fetch(FetchArgs),

    /// Export every built-in chart of one platform, or of all platforms, to CSV.
    ///
    /// Files land in <output-dir>/<yyyy-MM-dd_HH-mm-ss>/<platform>_<chart>.csv.
    Export(ExportArgs),

    /// List built-in charts.
    Charts(ChartsArgs),

    /// List registered platforms.
    Platforms,
}

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Platform key, alias or display name (qq, kugou, netease, 网易云音乐, ...).
    pub platform: String,

    /// Chart name from `chartfetch charts` or a raw numeric chart id.
    pub chart: String,

    /// Maximum number of tracks.
    #[arg(long, default_value_t = 100)]
    pub limit: usize,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Platform to export; all platforms when omitted.
    pub platform: Option<String>,

    /// Maximum number of tracks per chart.
    #[arg(long, default_value_t = 100)]
    pub limit: usize,

    /// Base directory for export runs.
    #[arg(long, default_value = "Exports")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct ChartsArgs {
    /// Only list charts of this platform.
    pub platform: Option<String>,
}
