mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = logging::init(
        cli.verbose,
        (!cli.no_log_file).then_some(cli.log_file.as_path()),
    );

    match run(&cli).await {
        Ok(code) => code,
        Err(error) => {
            tracing::info!(exit_code = error.exit_code(), "command failed: {error}");
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let result = commands::run(cli).await?;
    output::render(&result, cli.format, cli.pretty)?;
    Ok(ExitCode::SUCCESS)
}
