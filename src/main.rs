use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use refsheet::batch;
use refsheet::cli::CliOptions;
use refsheet::config::{Settings, setup_logging};
use refsheet::roster;
use tracing::error;

/// Exit status for configuration problems (missing key, empty selection...).
const EXIT_CONFIG: u8 = 2;

fn load_settings(cli: &CliOptions) -> Result<Settings> {
    roster::init().context("Failed to load the character roster")?;
    let characters = roster::characters()?;
    Ok(Settings::from_cli(cli, characters)?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliOptions::parse();

    let _ = setup_logging(cli.debug);

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            error!("{:#}", err);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let api = match settings.transport() {
        Ok(api) => api,
        Err(err) => {
            error!("{}", err);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match batch::run(&api, &settings).await {
        Ok(summary) => {
            println!("{}", summary.report());
            ExitCode::from(summary.exit_status())
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
