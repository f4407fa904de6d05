use devconsole::app::{self, load_config, log_dir};
use devconsole::error::DevConsoleError;
use devconsole::logger::initialize as LoggerInitialize;

use console_core::config::{default_dir, load_dotenv};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::io::stdout;
use std::panic::Location;
use std::process::ExitCode;

use log::{error, info};
use tokio::io::{BufReader, stdin};
use tokio::runtime::Builder;

fn main() -> ExitCode {
    let runtime = match Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run());

    // A pending stdin read never completes on its own
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), DevConsoleError> {
    let log_dir = log_dir();
    create_dir_all(&log_dir).map_err(|e| DevConsoleError::DevConsole {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Logger first so config problems end up in the log
    LoggerInitialize(&log_dir)?;
    load_dotenv();

    info!("Developer console starting");
    info!("Log directory: {}", log_dir.display());

    let config = load_config(default_dir())?;
    app::run(&config, BufReader::new(stdin()), stdout()).await?;

    info!("Developer console stopped");
    Ok(())
}
