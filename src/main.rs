//! srctrl CLI - records the sample Python class into a Sourcetrail database

use std::io::IsTerminal;
use std::process::ExitCode;

use srctrl::config::load_config;
use srctrl::driver::{self, DriverError};
use srctrl::storage::SqliteStore;
use srctrl::{ui, SqliteWriter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .with(filter)
        .init();

    let config = match load_config(None) {
        Ok(config) => config,
        Err(e) => {
            ui::error(&format!("ERROR: {:#}", e));
            return ExitCode::FAILURE;
        }
    };

    let result = run(config);
    if let Err(e) = &result {
        ui::error(&e.to_string());
    }
    ExitCode::from(driver::exit_code(&result) as u8)
}

fn run(config: Option<srctrl::config::SrctrlConfig>) -> Result<(), DriverError> {
    let params = driver::parse_args(std::env::args().skip(1))?;
    if let Some(version) = &params.invalid_version {
        ui::warn(&format!("Invalid DB version:{}", version));
    }

    let invocation = params.resolve(config.as_ref())?;

    let mut writer = SqliteWriter::new();
    tracing::debug!("Writer {}", writer.version_string());
    driver::run(&mut writer, &invocation)?;

    print_summary(&invocation.database_file_path);
    Ok(())
}

/// Row counts of the finished database
fn print_summary(db_path: &std::path::Path) {
    let stats = SqliteStore::open(db_path).and_then(|store| store.stats());
    match stats {
        Ok(stats) => ui::summary_table("Recorded", &stats.rows()),
        Err(e) => tracing::warn!("Unable to read back {}: {}", db_path.display(), e),
    }
}
