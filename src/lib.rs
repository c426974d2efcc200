pub mod cli;
pub mod commands;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;

use std::process::ExitCode;

use clap::Parser;

use cli::Args;
use commands::run_report;
use infrastructure::{AdDirectory, LinePrompt};

/// Parse arguments, run one report, and map the outcome to an exit code
pub fn run() -> ExitCode {
    let args = Args::parse();

    // Initialize logging to PwdLastSet.log
    let _guard = match logging::init_logging(args.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("[LOG_INIT_FAILED] Cannot open {}: {}", logging::LOG_FILE_NAME, e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Password report starting");

    let request = args.into_request();
    let mut prompt = LinePrompt::stdio();

    match run_report(&request, &mut prompt, AdDirectory::connect) {
        Ok(summary) => {
            println!(
                "Wrote {} account(s) to {}",
                summary.rows_written,
                summary.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            if e.is_user_initiated() {
                tracing::info!(code = e.error_code(), "Report run cancelled by operator");
            } else {
                tracing::error!(code = e.error_code(), error = %e, "Report run failed");
            }
            eprintln!("[{}] {}", e.error_code(), e);
            ExitCode::FAILURE
        }
    }
}
