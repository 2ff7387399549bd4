//! rblcheck - check hosts against DNS blocklists
//!
//! Exits 100 if anything is listed, 2 if some lookups failed, 0 otherwise,
//! and 1 if the run could not start.

use std::process::ExitCode;

use rblcheck_core::ExitStatus;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match rblcheck_cli::run().await {
        Ok(status) => ExitCode::from(status.code()),
        Err(err) => {
            eprintln!("{}: {err:#}", rblcheck_cli::PROGRAM);
            ExitCode::from(ExitStatus::ConfigError.code())
        }
    }
}
