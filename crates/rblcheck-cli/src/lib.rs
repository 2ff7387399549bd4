//! # rblcheck-cli
//!
//! Command-line front end for [`rblcheck_core`].
//!
//! ## Features
//!
//! - **Any number of zones**: `-s` is repeatable and merges with the config file
//! - **TXT explanations**: `-t` fetches the reason a zone gives for a listing
//! - **Verbosity levels**: `-q`/`-v` select between bare and chatty output
//! - **JSON output**: `--output json` for scripting
//! - **Exit codes**: 100 listed, 2 lookup failures, 1 aborted, 0 clean

pub mod cli;
pub mod config;
pub mod logging;
pub mod output;

pub use cli::run;

/// Program name used as the prefix of every diagnostic
pub const PROGRAM: &str = "rblcheck";
