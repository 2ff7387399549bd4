//! DNSBL lookup engine.
//!
//! Checks hosts against DNS blocklists by querying
//! `<reversed-address>.<zone>` for every (address, zone) pair:
//!
//! - **Zones**: the ordered [`ZoneRegistry`]
//! - **Lookups**: a [`Target`] owns one [`LookupRecord`] per (zone, address)
//! - **Orchestration**: [`Orchestrator`] resolves hostnames, fans out all
//!   queries of a target concurrently and chains TXT lookups onto listings
//! - **Aggregation**: [`RunTally`] and [`summarize`] feed reporting and the
//!   process exit status
//!
//! # Example
//!
//! ```rust,ignore
//! use rblcheck_core::{CheckOptions, HickoryResolver, Orchestrator, ResolverSettings, RunTally, ZoneRegistry};
//!
//! let zones = ZoneRegistry::from_names(["zen.spamhaus.org"])?;
//! let resolver = HickoryResolver::new(&ResolverSettings::default())?;
//! let checker = Orchestrator::new(&resolver, &zones, CheckOptions::default())?;
//!
//! let mut tally = RunTally::new();
//! let target = checker.check("192.0.2.1", &mut tally).await;
//! println!("listed {} times", target.listed_count());
//! std::process::exit(tally.exit_status().code().into());
//! ```

#![doc(html_root_url = "https://docs.rs/rblcheck-core/0.1.0")]

pub mod aggregate;
pub mod driver;
pub mod encoding;
mod error;
pub mod lookup;
pub mod orchestrator;
pub mod resolver;
pub mod zone;

#[cfg(test)]
mod testing;

pub use aggregate::{summarize, ExitStatus, RunTally, TargetSummary, ZoneSummary};
pub use error::{CheckError, QueryError, Result};
pub use lookup::{LookupRecord, LookupState, Target, TextPayload};
pub use orchestrator::{CheckOptions, Orchestrator, FAILURE_TARGET};
pub use resolver::{DnsblResolver, HickoryResolver, QueryResult, ResolverSettings};
pub use zone::{Zone, ZoneRegistry};
