//! Result aggregation: per-target summaries, run counters and exit status.

use serde::Serialize;

use crate::lookup::{LookupState, Target};

/// Counters accumulated across every target of one run.
///
/// Passed by `&mut` into the orchestrator and only touched while completion
/// events are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    listed: usize,
    failures: usize,
}

impl RunTally {
    /// Fresh tally with both counters at zero
    #[must_use]
    pub const fn new() -> Self {
        Self {
            listed: 0,
            failures: 0,
        }
    }

    /// Positive hits across the run
    #[must_use]
    pub const fn listed(&self) -> usize {
        self.listed
    }

    /// Failed A queries plus failed TXT queries across the run
    #[must_use]
    pub const fn failures(&self) -> usize {
        self.failures
    }

    pub(crate) fn record_listing(&mut self) {
        self.listed += 1;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Terminal status for the run. A listing wins over any failure.
    #[must_use]
    pub const fn exit_status(&self) -> ExitStatus {
        if self.listed > 0 {
            ExitStatus::Listed
        } else if self.failures > 0 {
            ExitStatus::Failures
        } else {
            ExitStatus::Clean
        }
    }
}

/// How a run ended, mapped onto the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every check completed and nothing is listed
    Clean,
    /// Nothing is listed but at least one query failed
    Failures,
    /// At least one address is listed somewhere
    Listed,
    /// The run was aborted before any target was checked
    ConfigError,
}

impl ExitStatus {
    /// Process exit code
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::ConfigError => 1,
            Self::Failures => 2,
            Self::Listed => 100,
        }
    }
}

/// Outcome counts for one zone registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneSummary {
    /// Zone name
    pub zone: String,
    /// Addresses listed by this zone
    pub listed: usize,
    /// Addresses confirmed absent from this zone
    pub not_listed: usize,
    /// Addresses whose query failed
    pub failed: usize,
}

/// Outcome counts for one target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    /// Resolved addresses
    pub addresses: usize,
    /// Records in `Listed`
    pub listed: usize,
    /// Records in `NotListed`
    pub not_listed: usize,
    /// Records in `Failed`
    pub failed: usize,
    /// Records still pending (always zero after a drain)
    pub pending: usize,
    /// Breakdown in zone registration order
    pub zones: Vec<ZoneSummary>,
}

/// Count outcomes for a target. Pure read of the target's records.
#[must_use]
pub fn summarize(target: &Target) -> TargetSummary {
    let mut summary = TargetSummary {
        addresses: target.resolved_address_count(),
        ..TargetSummary::default()
    };
    if summary.addresses == 0 {
        return summary;
    }

    // Records are zone-major, so each chunk is one zone registration.
    for chunk in target.lookups().chunks(summary.addresses) {
        let mut zone = ZoneSummary {
            zone: chunk[0].zone_name().to_string(),
            listed: 0,
            not_listed: 0,
            failed: 0,
        };
        for record in chunk {
            match record.state() {
                LookupState::Pending => summary.pending += 1,
                LookupState::Listed { .. } => zone.listed += 1,
                LookupState::NotListed => zone.not_listed += 1,
                LookupState::Failed { .. } => zone.failed += 1,
            }
        }
        summary.listed += zone.listed;
        summary.not_listed += zone.not_listed;
        summary.failed += zone.failed;
        summary.zones.push(zone);
    }

    summary
}
