//! Query orchestration: name resolution, fan-out and chained TXT lookups.

use std::net::{IpAddr, Ipv4Addr};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tracing::{debug, info, warn};

use crate::aggregate::{summarize, RunTally};
use crate::driver::{Completion, EventLoop};
use crate::error::{QueryError, Result};
use crate::lookup::Target;
use crate::resolver::{DnsblResolver, QueryResult};
use crate::zone::ZoneRegistry;

/// Tracing target of the per-failure reports (unresolvable hosts, failed
/// DNSBL queries). Always emitted at `warn`.
pub const FAILURE_TARGET: &str = "rblcheck::failure";

/// Behaviour switches for a check run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Fetch the TXT explanation for every listing
    pub fetch_txt: bool,
    /// Skip the remaining targets once one of them is listed
    pub stop_after_first_match: bool,
}

/// Drives targets through resolution and DNSBL queries.
///
/// Targets are processed one at a time; all queries of a target run
/// concurrently and are fully drained before the next target starts.
pub struct Orchestrator<'a, R: DnsblResolver + ?Sized> {
    resolver: &'a R,
    zones: &'a ZoneRegistry,
    options: CheckOptions,
}

impl<'a, R: DnsblResolver + ?Sized> Orchestrator<'a, R> {
    /// Create an orchestrator. Fails if no zone is configured.
    pub fn new(resolver: &'a R, zones: &'a ZoneRegistry, options: CheckOptions) -> Result<Self> {
        zones.ensure_configured()?;
        Ok(Self {
            resolver,
            zones,
            options,
        })
    }

    /// Check every target in order, handing each completed target to `report`.
    ///
    /// With `stop_after_first_match`, targets after the first listed one are
    /// skipped.
    pub async fn run<I, S, F>(&self, targets: I, tally: &mut RunTally, mut report: F)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut(&Target),
    {
        let mut targets = targets.into_iter();
        while let Some(argument) = targets.next() {
            let target = self.check(argument, tally).await;
            report(&target);

            if self.options.stop_after_first_match && target.listed_count() > 0 {
                let skipped = targets.count();
                if skipped > 0 {
                    info!(host = target.argument(), skipped, "match found, skipping remaining targets");
                }
                break;
            }
        }
    }

    /// Check a single target and return it with every record terminal
    pub async fn check(&self, argument: impl Into<String>, tally: &mut RunTally) -> Target {
        let mut target = Target::new(argument);
        self.process(&mut target, tally).await;
        target
    }

    /// Resolve `target`, fan out its queries and drain them to completion.
    pub async fn process(&self, target: &mut Target, tally: &mut RunTally) {
        let mut events = EventLoop::new();
        self.submit(target, &mut events);
        events
            .drain(|completion, events| self.apply(completion, target, tally, events))
            .await;

        debug_assert!(target.is_complete());
        let summary = summarize(target);
        info!(
            host = target.argument(),
            queries = events.submitted(),
            addresses = summary.addresses,
            listed = summary.listed,
            not_listed = summary.not_listed,
            failed = summary.failed,
            "target complete"
        );
    }

    fn submit(&self, target: &mut Target, events: &mut EventLoop<'a>) {
        if let Some(address) = target.literal_address() {
            self.fan_out(target, vec![address], events);
        } else {
            debug!(host = target.argument(), "resolving hostname");
            events.submit(self.name_query(target.argument().to_string()));
        }
    }

    fn fan_out(&self, target: &mut Target, addresses: Vec<IpAddr>, events: &mut EventLoop<'a>) {
        for index in target.populate(self.zones, addresses) {
            let name = target.lookups()[index].query_name();
            debug!(query = %name, "submitting DNSBL A query");
            events.submit(self.address_query(index, name));
        }
    }

    fn apply(
        &self,
        completion: Completion,
        target: &mut Target,
        tally: &mut RunTally,
        events: &mut EventLoop<'a>,
    ) {
        match completion {
            Completion::Name { result } => self.on_name(target, result, events),
            Completion::Address { index, result } => {
                self.on_address(target, index, result, tally, events);
            }
            Completion::Text { index, result } => Self::on_text(target, index, result, tally),
        }
    }

    fn on_name(
        &self,
        target: &mut Target,
        result: QueryResult<Vec<Ipv4Addr>>,
        events: &mut EventLoop<'a>,
    ) {
        match result {
            Ok(addresses) => {
                debug!(host = target.argument(), count = addresses.len(), "hostname resolved");
                let addresses = addresses.into_iter().map(IpAddr::V4).collect();
                self.fan_out(target, addresses, events);
            }
            Err(err) => {
                // Terminal for this target only; not a query failure.
                warn!(
                    target: FAILURE_TARGET,
                    host = target.argument(),
                    error = %err,
                    "unable to lookup host"
                );
                target.fail_resolution(err.to_string());
            }
        }
    }

    fn on_address(
        &self,
        target: &mut Target,
        index: usize,
        result: QueryResult<Vec<Ipv4Addr>>,
        tally: &mut RunTally,
        events: &mut EventLoop<'a>,
    ) {
        let Some(record) = target.lookup_mut(index) else {
            return;
        };
        match result {
            Ok(addresses) => {
                debug!(address = %record.address(), zone = record.zone_name(), "listed");
                let name = record.query_name();
                record.mark_listed(addresses);
                target.record_listing();
                tally.record_listing();
                if self.options.fetch_txt {
                    debug!(query = %name, "submitting DNSBL TXT query");
                    events.submit(self.text_query(index, name));
                }
            }
            Err(QueryError::NotFound) => {
                debug!(address = %record.address(), zone = record.zone_name(), "not listed");
                record.mark_not_listed();
            }
            Err(QueryError::Failed(error)) => {
                warn!(
                    target: FAILURE_TARGET,
                    address = %record.address(),
                    zone = record.zone_name(),
                    error = %error,
                    "unable to lookup DNSBL A record"
                );
                record.mark_failed(error);
                tally.record_failure();
            }
        }
    }

    fn on_text(
        target: &mut Target,
        index: usize,
        result: QueryResult<Vec<Vec<u8>>>,
        tally: &mut RunTally,
    ) {
        let Some(record) = target.lookup_mut(index) else {
            return;
        };
        match result {
            Ok(payload) => record.attach_text(payload),
            Err(QueryError::NotFound) => {
                debug!(address = %record.address(), zone = record.zone_name(), "no TXT record");
            }
            Err(QueryError::Failed(error)) => {
                warn!(
                    target: FAILURE_TARGET,
                    address = %record.address(),
                    zone = record.zone_name(),
                    error = %error,
                    "unable to lookup DNSBL TXT record"
                );
                tally.record_failure();
            }
        }
    }

    fn name_query(&self, host: String) -> BoxFuture<'a, Completion> {
        let resolver = self.resolver;
        async move {
            let result = resolver.lookup_a(&host).await;
            Completion::Name { result }
        }
        .boxed()
    }

    fn address_query(&self, index: usize, name: String) -> BoxFuture<'a, Completion> {
        let resolver = self.resolver;
        async move {
            let result = resolver.lookup_a(&name).await;
            Completion::Address { index, result }
        }
        .boxed()
    }

    fn text_query(&self, index: usize, name: String) -> BoxFuture<'a, Completion> {
        let resolver = self.resolver;
        async move {
            let result = resolver.lookup_txt(&name).await;
            Completion::Text { index, result }
        }
        .boxed()
    }
}
