//! Event loop driver: the set of in-flight queries for one target.
//!
//! Every submitted query is a future that resolves to a [`Completion`].
//! [`EventLoop::drain`] polls them all on the current task and hands each
//! completion to a single consumer, which may submit follow-up queries into
//! the same set. It returns once nothing is in flight.

use std::net::Ipv4Addr;

use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};

use crate::lookup::TextPayload;
use crate::resolver::QueryResult;

/// A finished query, routed back to the consumer loop
#[derive(Debug)]
pub enum Completion {
    /// Hostname resolution for the target finished
    Name {
        /// Addresses of the target, or why there are none
        result: QueryResult<Vec<Ipv4Addr>>,
    },
    /// A DNSBL A query finished
    Address {
        /// Index into the target's lookup records
        index: usize,
        /// Zone answer
        result: QueryResult<Vec<Ipv4Addr>>,
    },
    /// A chained DNSBL TXT query finished
    Text {
        /// Index into the target's lookup records
        index: usize,
        /// Zone answer
        result: QueryResult<TextPayload>,
    },
}

/// Pending-query set for one target.
pub struct EventLoop<'r> {
    inflight: FuturesUnordered<BoxFuture<'r, Completion>>,
    submitted: usize,
}

impl Default for EventLoop<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> EventLoop<'r> {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self {
            inflight: FuturesUnordered::new(),
            submitted: 0,
        }
    }

    /// Add a query to the set. It starts making progress on the next drain.
    pub fn submit(&mut self, query: BoxFuture<'r, Completion>) {
        self.submitted += 1;
        self.inflight.push(query);
    }

    /// Queries currently in flight
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inflight.len()
    }

    /// Returns true if nothing is in flight
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.inflight.is_empty()
    }

    /// Queries submitted over the lifetime of this set
    #[must_use]
    pub const fn submitted(&self) -> usize {
        self.submitted
    }

    /// Run until no query is in flight.
    ///
    /// `apply` is called once per completion, in completion order, and may
    /// submit further queries. Queries are never cancelled: each one runs
    /// until the resolver answers or gives up.
    pub async fn drain<F>(&mut self, mut apply: F)
    where
        F: FnMut(Completion, &mut Self),
    {
        while let Some(completion) = self.inflight.next().await {
            apply(completion, self);
        }
    }
}
