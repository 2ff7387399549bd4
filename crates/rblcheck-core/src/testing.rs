//! In-memory resolver for exercising the engine without a network.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::QueryError;
use crate::lookup::TextPayload;
use crate::resolver::{DnsblResolver, QueryResult};

/// Which record type a scripted query asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    A,
    Txt,
}

/// Answers queries from a fixed script; unknown names are NXDOMAIN.
#[derive(Default)]
pub struct ScriptedResolver {
    a: HashMap<String, QueryResult<Vec<Ipv4Addr>>>,
    txt: HashMap<String, QueryResult<TextPayload>>,
    delays: HashMap<String, Duration>,
    log: Mutex<Vec<(QueryKind, String)>>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn a(mut self, name: &str, answer: QueryResult<Vec<Ipv4Addr>>) -> Self {
        self.a.insert(name.to_string(), answer);
        self
    }

    pub fn listed(self, name: &str, code: u8) -> Self {
        self.a(name, Ok(vec![Ipv4Addr::new(127, 0, 0, code)]))
    }

    pub fn txt(mut self, name: &str, answer: QueryResult<TextPayload>) -> Self {
        self.txt.insert(name.to_string(), answer);
        self
    }

    pub fn timeout(self, name: &str) -> Self {
        self.a(name, Err(QueryError::failed("request timed out")))
    }

    /// Delay every answer for `name` (both record types)
    pub fn delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    /// Queries in the order they completed
    pub fn log(&self) -> Vec<(QueryKind, String)> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, kind: QueryKind) -> usize {
        self.log.lock().unwrap().iter().filter(|(k, _)| *k == kind).count()
    }

    async fn pause(&self, name: &str) {
        if let Some(delay) = self.delays.get(name) {
            tokio::time::sleep(*delay).await;
        }
    }

    fn record(&self, kind: QueryKind, name: &str) {
        self.log.lock().unwrap().push((kind, name.to_string()));
    }
}

#[async_trait]
impl DnsblResolver for ScriptedResolver {
    async fn lookup_a(&self, name: &str) -> QueryResult<Vec<Ipv4Addr>> {
        self.pause(name).await;
        self.record(QueryKind::A, name);
        self.a.get(name).cloned().unwrap_or(Err(QueryError::NotFound))
    }

    async fn lookup_txt(&self, name: &str) -> QueryResult<TextPayload> {
        self.pause(name).await;
        self.record(QueryKind::Txt, name);
        self.txt.get(name).cloned().unwrap_or(Err(QueryError::NotFound))
    }
}
