//! DNS resolution seam and its `hickory-resolver` backend.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::{ProtoError, ProtoErrorKind};
use hickory_resolver::{ResolveError, TokioResolver};
use tracing::debug;

use crate::error::{CheckError, QueryError, Result};
use crate::lookup::TextPayload;

/// Result of one query against the resolver
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// The two record lookups a DNSBL check needs.
///
/// Implementations own timeouts and retries: every call must eventually
/// return, and anything other than a definitive negative answer is reported
/// as [`QueryError::Failed`].
#[async_trait]
pub trait DnsblResolver: Send + Sync {
    /// Look up A records for `name`
    async fn lookup_a(&self, name: &str) -> QueryResult<Vec<Ipv4Addr>>;

    /// Look up TXT records for `name`, one byte string per record
    async fn lookup_txt(&self, name: &str) -> QueryResult<TextPayload>;
}

/// Resolver tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Timeout for a single attempt
    pub timeout: Duration,
    /// Attempts per query before it is reported as failed
    pub attempts: usize,
    /// Explicit nameservers; empty means the system configuration
    pub nameservers: Vec<IpAddr>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            attempts: DEFAULT_ATTEMPTS,
            nameservers: Vec::new(),
        }
    }
}

/// Default per-attempt timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default number of attempts per query
pub const DEFAULT_ATTEMPTS: usize = 2;

const DNS_PORT: u16 = 53;

/// [`DnsblResolver`] backed by hickory's tokio resolver
pub struct HickoryResolver {
    inner: TokioResolver,
}

impl HickoryResolver {
    /// Create a resolver from the system configuration or explicit nameservers
    pub fn new(settings: &ResolverSettings) -> Result<Self> {
        if !settings.nameservers.is_empty() {
            let group =
                NameServerConfigGroup::from_ips_clear(&settings.nameservers, DNS_PORT, true);
            return Ok(Self::with_nameservers(group, settings));
        }

        let mut builder =
            TokioResolver::builder_tokio().map_err(|e| CheckError::ResolverInit(e.to_string()))?;
        let opts = builder.options_mut();
        opts.timeout = settings.timeout;
        opts.attempts = settings.attempts;

        debug!(
            timeout_ms = settings.timeout.as_millis(),
            attempts = settings.attempts,
            "resolver initialized from system configuration"
        );

        Ok(Self {
            inner: builder.build(),
        })
    }

    /// Create a resolver that only queries `group`
    pub(crate) fn with_nameservers(
        group: NameServerConfigGroup,
        settings: &ResolverSettings,
    ) -> Self {
        let mut builder = TokioResolver::builder_with_config(
            ResolverConfig::from_parts(None, Vec::new(), group),
            TokioConnectionProvider::default(),
        );
        let opts = builder.options_mut();
        opts.timeout = settings.timeout;
        opts.attempts = settings.attempts;

        debug!(
            timeout_ms = settings.timeout.as_millis(),
            attempts = settings.attempts,
            "resolver initialized with explicit nameservers"
        );

        Self {
            inner: builder.build(),
        }
    }
}

#[async_trait]
impl DnsblResolver for HickoryResolver {
    async fn lookup_a(&self, name: &str) -> QueryResult<Vec<Ipv4Addr>> {
        let lookup = self.inner.ipv4_lookup(name).await.map_err(|e| classify(&e))?;
        let addresses: Vec<Ipv4Addr> = lookup.iter().map(|a| a.0).collect();
        if addresses.is_empty() {
            return Err(QueryError::NotFound);
        }
        Ok(addresses)
    }

    async fn lookup_txt(&self, name: &str) -> QueryResult<TextPayload> {
        let lookup = self.inner.txt_lookup(name).await.map_err(|e| classify(&e))?;
        let records: TextPayload = lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .flat_map(|part| part.iter().copied())
                    .collect()
            })
            .collect();
        if records.is_empty() {
            return Err(QueryError::NotFound);
        }
        Ok(records)
    }
}

/// Map a hickory error to a DNSBL query outcome.
///
/// Only NXDOMAIN and an empty NOERROR answer (NODATA) mean "no entry in this
/// zone". Hickory reports SERVFAIL, REFUSED and the other error rcodes as
/// `NoRecordsFound` too; those are failures.
fn classify(err: &ResolveError) -> QueryError {
    match err.proto().map(ProtoError::kind) {
        Some(ProtoErrorKind::NoRecordsFound { response_code, .. })
            if is_negative_answer(*response_code) =>
        {
            QueryError::NotFound
        }
        _ => QueryError::failed(err),
    }
}

const fn is_negative_answer(code: ResponseCode) -> bool {
    matches!(code, ResponseCode::NXDomain | ResponseCode::NoError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{ExitStatus, RunTally};
    use crate::lookup::LookupState;
    use crate::orchestrator::{CheckOptions, Orchestrator};
    use crate::zone::ZoneRegistry;
    use std::net::SocketAddr;
    use tokio::net::UdpSocket;

    const NOERROR: u8 = 0;
    const SERVFAIL: u8 = 2;
    const NXDOMAIN: u8 = 3;
    const REFUSED: u8 = 5;

    /// Local UDP nameserver answering every query with `rcode` and `answers`.
    async fn nameserver(rcode: u8, answers: Vec<Ipv4Addr>) -> SocketAddr {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            while let Ok((len, peer)) = socket.recv_from(&mut buf).await {
                let reply = reply(&buf[..len], rcode, &answers);
                let _ = socket.send_to(&reply, peer).await;
            }
        });
        addr
    }

    fn reply(query: &[u8], rcode: u8, answers: &[Ipv4Addr]) -> Vec<u8> {
        let mut end = 12;
        while query[end] != 0 {
            end += usize::from(query[end]) + 1;
        }
        // root label, QTYPE, QCLASS
        end += 5;

        let mut out = Vec::with_capacity(end + answers.len() * 16);
        out.extend_from_slice(&query[..2]);
        out.push(0x80 | (query[2] & 0x01));
        out.push(0x80 | rcode);
        out.extend_from_slice(&[0, 1]);
        out.extend_from_slice(&u16::try_from(answers.len()).unwrap().to_be_bytes());
        out.extend_from_slice(&[0, 0, 0, 0]);
        out.extend_from_slice(&query[12..end]);
        for addr in answers {
            out.extend_from_slice(&[0xc0, 0x0c, 0, 1, 0, 1, 0, 0, 0, 60, 0, 4]);
            out.extend_from_slice(&addr.octets());
        }
        out
    }

    fn resolver_for(addr: SocketAddr) -> HickoryResolver {
        let settings = ResolverSettings {
            timeout: Duration::from_millis(500),
            attempts: 1,
            nameservers: Vec::new(),
        };
        let group = NameServerConfigGroup::from_ips_clear(&[addr.ip()], addr.port(), true);
        HickoryResolver::with_nameservers(group, &settings)
    }

    #[test]
    fn test_default_settings() {
        let settings = ResolverSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.attempts, 2);
        assert!(settings.nameservers.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_nameservers_build() {
        let settings = ResolverSettings {
            nameservers: vec!["127.0.0.1".parse().unwrap()],
            ..ResolverSettings::default()
        };
        assert!(HickoryResolver::new(&settings).is_ok());
    }

    #[test]
    fn test_negative_answer_codes() {
        assert!(is_negative_answer(ResponseCode::NXDomain));
        assert!(is_negative_answer(ResponseCode::NoError));
        assert!(!is_negative_answer(ResponseCode::ServFail));
        assert!(!is_negative_answer(ResponseCode::Refused));
        assert!(!is_negative_answer(ResponseCode::FormErr));
        assert!(!is_negative_answer(ResponseCode::NotImp));
    }

    #[tokio::test]
    async fn test_listing_answer() {
        let resolver = resolver_for(nameserver(NOERROR, vec![Ipv4Addr::new(127, 0, 0, 2)]).await);
        let result = resolver.lookup_a("2.0.0.127.bl.example.com.").await;
        assert_eq!(result, Ok(vec![Ipv4Addr::new(127, 0, 0, 2)]));
    }

    #[tokio::test]
    async fn test_nxdomain_is_not_found() {
        let resolver = resolver_for(nameserver(NXDOMAIN, Vec::new()).await);
        let result = resolver.lookup_a("4.3.2.1.bl.example.com.").await;
        assert_eq!(result, Err(QueryError::NotFound));
    }

    #[tokio::test]
    async fn test_nodata_is_not_found() {
        let resolver = resolver_for(nameserver(NOERROR, Vec::new()).await);
        let result = resolver.lookup_a("4.3.2.1.bl.example.com.").await;
        assert_eq!(result, Err(QueryError::NotFound));
    }

    #[tokio::test]
    async fn test_servfail_is_failure() {
        let resolver = resolver_for(nameserver(SERVFAIL, Vec::new()).await);
        let result = resolver.lookup_a("4.3.2.1.bl.example.com.").await;
        assert!(matches!(result, Err(QueryError::Failed(_))), "{result:?}");
    }

    #[tokio::test]
    async fn test_refused_is_failure() {
        let resolver = resolver_for(nameserver(REFUSED, Vec::new()).await);
        let result = resolver.lookup_txt("4.3.2.1.bl.example.com.").await;
        assert!(matches!(result, Err(QueryError::Failed(_))), "{result:?}");
    }

    #[tokio::test]
    async fn test_unanswered_query_is_failure() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let resolver = resolver_for(silent.local_addr().unwrap());
        let result = resolver.lookup_a("4.3.2.1.bl.example.com.").await;
        assert!(matches!(result, Err(QueryError::Failed(_))), "{result:?}");
    }

    #[tokio::test]
    async fn test_servfail_zone_counts_as_failure() {
        let resolver = resolver_for(nameserver(SERVFAIL, Vec::new()).await);
        let zones = ZoneRegistry::from_names(["bl.example.com"]).unwrap();
        let checker = Orchestrator::new(&resolver, &zones, CheckOptions::default()).unwrap();
        let mut tally = RunTally::new();

        let target = checker.check("1.2.3.4", &mut tally).await;

        assert!(matches!(
            target.lookups()[0].state(),
            LookupState::Failed { .. }
        ));
        assert_eq!(tally.failures(), 1);
        assert_eq!(tally.listed(), 0);
        assert_eq!(tally.exit_status(), ExitStatus::Failures);
    }
}
