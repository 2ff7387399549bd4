//! Targets and their per-(address, zone) lookup records.

use std::net::{IpAddr, Ipv4Addr};

use crate::encoding;
use crate::zone::{Zone, ZoneRegistry};

/// Raw TXT data published by a zone: one byte string per TXT record.
pub type TextPayload = Vec<Vec<u8>>;

/// Outcome state of one lookup record.
///
/// `Pending` is the only non-terminal state. A record moves out of it exactly
/// once; the only later change is attaching TXT data to a `Listed` record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LookupState {
    /// Query submitted, no answer yet
    #[default]
    Pending,
    /// The zone published an address record for this address
    Listed {
        /// Returned A records (typically 127.0.0.x return codes)
        addresses: Vec<Ipv4Addr>,
        /// TXT explanation, if requested and published
        text: Option<TextPayload>,
    },
    /// The zone answered with a definitive negative
    NotListed,
    /// The query could not be answered
    Failed {
        /// Underlying resolver error
        error: String,
    },
}

impl LookupState {
    /// Returns true until the address query completes
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true once any terminal state was reached
    pub const fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    /// Short lowercase label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Listed { .. } => "listed",
            Self::NotListed => "not_listed",
            Self::Failed { .. } => "failed",
        }
    }
}

/// One address checked against one zone.
#[derive(Debug, Clone)]
pub struct LookupRecord {
    address: IpAddr,
    zone: Zone,
    state: LookupState,
}

impl LookupRecord {
    pub(crate) const fn new(address: IpAddr, zone: Zone) -> Self {
        Self {
            address,
            zone,
            state: LookupState::Pending,
        }
    }

    /// The checked address
    pub const fn address(&self) -> IpAddr {
        self.address
    }

    /// The zone this address was checked against
    pub const fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Zone name shortcut
    pub fn zone_name(&self) -> &str {
        self.zone.name()
    }

    /// Current state
    pub const fn state(&self) -> &LookupState {
        &self.state
    }

    /// Fully qualified DNSBL name queried for this record
    pub fn query_name(&self) -> String {
        encoding::query_name(&self.address, self.zone.name())
    }

    /// Returns true if the zone lists this address
    pub const fn is_listed(&self) -> bool {
        matches!(self.state, LookupState::Listed { .. })
    }

    /// Addresses returned by the zone, present only when listed
    pub fn listing_addresses(&self) -> Option<&[Ipv4Addr]> {
        match &self.state {
            LookupState::Listed { addresses, .. } => Some(addresses.as_slice()),
            _ => None,
        }
    }

    /// TXT data, present only when listed and the zone published one
    pub const fn text_payload(&self) -> Option<&TextPayload> {
        match &self.state {
            LookupState::Listed {
                text: Some(text), ..
            } => Some(text),
            _ => None,
        }
    }

    pub(crate) fn mark_listed(&mut self, addresses: Vec<Ipv4Addr>) {
        debug_assert!(self.state.is_pending(), "lookup completed twice");
        self.state = LookupState::Listed {
            addresses,
            text: None,
        };
    }

    pub(crate) fn mark_not_listed(&mut self) {
        debug_assert!(self.state.is_pending(), "lookup completed twice");
        self.state = LookupState::NotListed;
    }

    pub(crate) fn mark_failed(&mut self, error: String) {
        debug_assert!(self.state.is_pending(), "lookup completed twice");
        self.state = LookupState::Failed { error };
    }

    pub(crate) fn attach_text(&mut self, payload: TextPayload) {
        debug_assert!(self.is_listed(), "text attached to a record that is not listed");
        if let LookupState::Listed { text, .. } = &mut self.state {
            *text = Some(payload);
        }
    }
}

/// One host being checked: a literal address or a hostname.
///
/// Owns its lookup records. They are created in one go once the addresses are
/// known, `zones x addresses` (zones outer), and never added to afterwards.
#[derive(Debug, Clone)]
pub struct Target {
    argument: String,
    literal: Option<IpAddr>,
    addresses: Vec<IpAddr>,
    resolution_error: Option<String>,
    listed: usize,
    lookups: Vec<LookupRecord>,
}

impl Target {
    /// Create a target from a command-line argument
    #[must_use]
    pub fn new(argument: impl Into<String>) -> Self {
        let argument = argument.into();
        let literal = argument.parse::<IpAddr>().ok();
        Self {
            argument,
            literal,
            addresses: Vec::new(),
            resolution_error: None,
            listed: 0,
            lookups: Vec::new(),
        }
    }

    /// The argument exactly as given
    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// The address, if the argument was a literal IP
    pub const fn literal_address(&self) -> Option<IpAddr> {
        self.literal
    }

    /// Returns true if the argument was a literal IP
    pub const fn is_literal(&self) -> bool {
        self.literal.is_some()
    }

    /// Hostname, or `None` for literal targets
    pub fn hostname(&self) -> Option<&str> {
        if self.is_literal() {
            None
        } else {
            Some(self.argument.as_str())
        }
    }

    /// Resolved addresses (empty until resolution completes, or if it failed)
    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }

    /// Number of resolved addresses
    pub fn resolved_address_count(&self) -> usize {
        self.addresses.len()
    }

    /// Returns true if the target has at least one address to check
    pub fn has_addresses(&self) -> bool {
        !self.addresses.is_empty()
    }

    /// Why name resolution failed, if it did
    pub fn resolution_error(&self) -> Option<&str> {
        self.resolution_error.as_deref()
    }

    /// Number of positive hits across all zones
    pub const fn listed_count(&self) -> usize {
        self.listed
    }

    /// Lookup records in submission order (zones outer, addresses inner)
    pub fn lookups(&self) -> &[LookupRecord] {
        &self.lookups
    }

    /// Returns true once every lookup record reached a terminal state
    pub fn is_complete(&self) -> bool {
        self.lookups.iter().all(|l| l.state().is_terminal())
    }

    /// Create the lookup records for `zones x addresses`.
    ///
    /// Returns the index range of the new records.
    pub(crate) fn populate(
        &mut self,
        zones: &ZoneRegistry,
        addresses: Vec<IpAddr>,
    ) -> std::ops::Range<usize> {
        debug_assert!(self.lookups.is_empty(), "lookups created twice");
        self.lookups = zones
            .iter()
            .flat_map(|zone| {
                addresses
                    .iter()
                    .map(move |addr| LookupRecord::new(*addr, zone.clone()))
            })
            .collect();
        self.addresses = addresses;
        0..self.lookups.len()
    }

    pub(crate) fn fail_resolution(&mut self, error: String) {
        self.resolution_error = Some(error);
    }

    pub(crate) fn lookup_mut(&mut self, index: usize) -> Option<&mut LookupRecord> {
        self.lookups.get_mut(index)
    }

    pub(crate) fn record_listing(&mut self) {
        self.listed += 1;
    }
}
