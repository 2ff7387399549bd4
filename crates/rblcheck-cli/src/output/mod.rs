//! Output formatting for check results.
//!
//! Text output follows the traditional DNSBL checker layout and depends on
//! the verbosity level:
//!
//! - `< 0`: bare results only (listing addresses or TXT strings)
//! - `0`: `host zone result`
//! - `1` (default): `host is listed by zone: result`, TXT on indented lines
//! - `>= 2`: also `host is NOT listed by zone`

use clap::ValueEnum;
use rblcheck_core::{summarize, LookupRecord, LookupState, Target, TargetSummary};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::net::{IpAddr, Ipv4Addr};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per target
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Escape one TXT string for display.
///
/// Control and non-ASCII bytes become `\xNN`; `\` and `"` are
/// backslash-escaped.
pub fn escape_txt(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if !(b' '..0x7f).contains(&b) {
            let _ = write!(out, "\\x{b:02x}");
        } else if b == b'\\' || b == b'"' {
            out.push('\\');
            out.push(char::from(b));
        } else {
            out.push(char::from(b));
        }
    }
    out
}

/// Writes completed targets to an output stream.
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
    verbosity: i32,
    txt: bool,
    targets: usize,
}

impl<W: Write> Reporter<W> {
    /// Create a reporter
    pub const fn new(out: W, format: OutputFormat, verbosity: i32, txt: bool) -> Self {
        Self {
            out,
            format,
            verbosity,
            txt,
            targets: 0,
        }
    }

    /// Report one completed target
    pub fn report(&mut self, target: &Target) -> io::Result<()> {
        let first = self.targets == 0;
        self.targets += 1;
        match self.format {
            OutputFormat::Text => {
                if !first && (self.verbosity > 1 || (self.verbosity == 1 && self.txt)) {
                    writeln!(self.out)?;
                }
                self.write_text(target)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &TargetView::new(target))?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }

    /// Consume the reporter, returning the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_text(&mut self, target: &Target) -> io::Result<()> {
        if !target.has_addresses() {
            return Ok(());
        }
        for record in target.lookups() {
            let mut line = String::new();
            match record.state() {
                LookupState::Pending | LookupState::Failed { .. } => continue,
                LookupState::NotListed => {
                    if self.verbosity < 2 {
                        continue;
                    }
                    line.push_str(&host_label(target, record.address()));
                    let _ = write!(line, " is NOT listed by {}", record.zone_name());
                }
                LookupState::Listed { addresses, text } => {
                    self.format_listing(&mut line, target, record, addresses, text.as_deref());
                }
            }
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn format_listing(
        &self,
        line: &mut String,
        target: &Target,
        record: &LookupRecord,
        addresses: &[Ipv4Addr],
        text: Option<&[Vec<u8>]>,
    ) {
        if self.verbosity >= 0 {
            line.push_str(&host_label(target, record.address()));
        }
        if self.verbosity >= 1 {
            let _ = write!(line, " is listed by {}: ", record.zone_name());
        } else if self.verbosity >= 0 {
            let _ = write!(line, " {} ", record.zone_name());
        }

        if self.verbosity >= 1 || !self.txt {
            let joined: Vec<String> = addresses.iter().map(ToString::to_string).collect();
            line.push_str(&joined.join(" "));
        }

        if !self.txt {
            return;
        }
        match text {
            Some(strings) => {
                for (j, s) in strings.iter().enumerate() {
                    if self.verbosity > 0 {
                        line.push_str("\n\t");
                    } else if j > 0 {
                        line.push(' ');
                    }
                    let _ = write!(line, "\"{}\"", escape_txt(s));
                }
            }
            None => line.push_str("<no text available>"),
        }
    }
}

/// `name[address]` for hostname targets, the bare address for literals
fn host_label(target: &Target, address: IpAddr) -> String {
    target
        .hostname()
        .map_or_else(|| address.to_string(), |name| format!("{name}[{address}]"))
}

/// JSON shape of one target
#[derive(Debug, Serialize)]
struct TargetView<'a> {
    target: &'a str,
    addresses: &'a [IpAddr],
    listed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution_error: Option<&'a str>,
    summary: TargetSummary,
    lookups: Vec<LookupView<'a>>,
}

impl<'a> TargetView<'a> {
    fn new(target: &'a Target) -> Self {
        Self {
            target: target.argument(),
            addresses: target.addresses(),
            listed: target.listed_count(),
            resolution_error: target.resolution_error(),
            summary: summarize(target),
            lookups: target.lookups().iter().map(LookupView::new).collect(),
        }
    }
}

/// JSON shape of one lookup record
#[derive(Debug, Serialize)]
struct LookupView<'a> {
    address: IpAddr,
    zone: &'a str,
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    addresses: Option<&'a [Ipv4Addr]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> LookupView<'a> {
    fn new(record: &'a LookupRecord) -> Self {
        let error = match record.state() {
            LookupState::Failed { error } => Some(error.as_str()),
            _ => None,
        };
        Self {
            address: record.address(),
            zone: record.zone_name(),
            state: record.state().label(),
            addresses: record.listing_addresses(),
            text: record
                .text_payload()
                .map(|strings| strings.iter().map(|s| escape_txt(s)).collect()),
            error,
        }
    }
}
