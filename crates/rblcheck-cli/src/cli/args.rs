//! Command-line argument definitions using clap.

use clap::{ArgAction, Parser};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Check IP addresses and hostnames against DNS blocklists (DNSBLs)
///
/// Every address is looked up in every zone given with -s. Exit status is
/// 100 if anything is listed, 2 if some lookups failed, 0 otherwise.
#[derive(Parser, Debug)]
#[command(name = "rblcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Add a DNSBL zone to the service list (repeatable)
    #[arg(
        short = 's',
        long = "zone",
        value_name = "ZONE",
        env = "RBLCHECK_ZONES",
        value_delimiter = ','
    )]
    pub zones: Vec<String>,

    /// Obtain and print TXT records if any
    #[arg(short = 't', long)]
    pub txt: bool,

    /// Less output; repeat for bare results only
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    /// More output; -v also shows zones that do NOT list the address
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Stop checking after the first target that is listed
    #[arg(short = 'm', long)]
    pub first_match: bool,

    /// Per-attempt query timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Attempts per query before it counts as failed
    #[arg(long, value_name = "N")]
    pub attempts: Option<usize>,

    /// Query this nameserver instead of the system resolver (repeatable)
    #[arg(long = "nameserver", value_name = "IP")]
    pub nameservers: Vec<IpAddr>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short = 'c', long, value_name = "PATH", env = "RBLCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Ignore the configuration file
    #[arg(long, conflicts_with = "config")]
    pub no_config: bool,

    /// Log filter for diagnostics on stderr (e.g. "debug"; default: RUST_LOG or "warn").
    /// Failure reports are always shown unless "rblcheck::failure=off" is given.
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// IP addresses or hostnames to check
    #[arg(required = true, value_name = "ADDRESS")]
    pub targets: Vec<String>,
}

impl Cli {
    /// Output verbosity: 1 by default, lowered by -q and raised by -v.
    pub fn verbosity(&self) -> i32 {
        1 + i32::from(self.verbose) - i32::from(self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_options() {
        let cli = Cli::try_parse_from([
            "rblcheck", "-s", "bl.example.com", "-s", "dnsbl.example.net", "-t", "-vv", "-q",
            "-m", "192.0.2.1", "mail.example.org",
        ])
        .unwrap();
        assert_eq!(cli.zones, ["bl.example.com", "dnsbl.example.net"]);
        assert!(cli.txt);
        assert!(cli.first_match);
        assert_eq!(cli.verbosity(), 2);
        assert_eq!(cli.targets, ["192.0.2.1", "mail.example.org"]);
    }

    #[test]
    fn test_quiet_goes_below_zero() {
        let cli = Cli::try_parse_from(["rblcheck", "-qq", "192.0.2.1"]).unwrap();
        assert_eq!(cli.verbosity(), -1);
    }

    #[test]
    fn test_comma_separated_zones() {
        let cli = Cli::try_parse_from(["rblcheck", "--zone", "a.example,b.example", "192.0.2.1"])
            .unwrap();
        assert_eq!(cli.zones, ["a.example", "b.example"]);
    }

    #[test]
    fn test_target_required() {
        assert!(Cli::try_parse_from(["rblcheck", "-s", "bl.example.com"]).is_err());
    }

    #[test]
    fn test_nameserver_must_be_an_address() {
        assert!(
            Cli::try_parse_from(["rblcheck", "--nameserver", "dns.example", "192.0.2.1"]).is_err()
        );
    }
}
