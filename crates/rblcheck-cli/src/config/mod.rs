//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use rblcheck_core::resolver::{DEFAULT_ATTEMPTS, DEFAULT_TIMEOUT_SECS};
use rblcheck_core::{CheckError, ResolverSettings, ZoneRegistry};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::args::Cli;
use crate::output::OutputFormat;

/// File configuration.
///
/// ```toml
/// zones = ["zen.spamhaus.org", "bl.spamcop.net"]
/// txt = true
/// timeout_secs = 5
/// attempts = 2
/// nameservers = ["127.0.0.1"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Zones checked on every run, before any given with -s.
    #[serde(default)]
    pub zones: Vec<String>,

    /// Always fetch TXT records (as if -t was passed).
    #[serde(default)]
    pub txt: bool,

    /// Per-attempt query timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// Attempts per query.
    pub attempts: Option<usize>,

    /// Nameservers to use instead of the system resolver.
    #[serde(default)]
    pub nameservers: Vec<IpAddr>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,
}

impl Config {
    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("org", "rblcheck", "rblcheck")
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default path. A missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the configuration the command line asked for.
    pub fn for_cli(cli: &Cli) -> Result<Self> {
        if cli.no_config {
            Ok(Self::default())
        } else if let Some(path) = &cli.config {
            Self::load_from(path)
        } else {
            Self::load()
        }
    }
}

/// Effective settings for one run: file configuration overlaid with flags.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Zones in check order
    pub zones: ZoneRegistry,
    /// Fetch TXT records for listings
    pub txt: bool,
    /// Resolver tuning
    pub resolver: ResolverSettings,
    /// Output format
    pub output_format: OutputFormat,
}

impl Settings {
    /// Merge file configuration with command-line flags.
    ///
    /// Zones from the file come first, then those from -s, each in given order.
    pub fn merge(config: &Config, cli: &Cli) -> Result<Self> {
        let zones = ZoneRegistry::from_names(config.zones.iter().chain(&cli.zones))?;

        let nameservers = if cli.nameservers.is_empty() {
            config.nameservers.clone()
        } else {
            cli.nameservers.clone()
        };

        let timeout_secs = cli
            .timeout
            .or(config.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let attempts = cli.attempts.or(config.attempts).unwrap_or(DEFAULT_ATTEMPTS);
        if timeout_secs == 0 || attempts == 0 {
            return Err(CheckError::Config("timeout and attempts must be at least 1".into()).into());
        }

        Ok(Self {
            zones,
            txt: cli.txt || config.txt,
            resolver: ResolverSettings {
                timeout: Duration::from_secs(timeout_secs),
                attempts,
                nameservers,
            },
            output_format: cli.output.or(config.output_format).unwrap_or_default(),
        })
    }
}
