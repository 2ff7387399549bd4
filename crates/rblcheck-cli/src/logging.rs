//! Diagnostics on stderr via `tracing-subscriber`.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use rblcheck_core::FAILURE_TARGET;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

use crate::PROGRAM;

/// Default filter when neither `--log-level` nor `RUST_LOG` is set
const DEFAULT_FILTER: &str = "warn";

/// Formats events as `rblcheck: <message> key=value ...`.
///
/// Warnings carry no tag so failure reports read like plain diagnostics.
pub struct DiagnosticFormatter;

impl<S, N> FormatEvent<S, N> for DiagnosticFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(writer, "{PROGRAM}: ")?;

        let tag: Option<ColoredString> = match *event.metadata().level() {
            Level::ERROR => Some("error:".red().bold()),
            Level::WARN => None,
            Level::INFO => Some("info:".green()),
            Level::DEBUG => Some("debug:".blue()),
            Level::TRACE => Some("trace:".dimmed()),
        };
        if let Some(tag) = tag {
            write!(writer, "{tag} ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Build the event filter from an explicit directive, `RUST_LOG`, or the default.
///
/// Failure reports stay enabled at `warn` whatever the filter says, unless
/// the directive names their target explicitly.
pub fn filter(directive: Option<&str>) -> Result<EnvFilter> {
    let (filter, source) = match directive {
        Some(directive) => (EnvFilter::try_new(directive)?, Some(directive.to_owned())),
        None => match std::env::var(EnvFilter::DEFAULT_ENV) {
            Ok(env) => match EnvFilter::try_new(&env) {
                Ok(filter) => (filter, Some(env)),
                Err(_) => (EnvFilter::new(DEFAULT_FILTER), None),
            },
            Err(_) => (EnvFilter::new(DEFAULT_FILTER), None),
        },
    };

    if source.is_some_and(|s| s.contains(FAILURE_TARGET)) {
        return Ok(filter);
    }
    Ok(filter.add_directive(format!("{FAILURE_TARGET}=warn").parse()?))
}

/// Install the global subscriber writing to stderr.
pub fn init(directive: Option<&str>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(directive)?)
        .with_writer(std::io::stderr)
        .event_format(DiagnosticFormatter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("unable to initialize logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::warn;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured(directive: &str, emit: impl FnOnce()) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter(Some(directive)).unwrap())
            .with_writer(move || writer.clone())
            .event_format(DiagnosticFormatter)
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_explicit_filter() {
        assert!(filter(Some("debug")).is_ok());
        assert!(filter(Some("rblcheck_core=trace,warn")).is_ok());
    }

    #[test]
    fn test_invalid_filter() {
        assert!(filter(Some("rblcheck=loud")).is_err());
    }

    #[test]
    fn test_failure_reports_survive_restrictive_filter() {
        let out = captured("off", || {
            warn!(
                target: FAILURE_TARGET,
                zone = "bl.example.com",
                "unable to lookup DNSBL A record"
            );
            warn!("ordinary warning");
        });
        assert!(out.starts_with("rblcheck: unable to lookup DNSBL A record"), "{out}");
        assert!(out.contains("bl.example.com"));
        assert!(!out.contains("ordinary warning"));
    }

    #[test]
    fn test_failure_reports_can_be_silenced_by_name() {
        let out = captured(&format!("{FAILURE_TARGET}=off"), || {
            warn!(target: FAILURE_TARGET, "unable to lookup host");
        });
        assert!(out.is_empty());
    }
}
