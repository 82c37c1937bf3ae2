//! Logging setup for the command-line front-end.
//!
//! Without the `tracing` feature, [`init_with_level`] installs a small stderr
//! sink for the `log` facade. Lines carry the time since install, the level
//! and the emitting module:
//!
//! ```text
//! [  0.012s  INFO polar_horizon::session] loaded panorama 4096x2048
//! ```
//!
//! With the feature, [`init_tracing`] installs a `tracing-subscriber` whose
//! default filter follows the same `-v` count, and `RUST_LOG` overrides it.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct StderrSink {
    level: LevelFilter,
    since: Instant,
}

impl Log for StderrSink {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut out = std::io::stderr().lock();
        let _ = writeln!(
            out,
            "[{:7.3}s {:>5} {}] {}",
            self.since.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static SINK: OnceLock<StderrSink> = OnceLock::new();

/// Route `log` records at or above `level` to stderr.
///
/// Only the first call installs anything; later calls return `Ok(())` and
/// keep the level chosen first.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut fresh = false;
    let sink = SINK.get_or_init(|| {
        fresh = true;
        StderrSink {
            level,
            since: Instant::now(),
        }
    });
    if fresh {
        log::set_logger(sink)?;
        log::set_max_level(sink.level);
    }
    Ok(())
}

/// Map a `-v` repetition count to a level filter.
pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Filter directive used when `RUST_LOG` is unset.
#[cfg(feature = "tracing")]
fn default_directive(level: LevelFilter) -> String {
    level.as_str().to_ascii_lowercase()
}

/// Install a `tracing` subscriber. `RUST_LOG` wins over `level`; `json`
/// switches to one flattened JSON object per event.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: LevelFilter, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    // Already-installed subscribers are left in place.
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_from_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_from_verbosity(1), LevelFilter::Info);
        assert_eq!(level_from_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(9), LevelFilter::Trace);
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn tracing_default_follows_verbosity() {
        assert_eq!(default_directive(level_from_verbosity(0)), "warn");
        assert_eq!(default_directive(level_from_verbosity(2)), "debug");
        assert_eq!(default_directive(LevelFilter::Off), "off");
    }

    #[test]
    fn second_install_is_a_noop() {
        init_with_level(LevelFilter::Info).expect("first install");
        init_with_level(LevelFilter::Trace).expect("second install");
        assert_eq!(log::max_level(), LevelFilter::Info);
    }
}
