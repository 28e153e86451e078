//! Structured logging setup.
//!
//! The library only emits `tracing` events; installing a subscriber is up
//! to the embedding application. [`init_logging`] is the stock choice:
//! human-readable or JSONL output on stderr, filtered by [`LogConfig::level`]
//! unless `RUST_LOG` is set and `TSFRAME_LOG` is not.

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel, ENV_LOG, ENV_LOG_FORMAT};

use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events pass the default filter.
const TARGETS: &[&str] = &["tf_core", "tf_codec", "tf_frame"];

fn default_filter(config: &LogConfig) -> EnvFilter {
    let directives = TARGETS
        .iter()
        .map(|target| format!("{}={}", target, config.level))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::new(directives)
}

/// `RUST_LOG` directives verbatim when `TSFRAME_LOG` is unset, else the
/// per-crate filter at `config.level`.
fn env_filter<F>(config: &LogConfig, lookup: F) -> EnvFilter
where
    F: Fn(&str) -> Option<String>,
{
    if lookup(ENV_LOG).is_none() {
        if let Some(filter) = lookup("RUST_LOG").and_then(|d| EnvFilter::try_new(d).ok()) {
            return filter;
        }
    }
    default_filter(config)
}

/// Install a global subscriber for `config`.
///
/// Returns `false` when a subscriber was already installed, which leaves
/// the existing one in place.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = env_filter(config, |key| std::env::var(key).ok());
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Human => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                registry.with(layer).try_init()
            } else {
                registry.with(layer.without_time()).try_init()
            }
        }
        LogFormat::Jsonl => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    installed.is_ok()
}

/// [`init_logging`] with the environment-derived defaults.
pub fn init_default_logging() -> bool {
    init_logging(&LogConfig::from_env(None, None))
}
