//! Logging setup for hosts that do not install their own subscriber.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`.
///
/// `default_directive` (for example `"osmlayer=debug"`) applies when
/// `RUST_LOG` is unset; an unparsable directive falls back to `info`.
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging(default_directive: &str) -> bool {
    let directive = default_directive
        .parse::<Directive>()
        .unwrap_or_else(|_| LevelFilter::INFO.into());

    tracing_subscriber::fmt::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(directive)
                .from_env_lossy(),
        )
        .try_init()
        .is_ok()
}
