//! crates/logging/src/tracing_bridge.rs
//! Installation of the global tracing subscriber.
//!
//! The subscriber formats events to stderr (or a caller supplied writer)
//! behind an [`EnvFilter`]. The filter comes from the [`LOG_ENV`] variable
//! when it is set and parses, otherwise from [`VerbosityConfig::directive`].

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::VerbosityConfig;

/// Environment variable overriding the computed filter directive.
pub const LOG_ENV: &str = "RBH_SYNC_LOG";

/// Installs a stderr subscriber for `config`.
///
/// Returns `false` when a global subscriber was already installed, which
/// leaves the existing one in place.
pub fn init_tracing(config: &VerbosityConfig) -> bool {
    init_tracing_with_writer(config, std::io::stderr)
}

/// Installs a subscriber that formats events into `writer`.
pub fn init_tracing_with_writer<W>(config: &VerbosityConfig, writer: W) -> bool
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .without_time();

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(fmt)
        .try_init()
        .is_ok()
}

fn build_filter(config: &VerbosityConfig) -> EnvFilter {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(config.directive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    use crate::levels::Area;

    #[test]
    fn filter_follows_config_directive() {
        let config = VerbosityConfig::from_verbose_level(2).with_area(Area::Chunk, LevelFilter::OFF);
        if std::env::var_os(LOG_ENV).is_none() {
            let rendered = build_filter(&config).to_string();
            assert!(rendered.contains("debug"));
            assert!(rendered.contains("rbh::chunk=off"));
        }
    }
}
