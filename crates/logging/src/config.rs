//! crates/logging/src/config.rs
//! Verbosity configuration combining a global level with per-area overrides.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use tracing::level_filters::LevelFilter;

use crate::levels::Area;

/// Verbosity for a run: one default level plus optional per-area levels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerbosityConfig {
    default: LevelFilter,
    areas: BTreeMap<Area, LevelFilter>,
}

impl Default for VerbosityConfig {
    fn default() -> Self {
        Self::from_verbose_level(0)
    }
}

impl VerbosityConfig {
    /// Maps a `-v` count onto a level: 0 → warn, 1 → info, 2 → debug,
    /// 3 and above → trace.
    #[must_use]
    pub fn from_verbose_level(level: u8) -> Self {
        let default = match level {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };
        Self {
            default,
            areas: BTreeMap::new(),
        }
    }

    /// Silences everything, including warnings.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            default: LevelFilter::OFF,
            areas: BTreeMap::new(),
        }
    }

    /// Overrides the level of a single area.
    #[must_use]
    pub fn with_area(mut self, area: Area, level: LevelFilter) -> Self {
        self.areas.insert(area, level);
        self
    }

    /// Applies an `AREA[=LEVEL]` token such as `convert=debug`.
    ///
    /// A bare area name enables `debug` for that area.
    pub fn apply_area_token(&mut self, token: &str) -> Result<(), String> {
        let (name, level) = match token.split_once('=') {
            Some((name, level)) => (
                name,
                level
                    .parse::<LevelFilter>()
                    .map_err(|_| format!("invalid log level: {level}"))?,
            ),
            None => (token, LevelFilter::DEBUG),
        };
        let area = name.parse::<Area>()?;
        self.areas.insert(area, level);
        Ok(())
    }

    /// Level applied to areas without an override.
    #[must_use]
    pub const fn default_level(&self) -> LevelFilter {
        self.default
    }

    /// Effective level for `area`.
    #[must_use]
    pub fn level(&self, area: Area) -> LevelFilter {
        self.areas.get(&area).copied().unwrap_or(self.default)
    }

    /// Renders the configuration as an `EnvFilter` directive.
    #[must_use]
    pub fn directive(&self) -> String {
        let mut directive = level_name(self.default).to_owned();
        for (area, level) in &self.areas {
            let _ = write!(directive, ",{}={}", area.target(), level_name(*level));
        }
        directive
    }
}

fn level_name(level: LevelFilter) -> &'static str {
    match level.into_level() {
        None => "off",
        Some(tracing::Level::ERROR) => "error",
        Some(tracing::Level::WARN) => "warn",
        Some(tracing::Level::INFO) => "info",
        Some(tracing::Level::DEBUG) => "debug",
        Some(tracing::Level::TRACE) => "trace",
    }
}
