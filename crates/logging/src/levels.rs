//! crates/logging/src/levels.rs
//! Diagnostic areas and their tracing targets.

use std::fmt;
use std::str::FromStr;

/// Subsystems that emit diagnostics, one tracing target each.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Area {
    /// Entry sources and the retry loop.
    Source,
    /// Field projection and entry-to-event conversion.
    Convert,
    /// Batching.
    Chunk,
    /// Batch delivery to the destination.
    Commit,
    /// Run-level orchestration and statistics.
    Sync,
    /// Backend resolution and store implementations.
    Backend,
}

impl Area {
    /// Every area, in display order.
    pub const ALL: [Self; 6] = [
        Self::Source,
        Self::Convert,
        Self::Chunk,
        Self::Commit,
        Self::Sync,
        Self::Backend,
    ];

    /// Tracing target used by this area.
    #[must_use]
    pub const fn target(self) -> &'static str {
        match self {
            Self::Source => "rbh::source",
            Self::Convert => "rbh::convert",
            Self::Chunk => "rbh::chunk",
            Self::Commit => "rbh::commit",
            Self::Sync => "rbh::sync",
            Self::Backend => "rbh::backend",
        }
    }

    /// Short name accepted on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Convert => "convert",
            Self::Chunk => "chunk",
            Self::Commit => "commit",
            Self::Sync => "sync",
            Self::Backend => "backend",
        }
    }

    /// Maps a tracing target back to its area.
    ///
    /// Nested targets such as `rbh::commit::json` resolve to their parent.
    #[must_use]
    pub fn from_target(target: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|area| {
            target
                .strip_prefix(area.target())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
        })
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Area {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|area| area.name() == name)
            .ok_or_else(|| format!("unknown log area: {name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_round_trip_through_from_target() {
        for area in Area::ALL {
            assert_eq!(Area::from_target(area.target()), Some(area));
        }
    }

    #[test]
    fn nested_targets_resolve_to_parent() {
        assert_eq!(Area::from_target("rbh::backend::json"), Some(Area::Backend));
        assert_eq!(Area::from_target("rbh::syncer"), None);
        assert_eq!(Area::from_target("other::sync"), None);
    }

    #[test]
    fn names_parse() {
        assert_eq!("convert".parse::<Area>(), Ok(Area::Convert));
        assert!("unknown".parse::<Area>().is_err());
        assert_eq!(Area::Commit.to_string(), "commit");
    }
}
