//! crates/engine/src/mode.rs
//! What part of the source a run reads.

use std::fmt;
use std::str::FromStr;

use fsentry::{Id, IdParseError};

/// Designates one entry of a store, by path from the root or by identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Locator {
    /// `/`-separated path from the root entry.
    Path(String),
    /// Identifier of the entry.
    Id(Id),
}

impl Locator {
    /// The root entry.
    #[must_use]
    pub fn root() -> Self {
        Self::Path("/".to_owned())
    }

    /// Non-empty path components, or `None` for an identifier.
    pub fn components(&self) -> Option<impl Iterator<Item = &str>> {
        match self {
            Self::Path(path) => Some(path.split('/').filter(|part| !part.is_empty())),
            Self::Id(_) => None,
        }
    }
}

/// `[ID]` for identifiers, the path otherwise.
impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.write_str(path),
            Self::Id(id) => write!(f, "[{id}]"),
        }
    }
}

impl FromStr for Locator {
    type Err = IdParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            Some(id) => id.parse().map(Self::Id),
            None => Ok(Self::Path(text.to_owned())),
        }
    }
}

/// Selects which entries a run pulls from the source.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Every entry of the source.
    #[default]
    Tree,
    /// The designated entry and everything below it.
    Branch(Locator),
    /// Only the designated entry.
    One(Locator),
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree => f.write_str("tree"),
            Self::Branch(at) => write!(f, "branch {at}"),
            Self::One(at) => write!(f, "one {at}"),
        }
    }
}
