//! crates/backend/src/uri.rs
//! Store identifiers of the form `rbh:BACKEND:FSNAME[#FRAGMENT]`.
//!
//! The fragment designates one entry of the store, either by path or, when
//! enclosed in square brackets, by base64url identifier.

use std::fmt;
use std::str::FromStr;

use engine::{Locator, SyncError};
use fsentry::IdParseError;
use thiserror::Error;

/// Scheme every store URI starts with.
pub const SCHEME: &str = "rbh";

/// Failure to parse or resolve a store URI.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UriError {
    /// The text does not start with `rbh:`.
    #[error("'{0}' is not a robinhood URI (expected {SCHEME}:BACKEND:FSNAME)")]
    Scheme(String),
    /// The backend name is empty or missing.
    #[error("'{0}' does not name a backend")]
    MissingBackend(String),
    /// The filesystem name is empty.
    #[error("'{0}' does not name a filesystem")]
    MissingFsname(String),
    /// The fragment is an unparseable identifier.
    #[error("invalid fragment in '{uri}': {source}")]
    Fragment {
        /// Offending URI.
        uri: String,
        /// Identifier parse failure.
        #[source]
        source: IdParseError,
    },
    /// No backend is registered under this name.
    #[error("unknown backend '{0}'")]
    UnknownBackend(String),
}

impl From<UriError> for SyncError {
    fn from(error: UriError) -> Self {
        Self::Usage(error.to_string())
    }
}

/// A parsed store URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Uri {
    /// Backend name, e.g. `json`.
    pub backend: String,
    /// Backend-specific filesystem name.
    pub fsname: String,
    /// Entry designated by the fragment.
    pub fragment: Option<Locator>,
}

impl FromStr for Uri {
    type Err = UriError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let rest = text
            .strip_prefix(SCHEME)
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(|| UriError::Scheme(text.to_owned()))?;
        let (backend, rest) = rest
            .split_once(':')
            .filter(|(backend, _)| !backend.is_empty())
            .ok_or_else(|| UriError::MissingBackend(text.to_owned()))?;
        let (fsname, fragment) = match rest.split_once('#') {
            Some((fsname, fragment)) => (fsname, Some(fragment)),
            None => (rest, None),
        };
        if fsname.is_empty() {
            return Err(UriError::MissingFsname(text.to_owned()));
        }
        let fragment = fragment
            .map(str::parse::<Locator>)
            .transpose()
            .map_err(|source| UriError::Fragment {
                uri: text.to_owned(),
                source,
            })?;

        Ok(Self {
            backend: backend.to_owned(),
            fsname: fsname.to_owned(),
            fragment,
        })
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}:{}:{}", self.backend, self.fsname)?;
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsentry::Id;

    #[test]
    fn plain_uri() {
        let uri: Uri = "rbh:json:/var/lib/store.jsonl".parse().expect("valid");

        assert_eq!(uri.backend, "json");
        assert_eq!(uri.fsname, "/var/lib/store.jsonl");
        assert_eq!(uri.fragment, None);
    }

    #[test]
    fn path_fragment() {
        let uri: Uri = "rbh:memory:scratch#/a/b".parse().expect("valid");
        assert_eq!(uri.fragment, Some(Locator::Path("/a/b".to_owned())));
    }

    #[test]
    fn id_fragment() {
        let id = Id::from(42_u64);
        let uri: Uri = format!("rbh:memory:scratch#[{id}]").parse().expect("valid");

        assert_eq!(uri.fragment, Some(Locator::Id(id)));
        assert_eq!(uri.to_string(), format!("rbh:memory:scratch#[{}]", Id::from(42_u64)));
    }

    #[test]
    fn fsname_may_contain_colons() {
        let uri: Uri = "rbh:json:C:/stores/a.jsonl".parse().expect("valid");
        assert_eq!(uri.fsname, "C:/stores/a.jsonl");
    }

    #[test]
    fn malformed_uris_are_rejected() {
        assert!(matches!("json:x".parse::<Uri>(), Err(UriError::Scheme(_))));
        assert!(matches!("rbhx:json:x".parse::<Uri>(), Err(UriError::Scheme(_))));
        assert!(matches!("rbh::x".parse::<Uri>(), Err(UriError::MissingBackend(_))));
        assert!(matches!("rbh:json".parse::<Uri>(), Err(UriError::MissingBackend(_))));
        assert!(matches!("rbh:json:".parse::<Uri>(), Err(UriError::MissingFsname(_))));
        assert!(matches!("rbh:json:#/a".parse::<Uri>(), Err(UriError::MissingFsname(_))));
        assert!(matches!(
            "rbh:json:x#[***]".parse::<Uri>(),
            Err(UriError::Fragment { .. })
        ));
    }

    #[test]
    fn uri_errors_are_usage_errors() {
        let error: SyncError = UriError::UnknownBackend("mongo".to_owned()).into();
        assert_eq!(error.exit_code(), engine::EXIT_USAGE);
        assert_eq!(error.to_string(), "unknown backend 'mongo'");
    }
}
