#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `backend` names metadata stores with `rbh:BACKEND:FSNAME[#FRAGMENT]`
//! URIs and opens them as [`Backend`] trait objects usable as either end of
//! a synchronisation.
//!
//! Two stores are provided:
//!
//! - `memory`: an empty store living for the duration of the process,
//!   mostly useful as a sink when measuring a source.
//! - `json`: a JSON-lines file at the path given as `FSNAME`, loaded on open
//!   and rewritten atomically after every batch.
//!
//! # Examples
//!
//! ```
//! use backend::{Backend, Uri};
//! use engine::Source;
//!
//! let uri: Uri = "rbh:memory:scratch".parse().unwrap();
//! let store = backend::open(&uri).unwrap();
//! assert_eq!(store.as_source().name(), "memory");
//! ```

mod json;
mod memory;
mod uri;

use engine::{Destination, Source, SyncError};
use logging::trace_backend;

pub use crate::json::JsonBackend;
pub use crate::memory::MemoryBackend;
pub use crate::uri::{SCHEME, Uri, UriError};

/// A store that can be read from and written to.
pub trait Backend: Source + Destination {
    /// This store as an entry source.
    fn as_source(&self) -> &dyn Source;

    /// This store as an event destination.
    fn as_destination(&mut self) -> &mut dyn Destination;
}

impl<T: Source + Destination> Backend for T {
    fn as_source(&self) -> &dyn Source {
        self
    }

    fn as_destination(&mut self) -> &mut dyn Destination {
        self
    }
}

/// Opens the store `uri` designates. The fragment is not consulted.
pub fn open(uri: &Uri) -> Result<Box<dyn Backend>, SyncError> {
    trace_backend!(backend = %uri.backend, fsname = %uri.fsname, "opening store");
    match uri.backend.as_str() {
        MemoryBackend::NAME => Ok(Box::new(MemoryBackend::new(uri.fsname.as_str()))),
        JsonBackend::NAME => Ok(Box::new(JsonBackend::open(uri.fsname.as_str())?)),
        other => Err(UriError::UnknownBackend(other.to_owned()).into()),
    }
}
