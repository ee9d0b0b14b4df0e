//! crates/backend/src/json.rs
//! A store persisted as a JSON-lines file, one entry per line.
//!
//! The whole file is loaded when the store is opened. Every update is applied
//! in memory first, then the file is rewritten through a temporary sibling
//! that replaces it atomically, so readers never observe a partial store.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use engine::{BoxedEntrySource, Destination, Locator, Source, SyncError};
use fsentry::{FsEntry, Projection};
use fsevent::FsEvent;
use logging::trace_backend;
use tempfile::NamedTempFile;

use crate::memory::MemoryBackend;

/// JSON-lines store at a filesystem path.
#[derive(Debug)]
pub struct JsonBackend {
    path: PathBuf,
    store: MemoryBackend,
}

impl JsonBackend {
    /// Backend name used in URIs and diagnostics.
    pub const NAME: &'static str = "json";

    /// Loads the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let path = path.into();
        let fsname = path.display().to_string();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                trace_backend!(path = %fsname, "store does not exist yet, starting empty");
                return Ok(Self {
                    path,
                    store: MemoryBackend::new(fsname),
                });
            }
            Err(error) => return Err(error.into()),
        };

        let mut store = MemoryBackend::new(fsname.as_str());
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: FsEntry = serde_json::from_str(&line).map_err(|error| {
                SyncError::backend(Self::NAME, format!("{fsname}:{}: {error}", index + 1))
            })?;
            store.insert(entry);
        }
        trace_backend!(path = %fsname, entries = store.len(), "store loaded");
        Ok(Self { path, store })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The loaded entries.
    #[must_use]
    pub const fn store(&self) -> &MemoryBackend {
        &self.store
    }

    fn persist(&self) -> Result<(), SyncError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file = NamedTempFile::new_in(parent)?;
        let mut writer = BufWriter::new(file);
        for entry in self.store.iter() {
            serde_json::to_writer(&mut writer, entry).map_err(io::Error::from)?;
            writer.write_all(b"\n")?;
        }
        let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        file.persist(&self.path).map_err(|error| error.error)?;
        trace_backend!(path = %self.path.display(), entries = self.store.len(), "store written");
        Ok(())
    }
}

impl Source for JsonBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn entries(&self, projection: &Projection) -> Result<BoxedEntrySource<'_>, SyncError> {
        self.store.entries(projection)
    }

    fn branch(&self, at: &Locator, projection: &Projection) -> Result<BoxedEntrySource<'_>, SyncError> {
        self.store.branch(at, projection)
    }

    fn root(&self, at: &Locator, projection: &Projection) -> Result<FsEntry, SyncError> {
        self.store.root(at, projection)
    }
}

impl Destination for JsonBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn update(&mut self, events: &mut dyn Iterator<Item = Rc<FsEvent>>) -> Result<usize, SyncError> {
        let applied = self.store.apply_all(Self::NAME, events)?;
        self.persist()?;
        Ok(applied)
    }
}
