#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `pipeline` provides the stream plumbing shared by every rbh-sync stage.
//! Stages are plain [`Iterator`]s over `Result<T, E>` values: `None` is a
//! clean end-of-stream, `Some(Err(_))` is a failure, and the two are never
//! conflated. Evaluation is single-threaded and pull-based; nothing runs
//! until the most downstream consumer asks for the next element.
//!
//! # Design
//!
//! - [`PullSource`] models an external producer that may answer a pull with
//!   [`Pull::Retry`]. [`Blocking`] hides that transient signal by retrying
//!   until data, exhaustion, or a hard failure shows up.
//! - [`Once`] is a one-shot [`PullSource`] used when a single, externally
//!   supplied element replaces a whole scan.
//! - [`Chunks`] groups a stream into lazily consumed [`Chunk`]s of bounded
//!   size. A chunk mutably borrows its parent, so the next chunk cannot be
//!   requested while the current one is alive.
//! - [`tee`] splits a stream into two cursors sharing one reference-counted
//!   buffer, so a consumer can apply elements while another accounts for them.
//! - [`Trap`] turns a fallible stream into an infallible one, parking the
//!   first error in a caller-owned slot.
//!
//! # Invariants
//!
//! - [`Blocking`] never yields a retry signal and never gives up retrying.
//! - A [`Chunk`] yields at most the configured number of elements and is never
//!   empty.
//! - Dropping any stage drops its upstream and every element it buffers.
//!   Dropping a partially consumed [`Chunk`] drains its remainder so the
//!   next chunk starts on a fresh boundary.
//!
//! # Examples
//!
//! ```
//! use pipeline::{Chunks, DEFAULT_CHUNK_SIZE};
//! use std::num::NonZeroUsize;
//!
//! let items = (0..5).map(Ok::<_, std::io::Error>);
//! let mut chunks = Chunks::new(items, NonZeroUsize::new(2).unwrap());
//!
//! let mut sizes = Vec::new();
//! while let Some(chunk) = chunks.next_chunk()? {
//!     sizes.push(chunk.count());
//! }
//! assert_eq!(sizes, [2, 2, 1]);
//! assert_eq!(DEFAULT_CHUNK_SIZE.get(), 4096);
//! # Ok::<(), std::io::Error>(())
//! ```

mod chunks;
mod pull;
mod tee;
mod trap;

pub use crate::chunks::{Chunk, Chunks, DEFAULT_CHUNK_SIZE};
pub use crate::pull::{Blocking, Once, Pull, PullSource};
pub use crate::tee::{Tee, tee};
pub use crate::trap::Trap;
