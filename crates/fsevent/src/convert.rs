//! crates/fsevent/src/convert.rs
//! Entry-to-event conversion.
//!
//! Each entry yields at most one [`FsEvent::Upsert`] followed by at most one
//! [`FsEvent::Link`]. An entry carries content when it has attributes, a
//! link target or inode extended attributes; it carries a link when both
//! its parent and name are present. Entries with neither, and entries with
//! no identifier, are skipped without producing output.

use fsentry::FsEntry;
use logging::trace_convert;

use crate::event::FsEvent;

/// Counters kept by a [`Converter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConvertStats {
    /// Entries that produced at least one event.
    pub converted: u64,
    /// Entries dropped because they had no identifier.
    pub missing_id: u64,
    /// Entries dropped because they carried neither content nor a link.
    pub empty: u64,
    /// Upsert events produced.
    pub upserts: u64,
    /// Link events produced.
    pub links: u64,
}

impl ConvertStats {
    /// Entries that produced no event.
    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.missing_id + self.empty
    }
}

enum State {
    Idle,
    Upserting { upsert: FsEvent, link: Option<FsEvent> },
    Linking(FsEvent),
    Done,
}

/// Converts a fallible entry stream into a fallible event stream.
///
/// The first upstream error is yielded once; the converter is fused after
/// it and after upstream exhaustion.
pub struct Converter<I> {
    inner: I,
    state: State,
    stats: ConvertStats,
}

impl<I> Converter<I> {
    /// Wraps an entry stream.
    pub const fn new(inner: I) -> Self {
        Self {
            inner,
            state: State::Idle,
            stats: ConvertStats {
                converted: 0,
                missing_id: 0,
                empty: 0,
                upserts: 0,
                links: 0,
            },
        }
    }

    /// Counters so far.
    pub const fn stats(&self) -> ConvertStats {
        self.stats
    }

    /// Borrows the wrapped stream.
    pub const fn get_ref(&self) -> &I {
        &self.inner
    }

    fn classify(&mut self, entry: FsEntry) -> State {
        let Some(id) = entry.id else {
            self.stats.missing_id += 1;
            trace_convert!(
                warn: entry_name = entry.name.as_deref().unwrap_or(""),
                "skipping entry without an identifier"
            );
            return State::Idle;
        };

        let has_content =
            entry.statx.is_some() || entry.symlink.is_some() || entry.inode_xattrs.is_some();

        let link = match (entry.parent_id, entry.name) {
            (Some(parent_id), Some(name)) => Some(FsEvent::Link {
                id: id.clone(),
                parent_id,
                name,
                xattrs: entry.ns_xattrs,
            }),
            _ => None,
        };

        if !has_content && link.is_none() {
            self.stats.empty += 1;
            trace_convert!(id = %id, "entry carries neither content nor a link");
            return State::Idle;
        }

        self.stats.converted += 1;
        if has_content {
            State::Upserting {
                upsert: FsEvent::Upsert {
                    id,
                    statx: entry.statx,
                    symlink: entry.symlink,
                    xattrs: entry.inode_xattrs,
                },
                link,
            }
        } else {
            match link {
                Some(link) => State::Linking(link),
                None => State::Idle,
            }
        }
    }

    fn emit(&mut self, event: FsEvent) -> FsEvent {
        if event.is_upsert() {
            self.stats.upserts += 1;
        } else {
            self.stats.links += 1;
        }
        trace_convert!(trace: id = %event.id(), kind = event.kind(), "event");
        event
    }
}

impl<I, E> Iterator for Converter<I>
where
    I: Iterator<Item = Result<FsEntry, E>>,
{
    type Item = Result<FsEvent, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::Idle => match self.inner.next() {
                    None => return None,
                    Some(Err(error)) => return Some(Err(error)),
                    Some(Ok(entry)) => self.state = self.classify(entry),
                },
                State::Upserting { upsert, link } => {
                    self.state = link.map_or(State::Idle, State::Linking);
                    return Some(Ok(self.emit(upsert)));
                }
                State::Linking(link) => {
                    self.state = State::Idle;
                    return Some(Ok(self.emit(link)));
                }
                State::Done => return None,
            }
        }
    }
}

impl<I> std::fmt::Debug for Converter<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            State::Idle => "idle",
            State::Upserting { .. } => "upserting",
            State::Linking(_) => "linking",
            State::Done => "done",
        };
        f.debug_struct("Converter")
            .field("state", &state)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsentry::{Id, Statx, Xattrs};
    use logging::{Area, RecordingLayer, drain_events};
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    fn convert(entries: Vec<FsEntry>) -> (Vec<FsEvent>, ConvertStats) {
        let mut converter = Converter::new(entries.into_iter().map(Ok::<_, String>));
        let events = converter.by_ref().map(|event| event.expect("no error")).collect();
        (events, converter.stats())
    }

    fn upsert(id: u64, statx: Statx) -> FsEvent {
        FsEvent::Upsert {
            id: Id::from(id),
            statx: Some(statx),
            symlink: None,
            xattrs: None,
        }
    }

    fn link(id: u64, parent: u64, name: &str) -> FsEvent {
        FsEvent::Link {
            id: Id::from(id),
            parent_id: Id::from(parent),
            name: name.to_owned(),
            xattrs: None,
        }
    }

    #[test]
    fn entry_without_id_yields_nothing_and_warns() {
        let _ = drain_events();
        let subscriber = tracing_subscriber::registry().with(RecordingLayer);
        let (events, stats) = tracing::subscriber::with_default(subscriber, || {
            convert(vec![FsEntry {
                name: Some("orphan".to_owned()),
                statx: Some(Statx::new().with_size(1)),
                ..FsEntry::default()
            }])
        });

        assert!(events.is_empty());
        assert_eq!(stats.missing_id, 1);

        let warnings: Vec<_> = drain_events()
            .into_iter()
            .filter(|event| event.level == Level::WARN)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].area, Some(Area::Convert));
        assert_eq!(warnings[0].field("entry_name"), Some("orphan"));
    }

    #[test]
    fn content_only_yields_one_upsert() {
        let statx = Statx::new().with_size(10);
        let (events, stats) = convert(vec![FsEntry::new(1_u64).with_statx(statx.clone())]);

        assert_eq!(events, vec![upsert(1, statx)]);
        assert_eq!(stats.upserts, 1);
        assert_eq!(stats.links, 0);
    }

    #[test]
    fn symlink_and_inode_xattrs_count_as_content() {
        let (events, _) = convert(vec![
            FsEntry::new(1_u64).with_symlink("t"),
            FsEntry::new(2_u64).with_inode_xattrs(Xattrs::new()),
        ]);

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(FsEvent::is_upsert));
    }

    #[test]
    fn parent_and_name_only_yields_one_link() {
        let (events, _) = convert(vec![FsEntry::new(1_u64).with_parent(0_u64, "a")]);
        assert_eq!(events, vec![link(1, 0, "a")]);
    }

    #[test]
    fn link_carries_namespace_xattrs() {
        let xattrs = Xattrs::new().with("trusted.lov", "v");
        let (events, _) = convert(vec![
            FsEntry::new(1_u64)
                .with_parent(0_u64, "a")
                .with_ns_xattrs(xattrs.clone()),
        ]);

        assert_eq!(
            events,
            vec![FsEvent::Link {
                id: Id::from(1_u64),
                parent_id: Id::from(0_u64),
                name: "a".to_owned(),
                xattrs: Some(xattrs),
            }]
        );
    }

    #[test]
    fn both_yield_upsert_then_link() {
        let statx = Statx::new().with_size(10);
        let (events, stats) = convert(vec![
            FsEntry::new(1_u64)
                .with_parent(0_u64, "a")
                .with_statx(statx.clone()),
        ]);

        assert_eq!(events, vec![upsert(1, statx), link(1, 0, "a")]);
        assert_eq!(stats.converted, 1);
    }

    #[test]
    fn half_a_link_is_not_a_link() {
        let mut parent_only = FsEntry::new(1_u64);
        parent_only.parent_id = Some(Id::from(0_u64));
        let mut name_only = FsEntry::new(2_u64);
        name_only.name = Some("b".to_owned());

        let (events, stats) = convert(vec![parent_only, name_only, FsEntry::new(3_u64)]);

        assert!(events.is_empty());
        assert_eq!(stats.empty, 3);
        assert_eq!(stats.skipped(), 3);
    }

    #[test]
    fn order_follows_source_entries() {
        let (events, _) = convert(vec![
            FsEntry::new(1_u64).with_parent(0_u64, "a"),
            FsEntry::default(),
            FsEntry::new(2_u64).with_symlink("x").with_parent(1_u64, "b"),
            FsEntry::new(3_u64),
            FsEntry::new(4_u64).with_parent(1_u64, "c"),
        ]);

        let ids: Vec<(String, &'static str)> = events
            .iter()
            .map(|event| (event.id().to_string(), event.kind()))
            .collect();
        assert_eq!(
            ids,
            vec![
                (Id::from(1_u64).to_string(), "link"),
                (Id::from(2_u64).to_string(), "upsert"),
                (Id::from(2_u64).to_string(), "link"),
                (Id::from(4_u64).to_string(), "link"),
            ]
        );
    }

    #[test]
    fn upstream_error_is_yielded_once_then_fused() {
        let stream = vec![
            Ok(FsEntry::new(1_u64).with_parent(0_u64, "a")),
            Err("gone".to_owned()),
            Ok(FsEntry::new(2_u64).with_parent(0_u64, "b")),
        ];
        let mut converter = Converter::new(stream.into_iter());

        assert_eq!(converter.next(), Some(Ok(link(1, 0, "a"))));
        assert_eq!(converter.next(), Some(Err("gone".to_owned())));
        assert_eq!(converter.next(), None);
        assert_eq!(converter.next(), None);
    }

    #[test]
    fn empty_stream_ends_cleanly() {
        let mut converter = Converter::new(std::iter::empty::<Result<FsEntry, String>>());
        assert_eq!(converter.next(), None);
        assert_eq!(converter.stats(), ConvertStats::default());
    }
}
