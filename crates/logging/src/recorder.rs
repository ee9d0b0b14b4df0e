//! crates/logging/src/recorder.rs
//! In-memory event capture for assertions on diagnostics.

use std::cell::RefCell;
use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::levels::Area;

thread_local! {
    #[allow(clippy::missing_const_for_thread_local)]
    static EVENTS: RefCell<Vec<DiagnosticEvent>> = RefCell::new(Vec::new());
}

/// A diagnostic captured by [`RecordingLayer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticEvent {
    /// Area of the event's target, `None` for targets outside `rbh::`.
    pub area: Option<Area>,
    /// Level the event was emitted at.
    pub level: Level,
    /// Rendered `message` field.
    pub message: String,
    /// Remaining fields, in emission order, rendered with `Debug`.
    pub fields: Vec<(String, String)>,
}

impl DiagnosticEvent {
    /// Looks up a structured field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Layer that appends every event to a thread-local buffer.
///
/// Install it with [`tracing::subscriber::with_default`] so captures stay
/// scoped to the calling thread, then read them back with [`drain_events`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordingLayer;

impl<S: Subscriber> Layer<S> for RecordingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let captured = DiagnosticEvent {
            area: Area::from_target(metadata.target()),
            level: *metadata.level(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
        };
        EVENTS.with(|events| events.borrow_mut().push(captured));
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.fields
                .push((field.name().to_owned(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            self.fields.push((field.name().to_owned(), value.to_owned()));
        }
    }
}

/// Drains the events captured on the current thread.
pub fn drain_events() -> Vec<DiagnosticEvent> {
    EVENTS.with(|events| events.borrow_mut().drain(..).collect())
}
