use std::fmt::{self, Debug, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::event::Event;
use tracing::field::{Field, Visit};
use tracing::{span, Id, Level, Metadata, Subscriber};

/// Prints events at or above a verbosity level to stderr, one line each.
pub struct LanSubscriber {
    ids: AtomicUsize,
    max_level: Level,
}

impl LanSubscriber {
    pub fn new(max_level: Level) -> Self {
        LanSubscriber {
            ids: AtomicUsize::new(1),
            max_level,
        }
    }
}

impl Subscriber for LanSubscriber {
    fn enabled(&self, metadata: &Metadata) -> bool {
        *metadata.level() <= self.max_level
    }

    // Spans only need distinct ids; nothing is printed for them.
    fn new_span(&self, _span: &span::Attributes) -> Id {
        let id = self.ids.fetch_add(1, Ordering::SeqCst);
        Id::from_u64(id as u64)
    }

    fn record(&self, _span: &Id, _values: &span::Record) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event) {
        let mut visitor = LineVisitor::new();
        event.record(&mut visitor);
        let metadata = event.metadata();
        eprintln!(
            "{:>5} {}: {}{}",
            metadata.level(),
            metadata.target(),
            visitor.message,
            visitor.fields
        );
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn new() -> Self {
        LineVisitor {
            message: String::new(),
            fields: String::new(),
        }
    }

    fn push(&mut self, field: &Field, value: fmt::Arguments) {
        // Writing into a String cannot fail.
        if field.name() == "message" {
            let _ = self.message.write_fmt(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, format_args!("{}", value))
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.push(field, format_args!("{:?}", value))
    }
}
