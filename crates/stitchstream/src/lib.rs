//! Incremental, fragmentation-tolerant parser for streamed text.
//!
//! Recognizes a caller-declared set of custom tags (`<name attr="v">…</name>`),
//! fenced code blocks (`` ``` `` / `~~~`), and plain text further segmented
//! into tokens, words, or grapheme clusters — all while tolerating arbitrary
//! chunk boundaries in the input stream.
//!
//! The [`Parser`] facade ties the streaming state machine ([`parser`]) to
//! the event bus ([`bus`]): `feed`/`flush` run the parser core to
//! completion and hand the resulting events to the bus's transformation
//! pipeline before they reach any registered sink.
//!
//! ```
//! use stitchstream::{Parser, ParserConfig};
//!
//! let mut parser = Parser::new(ParserConfig::default()).unwrap();
//! let iter = parser.pull_iterator();
//! parser.feed("hello world");
//! parser.flush();
//!
//! let events: Vec<_> = iter.collect();
//! assert!(events.iter().any(|e| e.kind() == "flush"));
//! ```

pub mod bus;
mod buffer_utils;
pub mod config;
pub mod error;
pub mod event;
mod handlers;
pub mod model;
pub mod parser;
pub mod segmenter;

pub use bus::{EventBus, PullIterator, Sink};
pub use config::{EmitUnit, ParserConfig};
pub use error::StitchError;
pub use event::{Event, SharedContext};
pub use model::{AttrMap, FenceKind, FenceMarker, InFence, InTag, ParseContext};
pub use parser::StreamingParser;

/// Public facade combining the streaming parser core with the event bus.
///
/// This is the entry point most callers want: it owns both the state
/// machine and the delivery pipeline and drives one from the other,
/// matching the data flow in SPEC_FULL.md §2 ("parser hands events to the
/// bus → bus runs the transformation pipeline → events are delivered to
/// sinks").
pub struct Parser {
    core: StreamingParser,
    bus: EventBus,
    ended: bool,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Result<Self, StitchError> {
        let suppress = config.suppress_errors_from_transforms;
        let emit_delay = config.emit_delay;
        Ok(Self {
            core: StreamingParser::new(config)?,
            bus: EventBus::new(suppress, emit_delay),
            ended: false,
        })
    }

    pub fn config(&self) -> &ParserConfig {
        self.core.config()
    }

    pub fn register_sink(&mut self, sink: Box<dyn Sink>) {
        self.bus.register_sink(sink);
    }

    pub fn subscribe(&mut self, topic: impl Into<String>, callback: impl FnMut(&Event) + 'static) {
        self.bus.subscribe(topic, callback);
    }

    pub fn subscribe_all(&mut self, callback: impl FnMut(&Event) + 'static) {
        self.bus.subscribe_all(callback);
    }

    pub fn pull_iterator(&self) -> PullIterator {
        self.bus.pull_iterator()
    }

    /// Feed a chunk of input, driving the parser core and delivering the
    /// resulting events through the bus.
    pub fn feed(&mut self, chunk: &str) {
        let events = self.core.feed(chunk);
        self.bus.deliver(events);
    }

    /// Close any open scope, deliver the trailing events, and (if this is
    /// the first `flush`) deliver a terminal `end`.
    pub fn flush(&mut self) {
        let mut events = self.core.flush();
        if !self.ended {
            events.push(Event::End {
                context: SharedContext::new(),
                metadata: None,
            });
            self.ended = true;
        }
        self.bus.deliver(events);
    }

    /// Same as [`Parser::feed`]/[`Parser::flush`] followed by delivery, but
    /// paces event delivery by the configured `emit_delay`. Requires the
    /// `pacing` feature.
    #[cfg(feature = "pacing")]
    pub async fn feed_paced(&mut self, chunk: &str) {
        let events = self.core.feed(chunk);
        self.bus.deliver_paced(events).await;
    }

    #[cfg(feature = "pacing")]
    pub async fn flush_paced(&mut self) {
        let mut events = self.core.flush();
        if !self.ended {
            events.push(Event::End {
                context: SharedContext::new(),
                metadata: None,
            });
            self.ended = true;
        }
        self.bus.deliver_paced(events).await;
    }

    pub fn dispose(&mut self) {
        self.core.dispose();
        self.bus.dispose();
    }
}
