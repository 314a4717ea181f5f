//! The streaming parser core: owns the buffer, mode, and hold buffers, and
//! dispatches to the text/tag/fence handlers until no further progress can
//! be made without more input.

use tracing::{debug, trace};

use crate::config::ParserConfig;
use crate::error::StitchError;
use crate::event::{Event, SharedContext};
use crate::handlers::{fence, tag, text};
use crate::model::{InFence, InTag, Mode, ParseContext};

/// Internal mutable state shared by all three mode handlers.
pub(crate) struct ParserState {
    pub(crate) mode: Mode,
    pub(crate) buffer: String,
    pub(crate) text_hold: String,
    pub(crate) seg_hold: String,
    pub(crate) fence_hold: String,
    pub(crate) current_tag: Option<InTag>,
    pub(crate) current_fence: Option<(crate::model::FenceMarker, Option<String>)>,
}

impl ParserState {
    fn new() -> Self {
        Self {
            mode: Mode::Text,
            buffer: String::new(),
            text_hold: String::new(),
            seg_hold: String::new(),
            fence_hold: String::new(),
            current_tag: None,
            current_fence: None,
        }
    }

}

/// The incremental state machine parser. See `spec.md` / `SPEC_FULL.md`
/// §4.6 for the full `feed`/`flush`/`dispose` contract.
pub struct StreamingParser {
    config: ParserConfig,
    state: ParserState,
    disposed: bool,
}

impl StreamingParser {
    pub fn new(config: ParserConfig) -> Result<Self, StitchError> {
        config.validate()?;
        Ok(Self {
            config,
            state: ParserState::new(),
            disposed: false,
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Append `chunk` to the internal buffer and drive the current mode's
    /// handler until either no progress can be made or the buffer empties.
    pub fn feed(&mut self, chunk: &str) -> Vec<Event> {
        let mut events = Vec::new();
        self.state.buffer.push_str(chunk);
        trace!(chunk_len = chunk.len(), "feed");

        loop {
            if self.state.buffer.is_empty() {
                break;
            }
            let progressed = match self.state.mode {
                Mode::Text => text::step(&mut self.state, &self.config, &mut events),
                Mode::InTag => tag::step(&mut self.state, &self.config, &mut events),
                Mode::InFence => fence::step(&mut self.state, &self.config, &mut events),
            };
            if !progressed {
                break;
            }
            if self.state.text_hold.len() >= self.config.buffer_length {
                text::force_flush_hold(&mut self.state, &self.config, &mut events);
            }
        }

        if self.state.buffer.is_empty()
            && !matches!(self.state.mode, Mode::InFence)
            && !self.state.text_hold.is_empty()
        {
            text::force_flush_hold(&mut self.state, &self.config, &mut events);
        }

        events
    }

    /// Close any open scope and emit the terminal `flush` event. Idempotent
    /// on an already-empty state.
    pub fn flush(&mut self) -> Vec<Event> {
        let mut events = Vec::new();

        if !self.state.buffer.is_empty() {
            let remaining = std::mem::take(&mut self.state.buffer);
            self.state.text_hold.push_str(&remaining);
        }

        match self.state.mode {
            Mode::Text => {}
            Mode::InTag => {
                debug!("flush: closing unclosed tag, re-emitting open markup as text");
                let in_tag = self
                    .state
                    .current_tag
                    .take()
                    .expect("InTag mode implies current_tag");
                let mut markup = format!("<{}", in_tag.name);
                for (k, v) in in_tag.attrs.iter() {
                    markup.push_str(&format!(" {k}=\"{v}\""));
                }
                markup.push('>');
                // The opening markup precedes whatever was already held.
                self.state.text_hold = format!("{markup}{}", self.state.text_hold);
                self.state.mode = Mode::Text;
            }
            Mode::InFence => {
                debug!("flush: closing unclosed fence");
                let (marker, lang) = self
                    .state
                    .current_fence
                    .take()
                    .expect("InFence mode implies current_fence");
                let remaining = format!(
                    "{}{}",
                    std::mem::take(&mut self.state.fence_hold),
                    std::mem::take(&mut self.state.text_hold)
                );
                if !remaining.is_empty() {
                    events.push(Event::CodeFenceChunk {
                        text: remaining,
                        in_: ParseContext::fence(InFence { fence: marker, lang: lang.clone() }),
                        context: SharedContext::new(),
                        metadata: None,
                    });
                }
                events.push(Event::CodeFenceEnd {
                    in_: ParseContext::fence(InFence { fence: marker, lang }),
                    context: SharedContext::new(),
                    metadata: None,
                });
                self.state.mode = Mode::Text;
            }
        }

        if !self.state.text_hold.is_empty() || !self.state.seg_hold.is_empty() {
            text::force_flush_hold_final(&mut self.state, &self.config, &mut events);
        }

        events.push(Event::Flush {
            context: SharedContext::new(),
            metadata: None,
        });
        events
    }

    /// Release any pending state. After `dispose`, the parser must not be
    /// fed further input; callers drop it.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.state = ParserState::new();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
