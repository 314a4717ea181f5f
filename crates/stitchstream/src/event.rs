use serde::Serialize;
use std::collections::HashMap;

use crate::model::{AttrMap, FenceMarker, ParseContext};

/// Shared, mutable per-stream context. Transformation stages may write into
/// this to coordinate across events; the parser only ever reads/writes its
/// own `in_tag`/`in_code_fence` bookkeeping through [`ParseContext`], which
/// is separate from this free-form map.
pub type SharedContext = HashMap<String, serde_json::Value>;

/// One structured event produced by the parser, as delivered to sinks.
///
/// Every variant carries `context` (a snapshot of the bus's shared,
/// mutable per-stream mapping at the moment this event was dispatched) and
/// `metadata` (free-form, plugin-attached — never written by the core
/// itself, available for a sink to stamp before an event reaches later
/// stages or subscribers).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    Text {
        text: String,
        #[serde(rename = "in")]
        in_: ParseContext,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        context: SharedContext,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    TagOpen {
        name: String,
        attrs: AttrMap,
        #[serde(rename = "in")]
        in_: ParseContext,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        context: SharedContext,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    TagClose {
        name: String,
        #[serde(rename = "in")]
        in_: ParseContext,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        context: SharedContext,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    CodeFenceStart {
        fence: FenceMarker,
        lang: Option<String>,
        #[serde(rename = "in")]
        in_: ParseContext,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        context: SharedContext,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    CodeFenceChunk {
        text: String,
        #[serde(rename = "in")]
        in_: ParseContext,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        context: SharedContext,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    CodeFenceEnd {
        #[serde(rename = "in")]
        in_: ParseContext,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        context: SharedContext,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    Flush {
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        context: SharedContext,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    End {
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        context: SharedContext,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    Error {
        reason: String,
        recoverable: bool,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        context: SharedContext,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    BufferReleased {
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        context: SharedContext,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
}

impl Event {
    /// The event's `type` discriminant, used as the pub-sub topic key.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Text { .. } => "text",
            Event::TagOpen { .. } => "tag-open",
            Event::TagClose { .. } => "tag-close",
            Event::CodeFenceStart { .. } => "code-fence-start",
            Event::CodeFenceChunk { .. } => "code-fence-chunk",
            Event::CodeFenceEnd { .. } => "code-fence-end",
            Event::Flush { .. } => "flush",
            Event::End { .. } => "end",
            Event::Error { .. } => "error",
            Event::BufferReleased { .. } => "buffer-released",
        }
    }

    /// Events are "terminal" framing markers that never carry parsing
    /// context (`flush`, `end`, `error`, `buffer-released`).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::Flush { .. } | Event::End { .. } | Event::Error { .. } | Event::BufferReleased { .. }
        )
    }

    /// Stamp this event with the bus's current shared-context snapshot,
    /// overwriting whatever it was constructed with. Called once by
    /// [`crate::bus::EventBus::dispatch`], right before an event reaches
    /// subscribers and the pull queue.
    pub(crate) fn set_context(&mut self, ctx: SharedContext) {
        match self {
            Event::Text { context, .. }
            | Event::TagOpen { context, .. }
            | Event::TagClose { context, .. }
            | Event::CodeFenceStart { context, .. }
            | Event::CodeFenceChunk { context, .. }
            | Event::CodeFenceEnd { context, .. }
            | Event::Flush { context, .. }
            | Event::End { context, .. }
            | Event::Error { context, .. }
            | Event::BufferReleased { context, .. } => *context = ctx,
        }
    }
}
