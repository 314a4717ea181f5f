//! Fence-mode handler (§4.5): search for the closing fence line, emitting
//! interior content as `code-fence-chunk` events in the meantime.

use tracing::debug;

use crate::buffer_utils::fence_close_regex;
use crate::config::{EmitUnit, ParserConfig};
use crate::event::{Event, SharedContext};
use crate::model::{InFence, Mode, ParseContext};
use crate::parser::ParserState;
use crate::segmenter::{is_word_char, segment};

pub(crate) fn step(state: &mut ParserState, config: &ParserConfig, events: &mut Vec<Event>) -> bool {
    if state.buffer.len() < config.spec_min_parse_length {
        return false;
    }

    let (marker, lang) = state
        .current_fence
        .clone()
        .expect("InFence mode implies current_fence");
    let close_re = fence_close_regex(marker.kind, marker.fence_len);

    let found = close_re.find(&state.buffer).map(|m| {
        let matched = m.as_str().to_string();
        (m.start(), m.end(), matched)
    });

    if let Some((start, end, matched)) = found {
        let content_end = if matched.starts_with('\n') { start + 1 } else { start };
        let content = state.buffer[..content_end].to_string();
        let ctx = ParseContext::fence(InFence { fence: marker, lang: lang.clone() });
        flush_fence_hold_final(state, events, &ctx, &content);

        // `close_re`'s own match already consumes through the trailing
        // newline (or end-of-buffer) via its `[ \t]*(\n|$)` tail.
        state.buffer.drain(..end);
        debug!(fence = %marker.kind.as_str(), "code-fence-end");
        events.push(Event::CodeFenceEnd {
            in_: ctx,
            context: SharedContext::new(),
            metadata: None,
        });
        state.current_fence = None;
        state.mode = Mode::Text;
        return true;
    }

    let tail_len = config
        .spec_min_parse_length
        .saturating_sub(1)
        .max(marker.fence_len);
    if state.buffer.len() > tail_len {
        let emit_len = state.buffer.len() - tail_len;
        let content = state.buffer[..emit_len].to_string();
        let ctx = ParseContext::fence(InFence { fence: marker, lang: lang.clone() });
        emit_fence_chunk(state, config, events, &ctx, &content);
        state.buffer.drain(..emit_len);
        return true;
    }

    false
}

/// Emit `fence_hold + content` as a `code-fence-chunk`, retaining a
/// trailing partial word in `fence_hold` (Word mode only).
fn emit_fence_chunk(
    state: &mut ParserState,
    config: &ParserConfig,
    events: &mut Vec<Event>,
    ctx: &crate::model::ParseContext,
    content: &str,
) {
    let combined = format!("{}{}", state.fence_hold, content);
    state.fence_hold.clear();
    if combined.is_empty() {
        return;
    }
    if config.emit_unit == EmitUnit::Word {
        let pieces = segment(&combined, EmitUnit::Word);
        if let Some(last) = pieces.last() {
            if last.chars().last().map(is_word_char).unwrap_or(false) {
                let held_len = last.len();
                state.fence_hold = last.clone();
                let to_emit = &combined[..combined.len() - held_len];
                if !to_emit.is_empty() {
                    events.push(Event::CodeFenceChunk {
                        text: to_emit.to_string(),
                        in_: ctx.clone(),
                        context: SharedContext::new(),
                        metadata: None,
                    });
                }
                return;
            }
        }
    }
    events.push(Event::CodeFenceChunk {
        text: combined,
        in_: ctx.clone(),
        context: SharedContext::new(),
        metadata: None,
    });
}

/// At fence close, flush everything held (`fence_hold` + final content)
/// unconditionally — there is no more input coming for this scope.
fn flush_fence_hold_final(
    state: &mut ParserState,
    events: &mut Vec<Event>,
    ctx: &crate::model::ParseContext,
    content: &str,
) {
    let combined = format!("{}{}", std::mem::take(&mut state.fence_hold), content);
    if !combined.is_empty() {
        events.push(Event::CodeFenceChunk {
            text: combined,
            in_: ctx.clone(),
            context: SharedContext::new(),
            metadata: None,
        });
    }
}
