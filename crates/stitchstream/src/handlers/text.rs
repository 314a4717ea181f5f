//! Text-mode handler (§4.3): locate the earliest potential tag/fence open
//! in the buffer and decide, without premature commitment, whether it is
//! one.

use tracing::{debug, trace};

use crate::buffer_utils::{leading_run_len, next_special_index, parse_attrs, TAG_NAME_RE};
use crate::config::ParserConfig;
use crate::event::{Event, SharedContext};
use crate::handlers::emit_segmented_text;
use crate::model::{FenceKind, FenceMarker, InTag, Mode, ParseContext};
use crate::parser::ParserState;

/// One step of the Text-mode handler. Returns `true` if progress was made
/// (buffer consumed, mode changed, or held text grew); `false` means more
/// input is needed before a decision can be made.
pub(crate) fn step(state: &mut ParserState, config: &ParserConfig, events: &mut Vec<Event>) -> bool {
    let buffer_len = state.buffer.len();

    if buffer_len < config.spec_min_parse_length {
        return match next_special_index(&state.buffer) {
            None => {
                move_all_to_hold(state);
                true
            }
            Some(0) => false,
            Some(idx) => {
                move_prefix_to_hold(state, idx);
                true
            }
        };
    }

    let idx = match next_special_index(&state.buffer) {
        None => {
            move_all_to_hold(state);
            return true;
        }
        Some(idx) => idx,
    };

    if idx > 0 {
        move_prefix_to_hold(state, idx);
        return true;
    }

    let first = state.buffer.chars().next().expect("buffer non-empty");
    if first == '<' {
        try_tag_open(state, config, events)
    } else {
        try_fence_open(state, config, events)
    }
}

fn move_all_to_hold(state: &mut ParserState) {
    state.text_hold.push_str(&state.buffer);
    state.buffer.clear();
}

fn move_prefix_to_hold(state: &mut ParserState, idx: usize) {
    state.text_hold.push_str(&state.buffer[..idx]);
    state.buffer.drain(..idx);
}

/// Flush any held plain text as segmented `text` events in Text-mode context.
fn flush_text_hold(state: &mut ParserState, config: &ParserConfig, events: &mut Vec<Event>) {
    let raw = std::mem::take(&mut state.text_hold);
    emit_segmented_text(state, config, events, ParseContext::text(), &raw);
}

/// Force-flush `text_hold` once it reaches `buffer_length` (high-water
/// mark), independent of whether a special is pending. More input may still
/// arrive, so a trailing partial word is still retained in `seg_hold`.
pub(crate) fn force_flush_hold(state: &mut ParserState, config: &ParserConfig, events: &mut Vec<Event>) {
    flush_text_hold(state, config, events);
}

/// Final flush at end of stream: emits `text_hold` (and any retained
/// `seg_hold`) in full, with no trailing-word retention — there is no more
/// input coming to complete it.
pub(crate) fn force_flush_hold_final(state: &mut ParserState, config: &ParserConfig, events: &mut Vec<Event>) {
    let raw = std::mem::take(&mut state.text_hold);
    crate::handlers::emit_segmented_text_final(state, config, events, ParseContext::text(), &raw);
}

fn try_tag_open(state: &mut ParserState, config: &ParserConfig, events: &mut Vec<Event>) -> bool {
    debug_assert!(state.buffer.starts_with('<'));
    let rest = &state.buffer[1..];

    let Some(m) = TAG_NAME_RE.find(rest) else {
        if rest.is_empty() {
            return false; // just "<", need more to tell
        }
        // next char can never start a tag name: literal '<'
        state.text_hold.push('<');
        state.buffer.drain(..1);
        return true;
    };

    if m.end() == rest.len() {
        // the name might still be growing with the next chunk
        return wait_or_downgrade(state, config);
    }

    let name = m.as_str().to_string();
    let m_end = m.end();
    let after_name = &rest[m_end..];

    let Some(gt_rel) = after_name.find('>') else {
        return wait_or_downgrade(state, config);
    };

    if config.tags.contains(&name) {
        let attr_section = after_name[..gt_rel].to_string();
        flush_text_hold(state, config, events);
        let attrs = parse_attrs(&attr_section);
        let total_len = 1 + m_end + gt_rel + 1;
        state.buffer.drain(..total_len);
        debug!(tag = %name, "tag-open");
        events.push(Event::TagOpen {
            name: name.clone(),
            attrs: attrs.clone(),
            in_: ParseContext::text(),
            context: SharedContext::new(),
            metadata: None,
        });
        state.current_tag = Some(InTag { name, attrs });
        state.mode = Mode::InTag;
        true
    } else {
        trace!(tag = %name, "unrecognized tag name, literal '<'");
        state.text_hold.push('<');
        state.buffer.drain(..1);
        true
    }
}

/// Shared "wait for more data, unless the ambiguous lookahead has grown
/// past `spec_buffer_length`, in which case demote it to plain text".
fn wait_or_downgrade(state: &mut ParserState, config: &ParserConfig) -> bool {
    if state.buffer.len() < config.spec_buffer_length {
        false
    } else {
        trace!(len = state.buffer.len(), "ambiguous lookahead exceeded spec_buffer_length, demoting to text");
        move_all_to_hold(state);
        true
    }
}

fn try_fence_open(state: &mut ParserState, config: &ParserConfig, events: &mut Vec<Event>) -> bool {
    let buffer = &state.buffer;
    let leading_spaces = buffer.chars().take_while(|&c| c == ' ').count().min(3);
    let after_spaces = &buffer[leading_spaces..];
    let Some(fence_char) = after_spaces.chars().next() else {
        return false;
    };
    let kind = FenceKind::from_char(fence_char).expect("candidate guaranteed by next_special_index");
    let run_len = leading_run_len(after_spaces, fence_char);
    let run_end = leading_spaces + run_len;

    if run_len < 3 {
        if run_end == buffer.len() {
            return wait_or_downgrade(state, config);
        }
        // conclusively not a fence: the run breaks before reaching 3.
        let prefix_len = run_end;
        state.text_hold.push_str(&buffer[..prefix_len]);
        state.buffer.drain(..prefix_len);
        return true;
    }

    match buffer[run_end..].find('\n') {
        None => wait_or_downgrade(state, config),
        Some(nl_rel) => {
            let info = buffer[run_end..run_end + nl_rel].trim();
            let lang = if info.is_empty() { None } else { Some(info.to_string()) };
            let line_end = run_end + nl_rel + 1;
            flush_text_hold(state, config, events);
            let marker = FenceMarker { kind, fence_len: run_len };
            debug!(fence = %kind.as_str(), len = run_len, lang = ?lang, "code-fence-start");
            events.push(Event::CodeFenceStart {
                fence: marker,
                lang: lang.clone(),
                in_: ParseContext::text(),
                context: SharedContext::new(),
                metadata: None,
            });
            state.current_fence = Some((marker, lang));
            state.mode = Mode::InFence;
            state.buffer.drain(..line_end);
            true
        }
    }
}
