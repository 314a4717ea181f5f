pub(crate) mod fence;
pub(crate) mod tag;
pub(crate) mod text;

use crate::config::{EmitUnit, ParserConfig};
use crate::event::{Event, SharedContext};
use crate::model::ParseContext;
use crate::parser::ParserState;
use crate::segmenter::{is_word_char, segment};

/// Segment `seg_hold + raw`, retain a trailing partial word in `seg_hold`
/// (Word mode only), and push one [`Event::Text`] per remaining piece.
///
/// Shared by the text handler (Text-mode content) and the tag handler
/// (tag-interior content) — both use the same `seg_hold`, since at most one
/// of those modes is ever active (§4.2).
pub(crate) fn emit_segmented_text(
    state: &mut ParserState,
    config: &ParserConfig,
    events: &mut Vec<Event>,
    ctx: ParseContext,
    raw: &str,
) {
    emit_segmented_text_impl(state, config, events, ctx, raw, false);
}

/// Same as [`emit_segmented_text`], but never holds back a trailing partial
/// word — used once at final `flush`, where there is no further input to
/// complete it.
pub(crate) fn emit_segmented_text_final(
    state: &mut ParserState,
    config: &ParserConfig,
    events: &mut Vec<Event>,
    ctx: ParseContext,
    raw: &str,
) {
    emit_segmented_text_impl(state, config, events, ctx, raw, true);
}

fn emit_segmented_text_impl(
    state: &mut ParserState,
    config: &ParserConfig,
    events: &mut Vec<Event>,
    ctx: ParseContext,
    raw: &str,
    force: bool,
) {
    let combined = format!("{}{}", state.seg_hold, raw);
    state.seg_hold.clear();
    if combined.is_empty() {
        return;
    }
    let mut pieces = segment(&combined, config.emit_unit);
    if !force && config.emit_unit == EmitUnit::Word {
        if let Some(last) = pieces.last() {
            if last.chars().last().map(is_word_char).unwrap_or(false) {
                state.seg_hold = pieces.pop().expect("checked non-empty above");
            }
        }
    }
    for piece in pieces {
        events.push(Event::Text {
            text: piece,
            in_: ctx.clone(),
            context: SharedContext::new(),
            metadata: None,
        });
    }
}
