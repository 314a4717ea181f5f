//! Tag-mode handler (§4.4): search for the matching `</name>` close,
//! emitting tag-interior content as segmented text until it's found.

use regex::Regex;
use tracing::debug;

use crate::config::ParserConfig;
use crate::event::{Event, SharedContext};
use crate::handlers::emit_segmented_text;
use crate::model::{Mode, ParseContext};
use crate::parser::ParserState;

fn close_regex(name: &str) -> Regex {
    let escaped = regex::escape(name);
    Regex::new(&format!(r"</{escaped}\s*>")).expect("generated tag-close regex is always valid")
}

pub(crate) fn step(state: &mut ParserState, config: &ParserConfig, events: &mut Vec<Event>) -> bool {
    let in_tag = state.current_tag.clone().expect("InTag mode implies current_tag");
    let ctx = ParseContext::tag(in_tag.clone());
    let close_re = close_regex(&in_tag.name);

    let found = close_re.find(&state.buffer).map(|m| (m.start(), m.end()));
    if let Some((start, end)) = found {
        let text_before = state.buffer[..start].to_string();
        emit_segmented_text(state, config, events, ctx.clone(), &text_before);
        let consumed = end;
        state.buffer.drain(..consumed);
        debug!(tag = %in_tag.name, "tag-close");
        events.push(Event::TagClose {
            name: in_tag.name.clone(),
            in_: ctx,
            context: SharedContext::new(),
            metadata: None,
        });
        state.current_tag = None;
        state.mode = Mode::Text;
        return true;
    }

    let partial = format!("</{}", in_tag.name);
    if let Some(pos) = state.buffer.find(&partial) {
        if pos > 0 {
            let text_before = state.buffer[..pos].to_string();
            emit_segmented_text(state, config, events, ctx, &text_before);
            state.buffer.drain(..pos);
            return true;
        }
        return false;
    }

    let tail_len = partial.len().saturating_sub(1).max(1);
    if state.buffer.len() > tail_len {
        let emit_len = state.buffer.len() - tail_len;
        let text_before = state.buffer[..emit_len].to_string();
        emit_segmented_text(state, config, events, ctx, &text_before);
        state.buffer.drain(..emit_len);
        return true;
    }

    false
}
