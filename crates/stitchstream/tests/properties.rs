//! Round-trip / invariant properties (§8), checked across a handful of
//! representative inputs and an assortment of chunkings rather than a full
//! property-testing harness.

use stitchstream::{Event, EmitUnit, ParserConfig, StreamingParser};
use test_case::test_case;

fn chunk_by(input: &str, size: usize) -> Vec<&str> {
    if size == 0 {
        return vec![input];
    }
    let mut out = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        let at = rest
            .char_indices()
            .nth(size)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(at);
        out.push(head);
        rest = tail;
    }
    out
}

fn run(input: &str, chunk_size: usize, unit: EmitUnit, tags: &[&str]) -> Vec<Event> {
    let config = ParserConfig::new(tags.iter().map(|s| s.to_string())).with_emit_unit(unit);
    let mut parser = StreamingParser::new(config).unwrap();
    let mut events = Vec::new();
    for chunk in chunk_by(input, chunk_size) {
        events.extend(parser.feed(chunk));
    }
    events.extend(parser.flush());
    events
}

fn plain_text_concat(events: &[Event]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

/// Property: for plain text with no tags/fences, concatenating every `text`
/// event reproduces the input exactly, for any chunking and any emit unit.
#[test_case("hello world, this is a plain sentence.", 1, EmitUnit::Token; "token chunk-1")]
#[test_case("hello world, this is a plain sentence.", 3, EmitUnit::Token; "token chunk-3")]
#[test_case("hello world, this is a plain sentence.", 0, EmitUnit::Token; "token whole")]
#[test_case("hello world, this is a plain sentence.", 1, EmitUnit::Word; "word chunk-1")]
#[test_case("hello world, this is a plain sentence.", 4, EmitUnit::Word; "word chunk-4")]
#[test_case("hello world, this is a plain sentence.", 1, EmitUnit::Grapheme; "grapheme chunk-1")]
#[test_case("héllo wörld \u{1F600} café", 1, EmitUnit::Grapheme; "grapheme unicode chunk-1")]
#[test_case("héllo wörld \u{1F600} café", 1, EmitUnit::Word; "word unicode chunk-1")]
fn plain_text_roundtrips_across_chunkings(input: &str, chunk_size: usize, unit: EmitUnit) {
    let events = run(input, chunk_size, unit, &[]);
    assert_eq!(plain_text_concat(&events), input);
}

/// Property: the plain-text reconstruction is identical regardless of how
/// the same input is chopped into chunks.
#[test_case("the quick brown fox jumps over the lazy dog"; "pangram")]
#[test_case("a//b/*c*/d e f g h i j k l"; "comment operators")]
fn chunking_does_not_change_reconstructed_text(input: &str) {
    let whole = plain_text_concat(&run(input, 0, EmitUnit::Token, &[]));
    for size in [1, 2, 3, 5, 7] {
        let chunked = plain_text_concat(&run(input, size, EmitUnit::Token, &[]));
        assert_eq!(chunked, whole, "chunk size {size} diverged");
    }
}

/// Property: a properly closed tag round-trips byte-for-byte when its
/// opening/closing markup is reinserted around the interior text, for any
/// chunking.
#[test_case("before <note>interior text</note> after", 1; "chunk-1")]
#[test_case("before <note>interior text</note> after", 2; "chunk-2")]
#[test_case("before <note>interior text</note> after", 5; "chunk-5")]
#[test_case("before <note>interior text</note> after", 0; "whole")]
fn closed_tag_roundtrips_across_chunkings(input: &str, chunk_size: usize) {
    let events = run(input, chunk_size, EmitUnit::Token, &["note"]);

    let mut reconstructed = String::new();
    for event in &events {
        match event {
            Event::Text { text, .. } => reconstructed.push_str(text),
            Event::TagOpen { name, attrs, .. } => {
                reconstructed.push('<');
                reconstructed.push_str(name);
                for (k, v) in attrs.iter() {
                    reconstructed.push_str(&format!(" {k}=\"{v}\""));
                }
                reconstructed.push('>');
            }
            Event::TagClose { name, .. } => {
                reconstructed.push_str(&format!("</{name}>"));
            }
            _ => {}
        }
    }
    assert_eq!(reconstructed, input);

    // invariant: tag-open/tag-close for the same name alternate and balance.
    let opens = events.iter().filter(|e| matches!(e, Event::TagOpen { .. })).count();
    let closes = events.iter().filter(|e| matches!(e, Event::TagClose { .. })).count();
    assert_eq!(opens, closes);
}

/// Invariant: at most one of `in_tag` / `in_code_fence` is ever set.
#[test]
fn context_is_never_doubly_scoped() {
    let events = run(
        "plain <note>in tag</note> then ```rust\nfn f() {}\n```\ndone",
        3,
        EmitUnit::Token,
        &["note"],
    );
    for event in &events {
        let ctx = match event {
            Event::Text { in_, .. }
            | Event::TagOpen { in_, .. }
            | Event::TagClose { in_, .. }
            | Event::CodeFenceStart { in_, .. }
            | Event::CodeFenceChunk { in_, .. }
            | Event::CodeFenceEnd { in_, .. } => Some(in_),
            _ => None,
        };
        if let Some(ctx) = ctx {
            assert!(!(ctx.in_tag.is_some() && ctx.in_code_fence.is_some()));
        }
    }
}

/// Invariant: `code-fence-start`/`code-fence-end` balance once `end` fires.
#[test_case(1; "chunk-1")]
#[test_case(4; "chunk-4")]
#[test_case(0; "whole")]
fn fence_start_end_balance(chunk_size: usize) {
    let input = "intro\n```rust\nlet x = 1;\n```\nouter\n```\nplain fence\n```\ntail";
    let events = run(input, chunk_size, EmitUnit::Token, &[]);
    let starts = events.iter().filter(|e| matches!(e, Event::CodeFenceStart { .. })).count();
    let ends = events.iter().filter(|e| matches!(e, Event::CodeFenceEnd { .. })).count();
    assert_eq!(starts, ends);
    assert_eq!(starts, 2);
}

/// Invariant: `Word` mode never splits a word across two adjacent `text`
/// pieces — the emitted word-character boundaries all align with genuine
/// word boundaries in the original input.
#[test_case(1; "chunk-1")]
#[test_case(2; "chunk-2")]
fn word_mode_never_splits_a_word_mid_stream(chunk_size: usize) {
    let input = "supercalifragilisticexpialidocious and another-word here";
    let events = run(input, chunk_size, EmitUnit::Word, &[]);
    let pieces = plain_text_concat(&events);
    assert_eq!(pieces, input);

    let texts: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            Event::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    for window in texts.windows(2) {
        let ends_word = window[0].chars().last().map(is_word_char).unwrap_or(false);
        let starts_word = window[1].chars().next().map(is_word_char).unwrap_or(false);
        assert!(
            !(ends_word && starts_word),
            "adjacent pieces {:?} / {:?} both touch a word boundary",
            window[0],
            window[1]
        );
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Boundary: a lone `<` held across a chunk boundary is not emitted as text
/// until it either completes into markup or `spec_buffer_length` elapses.
#[test]
fn lone_angle_bracket_waits_for_more_input() {
    let config = ParserConfig::new(Vec::<String>::new());
    let mut parser = StreamingParser::new(config).unwrap();

    // "hello " is held behind the ambiguous trailing '<' (§4.2's shared
    // `seg_hold`/`text_hold` discipline: nothing is emitted until the `<`
    // resolves one way or the other), so the first feed produces nothing yet.
    let events = parser.feed("hello <");
    assert!(plain_text_concat(&events).is_empty());

    let mut events = parser.feed("b");
    events.extend(parser.flush());
    assert!(plain_text_concat(&events).contains("hello"));
    assert!(plain_text_concat(&events).contains("<b"));
}

/// Boundary: tags outside the configured `tags` set are treated as literal
/// text, one character at a time, never opening `InTag` mode.
#[test]
fn unrecognized_tag_name_is_literal_text() {
    let config = ParserConfig::new(["think"]);
    let mut parser = StreamingParser::new(config).unwrap();
    let mut events = parser.feed("a <other>b</other> c");
    events.extend(parser.flush());

    assert!(!events.iter().any(|e| matches!(e, Event::TagOpen { .. })));
    assert_eq!(plain_text_concat(&events), "a <other>b</other> c");
}

/// A transformation sink whose `transform` stage fails must not drop the
/// event for other sinks, and the original event survives for the stage
/// that errored (bus §4.7).
#[test]
fn sink_stage_error_preserves_original_event_for_other_sinks() {
    use std::cell::RefCell;
    use std::rc::Rc;
    use stitchstream::{EventBus, SharedContext, Sink};

    struct FailingSink;
    impl Sink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }
        fn transform(&mut self, _event: Event, _context: &mut SharedContext) -> anyhow::Result<Vec<Event>> {
            anyhow::bail!("boom")
        }
    }

    let seen_kinds: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let seen_kinds_clone = seen_kinds.clone();

    let mut bus = EventBus::new(false, std::time::Duration::ZERO);
    bus.register_sink(Box::new(FailingSink));
    bus.subscribe_all(move |event| {
        seen_kinds_clone.borrow_mut().push(event.kind());
    });

    bus.deliver(vec![Event::Text {
        text: "hi".into(),
        in_: Default::default(),
        context: Default::default(),
        metadata: None,
    }]);

    let kinds = seen_kinds.borrow();
    assert!(kinds.contains(&"text"));
    assert!(kinds.contains(&"error"));
}
