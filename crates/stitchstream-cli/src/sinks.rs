//! Thin demonstration sinks layered on top of the `stitchstream` core —
//! a logger, a plain-text collector, and a minimal syntax colorizer. None
//! of these are part of the core crate (SPEC_FULL.md §4.8).

use console::Style;
use stitchstream::{Event, SharedContext, Sink};

/// Forwards every event to `tracing`: structural events at `info`, text
/// and fence-chunk events at `trace`, terminal framing markers (`flush`,
/// `end`, `error`, `buffer-released`) at `info` with a `terminal` marker.
pub struct LoggingSink;

impl Sink for LoggingSink {
    fn name(&self) -> &str {
        "logging"
    }

    fn transform(&mut self, event: Event, _context: &mut SharedContext) -> anyhow::Result<Vec<Event>> {
        if event.is_terminal() {
            tracing::info!(kind = event.kind(), terminal = true, "event");
        } else {
            match &event {
                Event::Text { .. } | Event::CodeFenceChunk { .. } => {
                    tracing::trace!(kind = event.kind(), "event");
                }
                _ => tracing::info!(kind = event.kind(), "event"),
            }
        }
        Ok(vec![event])
    }
}

/// Accumulates every `text` / `code-fence-chunk` event into a single
/// `String`, for callers that just want the plain-text content.
#[derive(Default)]
pub struct TextCollectorSink {
    pub collected: String,
}

impl Sink for TextCollectorSink {
    fn name(&self) -> &str {
        "text-collector"
    }

    fn post_transform(&mut self, event: Event, _context: &mut SharedContext) -> anyhow::Result<Vec<Event>> {
        match &event {
            Event::Text { text, .. } | Event::CodeFenceChunk { text, .. } => {
                self.collected.push_str(text);
            }
            _ => {}
        }
        Ok(vec![event])
    }
}

/// Minimal ANSI colorizer for `code-fence-chunk` text, keyed by the
/// fence's declared language. Not a real syntax highlighter — a handful of
/// keyword/string/comment heuristics, enough for terminal demo output.
pub struct SyntaxColorSink {
    current_lang: Option<String>,
}

impl SyntaxColorSink {
    pub fn new() -> Self {
        Self { current_lang: None }
    }

    fn colorize(&self, text: &str) -> String {
        let keyword_style = Style::new().cyan().bold();
        let string_style = Style::new().green();
        let comment_style = Style::new().dim();

        let is_keyword_ish = matches!(
            self.current_lang.as_deref(),
            Some("rust" | "rs" | "python" | "py" | "javascript" | "js" | "typescript" | "ts")
        );

        text.split_inclusive(char::is_whitespace)
            .map(|word| {
                let trimmed = word.trim();
                if trimmed.starts_with('#') || trimmed.starts_with("//") {
                    comment_style.apply_to(word).to_string()
                } else if trimmed.starts_with('"') || trimmed.starts_with('\'') {
                    string_style.apply_to(word).to_string()
                } else if is_keyword_ish && is_common_keyword(trimmed) {
                    keyword_style.apply_to(word).to_string()
                } else {
                    word.to_string()
                }
            })
            .collect()
    }
}

impl Default for SyntaxColorSink {
    fn default() -> Self {
        Self::new()
    }
}

fn is_common_keyword(word: &str) -> bool {
    matches!(
        word,
        "fn" | "let"
            | "mut"
            | "if"
            | "else"
            | "match"
            | "for"
            | "while"
            | "return"
            | "def"
            | "class"
            | "import"
            | "from"
            | "const"
            | "function"
    )
}

impl Sink for SyntaxColorSink {
    fn name(&self) -> &str {
        "syntax-color"
    }

    fn transform(&mut self, event: Event, _context: &mut SharedContext) -> anyhow::Result<Vec<Event>> {
        match event {
            Event::CodeFenceStart { fence, lang, in_, context, metadata } => {
                self.current_lang = lang.clone();
                Ok(vec![Event::CodeFenceStart { fence, lang, in_, context, metadata }])
            }
            Event::CodeFenceChunk { text, in_, context, metadata } => {
                let colored = self.colorize(&text);
                Ok(vec![Event::CodeFenceChunk { text: colored, in_, context, metadata }])
            }
            Event::CodeFenceEnd { in_, context, metadata } => {
                self.current_lang = None;
                Ok(vec![Event::CodeFenceEnd { in_, context, metadata }])
            }
            other => Ok(vec![other]),
        }
    }
}
