//! Pure segmentation of a string into tokens, words, or grapheme clusters.
//!
//! `segment` is purely functional over its input: all statefulness needed to
//! stream safely (holding back an in-progress word) lives in the caller —
//! see [`crate::parser`]'s `seg_hold`/`fence_hold` handling.

use unicode_segmentation::UnicodeSegmentation;

use crate::config::EmitUnit;

/// Split `s` into pieces according to `unit`. Concatenating the returned
/// pieces always reproduces `s` exactly.
pub fn segment(s: &str, unit: EmitUnit) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    match unit {
        EmitUnit::Token => segment_tokens(s),
        EmitUnit::Grapheme => s.graphemes(true).map(String::from).collect(),
        EmitUnit::Word => merge_comment_operators(
            s.split_word_bounds().map(String::from).collect(),
        ),
    }
}

fn segment_tokens(s: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut chars = s.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        let is_ws = c.is_whitespace();
        let mut end = start + c.len_utf8();
        chars.next();
        while let Some(&(idx, c2)) = chars.peek() {
            if c2.is_whitespace() == is_ws {
                end = idx + c2.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        pieces.push(s[start..end].to_string());
    }
    pieces
}

/// Merge adjacent pieces that together form `//`, `/*`, or `*/` so comment
/// operators tokenize as a single piece (downstream syntax highlighters
/// expect this).
fn merge_comment_operators(pieces: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        if let Some(last) = out.last() {
            let combined = format!("{last}{piece}");
            if combined == "//" || combined == "/*" || combined == "*/" {
                let combined_len = out.len() - 1;
                out[combined_len] = combined;
                continue;
            }
        }
        out.push(piece);
    }
    out
}

/// True if `c` is a "word character" (Unicode letter/number/underscore) for
/// the purposes of `seg_hold` retention (§4.2) — the last piece of a
/// segmentation run is held back when it ends in one of these.
pub fn is_word_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("hello world test", &["hello", " ", "world", " ", "test"]; "token basic")]
    #[test_case("  a  ", &["  ", "a", "  "]; "token leading trailing whitespace")]
    #[test_case("", &[]; "token empty")]
    fn test_token_segmentation(input: &str, expected: &[&str]) {
        assert_eq!(segment(input, EmitUnit::Token), expected);
    }

    #[test]
    fn test_token_roundtrip() {
        let s = "the quick  brown\tfox\njumps";
        let pieces = segment(s, EmitUnit::Token);
        assert_eq!(pieces.concat(), s);
    }

    #[test]
    fn test_grapheme_roundtrip() {
        let s = "Hello 👩‍👩‍👧‍👦 world";
        let pieces = segment(s, EmitUnit::Grapheme);
        assert_eq!(pieces.concat(), s);
    }

    #[test]
    fn test_word_comment_operator_merge() {
        let pieces = segment("a // b /* c */ d", EmitUnit::Word);
        assert!(pieces.contains(&"//".to_string()));
        assert!(pieces.contains(&"/*".to_string()));
        assert!(pieces.contains(&"*/".to_string()));
        assert_eq!(pieces.concat(), "a // b /* c */ d");
    }

    #[test]
    fn test_word_roundtrip() {
        let s = "Hello, world! This is a test.";
        let pieces = segment(s, EmitUnit::Word);
        assert_eq!(pieces.concat(), s);
    }

    #[test]
    fn test_is_word_char() {
        assert!(is_word_char('a'));
        assert!(is_word_char('_'));
        assert!(is_word_char('9'));
        assert!(!is_word_char(' '));
        assert!(!is_word_char('.'));
    }
}
