//! Search helpers shared by the text, tag, and fence handlers: locating the
//! next potential special sequence, recognizing fence open/close lines, and
//! parsing quoted attributes.

use std::sync::LazyLock;

use regex::Regex;

pub(crate) static TAG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*").unwrap());

/// `(^|\n)[ ]{0,3}[`~]{1,}` — candidate fence-open run, column 0 or after a
/// newline, up to three leading spaces, one or more backticks/tildes.
pub(crate) static FENCE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\n)[ ]{0,3}[`~]+").unwrap());

/// `(\w+)=(["'])(.*?)\2` with the quote-matching expressed as an alternation
/// (the `regex` crate has no backreference support): `key="value"` or
/// `key='value'`, never mismatched quote kinds.
pub(crate) static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)"|(\w+)='([^']*)'"#).unwrap());

/// Earliest byte index in `buffer` at which a tag or fence could start:
/// the minimum of the first `<` and the first fence-open run. `None` if
/// neither appears.
pub(crate) fn next_special_index(buffer: &str) -> Option<usize> {
    let lt = buffer.find('<');
    let fence = FENCE_OPEN_RE.find(buffer).map(|m| {
        // The match may include a leading '\n'; the candidate starts at the
        // fence run itself, not at that newline.
        let matched = m.as_str();
        if let Some(stripped) = matched.strip_prefix('\n') {
            m.start() + (matched.len() - stripped.len())
        } else {
            m.start()
        }
    });
    match (lt, fence) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Parse `key="value"` / `key='value'` attribute pairs from an attribute
/// section (the text between a tag name and its closing `>`). Unquoted
/// attributes are ignored; later duplicate keys overwrite earlier ones.
pub(crate) fn parse_attrs(attr_section: &str) -> crate::model::AttrMap {
    ATTR_RE
        .captures_iter(attr_section)
        .map(|cap| {
            if let (Some(k), Some(v)) = (cap.get(1), cap.get(2)) {
                (k.as_str().to_string(), v.as_str().to_string())
            } else {
                (
                    cap.get(3).unwrap().as_str().to_string(),
                    cap.get(4).unwrap().as_str().to_string(),
                )
            }
        })
        .collect()
}

/// Count the run length of `ch` at the start of `s`.
pub(crate) fn leading_run_len(s: &str, ch: char) -> usize {
    s.chars().take_while(|&c| c == ch).count()
}

/// Build the closing-fence regex for a specific delimiter: exactly
/// `fence_len` copies of `ch`, at column 0 (optionally after up to three
/// leading spaces), followed only by whitespace through end-of-line or
/// end-of-buffer. The trailing `[ \t]*(\n|$)` is consumed rather than a
/// lookahead (the `regex` crate has no look-around support): if a further
/// delimiter char immediately follows, that tail can't match whitespace or
/// EOL and the whole match fails, which rejects a longer run exactly as a
/// lookahead would.
pub(crate) fn fence_close_regex(kind: crate::model::FenceKind, fence_len: usize) -> Regex {
    let escaped = regex::escape(&kind.delim_char().to_string());
    let pattern = format!(r"(^|\n)[ ]{{0,3}}{escaped}{{{fence_len}}}[ \t]*(\n|$)");
    Regex::new(&pattern).expect("generated fence-close regex is always valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FenceKind;

    #[test]
    fn test_next_special_lt_only() {
        assert_eq!(next_special_index("hello <tag>"), Some(6));
    }

    #[test]
    fn test_next_special_fence_only() {
        assert_eq!(next_special_index("hello\n```rust\n"), Some(6));
    }

    #[test]
    fn test_next_special_fence_at_start() {
        assert_eq!(next_special_index("```rust\n"), Some(0));
    }

    #[test]
    fn test_next_special_none() {
        assert_eq!(next_special_index("plain text"), None);
    }

    #[test]
    fn test_next_special_picks_earlier() {
        assert_eq!(next_special_index("a<b\n```"), Some(1));
    }

    #[test]
    fn test_parse_attrs() {
        let attrs = parse_attrs(r#" foo="bar" baz='qux' foo="override""#);
        assert_eq!(attrs.get("foo"), Some("override"));
        assert_eq!(attrs.get("baz"), Some("qux"));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_parse_attrs_ignores_unquoted() {
        let attrs = parse_attrs(r#" foo=bar baz="qux""#);
        assert_eq!(attrs.get("foo"), None);
        assert_eq!(attrs.get("baz"), Some("qux"));
    }

    #[test]
    fn test_fence_close_regex_exact_length() {
        let re = fence_close_regex(FenceKind::Backtick, 3);
        assert!(re.is_match("```\n"));
        assert!(!re.is_match("````\n"));
        assert!(re.is_match("   ```\n"));
    }

    #[test]
    fn test_fence_close_regex_trailing_whitespace_only() {
        let re = fence_close_regex(FenceKind::Tilde, 3);
        assert!(re.is_match("~~~  \n"));
        assert!(!re.is_match("~~~rust\n"));
    }
}
