use serde::Serialize;

/// Insertion-ordered string-to-string map, used for tag attributes.
///
/// A plain `Vec<(String, String)>` wrapper rather than a dependency on
/// `indexmap`: attribute lists are always small and last-write-wins is the
/// only lookup semantic needed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttrMap(Vec<(String, String)>);

impl AttrMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a key, keeping its original position on overwrite
    /// unless it's new (appended).
    pub fn insert(&mut self, key: String, value: String) {
        if let Some(entry) = self.0.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, String)> for AttrMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Which delimiter character opened a fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FenceKind {
    Backtick,
    Tilde,
}

impl FenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FenceKind::Backtick => "```",
            FenceKind::Tilde => "~~~",
        }
    }

    pub fn delim_char(self) -> char {
        match self {
            FenceKind::Backtick => '`',
            FenceKind::Tilde => '~',
        }
    }

    pub(crate) fn from_char(c: char) -> Option<Self> {
        match c {
            '`' => Some(FenceKind::Backtick),
            '~' => Some(FenceKind::Tilde),
            _ => None,
        }
    }
}

/// A recognized fence delimiter: which character, and how many were used to
/// open it (the close must use exactly as many).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FenceMarker {
    pub kind: FenceKind,
    pub fence_len: usize,
}

/// Active tag scope, carried on every event emitted while inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InTag {
    pub name: String,
    pub attrs: AttrMap,
}

/// Active fence scope, carried on every event emitted while inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InFence {
    pub fence: FenceMarker,
    pub lang: Option<String>,
}

/// Parsing context reported on each event: at most one of `in_tag` /
/// `in_code_fence` is ever set (the non-nesting invariant).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseContext {
    pub in_tag: Option<InTag>,
    pub in_code_fence: Option<InFence>,
}

impl ParseContext {
    pub fn text() -> Self {
        Self::default()
    }

    pub fn tag(in_tag: InTag) -> Self {
        Self {
            in_tag: Some(in_tag),
            in_code_fence: None,
        }
    }

    pub fn fence(in_fence: InFence) -> Self {
        Self {
            in_tag: None,
            in_code_fence: Some(in_fence),
        }
    }
}

/// The parser's top-level mode. `InTag`/`InFence` ⇔ the corresponding
/// `current_*` scope in [`crate::parser::ParserState`] is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Text,
    InTag,
    InFence,
}
