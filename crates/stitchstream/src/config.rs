use std::collections::HashSet;
use std::time::Duration;

/// Segmentation granularity for plain-text emission.
///
/// Selected once at construction and never changes for the lifetime of a
/// parser instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitUnit {
    /// Maximal runs of whitespace / non-whitespace.
    #[default]
    Token,
    /// Unicode word-segmentation pieces (words, whitespace, punctuation).
    Word,
    /// Unicode grapheme clusters.
    Grapheme,
}

/// Tunables for a [`crate::parser::StreamingParser`].
///
/// All fields correspond 1:1 to the configuration knobs in the design doc;
/// defaults match the reference values there.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub emit_unit: EmitUnit,
    pub buffer_length: usize,
    pub spec_buffer_length: usize,
    pub spec_min_parse_length: usize,
    pub tags: HashSet<String>,
    pub emit_delay: Duration,
    pub suppress_errors_from_transforms: bool,
    /// Set once `with_spec_buffer_length` is called explicitly; until then,
    /// `with_buffer_length` keeps `spec_buffer_length` tracking it.
    spec_buffer_length_overridden: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            emit_unit: EmitUnit::Token,
            buffer_length: 2048,
            spec_buffer_length: 2048,
            spec_min_parse_length: 10,
            tags: HashSet::new(),
            emit_delay: Duration::ZERO,
            suppress_errors_from_transforms: false,
            spec_buffer_length_overridden: false,
        }
    }
}

impl ParserConfig {
    /// Start building a config for the given recognized tag names.
    pub fn new(tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_emit_unit(mut self, unit: EmitUnit) -> Self {
        self.emit_unit = unit;
        self
    }

    pub fn with_buffer_length(mut self, n: usize) -> Self {
        self.buffer_length = n;
        if !self.spec_buffer_length_overridden {
            self.spec_buffer_length = n;
        }
        self
    }

    /// Set `spec_buffer_length` explicitly; otherwise it tracks `buffer_length`.
    pub fn with_spec_buffer_length(mut self, n: usize) -> Self {
        self.spec_buffer_length = n;
        self.spec_buffer_length_overridden = true;
        self
    }

    pub fn with_spec_min_parse_length(mut self, n: usize) -> Self {
        self.spec_min_parse_length = n;
        self
    }

    pub fn with_emit_delay(mut self, delay: Duration) -> Self {
        self.emit_delay = delay;
        self
    }

    pub fn with_suppress_errors_from_transforms(mut self, suppress: bool) -> Self {
        self.suppress_errors_from_transforms = suppress;
        self
    }

    /// Validate internal consistency; called by the parser constructor.
    pub(crate) fn validate(&self) -> Result<(), crate::error::StitchError> {
        if self.spec_min_parse_length == 0 {
            return Err(crate::error::StitchError::Config(
                "spec_min_parse_length must be at least 1".into(),
            ));
        }
        if self.buffer_length == 0 {
            return Err(crate::error::StitchError::Config(
                "buffer_length must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_length_carries_spec_buffer_length_when_untouched() {
        let config = ParserConfig::new(Vec::<String>::new()).with_buffer_length(100);
        assert_eq!(config.spec_buffer_length, 100);
    }

    #[test]
    fn explicit_spec_buffer_length_survives_a_later_buffer_length_change() {
        let config = ParserConfig::new(Vec::<String>::new())
            .with_spec_buffer_length(64)
            .with_buffer_length(100);
        assert_eq!(config.spec_buffer_length, 64);
    }
}
