/// Errors surfaced by the parser and event bus.
///
/// Parsing ambiguity is never represented here — an unresolved tag or fence
/// lookahead always demotes to plain text rather than returning `Err`. This
/// type only covers sink/transform failures and configuration mistakes.
#[derive(Debug, thiserror::Error)]
pub enum StitchError {
    #[error("sink {sink} failed during {stage}: {source}")]
    Sink {
        sink: String,
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid parser configuration: {0}")]
    Config(String),
}
