use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EmitUnitArg {
    Token,
    Word,
    Grapheme,
}

impl From<EmitUnitArg> for stitchstream::EmitUnit {
    fn from(value: EmitUnitArg) -> Self {
        match value {
            EmitUnitArg::Token => stitchstream::EmitUnit::Token,
            EmitUnitArg::Word => stitchstream::EmitUnit::Word,
            EmitUnitArg::Grapheme => stitchstream::EmitUnit::Grapheme,
        }
    }
}

/// Drive the stitchstream parser over a file (or stdin) and print the
/// resulting event stream.
#[derive(Debug, Parser)]
#[command(name = "stitchstream", version, about)]
pub struct Args {
    /// Input file; reads stdin if omitted.
    pub file: Option<PathBuf>,

    /// Recognized tag names (repeatable): `--tag think --tag plan`.
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Segmentation granularity for plain text.
    #[arg(long, value_enum, default_value = "token")]
    pub emit_unit: EmitUnitArg,

    /// Feed the whole input in a single `feed` call instead of line by line.
    #[arg(long)]
    pub whole_file: bool,

    /// Register the plain-text collector sink and print its result at the end.
    #[arg(long)]
    pub collect_text: bool,

    /// Register the ANSI syntax-coloring sink for code-fence chunks.
    #[arg(long)]
    pub highlight: bool,

    /// Register the tracing logger sink.
    #[arg(long)]
    pub log_events: bool,

    /// Suppress transformation-sink errors instead of surfacing `error` events.
    #[arg(long)]
    pub suppress_errors: bool,
}
