mod cli;
mod sinks;

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;

use cli::Args;
use sinks::{LoggingSink, SyntaxColorSink, TextCollectorSink};
use stitchstream::{Parser, ParserConfig};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(args: &Args) -> Result<String> {
    match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading input file {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = ParserConfig::new(args.tags.clone())
        .with_emit_unit(args.emit_unit.into())
        .with_suppress_errors_from_transforms(args.suppress_errors);

    let mut parser = Parser::new(config).context("building parser")?;

    if args.log_events {
        parser.register_sink(Box::new(LoggingSink));
    }
    if args.highlight {
        parser.register_sink(Box::new(SyntaxColorSink::new()));
    }

    parser.subscribe_all(|event| {
        if let Ok(json) = serde_json::to_string(event) {
            println!("{json}");
        }
    });

    let input = read_input(&args)?;

    if args.whole_file {
        parser.feed(&input);
    } else {
        for line in input.split_inclusive('\n') {
            parser.feed(line);
        }
    }
    parser.flush();

    if args.collect_text {
        // A second pass keeps the collector's output independent of whatever
        // `--highlight` rewrote in the first parser's pipeline.
        let mut collector_parser = Parser::new(
            ParserConfig::new(args.tags).with_emit_unit(args.emit_unit.into()),
        )?;
        collector_parser.register_sink(Box::new(TextCollectorSink::default()));
        let collected = std::rc::Rc::new(std::cell::RefCell::new(String::new()));
        let collected_sink = collected.clone();
        collector_parser.subscribe_all(move |event| {
            if let stitchstream::Event::Text { text, .. }
            | stitchstream::Event::CodeFenceChunk { text, .. } = event
            {
                collected_sink.borrow_mut().push_str(text);
            }
        });
        collector_parser.feed(&input);
        collector_parser.flush();
        eprintln!("--- collected text ---\n{}", collected.borrow());
    }

    parser.dispose();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_input_reads_from_file_argument() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "hello from a file").unwrap();

        let args = Args {
            file: Some(file.path().to_path_buf()),
            tags: Vec::new(),
            emit_unit: cli::EmitUnitArg::Token,
            whole_file: false,
            collect_text: false,
            highlight: false,
            log_events: false,
            suppress_errors: false,
        };

        assert_eq!(read_input(&args).unwrap(), "hello from a file");
    }
}
