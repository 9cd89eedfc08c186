//! Handles all user-facing output for the CLI.
//!
//! This module is responsible for pretty-printing, colorizing output, and
//! serializing trees. By centralizing output logic here, we ensure a
//! consistent user experience across all commands.

// ============================================================================
// OUTPUT SINKS: OutputBuffer and StdoutSink implementations
// ============================================================================

use serde::Serialize;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ast::Value;
use crate::builtins::OutputSink;
use crate::cli::args::Format;
use crate::document::{Argument, Document, Flag, Segment};
use crate::errors::{ErrorKind, WeftError};
use crate::syntax::Span;

/// OutputBuffer: collects output into a String for testing or programmatic capture.
pub struct OutputBuffer {
    pub buffer: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }
    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str, _span: Option<&Span>) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);
    }
}

/// StdoutSink: writes output to stdout for CLI and default runner use.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str, _span: Option<&Span>) {
        println!("{}", text);
    }
}

// ============================================================================
// CORE OUTPUT FUNCTIONS: User-facing CLI output utilities
// ============================================================================

/// Serializes a tree or document in the requested format.
pub fn render<T: Serialize>(value: &T, format: Format) -> Result<String, WeftError> {
    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
        Format::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
    };
    rendered.map_err(|reason| {
        WeftError::new(ErrorKind::Io {
            target: format!("{format:?} output"),
            reason,
        })
    })
}

/// Pretty-prints an evaluation result to the console.
pub fn print_result(result: &Value) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "Result: {}", result);
    let _ = stdout.reset();
}

/// Prints one line per segment: text spans dimmed, directives highlighted.
pub fn print_segments(document: &Document) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    if document.segments.is_empty() {
        let _ = writeln!(stdout, "(empty)");
        return;
    }

    for segment in &document.segments {
        let span = segment.span();
        match segment {
            Segment::Text { text, .. } => {
                let _ = stdout.set_color(ColorSpec::new().set_dimmed(true));
                let _ = writeln!(stdout, "{:>5}..{:<5} text      {:?}", span.start, span.end, text);
            }
            Segment::Directive(d) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
                let _ = write!(
                    stdout,
                    "{:>5}..{:<5} directive {}{} {}",
                    span.start,
                    span.end,
                    flag_char(d.visibility.command),
                    flag_char(d.visibility.result),
                    d.name
                );
                let _ = stdout.reset();
                let args = d.arguments.iter().map(format_argument).collect::<Vec<_>>().join(", ");
                let _ = writeln!(stdout, "({}) body {:?}", args, d.body);
            }
        }
        let _ = stdout.reset();
    }
}

/// Prints a sorted list of names, marking `highlight` if present.
pub fn print_registry(items: &[String], highlight: Option<&str>) {
    if items.is_empty() {
        println!("  No items found.");
        return;
    }

    for item in items {
        if Some(item.as_str()) == highlight {
            println!("  {} (root)", item);
        } else {
            println!("  {}", item);
        }
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn flag_char(flag: Flag) -> char {
    match flag {
        Flag::Show => '>',
        Flag::Hide => '-',
    }
}

fn format_argument(arg: &Argument) -> String {
    match arg {
        Argument::Str(s) => format!("{s:?}"),
        Argument::Int(n) => n.to_string(),
        Argument::Bare(b) => b.clone(),
        Argument::KeyValue { key, value } => format!("{}: {}", key, format_argument(value)),
    }
}
