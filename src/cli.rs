//! The Weft Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::io::Read;
use std::path::Path;
use std::process;

use clap::Parser;

use crate::builtins;
use crate::document::Document;
use crate::engine::{self, EvalConfig};
use crate::errors::{print_error, ErrorKind, SourceContext, WeftError};
use crate::grammars::{arguments, directive, expression};
use crate::syntax::Grammar;

pub mod args;
pub mod output;

use args::{Command, Format, GrammarChoice, WeftArgs};
use output::StdoutSink;

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = WeftArgs::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Command::Parse {
            grammar,
            rule,
            transform,
            format,
            file,
        } => handle_parse(grammar, rule.as_deref(), transform, format, &file),
        Command::Eval {
            max_depth,
            max_nesting,
            expr,
        } => handle_eval(&expr, max_depth, max_nesting),
        Command::Scan { file } => handle_scan(&file),
        Command::Rules { grammar } => handle_rules(grammar),
        Command::ListBuiltins => {
            output::print_registry(&builtins::standard().list(), None);
            Ok(())
        }
    };

    if let Err(e) = result {
        print_error(e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_parse(
    choice: GrammarChoice,
    rule: Option<&str>,
    transform: bool,
    format: Format,
    file: &Path,
) -> Result<(), WeftError> {
    let source = read_source(file)?;
    let rendered = match (choice, transform) {
        (GrammarChoice::Directive, true) if rule.is_none() => {
            output::render(&Document::parse_source(&source)?, format)?
        }
        (choice, transform) => {
            let tree = grammar_for(choice)?.parse_source(rule, &source)?;
            match (choice, transform) {
                (GrammarChoice::Arguments, true) => {
                    output::render(&arguments::transform().apply_in(tree, &source)?, format)?
                }
                (GrammarChoice::Expression, true) => {
                    output::render(&expression::transform().apply_in(tree, &source)?, format)?
                }
                _ => output::render(&tree, format)?,
            }
        }
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn handle_eval(expr: &str, max_depth: usize, max_nesting: usize) -> Result<(), WeftError> {
    let config = EvalConfig::default()
        .with_max_depth(max_depth)
        .with_max_nesting(max_nesting);
    let mut sink = StdoutSink;
    let value = engine::run(expr, config, &mut sink)?;
    output::print_result(&value);
    Ok(())
}

fn handle_scan(file: &Path) -> Result<(), WeftError> {
    let source = read_source(file)?;
    let document = Document::parse_source(&source)?;
    output::print_segments(&document);
    Ok(())
}

fn handle_rules(choice: GrammarChoice) -> Result<(), WeftError> {
    let grammar = grammar_for(choice)?;
    let mut names: Vec<String> = grammar.rule_names().map(str::to_string).collect();
    names.sort();
    output::print_registry(&names, Some(grammar.root_name()));
    Ok(())
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn grammar_for(choice: GrammarChoice) -> Result<&'static Grammar, WeftError> {
    match choice {
        GrammarChoice::Arguments => arguments::grammar(),
        GrammarChoice::Directive => directive::grammar(),
        GrammarChoice::Expression => expression::grammar(),
    }
}

/// Reads a file, or stdin when the path is `-`.
fn read_source(path: &Path) -> Result<SourceContext, WeftError> {
    let io_error = |e: std::io::Error| {
        WeftError::new(ErrorKind::Io {
            target: path.display().to_string(),
            reason: e.to_string(),
        })
    };
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content).map_err(io_error)?;
        Ok(SourceContext::from_file("<stdin>", content))
    } else {
        let content = std::fs::read_to_string(path).map_err(io_error)?;
        Ok(SourceContext::from_file(path.display().to_string(), content))
    }
}
