//! Defines the command-line arguments and subcommands for the Weft CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "weft",
    version,
    about = "Parse, transform and evaluate text with hand-built PEG grammars."
)]
pub struct WeftArgs {
    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse input with a built-in grammar and print the tree.
    Parse {
        /// Grammar to parse with.
        #[arg(short, long, value_enum, default_value_t = GrammarChoice::Arguments)]
        grammar: GrammarChoice,
        /// Start from this rule instead of the grammar's root.
        #[arg(short, long)]
        rule: Option<String>,
        /// Apply the grammar's transform to the tree.
        #[arg(short, long)]
        transform: bool,
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Input file, or `-` for stdin.
        file: PathBuf,
    },
    /// Evaluate an expression such as `puts(1, 4 + 5)`.
    Eval {
        /// Deepest expression nesting to evaluate.
        #[arg(long, default_value_t = 1000)]
        max_depth: usize,
        /// Deepest grammar nesting to parse.
        #[arg(long, default_value_t = crate::syntax::DEFAULT_MAX_NESTING)]
        max_nesting: usize,
        /// The expression source.
        expr: String,
    },
    /// List the plain-text spans and directive blocks of a document.
    Scan {
        /// Input file, or `-` for stdin.
        file: PathBuf,
    },
    /// List the rules of a grammar.
    Rules {
        #[arg(value_enum)]
        grammar: GrammarChoice,
    },
    /// List all available built-in functions.
    ListBuiltins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GrammarChoice {
    Arguments,
    Directive,
    Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Yaml,
}
