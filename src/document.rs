//! Typed reading of the directive grammar.
//!
//! A [`Document`] is its source text cut into [`Segment`]s: plain text and
//! directive blocks, in order. Segment spans tile the source exactly, so
//! nothing is lost between them and [`Document::reconstruct`] returns the
//! original input.
//!
//! What a hidden command or result means is up to whoever runs the
//! directives; the document only records the flags.

use serde::Serialize;
use std::fmt;

use crate::errors::{SourceContext, WeftError};
use crate::grammars::directive;
use crate::syntax::Span;
use crate::transform::{record, sequence, simple, BindingError, Bindings, Transform, Tree};

// ============================================================================
// DOCUMENT MODEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    Show,
    Hide,
}

/// Whether a directive's command and its result are meant to be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub command: Flag,
    pub result: Flag,
}

impl Visibility {
    pub fn shows_command(&self) -> bool {
        self.command == Flag::Show
    }

    pub fn shows_result(&self) -> bool {
        self.result == Flag::Show
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Argument {
    Str(String),
    Int(i64),
    Bare(String),
    KeyValue { key: String, value: Box<Argument> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<Argument>,
    pub visibility: Visibility,
    /// Text following the command up to the next directive or end of input.
    pub body: String,
    /// From the marker through the end of the body.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Text { text: String, span: Span },
    Directive(Directive),
}

impl Segment {
    pub fn span(&self) -> Span {
        match self {
            Segment::Text { span, .. } => *span,
            Segment::Directive(d) => d.span,
        }
    }

    fn span_mut(&mut self) -> &mut Span {
        match self {
            Segment::Text { span, .. } => span,
            Segment::Directive(d) => &mut d.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    #[serde(skip)]
    source: String,
    pub segments: Vec<Segment>,
}

impl Document {
    pub fn parse(input: &str) -> Result<Document, WeftError> {
        Self::parse_source(&SourceContext::from_input(input))
    }

    pub fn parse_source(source: &SourceContext) -> Result<Document, WeftError> {
        let tree = directive::grammar()?.parse_source(None, source)?;
        let parts = match transform().apply_in(tree, source)? {
            Tree::List(items) => items,
            other => vec![other],
        };

        let mut segments = Vec::with_capacity(parts.len());
        let mut offset = 0;
        for part in parts {
            let mut segment = match part.into_value()? {
                Part::Segment(segment) => segment,
                other => return Err(incomplete("a segment", &other)),
            };
            // Directive spans start at their marker, which is not captured;
            // it begins where the previous segment ended.
            segment.span_mut().start = offset;
            offset = segment.span().end;
            if matches!(&segment, Segment::Text { text, .. } if text.is_empty()) {
                continue;
            }
            segments.push(segment);
        }
        log::debug!("scanned {} segments from {}", segments.len(), source.name);

        Ok(Document {
            source: source.content.clone(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Directive(d) => Some(d),
            Segment::Text { .. } => None,
        })
    }

    /// Source text covered by `segment`.
    pub fn text_of(&self, segment: &Segment) -> &str {
        let span = segment.span();
        &self.source[span.start..span.end]
    }

    /// Concatenates every segment's source text in order.
    pub fn reconstruct(&self) -> String {
        self.segments.iter().map(|s| self.text_of(s)).collect()
    }
}

fn incomplete(expected: &str, found: &Part) -> WeftError {
    WeftError::new(crate::errors::ErrorKind::IncompleteTransform {
        expected: expected.into(),
        found: found.kind().into(),
    })
}

// ============================================================================
// TRANSFORM
// ============================================================================

/// Values constructed while transforming a directive parse tree.
#[derive(Debug, Clone, PartialEq)]
enum Part {
    Flag(Flag),
    Visibility(Visibility),
    Argument(Argument),
    Segment(Segment),
}

impl Part {
    fn kind(&self) -> &'static str {
        match self {
            Part::Flag(_) => "flag",
            Part::Visibility(_) => "visibility",
            Part::Argument(_) => "argument",
            Part::Segment(_) => "segment",
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Flag(Flag::Show) => write!(f, ">"),
            Part::Flag(Flag::Hide) => write!(f, "-"),
            Part::Visibility(v) => write!(f, "{}{}", Part::Flag(v.command), Part::Flag(v.result)),
            Part::Argument(a) => write!(f, "{a:?}"),
            Part::Segment(Segment::Text { text, .. }) => write!(f, "{text:?}"),
            Part::Segment(Segment::Directive(d)) => write!(f, "directive {}", d.name),
        }
    }
}

fn take_flag(b: &mut Bindings<Part>, name: &str) -> Result<Flag, BindingError> {
    match b.take_value(name)? {
        Part::Flag(flag) => Ok(flag),
        other => Err(wrong_part(name, "flag", &other)),
    }
}

fn take_argument(part: Part) -> Result<Argument, BindingError> {
    match part {
        Part::Argument(arg) => Ok(arg),
        other => Err(wrong_part("args", "argument", &other)),
    }
}

fn wrong_part(name: &str, expected: &'static str, found: &Part) -> BindingError {
    BindingError::Shape {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}

fn transform() -> Transform<Part> {
    Transform::<Part>::new()
        .rule("show", record([("show", simple("f"))]), |_| Ok(Tree::Value(Part::Flag(Flag::Show))))
        .rule("hide", record([("hide", simple("f"))]), |_| Ok(Tree::Value(Part::Flag(Flag::Hide))))
        .rule(
            "visibility",
            record([("command", simple("command")), ("result", simple("result"))]),
            |b| {
                let command = take_flag(b, "command")?;
                let result = take_flag(b, "result")?;
                Ok(Tree::Value(Part::Visibility(Visibility { command, result })))
            },
        )
        .rule("string", record([("string", simple("s"))]), |b| {
            Ok(Tree::Value(Part::Argument(Argument::Str(b.text("s")?.to_string()))))
        })
        .rule("int", record([("int", simple("i"))]), |b| {
            let text = b.text("i")?;
            text.parse()
                .map(|n| Tree::Value(Part::Argument(Argument::Int(n))))
                .map_err(|e| BindingError::Invalid(format!("'{text}' is not a 64-bit integer: {e}")))
        })
        .rule("bare", record([("bare", simple("b"))]), |b| {
            Ok(Tree::Value(Part::Argument(Argument::Bare(b.text("b")?.to_string()))))
        })
        .rule(
            "key_value",
            record([(
                "key_value",
                record([("key", simple("key")), ("value", simple("value"))]),
            )]),
            |b| {
                let key = b.text("key")?.to_string();
                let value = take_argument(b.take_value("value")?)?;
                Ok(Tree::Value(Part::Argument(Argument::KeyValue {
                    key,
                    value: Box::new(value),
                })))
            },
        )
        .rule("no_code", record([("no_code", simple("text"))]), |b| {
            let slice = b.slice("text")?;
            Ok(Tree::Value(Part::Segment(Segment::Text {
                text: slice.text.clone(),
                span: slice.span,
            })))
        })
        .rule(
            "code",
            record([(
                "code",
                record([
                    ("visibility", simple("visibility")),
                    ("funcall", simple("name")),
                    ("arglist", sequence("args")),
                    ("stdin", simple("body")),
                ]),
            )]),
            |b| {
                let name = b.slice("name")?.clone();
                let body = b.slice("body")?.clone();
                let visibility = match b.take_value("visibility")? {
                    Part::Visibility(v) => v,
                    other => return Err(wrong_part("visibility", "visibility", &other)),
                };
                let arguments = b
                    .take_values("args")?
                    .into_iter()
                    .map(take_argument)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Tree::Value(Part::Segment(Segment::Directive(Directive {
                    name: name.text,
                    arguments,
                    visibility,
                    body: body.text,
                    span: Span::new(name.span.start, body.span.end),
                }))))
            },
        )
}
