//! Directive blocks embedded in free text.
//!
//! ```text
//! welcome
//! :::>> foo(hello_there: 'world')
//!   I am inside the block
//! :::>- $ cat Gemfile
//! ```
//!
//! A directive starts with the marker `:::` and two visibility flags, `>`
//! (show) or `-` (hide), for the command and its result. A command name
//! follows, then either a parenthesized argument list or the rest of the line
//! as one bare argument, without trailing blanks. A `(` directly after the
//! name must open a well-formed argument list. Everything up to the next directive marker is the
//! directive's body.
//!
//! The root rule yields `[{no_code}, {code}, ...]` where each `code` record
//! holds `visibility`, `funcall`, `arglist` and `stdin`.

use once_cell::sync::OnceCell;

use super::{digits, quoted};
use crate::errors::WeftError;
use crate::syntax::{any, class, literal, rule, Grammar, GrammarBuilder};

/// Opens every directive block.
pub const MARKER: &str = ":::";

static GRAMMAR: OnceCell<Grammar> = OnceCell::new();

pub fn grammar() -> Result<&'static Grammar, WeftError> {
    GRAMMAR.get_or_try_init(build)
}

fn build() -> Result<Grammar, WeftError> {
    GrammarBuilder::new("directive")
        .rule("document", rule("no_code") >> rule("code").repeat(0))
        .rule("no_code", rule("text").capture("no_code"))
        .rule("code", (rule("start_command") >> rule("command")).capture("code"))
        .rule("text", (rule("start_command").absent() >> any()).repeat(0))
        // Layout
        .rule("space?", class(r"\s").repeat(0))
        .rule("inline_space", class("[ \t]").repeat(1))
        .rule("newline", literal("\r\n") | literal("\n"))
        // Directive head
        .rule("show", literal(">").capture("show"))
        .rule("hide", literal("-").capture("hide"))
        .rule("flag", rule("show") | rule("hide"))
        .rule(
            "visibility",
            rule("flag").capture("command") >> rule("flag").capture("result"),
        )
        .rule(
            "start_command",
            literal(MARKER) >> rule("visibility").capture("visibility") >> rule("inline_space").maybe(),
        )
        .rule(
            "command",
            rule("funcall")
                >> rule("args").capture("arglist")
                >> rule("inline_space").maybe()
                >> rule("newline").maybe()
                >> rule("stdin"),
        )
        .rule("funcall", class(r"[^ \t\r\n()]").repeat(1).capture("funcall"))
        .rule("stdin", rule("text").capture("stdin"))
        // Arguments
        // A `(` right after the name commits to a parenthesized list.
        .rule(
            "args",
            rule("paren_args") | (literal("(").absent() >> rule("line_args").maybe()),
        )
        .rule(
            "paren_args",
            literal("(") >> rule("space?") >> (rule("arglist") >> rule("space?")).maybe() >> literal(")"),
        )
        .rule(
            "line_args",
            rule("inline_space") >> rule("line_text").capture("bare"),
        )
        .rule("line_word", class(r"[^ \t\r\n]").repeat(1))
        .rule(
            "line_text",
            rule("line_word") >> (rule("inline_space") >> rule("line_word")).repeat(0),
        )
        .rule(
            "arglist",
            rule("arg") >> (rule("space?") >> literal(",") >> rule("space?") >> rule("arg")).repeat(0),
        )
        .rule("arg", rule("string") | rule("key_value") | rule("number") | rule("bare"))
        .rule("string", quoted('\'') | quoted('"'))
        .rule("integer", digits())
        // Digits followed by more token characters are a bare word such as `3x`.
        .rule("number", rule("integer") >> rule("bare_char").absent())
        .rule("bare_char", class(r#"[^\s,()'"]"#))
        .rule("value", rule("string") | rule("integer"))
        .rule("key", class(r#"[^\s:(),'"]"#).repeat(1).capture("key"))
        .rule(
            "key_value",
            (rule("key") >> literal(":") >> rule("inline_space").maybe() >> rule("value").capture("value"))
                .capture("key_value"),
        )
        .rule("bare", rule("bare_char").repeat(1).capture("bare"))
        .root("document")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Capture;

    fn flag(name: &str, text: &str) -> Capture {
        Capture::tagged(name, Capture::atom(text))
    }

    #[test]
    fn plain_text_is_one_span() {
        let tree = grammar().unwrap().parse("just\ntext\n").unwrap();
        assert_eq!(
            tree,
            Capture::list([Capture::tagged("no_code", Capture::atom("just\ntext\n"))])
        );
    }

    #[test]
    fn directive_record_fields() {
        let tree = grammar().unwrap().parse(":::>- hi('there')\nbody\n").unwrap();
        let items = tree.as_list().unwrap();
        assert_eq!(items.len(), 2);
        let code = items[1].get("code").unwrap();
        assert_eq!(
            code.get("visibility").unwrap(),
            &Capture::record([
                ("command", flag("show", ">")),
                ("result", flag("hide", "-")),
            ])
        );
        assert_eq!(code.get("funcall").unwrap().as_text(), Some("hi"));
        assert_eq!(
            code.get("arglist").unwrap(),
            &Capture::list([Capture::tagged("string", Capture::atom("there"))])
        );
        assert_eq!(code.get("stdin").unwrap().as_text(), Some("body\n"));
    }

    #[test]
    fn rest_of_line_is_bare_argument() {
        let tree = grammar().unwrap().parse(":::>> $ cat Gemfile\n").unwrap();
        let code = tree.as_list().unwrap()[1].get("code").unwrap().clone();
        assert_eq!(code.get("funcall").unwrap().as_text(), Some("$"));
        assert_eq!(
            code.get("arglist").unwrap(),
            &Capture::list([Capture::tagged("bare", Capture::atom("cat Gemfile"))])
        );
        assert_eq!(code.get("stdin").unwrap().as_text(), Some(""));
    }

    #[test]
    fn missing_command_name_is_parse_error() {
        assert!(grammar().unwrap().parse("text\n:::>>\n").is_err());
    }
}
