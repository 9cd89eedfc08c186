// tests/properties.rs

use proptest::prelude::*;
use weft::document::Document;
use weft::grammars::arguments;
use weft::syntax::Capture;

fn directive_line() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec![">>", ">-", "->", "--"]),
        "[a-z_]{1,8}",
        prop::collection::vec("[a-z0-9]{1,5}", 0..3),
    )
        .prop_map(|(flags, name, args)| {
            let args = args
                .iter()
                .map(|a| format!("'{a}'"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(":::{flags} {name}({args})\n")
        })
}

proptest! {
    #[test]
    fn double_quoted_strings_keep_their_content(content in "[^\"]{0,24}") {
        let input = format!("\"{content}\"");
        let tree = arguments::grammar().unwrap().parse_rule("string", &input).unwrap();
        prop_assert_eq!(tree, Capture::tagged("string", Capture::atom(content)));
    }

    #[test]
    fn single_quoted_strings_keep_their_content(content in "[^']{0,24}") {
        let input = format!("'{content}'");
        let tree = arguments::grammar().unwrap().parse_rule("string", &input).unwrap();
        prop_assert_eq!(tree, Capture::tagged("string", Capture::atom(content)));
    }

    #[test]
    fn documents_reconstruct_exactly(
        parts in prop::collection::vec(("[^:]{0,30}", directive_line()), 0..5),
        tail in "[^:]{0,30}",
    ) {
        let mut input = String::new();
        for (text, directive) in &parts {
            input.push_str(text);
            if !input.is_empty() && !input.ends_with('\n') {
                input.push('\n');
            }
            input.push_str(directive);
        }
        input.push_str(&tail);

        let doc = Document::parse(&input).unwrap();
        prop_assert_eq!(doc.directives().count(), parts.len());
        prop_assert_eq!(doc.reconstruct(), input);
    }
}
