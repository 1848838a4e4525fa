//! Property-based tests with proptest.
//!
//! Generate token sequences, format them, tokenize them back, and check
//! the round-trip is exact. Arbitrary text checks the tokenizer's
//! progress and line accounting.

mod common;

use common::assert_tokens_roundtrip;
use corky_rs::{
    ArgKind, GeneratorConfig, Mode, Script, Token, build, format_tokens, generate, scan, tokenize,
};
use proptest::prelude::*;

// -- Leaf strategies --

/// Command name: letter start, then letters and underscores.
fn command_name() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(vec![
            "echo", "define", "const", "format", "store", "static", "text", "null", "true",
            "scope", "end",
        ])
        .prop_map(str::to_string),
        1 => "[a-z][a-z_]{0,8}",
    ]
}

/// Text payload: no quotes or backslashes except as valid escapes.
fn text_payload() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            6 => "[a-zA-Z0-9 :@~%.,!\n]",
            1 => Just("\\\"".to_string()),
            1 => Just("\\\\".to_string()),
        ],
        0..8,
    )
    .prop_map(|parts| parts.concat())
}

/// Argument with a value the lexer gives back unchanged.
fn argument() -> impl Strategy<Value = Option<(ArgKind, String)>> {
    prop_oneof![
        2 => Just(None),
        2 => text_payload().prop_map(|v| Some((ArgKind::Text, v))),
        1 => "[a-zA-Z_]{1,6}".prop_map(|v| Some((ArgKind::BareWord, v))),
        1 => "[0-9]{1,4}".prop_map(|v| Some((ArgKind::IndexRef, v))),
        1 => "[0-9]{1,3}\\.[0-9]{0,3}".prop_map(|v| Some((ArgKind::DynamicFloat, v))),
        1 => "[0-9]{1,6}".prop_map(|v| Some((ArgKind::StaticInt, v))),
        1 => "[#$%?!-][#$%?!a-z0-9-]{0,4}".prop_map(|v| Some((ArgKind::Unknown, v))),
    ]
}

fn token() -> impl Strategy<Value = Token> {
    prop_oneof![
        2 => (command_name(), argument()).prop_map(|(name, arg)| match arg {
            Some((kind, value)) => Token::named(&name).with_arg(kind, &value),
            None => Token::named(&name),
        }),
        1 => (0usize..20, any::<bool>(), any::<bool>()).prop_map(|(index, function, parent)| {
            let token = if function {
                Token::function(index)
            } else {
                Token::variable(index)
            };
            if parent { token.parent() } else { token }
        }),
        1 => Just(Token::argv()),
    ]
}

/// Tokens with line breaks between some of them.
fn script() -> impl Strategy<Value = Script> {
    prop::collection::vec((token(), 0usize..3), 0..12).prop_map(|items| {
        items.into_iter().fold(Script::new(), |script, (token, breaks)| {
            (0..breaks).fold(script, |script, _| script.newline()).token(token)
        })
    })
}

/// Lexer lines for a script: breaks inside text push later tokens down.
fn relined(script: &Script) -> Vec<Token> {
    let source = script.to_source();
    if source.is_empty() {
        return Vec::new();
    }
    tokenize(&source).expect("formatted source tokenizes")
}

proptest! {
    /// Formatting a tokenized script and tokenizing again is exact.
    #[test]
    fn token_roundtrip(script in script()) {
        let tokens = relined(&script);
        prop_assume!(!tokens.is_empty());
        assert_tokens_roundtrip(&tokens);
    }

    /// Formatting is idempotent.
    #[test]
    fn format_idempotent(script in script()) {
        let once = script.to_source();
        prop_assume!(!once.is_empty());
        let twice = format_tokens(&tokenize(&once).unwrap());
        prop_assert_eq!(once, twice);
    }

    /// Token kinds and arguments survive formatting unchanged.
    #[test]
    fn kinds_preserved(script in script()) {
        let tokens = relined(&script);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind.clone()).collect();
        let built: Vec<_> = script.tokens().iter().map(|t| t.kind.clone()).collect();
        prop_assert_eq!(kinds, built);
    }

    /// The tokenizer never panics and lines stay within the source.
    #[test]
    fn lines_bounded(source in "[a-z:~&^@\"\\\\0-9.\r\n ]{1,60}") {
        let tokens = tokenize(&source).unwrap();
        let breaks = source.matches("\r\n").count()
            + source.matches('\n').count()
            + source.matches('\r').count()
            - 2 * source.matches("\r\n").count();
        let mut last = 1;
        for token in &tokens {
            prop_assert!(token.line >= last);
            prop_assert!(token.line <= breaks + 1);
            last = token.line;
        }
    }

    /// Consumed spans advance strictly and never overlap.
    #[test]
    fn spans_advance(source in "[a-z:~&^@\"\\\\0-9.\n ]{1,60}") {
        let lexemes = scan(&source).unwrap();
        let mut end = 0;
        for lexeme in &lexemes {
            prop_assert!(lexeme.span.start >= end);
            prop_assert!(lexeme.span.end > lexeme.span.start);
            prop_assert!(lexeme.span.end <= source.len());
            prop_assert_eq!(source.as_bytes()[lexeme.span.start], b':');
            end = lexeme.span.end;
        }
    }

    /// Whatever builds also generates and runs without panicking.
    #[test]
    fn pipeline_never_panics(script in script(), unchecked in any::<bool>()) {
        let tokens = relined(&script);
        if let Ok(tree) = build(&tokens) {
            let mode = if unchecked { Mode::Unchecked } else { Mode::Checked };
            let program = generate(&tree, &GeneratorConfig::default().with_mode(mode));
            let _ = program.run(&["arg"]);
        }
    }
}
