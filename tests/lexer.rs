//! Tokenizer edge cases.

use corky_rs::{ArgKind, CommandName, Identifier, NoCodeError, RefType, TokenKind, scan, tokenize};

fn names(input: &str) -> Vec<String> {
    tokenize(input)
        .expect("tokenize")
        .iter()
        .map(|t| t.kind_name().to_string())
        .collect()
}

// -----------------------------------------------------------
// Basic lexer behaviour.
// -----------------------------------------------------------

#[test]
fn lex_empty_input() {
    assert_eq!(tokenize(""), Err(NoCodeError));
    assert_eq!(scan("").unwrap_err().to_string(), "no code given, empty or wrong type");
}

#[test]
fn lex_only_whitespace() {
    let tokens = tokenize("   \t  \n\n  ").expect("tokenize");
    assert!(tokens.is_empty());
}

#[test]
fn lex_text_between_tokens_is_ignored() {
    assert_eq!(
        names("print this :echo then :const@1 and :~0 done"),
        vec!["echo", "const", "var"]
    );
}

#[test]
fn lex_command_name_stops_at_digit() {
    let tokens = tokenize(":echo2").expect("tokenize");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind_name(), "echo");
}

#[test]
fn lex_underscore_in_name() {
    assert_eq!(names(":my_cmd"), vec!["my_cmd"]);
    assert!(matches!(
        tokenize(":my_cmd").unwrap()[0].command().unwrap().name,
        CommandName::Other(ref name) if name == "my_cmd"
    ));
}

#[test]
fn lex_name_cannot_start_with_underscore() {
    assert!(tokenize(":_x").unwrap().is_empty());
}

// -----------------------------------------------------------
// References.
// -----------------------------------------------------------

#[test]
fn lex_reference_forms() {
    let tokens = tokenize(":~3:&0:^~1:^&-1").expect("tokenize");
    let refs: Vec<_> = tokens
        .iter()
        .map(|t| {
            let var = t.var().expect("reference");
            (var.ref_type, var.identifier, var.parent)
        })
        .collect();
    assert_eq!(
        refs,
        vec![
            (RefType::Variable, Identifier::Index(3), false),
            (RefType::Function, Identifier::Index(0), false),
            (RefType::Variable, Identifier::Index(1), true),
            (RefType::Function, Identifier::Argv, true),
        ]
    );
}

#[test]
fn lex_reference_without_identifier_is_skipped() {
    assert_eq!(names(":~:&x:^:echo"), vec!["echo"]);
}

#[test]
fn lex_other_negative_identifiers_are_skipped() {
    assert!(tokenize(":~-2").unwrap().is_empty());
}

#[test]
fn lex_overflowing_index_is_skipped() {
    assert!(tokenize(":~99999999999999999999999999").unwrap().is_empty());
}

// -----------------------------------------------------------
// Arguments.
// -----------------------------------------------------------

#[test]
fn lex_text_may_span_colons_and_lines() {
    let tokens = tokenize(":const@\"a:b\nc\"").expect("tokenize");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].arg().unwrap().value, "a:b\nc");
}

#[test]
fn lex_first_unescaped_quote_closes_text() {
    let tokens = tokenize(r#":const@"a"b":echo"#).expect("tokenize");
    assert_eq!(tokens[0].arg().unwrap().value, "a");
    assert_eq!(tokens[1].kind_name(), "echo");
}

#[test]
fn lex_unterminated_text_is_unknown() {
    let tokens = tokenize(":const@\"abc").expect("tokenize");
    let arg = tokens[0].arg().unwrap();
    assert_eq!(arg.kind, ArgKind::Unknown);
    assert_eq!(arg.value, "\"abc");
}

#[test]
fn lex_bare_word_keeps_case() {
    let tokens = tokenize(":x@HelloWorld").expect("tokenize");
    let arg = tokens[0].arg().unwrap();
    assert_eq!(arg.kind, ArgKind::BareWord);
    assert_eq!(arg.value, "HelloWorld");
}

#[test]
fn lex_bare_word_stops_at_digit() {
    let tokens = tokenize(":x@ab12:echo").expect("tokenize");
    assert_eq!(tokens[0].arg().unwrap().value, "ab");
    assert_eq!(tokens.len(), 2);
}

#[test]
fn lex_index_argument_needs_digits() {
    let tokens = tokenize(":x@~").expect("tokenize");
    let arg = tokens[0].arg().unwrap();
    assert_eq!(arg.kind, ArgKind::Unknown);
    assert_eq!(arg.value, "~");
}

#[test]
fn lex_lone_dot_is_unknown() {
    let tokens = tokenize(":x@.").expect("tokenize");
    assert_eq!(tokens[0].arg().unwrap().kind, ArgKind::Unknown);
}

#[test]
fn lex_negative_number_is_unknown() {
    let tokens = tokenize(":x@-4").expect("tokenize");
    let arg = tokens[0].arg().unwrap();
    assert_eq!(arg.kind, ArgKind::Unknown);
    assert_eq!(arg.value, "-4");
}

#[test]
fn lex_unknown_stops_at_colon() {
    let tokens = tokenize(":x@?!:echo").expect("tokenize");
    assert_eq!(tokens[0].arg().unwrap().value, "?!");
    assert_eq!(tokens[1].kind_name(), "echo");
}

// -----------------------------------------------------------
// Escapes and recovery.
// -----------------------------------------------------------

#[test]
fn lex_escape_comments_out_reference() {
    assert_eq!(names("::~0:echo"), vec!["echo"]);
}

#[test]
fn lex_escape_comments_out_argument() {
    assert_eq!(names("::const@\"a:b\":null"), vec!["null"]);
}

#[test]
fn lex_double_escape() {
    assert_eq!(names(":::echo:null"), vec!["null"]);
}

#[test]
fn lex_escape_before_nothing() {
    assert_eq!(names(":: :echo"), vec!["echo"]);
}

#[test]
fn lex_scan_reports_escaped_spans() {
    let lexemes = scan("::echo :null").expect("scan");
    assert_eq!(lexemes.len(), 2);
    assert_eq!(lexemes[0].span, 0..6);
    assert!(lexemes[0].token.is_none());
    assert!(matches!(
        lexemes[1].token.as_ref().map(|t| &t.kind),
        Some(TokenKind::Command(_))
    ));
}

// -----------------------------------------------------------
// Lines.
// -----------------------------------------------------------

#[test]
fn lex_lines_with_mixed_breaks() {
    let tokens = tokenize("\r\n:a\n\r:b\r\r\n:c").expect("tokenize");
    let lines: Vec<_> = tokens.iter().map(|t| t.line).collect();
    assert_eq!(lines, vec![2, 4, 6]);
}

#[test]
fn lex_lines_after_escaped_text() {
    let tokens = tokenize("::const@\"\n\n\":echo").expect("tokenize");
    assert_eq!(tokens[0].line, 3);
}
