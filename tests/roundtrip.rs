//! Round-trip tests: tokenize, re-serialize, retokenize.

mod common;

use common::roundtrip;
use corky_rs::{format_tokens, tokenize};

// -----------------------------------------------------------
// Canonical sources come back unchanged.
// -----------------------------------------------------------

#[test]
fn roundtrip_single_command() {
    assert_eq!(roundtrip(":echo:const@\"hi\"\n"), ":echo:const@\"hi\"\n");
}

#[test]
fn roundtrip_multiline_program() {
    let source = ":define:static:~0:store:const@1\n\n:echo@\"%d\":~0\n";
    assert_eq!(roundtrip(source), source);
}

#[test]
fn roundtrip_every_argument_kind() {
    let source = ":a@\"t\":b@word:c@~4:d@.25:e@7:f@#\n";
    assert_eq!(roundtrip(source), source);
}

#[test]
fn roundtrip_references() {
    let source = ":~0:&1:^~2:^&3:~-1\n";
    assert_eq!(roundtrip(source), source);
}

#[test]
fn roundtrip_escaped_text() {
    let source = ":const@\"a \\\"quoted\\\" \\\\ path\"\n";
    assert_eq!(roundtrip(source), source);
}

// -----------------------------------------------------------
// Non-canonical sources normalise.
// -----------------------------------------------------------

#[test]
fn roundtrip_drops_junk_between_tokens() {
    assert_eq!(roundtrip("say :echo it :null !"), ":echo:null\n");
}

#[test]
fn roundtrip_drops_escaped_forms() {
    assert_eq!(roundtrip("::echo@\"x\":true"), ":true\n");
}

#[test]
fn roundtrip_lowercases_names() {
    assert_eq!(roundtrip(":Define:STATIC:~0"), ":define:static:~0\n");
}

#[test]
fn roundtrip_normalises_line_breaks() {
    assert_eq!(roundtrip(":a\r\n\r:b\r\n"), ":a\n\n:b\n");
}

#[test]
fn roundtrip_keeps_breaks_inside_text() {
    assert_eq!(
        roundtrip("  :const@\"x\r\ny\"  :echo\n:null"),
        ":const@\"x\r\ny\":echo\n:null\n"
    );
}

#[test]
fn roundtrip_trailing_float_dot() {
    assert_eq!(roundtrip(":d@5."), ":d@5.\n");
}

#[test]
fn roundtrip_token_free_source_has_no_form() {
    let tokens = tokenize("no tokens here").expect("tokenize");
    assert!(tokens.is_empty());
    assert_eq!(format_tokens(&tokens), "");
    assert!(tokenize(&format_tokens(&tokens)).is_err());
}
