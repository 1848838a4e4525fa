#![allow(dead_code)]

use corky_rs::{GeneratorConfig, Mode, RuntimeError, SyntaxNode, Token, compile_str, format_tokens, tokenize};

pub const NO_ARGS: [&str; 0] = [];

/// Helper: tokenize, re-serialize, retokenize and assert the token
/// sequences match.
pub fn roundtrip(input: &str) -> String {
    let tokens = tokenize(input).expect("tokenize failed");
    let output = format_tokens(&tokens);
    let again = tokenize(&output).unwrap_or_else(|e| {
        panic!("failed to retokenize formatted output: {e}\n--- formatted ---\n{output}")
    });
    assert_eq!(
        tokens, again,
        "round-trip mismatch:\n--- input ---\n{input}\n--- formatted ---\n{output}"
    );
    output
}

/// Helper: re-serialize tokens and assert the result tokenizes back to
/// the same sequence. An empty slice has no source form and is skipped.
pub fn assert_tokens_roundtrip(tokens: &[Token]) {
    if tokens.is_empty() {
        return;
    }
    let formatted = format_tokens(tokens);
    let parsed = tokenize(&formatted).unwrap_or_else(|e| {
        panic!("failed to tokenize formatted output: {e}\n--- formatted ---\n{formatted}")
    });
    assert_eq!(
        tokens,
        parsed.as_slice(),
        "token mismatch\n--- formatted ---\n{formatted}"
    );
}

pub fn tree(input: &str) -> Vec<SyntaxNode> {
    corky_rs::build_str(input).unwrap_or_else(|e| panic!("build failed: {e}\n--- input ---\n{input}"))
}

/// Compile in `mode` and run without program arguments.
pub fn run(input: &str, mode: Mode) -> Result<String, RuntimeError> {
    compile_str(input, &GeneratorConfig::default().with_mode(mode))
        .unwrap_or_else(|e| panic!("compile failed: {e}\n--- input ---\n{input}"))
        .run(&NO_ARGS)
}

/// Run in both modes and assert they print the same thing.
pub fn run_both(input: &str) -> String {
    let checked = run(input, Mode::Checked).expect("checked run failed");
    let unchecked = run(input, Mode::Unchecked).expect("unchecked run failed");
    assert_eq!(checked, unchecked, "modes disagree on\n{input}");
    checked
}
