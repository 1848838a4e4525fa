//! Re-serializer that turns tokens back into Corky source text.
//!
//! Output retokenizes to the same token sequence, lines included.

use std::fmt::{self, Write as _};

use crate::token::{ArgKind, Argument, Command, Token, TokenKind, VarRef};

/// Format a token sequence as source text.
///
/// Tokens on the same line are written back to back; a line increase of
/// `k` writes `k` line breaks before the token. A non-empty result ends
/// with a newline.
///
/// An empty sequence has no source form: it formats to the empty string,
/// which [`tokenize`](crate::lexer::tokenize) rejects as no code.
#[must_use]
pub fn format_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut line = 1;

    for token in tokens {
        for _ in line..token.line {
            out.push('\n');
        }
        let rendered = format!(":{token}");
        line = line.max(token.line) + line_breaks(&rendered);
        out.push_str(&rendered);
    }

    if !tokens.is_empty() {
        out.push('\n');
    }
    out
}

/// Line breaks the way the lexer counts them: `\r\n` is one break.
fn line_breaks(text: &str) -> usize {
    let bytes = text.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|&(i, &b)| b == b'\n' || (b == b'\r' && bytes.get(i + 1) != Some(&b'\n')))
        .count()
}

/// Renders without the leading colon: `echo`, `const@"hi"`, `^~0`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Var(var) => write!(f, "{var}"),
            TokenKind::Command(command) => write!(f, "{command}"),
        }
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parent {
            f.write_char('^')?;
        }
        write!(f, "{}{}", self.ref_type.sigil(), self.identifier)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())?;
        if let Some(arg) = &self.arg {
            write!(f, "@{arg}")?;
        }
        Ok(())
    }
}

/// Text is re-quoted with its escapes as scanned; index references get
/// their `~` back.
impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ArgKind::Text => write!(f, "\"{}\"", self.value),
            ArgKind::IndexRef => write!(f, "~{}", self.value),
            ArgKind::BareWord | ArgKind::DynamicFloat | ArgKind::StaticInt | ArgKind::Unknown => {
                f.write_str(&self.value)
            }
        }
    }
}
