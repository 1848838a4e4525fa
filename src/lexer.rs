use std::ops::Range;

use crate::token::{ArgKind, Argument, Command, CommandName, Identifier, RefType, Token, TokenKind, VarRef};

/// Error for empty source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no code given, empty or wrong type")]
pub struct NoCodeError;

/// One consumed span of source. `token` is `None` for `::` escapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Option<Token>,
    pub span: Range<usize>,
}

/// Tokenize Corky source into a sequence of tokens.
///
/// Colons that do not start a valid token form are skipped silently;
/// structural problems surface later in the tree builder.
///
/// # Errors
///
/// Returns `NoCodeError` if `source` is empty.
pub fn tokenize(source: &str) -> Result<Vec<Token>, NoCodeError> {
    let tokens: Vec<Token> = scan(source)?
        .into_iter()
        .filter_map(|lexeme| lexeme.token)
        .collect();
    log::debug!("tokenized {} bytes into {} tokens", source.len(), tokens.len());
    Ok(tokens)
}

/// Scan Corky source, reporting every consumed span in order, including
/// the ones that produce no token.
///
/// Spans never overlap: scanning resumes right after each match.
///
/// # Errors
///
/// Returns `NoCodeError` if `source` is empty.
pub fn scan(source: &str) -> Result<Vec<Lexeme>, NoCodeError> {
    if source.is_empty() {
        return Err(NoCodeError);
    }
    Ok(Lexer::new(source).scan())
}

struct Lexer<'a> {
    source: &'a str,
    input: &'a [u8],
    pos: usize,
    line: usize,
}

/// Outcome of matching the token grammar at a colon.
struct Match {
    end: usize,
    kind: Option<TokenKind>,
}

impl<'a> Lexer<'a> {
    const fn new(source: &'a str) -> Self {
        Self {
            source,
            input: source.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    fn scan(mut self) -> Vec<Lexeme> {
        let mut lexemes = Vec::new();

        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b'\r' => {
                    self.pos += 1;
                    if self.peek() == Some(b'\n') {
                        self.pos += 1;
                    }
                    self.line += 1;
                }
                b'\n' => {
                    self.pos += 1;
                    self.line += 1;
                }
                b':' => {
                    let start = self.pos;
                    if let Some(found) = self.match_at(start) {
                        let line = self.line;
                        self.consume_to(found.end);
                        let token = found.kind.map(|kind| Token { kind, line });
                        if let Some(token) = &token {
                            log::trace!("line {line}: {token}");
                        }
                        lexemes.push(Lexeme {
                            token,
                            span: start..found.end,
                        });
                    } else {
                        // unmatched colon
                        self.pos += 1;
                    }
                }
                _ => {
                    self.pos += 1;
                }
            }
        }

        lexemes
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn byte(&self, at: usize) -> Option<u8> {
        self.input.get(at).copied()
    }

    /// Advance to `end`, counting line breaks inside the consumed span.
    fn consume_to(&mut self, end: usize) {
        while self.pos < end {
            match self.input[self.pos] {
                b'\r' => {
                    if self.byte(self.pos + 1) == Some(b'\n') && self.pos + 1 < end {
                        self.pos += 1;
                    }
                    self.line += 1;
                }
                b'\n' => self.line += 1,
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// Anchored match of the token grammar at the colon `start`.
    fn match_at(&self, start: usize) -> Option<Match> {
        let mut at = start + 1;
        let skip = self.byte(at) == Some(b':');
        if skip {
            at += 1;
        }

        let (end, kind) = self
            .match_reference(at)
            .or_else(|| self.match_command(at))?;

        Some(Match {
            end,
            kind: if skip { None } else { Some(kind) },
        })
    }

    fn match_reference(&self, mut at: usize) -> Option<(usize, TokenKind)> {
        let parent = self.byte(at) == Some(b'^');
        if parent {
            at += 1;
        }

        let ref_type = match self.byte(at)? {
            b'~' => RefType::Variable,
            b'&' => RefType::Function,
            _ => return None,
        };
        at += 1;

        let digits = self.digits(at);
        let (identifier, end) = if digits > 0 {
            let index = self.source[at..at + digits].parse().ok()?;
            (Identifier::Index(index), at + digits)
        } else if self.input[at..].starts_with(b"-1") {
            (Identifier::Argv, at + 2)
        } else {
            return None;
        };

        Some((
            end,
            TokenKind::Var(VarRef {
                ref_type,
                identifier,
                parent,
            }),
        ))
    }

    fn match_command(&self, at: usize) -> Option<(usize, TokenKind)> {
        if !self.byte(at)?.is_ascii_alphabetic() {
            return None;
        }
        let mut end = at + 1;
        while self
            .byte(end)
            .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        {
            end += 1;
        }
        let name = CommandName::from_name(&self.source[at..end].to_ascii_lowercase());

        let arg = if self.byte(end) == Some(b'@') {
            let (arg_end, arg) = self.match_argument(end + 1);
            end = arg_end;
            arg
        } else {
            None
        };

        Some((end, TokenKind::Command(Command { name, arg })))
    }

    /// Try the argument alternatives in precedence order. The fallback
    /// always matches, possibly empty (no argument).
    fn match_argument(&self, at: usize) -> (usize, Option<Argument>) {
        let argument = |kind, range: Range<usize>| Argument {
            kind,
            value: self.source[range].to_string(),
        };

        if let Some(end) = self.match_text(at) {
            return (end, Some(argument(ArgKind::Text, at + 1..end - 1)));
        }

        let word = self.count(at, |b| b.is_ascii_alphabetic() || b == b'_');
        if word > 0 {
            return (at + word, Some(argument(ArgKind::BareWord, at..at + word)));
        }

        if self.byte(at) == Some(b'~') {
            let digits = self.digits(at + 1);
            if digits > 0 {
                let end = at + 1 + digits;
                return (end, Some(argument(ArgKind::IndexRef, at + 1..end)));
            }
        }

        if let Some(end) = self.match_float(at) {
            return (end, Some(argument(ArgKind::DynamicFloat, at..end)));
        }

        let digits = self.digits(at);
        if digits > 0 {
            return (at + digits, Some(argument(ArgKind::StaticInt, at..at + digits)));
        }

        let rest = self.count(at, |b| b != b':' && !is_space(b));
        if rest == 0 {
            (at, None)
        } else {
            (at + rest, Some(argument(ArgKind::Unknown, at..at + rest)))
        }
    }

    /// Double-quoted text; returns the position after the closing quote.
    fn match_text(&self, at: usize) -> Option<usize> {
        if self.byte(at) != Some(b'"') {
            return None;
        }
        let mut pos = at + 1;
        loop {
            match self.byte(pos)? {
                b'"' => return Some(pos + 1),
                b'\\' => match self.byte(pos + 1)? {
                    b'\\' | b'"' => pos += 2,
                    _ => return None,
                },
                _ => pos += 1,
            }
        }
    }

    /// `\d+\.\d*` or `\d*\.\d+`.
    fn match_float(&self, at: usize) -> Option<usize> {
        let whole = self.digits(at);
        if self.byte(at + whole) != Some(b'.') {
            return None;
        }
        let fraction = self.digits(at + whole + 1);
        if whole == 0 && fraction == 0 {
            return None;
        }
        Some(at + whole + 1 + fraction)
    }

    fn digits(&self, at: usize) -> usize {
        self.count(at, |b| b.is_ascii_digit())
    }

    fn count(&self, at: usize, accept: impl Fn(u8) -> bool) -> usize {
        self.input
            .get(at..)
            .map_or(0, |rest| rest.iter().take_while(|&&b| accept(b)).count())
    }
}

/// PCRE `\s` without Unicode mode.
const fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(token: &Token) -> &Command {
        token.command().expect("should be a command")
    }

    #[test]
    fn single_command() {
        let tokens = tokenize(":echo").expect("should tokenize");
        assert_eq!(tokens.len(), 1);
        assert_eq!(command(&tokens[0]).name, CommandName::Echo);
        assert_eq!(command(&tokens[0]).arg, None);
    }

    #[test]
    fn names_are_lowercased() {
        let tokens = tokenize(":ECHO:Const@1").expect("should tokenize");
        assert_eq!(command(&tokens[0]).name, CommandName::Echo);
        assert_eq!(command(&tokens[1]).name, CommandName::Const);
    }

    #[test]
    fn references() {
        let tokens = tokenize(":~0:^&12:~-1").expect("should tokenize");
        assert_eq!(
            tokens[0].var(),
            Some(&VarRef {
                ref_type: RefType::Variable,
                identifier: Identifier::Index(0),
                parent: false,
            })
        );
        assert_eq!(
            tokens[1].var(),
            Some(&VarRef {
                ref_type: RefType::Function,
                identifier: Identifier::Index(12),
                parent: true,
            })
        );
        assert_eq!(tokens[2].var().map(|v| v.identifier), Some(Identifier::Argv));
    }

    #[test]
    fn text_argument_strips_quotes() {
        let tokens = tokenize(r#":const@"hello world""#).expect("should tokenize");
        let arg = tokens[0].arg().expect("should have argument");
        assert_eq!(arg.kind, ArgKind::Text);
        assert_eq!(arg.value, "hello world");
    }

    #[test]
    fn text_argument_keeps_escapes() {
        let tokens = tokenize(r#":const@"say \"hi\" \\ ok""#).expect("should tokenize");
        assert_eq!(tokens[0].arg().unwrap().value, r#"say \"hi\" \\ ok"#);
    }

    #[test]
    fn text_with_bad_escape_falls_back() {
        let tokens = tokenize(r#":const@"a\nb":echo"#).expect("should tokenize");
        let arg = tokens[0].arg().unwrap();
        assert_eq!(arg.kind, ArgKind::Unknown);
        assert_eq!(arg.value, r#""a\nb""#);
        assert_eq!(command(&tokens[1]).name, CommandName::Echo);
    }

    #[test]
    fn argument_precedence() {
        let cases = [
            (":x@word", ArgKind::BareWord, "word"),
            (":x@~7", ArgKind::IndexRef, "7"),
            (":x@1.5", ArgKind::DynamicFloat, "1.5"),
            (":x@.5", ArgKind::DynamicFloat, ".5"),
            (":x@5.", ArgKind::DynamicFloat, "5."),
            (":x@425", ArgKind::StaticInt, "425"),
            (":x@#$%", ArgKind::Unknown, "#$%"),
        ];
        for (source, kind, value) in cases {
            let tokens = tokenize(source).expect("should tokenize");
            let arg = tokens[0].arg().expect("should have argument");
            assert_eq!(arg.kind, kind, "{source}");
            assert_eq!(arg.value, value, "{source}");
        }
    }

    #[test]
    fn empty_argument_is_none() {
        let tokens = tokenize(":echo@ :const@1").expect("should tokenize");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].arg(), None);
    }

    #[test]
    fn escape_skips_whole_token() {
        let tokens = tokenize("::echo:const@1").expect("should tokenize");
        assert_eq!(tokens.len(), 1);
        assert_eq!(command(&tokens[0]).name, CommandName::Const);
    }

    #[test]
    fn unmatched_colons_are_skipped() {
        let tokens = tokenize(": :1 :: :echo").expect("should tokenize");
        assert_eq!(tokens.len(), 1);
        assert_eq!(command(&tokens[0]).name, CommandName::Echo);
    }

    #[test]
    fn line_tracking() {
        let tokens = tokenize(":echo\r\n:const@1\n\n:~0\r:null").expect("should tokenize");
        let lines: Vec<_> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 4, 5]);
    }

    #[test]
    fn line_breaks_inside_text_are_counted() {
        let tokens = tokenize(":const@\"a\nb\":echo").expect("should tokenize");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn spans_do_not_overlap() {
        let lexemes = scan("::~0:echo@\"x\" junk :const@2").expect("should scan");
        assert_eq!(lexemes.len(), 3);
        assert!(lexemes[0].token.is_none());
        assert_eq!(lexemes[0].span, 0..4);
        assert_eq!(lexemes[1].span, 4..13);
        assert_eq!(lexemes[2].span, 19..27);
    }

    #[test]
    fn empty_source() {
        assert_eq!(tokenize(""), Err(NoCodeError));
    }

    #[test]
    fn trailing_colon() {
        let tokens = tokenize(":echo:").expect("should tokenize");
        assert_eq!(tokens.len(), 1);
    }
}
