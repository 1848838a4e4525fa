use crate::formatter::format_tokens;
use crate::token::{ArgKind, Argument, Command, CommandName, Identifier, RefType, Token, TokenKind, VarRef};
use crate::value::escape;

impl Token {
    /// A command token on line 1.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            kind: TokenKind::Command(Command {
                name: CommandName::from_name(&name.to_ascii_lowercase()),
                arg: None,
            }),
            line: 1,
        }
    }

    /// A `~<index>` variable reference on line 1.
    #[must_use]
    pub const fn variable(index: usize) -> Self {
        Self::reference(RefType::Variable, Identifier::Index(index))
    }

    /// A `&<index>` function reference on line 1.
    #[must_use]
    pub const fn function(index: usize) -> Self {
        Self::reference(RefType::Function, Identifier::Index(index))
    }

    /// The `~-1` argument-count reference.
    #[must_use]
    pub const fn argv() -> Self {
        Self::reference(RefType::Variable, Identifier::Argv)
    }

    const fn reference(ref_type: RefType, identifier: Identifier) -> Self {
        Self {
            kind: TokenKind::Var(VarRef {
                ref_type,
                identifier,
                parent: false,
            }),
            line: 1,
        }
    }

    /// Mark a reference as resolving in the enclosing scope. No effect on
    /// commands.
    #[must_use]
    pub const fn parent(mut self) -> Self {
        if let TokenKind::Var(var) = &mut self.kind {
            var.parent = true;
        }
        self
    }

    #[must_use]
    pub const fn on_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Set the argument of a command. No effect on references.
    #[must_use]
    pub fn with_arg(mut self, kind: ArgKind, value: &str) -> Self {
        if let TokenKind::Command(command) = &mut self.kind {
            command.arg = Some(Argument {
                kind,
                value: value.to_string(),
            });
        }
        self
    }

    /// Text argument; quotes and backslashes are escaped.
    #[must_use]
    pub fn with_text(self, text: &str) -> Self {
        self.with_arg(ArgKind::Text, &escape(text))
    }

    #[must_use]
    pub fn with_int(self, value: u64) -> Self {
        self.with_arg(ArgKind::StaticInt, &value.to_string())
    }

    /// Float argument. Negative and non-finite values have no source form
    /// and should go through [`Token::with_arg`].
    #[must_use]
    pub fn with_float(self, value: f64) -> Self {
        let mut literal = value.to_string();
        if !literal.contains('.') {
            literal.push_str(".0");
        }
        self.with_arg(ArgKind::DynamicFloat, &literal)
    }

    /// Bare word argument.
    #[must_use]
    pub fn with_word(self, word: &str) -> Self {
        self.with_arg(ArgKind::BareWord, word)
    }
}

/// Incremental construction of a token sequence, one line at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    tokens: Vec<Token>,
    line: usize,
}

impl Script {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tokens: Vec::new(),
            line: 1,
        }
    }

    /// Append a token on the current line.
    #[must_use]
    pub fn token(mut self, token: Token) -> Self {
        self.tokens.push(token.on_line(self.line));
        self
    }

    /// Start a new line.
    #[must_use]
    pub const fn newline(mut self) -> Self {
        self.line += 1;
        self
    }

    /// `:echo` followed by `values`.
    #[must_use]
    pub fn echo(self, values: impl IntoIterator<Item = Token>) -> Self {
        values
            .into_iter()
            .fold(self.token(Token::named("echo")), Self::token)
    }

    /// `:echo@"<format>"` followed by `values`.
    #[must_use]
    pub fn echo_format(self, format: &str, values: impl IntoIterator<Item = Token>) -> Self {
        values.into_iter().fold(
            self.token(Token::named("echo").with_text(format)),
            Self::token,
        )
    }

    /// `:define:<kind>:~<index>`.
    #[must_use]
    pub fn define(self, kind: &str, index: usize) -> Self {
        self.token(Token::named("define"))
            .token(Token::named(kind))
            .token(Token::variable(index))
    }

    /// `:define:<kind>:~<index>:store:<value>`.
    #[must_use]
    pub fn define_with(self, kind: &str, index: usize, value: Token) -> Self {
        self.define(kind, index)
            .token(Token::named("store"))
            .token(value)
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Source text for the tokens built so far.
    #[must_use]
    pub fn to_source(&self) -> String {
        format_tokens(&self.tokens)
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}
