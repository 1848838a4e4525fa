use std::fmt;

/// A single token with its kind and the line of its leading colon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Variable or function reference (`~0`, `^&1`, `~-1`).
    Var(VarRef),
    /// Named command with an optional argument (`echo`, `const@"hi"`).
    Command(Command),
}

/// Reference to a variable or function slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub ref_type: RefType,
    pub identifier: Identifier,
    /// `^` marker: resolve in the enclosing scope.
    pub parent: bool,
}

/// Reference sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefType {
    /// `~`
    Variable,
    /// `&`
    Function,
}

/// Slot identifier of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Non-negative slot index.
    Index(usize),
    /// The reserved `-1` slot holding the program arguments.
    Argv,
}

/// Command token: a lowercase name and its optional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: CommandName,
    pub arg: Option<Argument>,
}

/// Typed command argument. `value` is the source payload with quotes
/// stripped from text; escapes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub kind: ArgKind,
    pub value: String,
}

/// Argument typing, in lexer precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Double-quoted text.
    Text,
    /// Bare word (`@name`).
    BareWord,
    /// Index reference (`@~3`).
    IndexRef,
    /// Decimal float.
    DynamicFloat,
    /// Integer.
    StaticInt,
    /// Anything else up to the next colon or whitespace.
    Unknown,
}

macro_rules! command_names {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Command names known to the language. Any other name lexes as
        /// [`CommandName::Other`].
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum CommandName {
            $($variant,)*
            Other(String),
        }

        impl CommandName {
            /// Resolve a lowercase name.
            #[must_use]
            pub fn from_name(name: &str) -> Self {
                match name {
                    $($name => Self::$variant,)*
                    other => Self::Other(other.to_string()),
                }
            }

            /// The lowercase source name.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $name,)*
                    Self::Other(name) => name,
                }
            }
        }
    };
}

command_names! {
    Define => "define",
    Func => "func",
    Fn => "fn",
    Static => "static",
    Dynamic => "dynamic",
    Text => "text",
    List => "list",
    Dict => "dict",
    Obj => "obj",
    Const => "const",
    True => "true",
    False => "false",
    Null => "null",
    Echo => "echo",
    Scope => "scope",
    End => "end",
    Case => "case",
    Cycle => "cycle",
    Repeat => "repeat",
    Format => "format",
    Store => "store",
    To => "to",
    From => "from",
    Through => "through",
    Into => "into",
}

impl Token {
    /// Kind name used for classification and diagnostics: `var` for
    /// references, the command name otherwise.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        match &self.kind {
            TokenKind::Var(_) => "var",
            TokenKind::Command(cmd) => cmd.name.as_str(),
        }
    }

    /// The reference, if this is a `var` token.
    #[must_use]
    pub const fn var(&self) -> Option<&VarRef> {
        match &self.kind {
            TokenKind::Var(var) => Some(var),
            TokenKind::Command(_) => None,
        }
    }

    /// The command, if this is a command token.
    #[must_use]
    pub const fn command(&self) -> Option<&Command> {
        match &self.kind {
            TokenKind::Command(cmd) => Some(cmd),
            TokenKind::Var(_) => None,
        }
    }

    /// The command argument, if any.
    #[must_use]
    pub fn arg(&self) -> Option<&Argument> {
        self.command().and_then(|cmd| cmd.arg.as_ref())
    }

    /// Whether this is a command with the given name.
    #[must_use]
    pub fn is(&self, name: &CommandName) -> bool {
        self.command().is_some_and(|cmd| &cmd.name == name)
    }
}

impl RefType {
    /// Source sigil.
    #[must_use]
    pub const fn sigil(self) -> char {
        match self {
            Self::Variable => '~',
            Self::Function => '&',
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Argv => f.write_str("-1"),
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::BareWord => "bare word",
            Self::IndexRef => "index",
            Self::DynamicFloat => "dynamic",
            Self::StaticInt => "static",
            Self::Unknown => "unknown",
        })
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
