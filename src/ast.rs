use crate::token::{Token, VarRef};
use crate::value::{Reserved, TypeTag, Value};

/// One node of the syntax tree. Every node keeps the token it was built
/// from; nodes that absorb following tokens keep those as operands.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode {
    /// `:echo` with an optional format string and at least one argument.
    Echo {
        token: Token,
        format: Option<String>,
        args: Vec<Operand>,
    },
    /// `:define:<type>:<~var>` with an optional `:store:<value>`.
    Define {
        token: Token,
        declared_type: TypeTag,
        target: VarRef,
        initial_value: Option<Operand>,
    },
    /// Standalone `:const@<literal>`.
    Const { token: Token, value: Value },
    /// Standalone `:format@"..."`.
    Format { token: Token, value: String },
    /// Standalone `:store@"..."`.
    Store { token: Token, value: String },
    /// Any token without a dedicated rule.
    Passthrough(Token),
}

/// A value read by `echo` or stored by `define`.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Slot reference.
    Var(VarRef),
    /// Literal constant.
    Literal(Value),
    /// `true`, `false`, or `null`.
    Reserved(Reserved),
}

impl SyntaxNode {
    /// The token this node was built from.
    #[must_use]
    pub const fn token(&self) -> &Token {
        match self {
            Self::Echo { token, .. }
            | Self::Define { token, .. }
            | Self::Const { token, .. }
            | Self::Format { token, .. }
            | Self::Store { token, .. }
            | Self::Passthrough(token) => token,
        }
    }

    /// Source line of the originating token.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.token().line
    }
}
