//! Runtime values, type tags, and the reserved constants.

use std::fmt;

use crate::token::{ArgKind, Argument};

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    StaticInt(i64),
    DynamicFloat(f64),
    Text(String),
    Null,
}

/// Type tag of a slot or value. Only the first four are carried by
/// values; the rest can be declared but never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    StaticInt,
    DynamicFloat,
    Text,
    Null,
    Function,
    List,
    Dict,
    Object,
}

/// Constants every generated program defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reserved {
    True,
    False,
    Null,
    Default,
}

impl Reserved {
    pub const ALL: [Self; 4] = [Self::True, Self::False, Self::Null, Self::Default];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::Default => "default",
        }
    }

    #[must_use]
    pub const fn value(self) -> Value {
        match self {
            Self::True => Value::StaticInt(1),
            Self::False | Self::Default => Value::StaticInt(0),
            Self::Null => Value::Null,
        }
    }
}

/// Classifies a type error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeErrorKind {
    /// Argument kind has no runtime value.
    NotAValue(ArgKind),
    /// Integer literal does not fit in 64 bits.
    IntegerOverflow(String),
    /// Float literal could not be parsed.
    InvalidFloat(String),
}

impl fmt::Display for TypeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAValue(kind) => {
                write!(f, "argument of type {kind} cannot be used as a value")
            }
            Self::IntegerOverflow(literal) => {
                write!(f, "integer literal {literal} is out of range")
            }
            Self::InvalidFloat(literal) => {
                write!(f, "invalid float literal {literal}")
            }
        }
    }
}

/// Argument or value type mismatch found while building the tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line}")]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub line: usize,
}

impl Value {
    /// Build a literal from a command argument found on `line`.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` for argument kinds without a value and for
    /// numbers that cannot be represented.
    pub fn from_argument(arg: &Argument, line: usize) -> Result<Self, TypeError> {
        let error = |kind| TypeError { kind, line };
        match arg.kind {
            ArgKind::Text => Ok(Self::Text(unescape(&arg.value))),
            ArgKind::StaticInt => arg
                .value
                .parse()
                .map(Self::StaticInt)
                .map_err(|_| error(TypeErrorKind::IntegerOverflow(arg.value.clone()))),
            ArgKind::DynamicFloat => arg
                .value
                .parse()
                .map(Self::DynamicFloat)
                .map_err(|_| error(TypeErrorKind::InvalidFloat(arg.value.clone()))),
            kind @ (ArgKind::BareWord | ArgKind::IndexRef | ArgKind::Unknown) => {
                Err(error(TypeErrorKind::NotAValue(kind)))
            }
        }
    }

    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        match self {
            Self::StaticInt(_) => TypeTag::StaticInt,
            Self::DynamicFloat(_) => TypeTag::DynamicFloat,
            Self::Text(_) => TypeTag::Text,
            Self::Null => TypeTag::Null,
        }
    }

    /// Integer view used by `%d`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_int(&self) -> i64 {
        match self {
            Self::StaticInt(n) => *n,
            Self::DynamicFloat(x) => x.trunc() as i64,
            Self::Text(s) => s.trim().parse().unwrap_or(0),
            Self::Null => 0,
        }
    }

    /// Float view used by `%f`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> f64 {
        match self {
            Self::StaticInt(n) => *n as f64,
            Self::DynamicFloat(x) => *x,
            Self::Text(s) => s.trim().parse().unwrap_or(0.0),
            Self::Null => 0.0,
        }
    }
}

/// Resolve the `\\` and `\"` escapes of a text payload.
pub(crate) fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Inverse of [`unescape`].
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Literal rendering used by the target listing.
pub(crate) fn quote(text: &str) -> String {
    format!("\"{}\"", escape(text))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticInt(n) => write!(f, "{n}"),
            Self::DynamicFloat(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Null => Ok(()),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StaticInt => "static",
            Self::DynamicFloat => "dynamic",
            Self::Text => "text",
            Self::Null => "null",
            Self::Function => "fn",
            Self::List => "list",
            Self::Dict => "dict",
            Self::Object => "obj",
        })
    }
}
