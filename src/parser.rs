use std::fmt;

use crate::ast::{Operand, SyntaxNode};
use crate::classify::{Classifier, Group};
use crate::token::{ArgKind, CommandName, RefType, Token, TokenKind};
use crate::value::{self, Reserved, TypeError, TypeTag, Value};

/// Classifies a syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    MustBeLast,
    CannotBeLast,
    MustBeFirst,
    CannotBeFirst,
    /// Previous token is not the expected one.
    ExpectedAfter(String),
    /// Next token is not the expected one.
    ExpectedBefore(String),
    ArgumentRequired,
    UnexpectedArgument {
        expected: Vec<ArgKind>,
        found: ArgKind,
    },
    UnexpectedGroup {
        expected: Vec<Group>,
        found: Group,
    },
    UnexpectedKind {
        expected: String,
        found: String,
    },
    /// `echo` consumed no arguments.
    MissingArguments,
    /// Value-group token with nothing to evaluate.
    NotAValue,
    /// `define` target is a function reference.
    FunctionTarget,
    /// A rule looked past the last token.
    UnexpectedEnd,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MustBeLast => write!(f, "must be the last token"),
            Self::CannotBeLast => write!(f, "can't be the last token"),
            Self::MustBeFirst => write!(f, "must be the first token"),
            Self::CannotBeFirst => write!(f, "can't be the first token"),
            Self::ExpectedAfter(what) => write!(f, "must be after {what}"),
            Self::ExpectedBefore(what) => write!(f, "must be before {what}"),
            Self::ArgumentRequired => write!(f, "argument required"),
            Self::UnexpectedArgument { expected, found } => {
                write!(f, "argument of type in ({}) expected, {found} given", join(expected))
            }
            Self::UnexpectedGroup { expected, found } => {
                write!(f, "expected group in ({}), {found} given", join(expected))
            }
            Self::UnexpectedKind { expected, found } => {
                write!(f, "expected :{expected}, :{found} given")
            }
            Self::MissingArguments => write!(f, "at least 1 argument is required"),
            Self::NotAValue => write!(f, "token has no value"),
            Self::FunctionTarget => write!(f, "only variables can be defined"),
            Self::UnexpectedEnd => write!(f, "unexpected end of input"),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Structural rule violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(":{token} - {kind} at line {line}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub line: usize,
    /// The offending token.
    pub token: Token,
}

/// Error produced while building the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
    #[error("{0}")]
    Type(#[from] TypeError),
}

/// Build a syntax tree from a token sequence.
///
/// # Errors
///
/// Returns `BuildError` on the first structural violation; no partial
/// tree is produced.
pub fn build(tokens: &[Token]) -> Result<Vec<SyntaxNode>, BuildError> {
    TreeBuilder::new(tokens).build()
}

/// One predicate of the assertion vocabulary.
#[derive(Debug, Clone, Copy)]
enum Rule<'r> {
    Last(bool),
    First(bool),
    After(Adjacent<'r>),
    Before(Adjacent<'r>),
    Arg(ArgRule<'r>),
    Group(&'r [Group]),
    Kind(&'r str),
}

/// What a neighbouring token must be.
#[derive(Debug, Clone, Copy)]
enum Adjacent<'r> {
    Kind(&'r str),
    Group(&'r [Group]),
}

#[derive(Debug, Clone, Copy)]
enum ArgRule<'r> {
    Any,
    OneOf(&'r [ArgKind]),
}

impl fmt::Display for Adjacent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => write!(f, ":{kind}"),
            Self::Group(groups) => write!(f, "a {} token", join(groups)),
        }
    }
}

const LITERAL: &[ArgKind] = &[ArgKind::Text, ArgKind::StaticInt, ArgKind::DynamicFloat];
const TEXT: &[ArgKind] = &[ArgKind::Text];
const VALUE: &[Group] = &[Group::Value];
const MODIFIER: &[Group] = &[Group::Modifier];
const DECLARATION: &[Group] = &[Group::DataType, Group::DataStructure];

struct TreeBuilder<'a> {
    tokens: &'a [Token],
    pos: usize,
    classifier: Classifier,
}

impl<'a> TreeBuilder<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            classifier: Classifier::new(),
        }
    }

    fn build(mut self) -> Result<Vec<SyntaxNode>, BuildError> {
        let mut tree = Vec::new();

        while self.pos < self.tokens.len() {
            tree.push(self.node()?);
        }

        log::debug!(
            "built {} nodes from {} tokens ({} kinds classified)",
            tree.len(),
            self.tokens.len(),
            self.classifier.cached()
        );
        Ok(tree)
    }

    fn node(&mut self) -> Result<SyntaxNode, BuildError> {
        let at = self.pos;
        let tokens = self.tokens;
        let token = &tokens[at];
        self.pos += 1;

        let TokenKind::Command(command) = &token.kind else {
            return Ok(SyntaxNode::Passthrough(token.clone()));
        };
        log::trace!("line {}: rule for :{}", token.line, command.name);

        match command.name {
            CommandName::Echo => self.echo(at),
            CommandName::Define => self.define(at),
            CommandName::Const => Ok(SyntaxNode::Const {
                token: token.clone(),
                value: self.literal(at)?,
            }),
            CommandName::Format => Ok(SyntaxNode::Format {
                token: token.clone(),
                value: self.modifier_text(at, "echo")?,
            }),
            CommandName::Store => Ok(SyntaxNode::Store {
                token: token.clone(),
                value: self.modifier_text(at, "var")?,
            }),
            _ => Ok(SyntaxNode::Passthrough(token.clone())),
        }
    }

    fn echo(&mut self, at: usize) -> Result<SyntaxNode, BuildError> {
        self.check(at, &[Rule::Last(false)])?;
        let tokens = self.tokens;
        let token = &tokens[at];

        let mut format = None;
        if self.holds(at, &[Rule::Arg(ArgRule::OneOf(TEXT))]) {
            format = token.arg().map(|arg| value::unescape(&arg.value));
            // no :format after an inline one
            self.check(self.pos, &[Rule::Group(VALUE)])?;
        } else if self.holds(self.pos, &[Rule::Kind("format"), Rule::Group(MODIFIER)]) {
            self.check(self.pos, &[Rule::Arg(ArgRule::OneOf(TEXT))])?;
            format = tokens[self.pos]
                .arg()
                .map(|arg| value::unescape(&arg.value));
            self.pos += 1;
        }

        let args = self.values()?;
        if args.is_empty() {
            return Err(self.error(at, SyntaxErrorKind::MissingArguments).into());
        }

        Ok(SyntaxNode::Echo {
            token: token.clone(),
            format,
            args,
        })
    }

    fn define(&mut self, at: usize) -> Result<SyntaxNode, BuildError> {
        self.check(at, &[Rule::Last(false)])?;

        let type_at = at + 1;
        self.check(
            type_at,
            &[
                Rule::Last(false),
                Rule::Group(DECLARATION),
                Rule::Before(Adjacent::Kind("var")),
            ],
        )?;
        let declared_type = self.tokens[type_at]
            .command()
            .and_then(|command| declared_type(&command.name))
            .ok_or_else(|| {
                self.error(
                    type_at,
                    SyntaxErrorKind::UnexpectedGroup {
                        expected: DECLARATION.to_vec(),
                        found: Group::Unknown,
                    },
                )
            })?;

        let target_at = type_at + 1;
        let target = match self.tokens[target_at].var() {
            Some(var) if var.ref_type == RefType::Variable => *var,
            _ => return Err(self.error(target_at, SyntaxErrorKind::FunctionTarget).into()),
        };
        self.pos = target_at + 1;

        // lookahead only: without a store and a value the cursor stays
        // after the target
        let store_at = self.pos;
        let initial_value = if self.holds(
            store_at,
            &[
                Rule::Kind("store"),
                Rule::Group(MODIFIER),
                Rule::Before(Adjacent::Group(VALUE)),
            ],
        ) {
            let value = self.operand(store_at + 1)?;
            self.pos = store_at + 2;
            Some(value)
        } else {
            None
        };

        Ok(SyntaxNode::Define {
            token: self.tokens[at].clone(),
            declared_type,
            target,
            initial_value,
        })
    }

    fn modifier_text(&mut self, at: usize, after: &str) -> Result<String, BuildError> {
        self.check(
            at,
            &[
                Rule::Arg(ArgRule::OneOf(TEXT)),
                Rule::After(Adjacent::Kind(after)),
            ],
        )?;
        Ok(self.tokens[at]
            .arg()
            .map(|arg| value::unescape(&arg.value))
            .unwrap_or_default())
    }

    /// Greedy run of value tokens or tokens carrying an argument.
    fn values(&mut self) -> Result<Vec<Operand>, BuildError> {
        let mut values = Vec::new();
        while self.holds(self.pos, &[Rule::Group(VALUE)])
            || self.holds(self.pos, &[Rule::Arg(ArgRule::Any)])
        {
            values.push(self.operand(self.pos)?);
            self.pos += 1;
        }
        Ok(values)
    }

    fn operand(&mut self, at: usize) -> Result<Operand, BuildError> {
        let token = self.token_at(at)?;
        let command = match &token.kind {
            TokenKind::Var(var) => return Ok(Operand::Var(*var)),
            TokenKind::Command(command) => command,
        };

        match (&command.name, &command.arg) {
            (CommandName::Const, _) => Ok(Operand::Literal(self.literal(at)?)),
            (CommandName::True, _) => Ok(Operand::Reserved(Reserved::True)),
            (CommandName::False, _) => Ok(Operand::Reserved(Reserved::False)),
            (CommandName::Null, _) => Ok(Operand::Reserved(Reserved::Null)),
            (_, Some(arg)) => Ok(Operand::Literal(Value::from_argument(arg, token.line)?)),
            (_, None) => Err(self.error(at, SyntaxErrorKind::NotAValue).into()),
        }
    }

    fn literal(&mut self, at: usize) -> Result<Value, BuildError> {
        self.check(at, &[Rule::Arg(ArgRule::OneOf(LITERAL))])?;
        let token = self.token_at(at)?;
        match token.arg() {
            Some(arg) => Ok(Value::from_argument(arg, token.line)?),
            None => Err(self.error(at, SyntaxErrorKind::ArgumentRequired).into()),
        }
    }

    fn holds(&mut self, at: usize, rules: &[Rule<'_>]) -> bool {
        at < self.tokens.len() && self.check(at, rules).is_ok()
    }

    fn check(&mut self, at: usize, rules: &[Rule<'_>]) -> Result<(), SyntaxError> {
        for rule in rules {
            self.check_rule(at, *rule)?;
        }
        Ok(())
    }

    fn check_rule(&mut self, at: usize, rule: Rule<'_>) -> Result<(), SyntaxError> {
        let tokens = self.tokens;
        let token = self.token_at(at)?;
        let len = tokens.len();

        let failure = match rule {
            Rule::Last(expected) => {
                let is_last = at + 1 >= len;
                match (expected, is_last) {
                    (true, false) => Some(SyntaxErrorKind::MustBeLast),
                    (false, true) => Some(SyntaxErrorKind::CannotBeLast),
                    _ => None,
                }
            }
            Rule::First(expected) => match (expected, at == 0) {
                (true, false) => Some(SyntaxErrorKind::MustBeFirst),
                (false, true) => Some(SyntaxErrorKind::CannotBeFirst),
                _ => None,
            },
            Rule::After(adjacent) => {
                self.check_rule(at, Rule::First(false))?;
                let prev = &tokens[at - 1];
                (!self.is(prev, adjacent))
                    .then(|| SyntaxErrorKind::ExpectedAfter(adjacent.to_string()))
            }
            Rule::Before(adjacent) => {
                self.check_rule(at, Rule::Last(false))?;
                let next = &tokens[at + 1];
                (!self.is(next, adjacent))
                    .then(|| SyntaxErrorKind::ExpectedBefore(adjacent.to_string()))
            }
            Rule::Arg(arg_rule) => match (arg_rule, token.arg()) {
                (_, None) => Some(SyntaxErrorKind::ArgumentRequired),
                (ArgRule::OneOf(kinds), Some(arg)) if !kinds.contains(&arg.kind) => {
                    Some(SyntaxErrorKind::UnexpectedArgument {
                        expected: kinds.to_vec(),
                        found: arg.kind,
                    })
                }
                _ => None,
            },
            Rule::Group(groups) => {
                let found = self.classifier.group_of(token.kind_name());
                (!groups.contains(&found)).then(|| SyntaxErrorKind::UnexpectedGroup {
                    expected: groups.to_vec(),
                    found,
                })
            }
            Rule::Kind(kind) => {
                (token.kind_name() != kind).then(|| SyntaxErrorKind::UnexpectedKind {
                    expected: kind.to_string(),
                    found: token.kind_name().to_string(),
                })
            }
        };

        failure.map_or(Ok(()), |kind| Err(self.error(at, kind)))
    }

    fn is(&mut self, token: &Token, adjacent: Adjacent<'_>) -> bool {
        match adjacent {
            Adjacent::Kind(kind) => token.kind_name() == kind,
            Adjacent::Group(groups) => groups.contains(&self.classifier.group_of(token.kind_name())),
        }
    }

    fn token_at(&self, at: usize) -> Result<&'a Token, SyntaxError> {
        let tokens = self.tokens;
        tokens
            .get(at)
            .ok_or_else(|| self.error(at, SyntaxErrorKind::UnexpectedEnd))
    }

    /// Error anchored at `at`, or at the last token past the end.
    fn error(&self, at: usize, kind: SyntaxErrorKind) -> SyntaxError {
        let token = &self.tokens[at.min(self.tokens.len() - 1)];
        SyntaxError {
            kind,
            line: token.line,
            token: token.clone(),
        }
    }
}

const fn declared_type(name: &CommandName) -> Option<TypeTag> {
    match name {
        CommandName::Func | CommandName::Fn => Some(TypeTag::Function),
        CommandName::Static => Some(TypeTag::StaticInt),
        CommandName::Dynamic => Some(TypeTag::DynamicFloat),
        CommandName::Text => Some(TypeTag::Text),
        CommandName::List => Some(TypeTag::List),
        CommandName::Dict => Some(TypeTag::Dict),
        CommandName::Obj => Some(TypeTag::Object),
        _ => None,
    }
}
