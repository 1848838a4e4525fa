//! Corky tokenizer, tree builder, code generator and runtime.
//!
//! Corky programs are flat sequences of colon-led tokens: references
//! such as `:~0` and commands such as `:echo` or `:const@"hi"`. This crate
//! tokenizes source text, validates it into a syntax tree, lowers the tree
//! into a target program over a scoped, type-tagged variable store, and
//! runs that program.
//!
//! # Quick start
//!
//! ## Compile and run a program
//!
//! ```
//! use corky_rs::{GeneratorConfig, compile_str};
//!
//! let source = ":define:text:~0:store:const@\"world\"\n:echo@\"hello %s\":~0";
//! let program = compile_str(source, &GeneratorConfig::default()).unwrap();
//! let args: [&str; 0] = [];
//! assert_eq!(program.run(&args).unwrap(), "hello world");
//! ```
//!
//! ## Inspect the pipeline
//!
//! ```
//! use corky_rs::{SyntaxNode, build, format_tokens, tokenize};
//!
//! let tokens = tokenize(":echo   :const@\"hi\"").unwrap();
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(format_tokens(&tokens), ":echo:const@\"hi\"\n");
//!
//! let tree = build(&tokens).unwrap();
//! assert!(matches!(tree[0], SyntaxNode::Echo { .. }));
//! ```
//!
//! ## Pick a backend by name
//!
//! ```
//! use corky_rs::Program;
//!
//! let mut program = Program::new(":echo:const@1:const@1").unwrap();
//! let listing = program.compile("unchecked").unwrap().to_string();
//! assert_eq!(listing.matches(".const").count(), 1);
//! ```

#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod builder;
pub mod classify;
pub mod codegen;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod runtime;
pub mod token;
pub mod value;
pub mod vm;

pub use ast::{Operand, SyntaxNode};
pub use builder::Script;
pub use classify::{Classifier, Group, group_of};
pub use codegen::{
    GeneratorConfig, Load, Mode, Preamble, Statement, StatementKind, TargetProgram, generate,
};
pub use formatter::format_tokens;
pub use lexer::{Lexeme, NoCodeError, scan, tokenize};
pub use parser::{BuildError, SyntaxError, SyntaxErrorKind, build};
pub use registry::{InvalidStateError, Language, Output, Program, UnknownLanguageError};
pub use runtime::{DEFAULT_MAX_SCOPE_DEPTH, RuntimeError, RuntimeErrorKind, RuntimeStore, Slot};
pub use token::{
    ArgKind, Argument, Command, CommandName, Identifier, RefType, Token, TokenKind, VarRef,
};
pub use value::{Reserved, TypeError, TypeErrorKind, TypeTag, Value};

/// Unified error type covering every stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Empty source text.
    #[error("{0}")]
    NoCode(#[from] NoCodeError),
    /// Source produced no tokens.
    #[error("{0}")]
    InvalidState(#[from] InvalidStateError),
    /// A tree builder rule failed.
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
    /// A literal could not become a value.
    #[error("{0}")]
    Type(#[from] TypeError),
    /// Execution failed.
    #[error("{0}")]
    Runtime(#[from] RuntimeError),
    /// No backend with that name.
    #[error("{0}")]
    UnknownLanguage(#[from] UnknownLanguageError),
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Syntax(err) => Self::Syntax(err),
            BuildError::Type(err) => Self::Type(err),
        }
    }
}

/// Tokenize and build a source string in one step.
///
/// Non-empty source without a single token is `Error::InvalidState`.
pub fn build_str(source: &str) -> Result<Vec<SyntaxNode>, Error> {
    let tokens = tokenize_nonempty(source)?;
    Ok(build(&tokens)?)
}

/// Tokenize, treating a token-free source as a pipeline fault.
pub(crate) fn tokenize_nonempty(source: &str) -> Result<Vec<Token>, Error> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(InvalidStateError("tokenizer returned no tokens").into());
    }
    Ok(tokens)
}

/// Tokenize, build and lower a source string in one step.
pub fn compile_str(source: &str, config: &GeneratorConfig) -> Result<TargetProgram, Error> {
    let tree = build_str(source)?;
    Ok(generate(&tree, config))
}
