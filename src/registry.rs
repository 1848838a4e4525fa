//! Named backends and the compilation session that memoizes them.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::{Error, tokenize_nonempty};
use crate::ast::SyntaxNode;
use crate::codegen::{GeneratorConfig, Mode, TargetProgram, generate};
use crate::formatter::format_tokens;
use crate::parser::build;
use crate::runtime::DEFAULT_MAX_SCOPE_DEPTH;
use crate::token::Token;

/// A backend selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// Target program with runtime checks.
    Checked,
    /// Target program with direct slot access.
    Unchecked,
    /// Corky source re-serialized from the tokens.
    Source,
}

impl Language {
    pub const ALL: [Self; 3] = [Self::Checked, Self::Unchecked, Self::Source];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Checked => "checked",
            Self::Unchecked => "unchecked",
            Self::Source => "source",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name that matches no backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown language '{0}'")]
pub struct UnknownLanguageError(pub String);

impl FromStr for Language {
    type Err = UnknownLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|language| language.name() == name)
            .ok_or_else(|| UnknownLanguageError(s.to_string()))
    }
}

/// Pipeline produced nothing to work with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid state: {0}")]
pub struct InvalidStateError(pub &'static str);

/// What a backend produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Target(TargetProgram),
    Source(String),
}

impl Output {
    /// The target program, for the checked and unchecked backends.
    #[must_use]
    pub const fn target(&self) -> Option<&TargetProgram> {
        match self {
            Self::Target(program) => Some(program),
            Self::Source(_) => None,
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target(program) => write!(f, "{program}"),
            Self::Source(source) => f.write_str(source),
        }
    }
}

/// One source text taken through the front end once, with every backend
/// compiled on first request and reused after.
#[derive(Debug, Clone)]
pub struct Program {
    source: String,
    tokens: Vec<Token>,
    tree: Vec<SyntaxNode>,
    max_scope_depth: usize,
    compiled: HashMap<Language, Output>,
}

impl Program {
    /// Tokenize and build `source`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCode` for empty source, `Error::InvalidState` if
    /// no token was found, and the tree builder's error otherwise.
    pub fn new(source: &str) -> Result<Self, Error> {
        let tokens = tokenize_nonempty(source)?;
        let tree = build(&tokens)?;

        Ok(Self {
            source: source.to_string(),
            tokens,
            tree,
            max_scope_depth: DEFAULT_MAX_SCOPE_DEPTH,
            compiled: HashMap::new(),
        })
    }

    /// Scope guard for the target backends. Drops compiled outputs.
    #[must_use]
    pub fn with_max_scope_depth(mut self, max_scope_depth: usize) -> Self {
        self.max_scope_depth = max_scope_depth;
        self.compiled.clear();
        self
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn tree(&self) -> &[SyntaxNode] {
        &self.tree
    }

    /// Compile with the backend registered as `name` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownLanguage` for an unregistered name.
    pub fn compile(&mut self, name: &str) -> Result<&Output, Error> {
        let language: Language = name.parse()?;
        Ok(self.compile_language(language))
    }

    /// Compile with `language`, reusing an earlier result.
    pub fn compile_language(&mut self, language: Language) -> &Output {
        let max_scope_depth = self.max_scope_depth;
        self.compiled.entry(language).or_insert_with(|| {
            log::debug!("compiling with the {language} backend");
            match language {
                Language::Checked | Language::Unchecked => {
                    let mode = if language == Language::Checked {
                        Mode::Checked
                    } else {
                        Mode::Unchecked
                    };
                    let config = GeneratorConfig::default()
                        .with_mode(mode)
                        .with_max_scope_depth(max_scope_depth);
                    Output::Target(generate(&self.tree, &config))
                }
                Language::Source => Output::Source(format_tokens(&self.tokens)),
            }
        })
    }

    /// Backends compiled so far.
    #[must_use]
    pub fn compiled(&self) -> usize {
        self.compiled.len()
    }
}
