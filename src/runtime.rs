//! Execution-time variable store used by generated programs.
//!
//! The store holds one variable table and one function table per scope
//! depth, the program arguments below depth 0, and the depth counter.
//! Checked operations enforce contiguous slot allocation and type
//! compatibility; unchecked ones index directly and never fail.

use std::collections::BTreeMap;
use std::fmt;

use crate::token::{Identifier, RefType, VarRef};
use crate::value::{TypeTag, Value};

/// Default bound on nested scopes.
pub const DEFAULT_MAX_SCOPE_DEPTH: usize = 10;

/// One binding: a declared type and its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub tag: TypeTag,
    pub value: Value,
}

/// Classifies a runtime error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// Stored value does not match the slot's type.
    TypeMismatch { expected: TypeTag, found: TypeTag },
    /// Slot does not exist. `depth` is `None` for the argument table.
    UndefinedVar {
        var: String,
        depth: Option<usize>,
    },
    /// `~-1` holds the argument count and cannot be declared or assigned.
    ReadOnlyArgv,
    /// `enter_scope` past the max-depth guard.
    ScopeDepthExceeded { max: usize },
    /// `leave_scope` at depth 0.
    ScopeUnderflow,
    /// Format string has more placeholders than arguments.
    MissingFormatArgument { position: usize },
    /// Writing program output failed.
    Output,
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch, expected {expected}, got {found}")
            }
            Self::UndefinedVar {
                var,
                depth: Some(depth),
            } => write!(f, "undefined var {var} on scope {depth}"),
            Self::UndefinedVar { var, depth: None } => {
                write!(f, "undefined program argument {var}")
            }
            Self::ReadOnlyArgv => write!(f, "~-1 is read-only"),
            Self::ScopeDepthExceeded { max } => {
                write!(f, "maximum scope depth of {max} exceeded")
            }
            Self::ScopeUnderflow => write!(f, "no scope to leave"),
            Self::MissingFormatArgument { position } => {
                write!(f, "missing argument {position} for format string")
            }
            Self::Output => write!(f, "failed to write output"),
        }
    }
}

/// Error raised while executing a generated program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}{}", at_line(*line))]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    /// Source line of the failing statement, when known.
    pub line: Option<usize>,
}

fn at_line(line: Option<usize>) -> String {
    line.map_or_else(String::new, |line| format!(" at line {line}"))
}

impl RuntimeError {
    #[must_use]
    pub const fn new(kind: RuntimeErrorKind) -> Self {
        Self { kind, line: None }
    }

    /// Attach a source line unless one is already set.
    #[must_use]
    pub fn at(mut self, line: usize) -> Self {
        self.line.get_or_insert(line);
        self
    }
}

impl From<fmt::Error> for RuntimeError {
    fn from(_: fmt::Error) -> Self {
        Self::new(RuntimeErrorKind::Output)
    }
}

#[derive(Debug, Clone, Default)]
struct Scope {
    vars: BTreeMap<usize, Slot>,
    fns: BTreeMap<usize, Slot>,
}

impl Scope {
    const fn table(&self, ref_type: RefType) -> &BTreeMap<usize, Slot> {
        match ref_type {
            RefType::Variable => &self.vars,
            RefType::Function => &self.fns,
        }
    }
}

/// Per-execution store. Create one per running program.
#[derive(Debug, Clone)]
pub struct RuntimeStore {
    scopes: Vec<Scope>,
    args: Vec<Slot>,
    depth: usize,
    max_depth: usize,
}

impl RuntimeStore {
    /// Fresh store at depth 0 with empty tables and the given program
    /// arguments.
    #[must_use]
    pub fn new<S: AsRef<str>>(max_depth: usize, args: &[S]) -> Self {
        Self {
            scopes: vec![Scope::default()],
            args: args
                .iter()
                .map(|arg| Slot {
                    tag: TypeTag::Text,
                    value: Value::Text(arg.as_ref().to_string()),
                })
                .collect(),
            depth: 0,
            max_depth,
        }
    }

    /// Current scope depth.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Open a nested scope with empty tables.
    ///
    /// # Errors
    ///
    /// Returns `ScopeDepthExceeded` past the max-depth guard.
    pub fn enter_scope(&mut self) -> Result<(), RuntimeError> {
        if self.depth >= self.max_depth {
            return Err(RuntimeError::new(RuntimeErrorKind::ScopeDepthExceeded {
                max: self.max_depth,
            }));
        }
        self.depth += 1;
        self.scopes.push(Scope::default());
        log::trace!("entered scope {}", self.depth);
        Ok(())
    }

    /// Drop the innermost scope and its slots.
    ///
    /// # Errors
    ///
    /// Returns `ScopeUnderflow` at depth 0.
    pub fn leave_scope(&mut self) -> Result<(), RuntimeError> {
        if self.depth == 0 {
            return Err(RuntimeError::new(RuntimeErrorKind::ScopeUnderflow));
        }
        self.scopes.pop();
        self.depth -= 1;
        log::trace!("left scope {}", self.depth + 1);
        Ok(())
    }

    /// Declare variable slot `index` in the current scope with `tag` and
    /// a null value. Slots fill in order: `index` may only follow an
    /// existing slot `index - 1`. Redeclaring resets the slot.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVar` naming the missing predecessor and
    /// `ReadOnlyArgv` for `~-1`.
    pub fn create_slot(&mut self, index: Identifier, tag: TypeTag) -> Result<(), RuntimeError> {
        let depth = self.depth;
        let Identifier::Index(index) = index else {
            return Err(RuntimeError::new(RuntimeErrorKind::ReadOnlyArgv));
        };
        let vars = &mut self.scopes[depth].vars;
        if index > 0 && !vars.contains_key(&(index - 1)) {
            return Err(undefined(format!("~{}", index - 1), Some(depth)));
        }

        vars.insert(
            index,
            Slot {
                tag,
                value: Value::Null,
            },
        );
        log::trace!("create_slot ~{index} {tag} on scope {depth}");
        Ok(())
    }

    /// Store `value` in existing variable slot `index` of the current
    /// scope. A null value keeps the declared tag.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVar` for a missing slot, `ReadOnlyArgv` for `~-1`
    /// and `TypeMismatch` when a non-null value differs from the slot's tag.
    pub fn set_slot(&mut self, index: Identifier, value: Value) -> Result<(), RuntimeError> {
        let depth = self.depth;
        let Identifier::Index(index) = index else {
            return Err(RuntimeError::new(RuntimeErrorKind::ReadOnlyArgv));
        };
        let slot = self.scopes[depth]
            .vars
            .get_mut(&index)
            .ok_or_else(|| undefined(format!("~{index}"), Some(depth)))?;

        let found = value.type_tag();
        if found != TypeTag::Null && found != slot.tag {
            return Err(RuntimeError::new(RuntimeErrorKind::TypeMismatch {
                expected: slot.tag,
                found,
            }));
        }
        log::trace!("set_slot ~{index} = {value:?} on scope {depth}");
        slot.value = value;
        Ok(())
    }

    /// Read the slot `var` refers to. A parent reference reads one scope
    /// up; above depth 0 that is the program argument table.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVar` if the slot does not exist.
    pub fn get_slot(&self, var: &VarRef) -> Result<Slot, RuntimeError> {
        let name = format!("{}{}", var.ref_type.sigil(), var.identifier);
        let index = match var.identifier {
            Identifier::Index(index) => index,
            Identifier::Argv => return Ok(self.argument_count()),
        };

        match self.resolve_depth(var.parent) {
            Some(depth) => self.scopes[depth]
                .table(var.ref_type)
                .get(&index)
                .cloned()
                .ok_or_else(|| undefined(name, Some(depth))),
            None => self
                .args
                .get(index)
                .cloned()
                .ok_or_else(|| undefined(name, None)),
        }
    }

    /// Overwrite variable slot `index` without any check. Writes to `-1`
    /// are ignored.
    pub fn write_slot_unchecked(&mut self, index: Identifier, tag: TypeTag, value: Value) {
        let Identifier::Index(index) = index else {
            return;
        };
        self.scopes[self.depth]
            .vars
            .insert(index, Slot { tag, value });
    }

    /// Read the value `var` refers to without any check. Missing slots
    /// read as null.
    #[must_use]
    pub fn read_slot_unchecked(&self, var: &VarRef) -> Value {
        self.get_slot(var).map_or(Value::Null, |slot| slot.value)
    }

    /// `None` means the argument table.
    const fn resolve_depth(&self, parent: bool) -> Option<usize> {
        if parent {
            self.depth.checked_sub(1)
        } else {
            Some(self.depth)
        }
    }

    fn argument_count(&self) -> Slot {
        Slot {
            tag: TypeTag::StaticInt,
            value: Value::StaticInt(i64::try_from(self.args.len()).unwrap_or(i64::MAX)),
        }
    }
}

const fn undefined(var: String, depth: Option<usize>) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::UndefinedVar { var, depth })
}
