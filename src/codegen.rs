//! Lowering of the syntax tree into a target program.
//!
//! The generator walks the tree once and emits statements against the
//! [`RuntimeStore`](crate::runtime::RuntimeStore) contract. Every literal
//! goes through a per-generation constant pool, so statements refer to
//! constants by index only.

use std::collections::HashMap;
use std::fmt;

use crate::ast::{Operand, SyntaxNode};
use crate::runtime::DEFAULT_MAX_SCOPE_DEPTH;
use crate::token::{Identifier, VarRef};
use crate::value::{self, Reserved, TypeTag, Value};

/// Name the preamble reports as the compiling system.
pub const COMPILER: &str = "corky-rs";

/// Lowering strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Every slot access goes through the runtime checks.
    #[default]
    Checked,
    /// Slot accesses index the tables directly.
    Unchecked,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Checked => "checked",
            Self::Unchecked => "unchecked",
        })
    }
}

/// Code generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub mode: Mode,
    /// Guard written into the preamble and enforced by the store.
    pub max_scope_depth: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Checked,
            max_scope_depth: DEFAULT_MAX_SCOPE_DEPTH,
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn with_max_scope_depth(mut self, max_scope_depth: usize) -> Self {
        self.max_scope_depth = max_scope_depth;
        self
    }
}

/// Fixed store initializer every program starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub mode: Mode,
    pub max_scope_depth: usize,
    pub compiler: &'static str,
    pub version: &'static str,
}

/// A generated program: preamble, constant pool and statements.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetProgram {
    pub preamble: Preamble,
    /// Distinct literals, referenced by index from [`Load::Constant`]
    /// and echo formats.
    pub constants: Vec<Value>,
    pub statements: Vec<Statement>,
}

/// One lowered statement with the source line of its node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub line: usize,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// Checked declaration: `create_slot`.
    CreateSlot { index: Identifier, tag: TypeTag },
    /// Checked store: `set_slot`.
    SetSlot { index: Identifier, value: Load },
    /// Unchecked declaration with an optional initial value.
    WriteSlot {
        index: Identifier,
        tag: TypeTag,
        value: Option<Load>,
    },
    /// Print `args`, through the pooled format string if any.
    Echo {
        format: Option<usize>,
        args: Vec<Load>,
    },
}

/// Where an operand value comes from at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Load {
    Constant(usize),
    Reserved(Reserved),
    /// Checked `get_slot`.
    Slot(VarRef),
    /// Direct table read.
    SlotUnchecked(VarRef),
}

/// Lower a syntax tree. A successful tree build is the only precondition;
/// tokens are not re-validated here.
#[must_use]
pub fn generate(tree: &[SyntaxNode], config: &GeneratorConfig) -> TargetProgram {
    let mut generator = CodeGenerator::new(config.mode);
    for node in tree {
        generator.node(node);
    }

    log::debug!(
        "generated {} statements, {} constants ({} mode)",
        generator.statements.len(),
        generator.pool.values.len(),
        config.mode
    );

    TargetProgram {
        preamble: Preamble {
            mode: config.mode,
            max_scope_depth: config.max_scope_depth,
            compiler: COMPILER,
            version: env!("CARGO_PKG_VERSION"),
        },
        constants: generator.pool.values,
        statements: generator.statements,
    }
}

/// Dedup key: floats compare by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstKey {
    Int(i64),
    Float(u64),
    Text(String),
    Null,
}

impl From<&Value> for ConstKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::StaticInt(n) => Self::Int(*n),
            Value::DynamicFloat(x) => Self::Float(x.to_bits()),
            Value::Text(s) => Self::Text(s.clone()),
            Value::Null => Self::Null,
        }
    }
}

#[derive(Debug, Default)]
struct ConstantPool {
    values: Vec<Value>,
    index: HashMap<ConstKey, usize>,
}

impl ConstantPool {
    fn intern(&mut self, value: &Value) -> usize {
        let key = ConstKey::from(value);
        if let Some(&index) = self.index.get(&key) {
            return index;
        }
        let index = self.values.len();
        self.values.push(value.clone());
        self.index.insert(key, index);
        index
    }
}

struct CodeGenerator {
    mode: Mode,
    pool: ConstantPool,
    statements: Vec<Statement>,
}

impl CodeGenerator {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            pool: ConstantPool::default(),
            statements: Vec::new(),
        }
    }

    fn node(&mut self, node: &SyntaxNode) {
        let line = node.line();
        match node {
            SyntaxNode::Echo { format, args, .. } => {
                let format = format
                    .as_ref()
                    .map(|format| self.pool.intern(&Value::Text(format.clone())));
                let args = args.iter().map(|arg| self.load(arg)).collect();
                self.emit(line, StatementKind::Echo { format, args });
            }
            SyntaxNode::Define {
                declared_type,
                target,
                initial_value,
                ..
            } => self.define(line, *declared_type, target, initial_value.as_ref()),
            SyntaxNode::Const { value, .. } => {
                self.pool.intern(value);
            }
            SyntaxNode::Format { .. } | SyntaxNode::Store { .. } | SyntaxNode::Passthrough(_) => {}
        }
    }

    fn define(&mut self, line: usize, tag: TypeTag, target: &VarRef, initial: Option<&Operand>) {
        let index = target.identifier;
        let value = initial.map(|operand| self.load(operand));
        match self.mode {
            Mode::Checked => {
                self.emit(line, StatementKind::CreateSlot { index, tag });
                if let Some(value) = value {
                    self.emit(line, StatementKind::SetSlot { index, value });
                }
            }
            Mode::Unchecked => self.emit(line, StatementKind::WriteSlot { index, tag, value }),
        }
    }

    fn load(&mut self, operand: &Operand) -> Load {
        match (operand, self.mode) {
            (Operand::Var(var), Mode::Checked) => Load::Slot(*var),
            (Operand::Var(var), Mode::Unchecked) => Load::SlotUnchecked(*var),
            (Operand::Literal(value), _) => Load::Constant(self.pool.intern(value)),
            (Operand::Reserved(reserved), _) => Load::Reserved(*reserved),
        }
    }

    fn emit(&mut self, line: usize, kind: StatementKind) {
        log::trace!("line {line}: {kind}");
        self.statements.push(Statement { line, kind });
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::StaticInt(n) => format!("static {n}"),
        Value::DynamicFloat(x) => format!("dynamic {x:?}"),
        Value::Text(s) => format!("text {}", value::quote(s)),
        Value::Null => "null".to_string(),
    }
}

impl fmt::Display for Load {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(index) => write!(f, "#{index}"),
            Self::Reserved(reserved) => write!(f, "${}", reserved.name()),
            Self::Slot(var) => write!(f, "get({var})"),
            Self::SlotUnchecked(var) => write!(f, "[{var}]"),
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateSlot { index, tag } => write!(f, "create ~{index} {tag}"),
            Self::SetSlot { index, value } => write!(f, "set ~{index} {value}"),
            Self::WriteSlot { index, tag, value } => {
                write!(f, "write ~{index} {tag}")?;
                if let Some(value) = value {
                    write!(f, " {value}")?;
                }
                Ok(())
            }
            Self::Echo { format, args } => {
                f.write_str("echo")?;
                if let Some(format) = format {
                    write!(f, " fmt #{format}")?;
                }
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for TargetProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preamble = &self.preamble;
        writeln!(f, ".compiler {} {}", preamble.compiler, preamble.version)?;
        writeln!(f, ".mode {}", preamble.mode)?;
        writeln!(f, ".scope depth 0 max {}", preamble.max_scope_depth)?;
        for reserved in Reserved::ALL {
            writeln!(f, ".reserved {} {}", reserved.name(), literal(&reserved.value()))?;
        }
        for (index, value) in self.constants.iter().enumerate() {
            writeln!(f, ".const #{index} {}", literal(value))?;
        }
        for statement in &self.statements {
            writeln!(f, "{:>4}  {}", statement.line, statement.kind)?;
        }
        Ok(())
    }
}
