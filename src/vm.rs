//! Host executor for generated programs.

use std::fmt;

use crate::codegen::{Load, StatementKind, TargetProgram};
use crate::runtime::{RuntimeError, RuntimeErrorKind, RuntimeStore};
use crate::value::Value;

impl TargetProgram {
    /// Run the program against a fresh store, writing echo output to
    /// `out`. `args` become the program argument table.
    ///
    /// # Errors
    ///
    /// Returns the first `RuntimeError`, tagged with the line of the
    /// failing statement. Output written before the failure is kept.
    pub fn execute<S: AsRef<str>>(
        &self,
        args: &[S],
        out: &mut impl fmt::Write,
    ) -> Result<(), RuntimeError> {
        let mut store = RuntimeStore::new(self.preamble.max_scope_depth, args);
        log::debug!(
            "executing {} statements with {} arguments",
            self.statements.len(),
            args.len()
        );

        for statement in &self.statements {
            self.step(&mut store, &statement.kind, out)
                .map_err(|err| err.at(statement.line))?;
        }
        Ok(())
    }

    /// Run the program and collect its output.
    ///
    /// # Errors
    ///
    /// Returns the first `RuntimeError`; partial output is dropped.
    pub fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<String, RuntimeError> {
        let mut out = String::new();
        self.execute(args, &mut out)?;
        Ok(out)
    }

    fn step(
        &self,
        store: &mut RuntimeStore,
        kind: &StatementKind,
        out: &mut impl fmt::Write,
    ) -> Result<(), RuntimeError> {
        match kind {
            StatementKind::CreateSlot { index, tag } => store.create_slot(*index, *tag),
            StatementKind::SetSlot { index, value } => {
                let value = self.load(store, value)?;
                store.set_slot(*index, value)
            }
            StatementKind::WriteSlot { index, tag, value } => {
                let value = match value {
                    Some(value) => self.load(store, value)?,
                    None => Value::Null,
                };
                store.write_slot_unchecked(*index, *tag, value);
                Ok(())
            }
            StatementKind::Echo { format, args } => {
                let values = args
                    .iter()
                    .map(|arg| self.load(store, arg))
                    .collect::<Result<Vec<_>, _>>()?;
                match format {
                    Some(format) => {
                        let format = self.constant(*format).to_string();
                        printf(out, &format, &values)
                    }
                    None => {
                        for value in &values {
                            write!(out, "{value}")?;
                        }
                        Ok(())
                    }
                }
            }
        }
    }

    fn load(&self, store: &RuntimeStore, load: &Load) -> Result<Value, RuntimeError> {
        match load {
            Load::Constant(index) => Ok(self.constant(*index)),
            Load::Reserved(reserved) => Ok(reserved.value()),
            Load::Slot(var) => store.get_slot(var).map(|slot| slot.value),
            Load::SlotUnchecked(var) => Ok(store.read_slot_unchecked(var)),
        }
    }

    fn constant(&self, index: usize) -> Value {
        self.constants.get(index).cloned().unwrap_or(Value::Null)
    }
}

/// Substitute `%s`, `%d`, `%f` and `%%` in `format` from `values`, left to
/// right. Unknown directives are written as is; surplus values are ignored.
fn printf(out: &mut impl fmt::Write, format: &str, values: &[Value]) -> Result<(), RuntimeError> {
    let mut values = values.iter();
    let mut position = 0;
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.write_char(c)?;
            continue;
        }
        let Some(directive) = chars.next() else {
            out.write_char('%')?;
            break;
        };
        if !matches!(directive, 's' | 'd' | 'f') {
            if directive != '%' {
                out.write_char('%')?;
            }
            out.write_char(directive)?;
            continue;
        }

        position += 1;
        let value = values.next().ok_or_else(|| {
            RuntimeError::new(RuntimeErrorKind::MissingFormatArgument { position })
        })?;
        match directive {
            'd' => write!(out, "{}", value.as_int())?,
            'f' => write!(out, "{:.6}", value.as_float())?,
            _ => write!(out, "{value}")?,
        }
    }
    Ok(())
}
