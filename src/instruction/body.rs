//! The per-method unit of work.

use crate::{
    classfile::{access_flags::MethodAccessFlags, LocalVariables},
    instruction::Instruction,
};

/// A method body: its statement list and local variable table.
///
/// The statement list and the table are private to the method; nothing in a `MethodBody` is
/// shared with other methods, so bodies of one class can be normalized on separate threads.
#[derive(Debug, Clone, Default)]
pub struct MethodBody {
    /// Method name
    pub name: String,
    /// Method descriptor
    pub descriptor: String,
    /// Access flags
    pub access_flags: MethodAccessFlags,
    /// Statement roots, in source order
    pub statements: Vec<Instruction>,
    /// Local variable table
    pub locals: LocalVariables,
}

impl MethodBody {
    /// Creates an empty body.
    #[must_use]
    pub fn new(name: &str, descriptor: &str) -> Self {
        MethodBody {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            ..Self::default()
        }
    }

    /// Appends a statement.
    #[must_use]
    pub fn with_statement(mut self, statement: Instruction) -> Self {
        self.statements.push(statement);
        self
    }

    /// Replaces the local variable table.
    #[must_use]
    pub fn with_locals(mut self, locals: LocalVariables) -> Self {
        self.locals = locals;
        self
    }

    /// Returns true if the method is declared `static`.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }

    /// Returns the total number of nodes across all statements.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.statements.iter().map(Instruction::node_count).sum()
    }
}
