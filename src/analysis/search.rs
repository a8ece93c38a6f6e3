//! Read-only searches over instruction trees.
//!
//! All searches walk depth-first in pre-order and examine children in reverse operand order,
//! last pushed first. That is the order in which the stack discharges its values, so the first
//! hit is the node a stack-simulating consumer would have met first. The walk descends into
//! reconstructed constructs (loops, switches, `try` blocks, labeled blocks) as well, so the
//! searches stay usable after control-flow reconstruction has run.
//!
//! The walk uses an explicit stack; nesting depth is bounded only by memory.

use crate::{
    instruction::{Instruction, InstructionKind, Opcode},
    Error, Result,
};

/// Pre-order, reverse-child iterator over a tree.
struct ReverseDfs<'a> {
    stack: Vec<&'a Instruction>,
}

impl<'a> ReverseDfs<'a> {
    fn new(root: &'a Instruction) -> Self {
        ReverseDfs { stack: vec![root] }
    }
}

impl<'a> Iterator for ReverseDfs<'a> {
    type Item = &'a Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Pushed in operand order so the last operand is popped first.
        self.stack.extend(node.children());
        Some(node)
    }
}

/// Finds the first node of kind `opcode` in the tree rooted at `root`.
///
/// # Errors
///
/// Returns [`Error::NullInstruction`] if `root` is `None`. A missing root is always a defect in
/// the stage that built the forest.
///
/// # Examples
///
/// ```rust
/// use jnorm::analysis::find_by_opcode;
/// use jnorm::instruction::{Instruction, InstructionKind, Opcode};
///
/// let ret = Instruction::new(0, None, InstructionKind::Return);
/// assert!(find_by_opcode(Some(&ret), Opcode::Return)?.is_some());
/// assert!(find_by_opcode(None, Opcode::Return).is_err());
/// # Ok::<(), jnorm::Error>(())
/// ```
pub fn find_by_opcode(root: Option<&Instruction>, opcode: Opcode) -> Result<Option<&Instruction>> {
    let root = root.ok_or(Error::NullInstruction {
        operation: "find_by_opcode",
    })?;
    Ok(ReverseDfs::new(root).find(|node| node.opcode() == opcode))
}

/// Finds the first node of kind `opcode` in a statement list.
///
/// Statements are searched last to first, consistent with [`find_by_opcode`].
#[must_use]
pub fn find_by_opcode_in(statements: &[Instruction], opcode: Opcode) -> Option<&Instruction> {
    statements
        .iter()
        .rev()
        .flat_map(ReverseDfs::new)
        .find(|node| node.opcode() == opcode)
}

/// Finds the node whose byte offset is exactly `offset`.
///
/// No nearest-offset matching is done; callers needing it must walk outward themselves.
#[must_use]
pub fn find_by_offset(root: &Instruction, offset: u32) -> Option<&Instruction> {
    ReverseDfs::new(root).find(|node| node.offset == offset)
}

/// Finds the node whose byte offset is exactly `offset` in a statement list.
#[must_use]
pub fn find_by_offset_in(statements: &[Instruction], offset: u32) -> Option<&Instruction> {
    statements
        .iter()
        .rev()
        .flat_map(ReverseDfs::new)
        .find(|node| node.offset == offset)
}

/// Finds the first [`InstructionKind::DupLoad`] in `tree` reading the value held by `store`.
///
/// Returns `None` if `store` is not a [`InstructionKind::DupStore`] or no reader exists.
#[must_use]
pub fn find_duplicate_consumer<'a>(
    tree: &'a Instruction,
    store: &Instruction,
) -> Option<&'a Instruction> {
    let InstructionKind::DupStore { id, .. } = store.kind else {
        return None;
    };
    ReverseDfs::new(tree)
        .find(|node| matches!(node.kind, InstructionKind::DupLoad { id: load } if load == id))
}
