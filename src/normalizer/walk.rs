//! Post-order traversal shared by the passes.

use crate::{
    instruction::{Instruction, InstructionKind},
    normalizer::{DiagnosticCategory, PassContext},
    Result,
};

/// Visits every node of `statements` in post-order.
///
/// Children are rewritten before their parent is visited, so a visitor always sees operands
/// that are already normalized. [`InstructionKind::Opaque`] nodes and subtrees nested deeper
/// than the configured limit are reported under `category` and not descended into.
///
/// Returns `true` if any visit reported a change.
pub(crate) fn post_order<F>(
    statements: &mut [Instruction],
    ctx: &PassContext,
    category: DiagnosticCategory,
    visit: &mut F,
) -> Result<bool>
where
    F: FnMut(&mut Instruction) -> Result<bool>,
{
    let mut changed = false;
    for statement in statements {
        changed |= walk(statement, ctx, category, 0, visit)?;
    }
    Ok(changed)
}

fn walk<F>(
    node: &mut Instruction,
    ctx: &PassContext,
    category: DiagnosticCategory,
    depth: usize,
    visit: &mut F,
) -> Result<bool>
where
    F: FnMut(&mut Instruction) -> Result<bool>,
{
    if depth > ctx.config.max_depth {
        ctx.diagnostics
            .too_deep(category, node, ctx.config.max_depth);
        return Ok(false);
    }
    if matches!(node.kind, InstructionKind::Opaque { .. }) {
        ctx.diagnostics.unrecognized(category, node);
        return Ok(false);
    }

    let mut changed = false;
    for child in node.children_mut() {
        changed |= walk(child, ctx, category, depth + 1, visit)?;
    }
    changed |= visit(node)?;
    Ok(changed)
}
