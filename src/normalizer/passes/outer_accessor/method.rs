//! Inlining of method bridges.

use crate::{
    classfile::{Accessor, AccessorKind},
    instruction::{Instruction, InstructionKind},
    normalizer::PassContext,
    Result,
};

/// Rewrites `access$200(o, a, b)` to `o.method(a, b)`, or `Outer.method(a, b)` for static
/// targets.
pub(super) fn inline_invocation(
    node: &mut Instruction,
    accessor: &Accessor,
    ctx: &PassContext,
) -> Result<bool> {
    let instance = accessor.kind == AccessorKind::InvokeMethod;
    if instance && matches!(&node.kind, InstructionKind::InvokeStatic { args, .. } if args.is_empty())
    {
        return Ok(false);
    }
    let index = ctx.pool().intern_methodref(
        &accessor.target_class,
        &accessor.target_name,
        &accessor.target_descriptor,
    )?;

    let mut inlined = false;
    node.replace_kind(|kind| match kind {
        InstructionKind::InvokeStatic { mut args, .. } if instance => {
            inlined = true;
            let objectref = args.remove(0);
            InstructionKind::InvokeVirtual {
                index,
                objectref: Box::new(objectref),
                args,
            }
        }
        InstructionKind::InvokeStatic { args, .. } => {
            inlined = true;
            InstructionKind::InvokeStatic { index, args }
        }
        other => other,
    });
    Ok(inlined)
}
