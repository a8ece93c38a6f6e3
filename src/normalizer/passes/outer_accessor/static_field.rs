//! Inlining of static field bridges.

use crate::{
    classfile::{descriptor::MethodDescriptor, Accessor},
    instruction::{Instruction, InstructionKind},
    normalizer::PassContext,
    Result,
};

/// Rewrites `access$100()` to `Outer.field`.
pub(super) fn inline_get_static(
    node: &mut Instruction,
    accessor: &Accessor,
    ctx: &PassContext,
) -> Result<bool> {
    if !matches!(&node.kind, InstructionKind::InvokeStatic { args, .. } if args.is_empty()) {
        return Ok(false);
    }
    let index = ctx.pool().intern_fieldref(
        &accessor.target_class,
        &accessor.target_name,
        &accessor.target_descriptor,
    )?;
    node.kind = InstructionKind::GetStatic { index };
    Ok(true)
}

/// Rewrites `access$102(v)` to `Outer.field = v`.
///
/// Echoing bridges become an assignment expression, `void` bridges a plain `putstatic`.
pub(super) fn inline_put_static(
    node: &mut Instruction,
    accessor: &Accessor,
    ctx: &PassContext,
) -> Result<bool> {
    let echoes = !MethodDescriptor::parse(&accessor.method_descriptor)?.returns_void();
    let index = ctx.pool().intern_fieldref(
        &accessor.target_class,
        &accessor.target_name,
        &accessor.target_descriptor,
    )?;

    let (offset, line) = (node.offset, node.line);
    let mut inlined = false;
    node.replace_kind(|kind| match kind {
        InstructionKind::InvokeStatic { index: call, args } => {
            match <[Instruction; 1]>::try_from(args) {
                Ok([value]) => {
                    inlined = true;
                    if echoes {
                        InstructionKind::Assignment {
                            op: None,
                            target: Box::new(Instruction::new(
                                offset,
                                line,
                                InstructionKind::GetStatic { index },
                            )),
                            value: Box::new(value),
                        }
                    } else {
                        InstructionKind::PutStatic {
                            index,
                            value: Box::new(value),
                        }
                    }
                }
                Err(args) => InstructionKind::InvokeStatic { index: call, args },
            }
        }
        other => other,
    });
    Ok(inlined)
}
