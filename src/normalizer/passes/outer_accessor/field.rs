//! Inlining of instance field bridges.

use crate::{
    classfile::{descriptor::MethodDescriptor, Accessor},
    instruction::{Instruction, InstructionKind},
    normalizer::PassContext,
    Result,
};

/// Rewrites `access$000(o)` to `o.field`.
pub(super) fn inline_get_field(
    node: &mut Instruction,
    accessor: &Accessor,
    ctx: &PassContext,
) -> Result<bool> {
    let index = ctx.pool().intern_fieldref(
        &accessor.target_class,
        &accessor.target_name,
        &accessor.target_descriptor,
    )?;

    let mut inlined = false;
    node.replace_kind(|kind| match kind {
        InstructionKind::InvokeStatic { index: call, args } => {
            match <[Instruction; 1]>::try_from(args) {
                Ok([objectref]) => {
                    inlined = true;
                    InstructionKind::GetField {
                        index,
                        objectref: Box::new(objectref),
                    }
                }
                Err(args) => InstructionKind::InvokeStatic { index: call, args },
            }
        }
        other => other,
    });
    Ok(inlined)
}

/// Rewrites `access$002(o, v)` to `o.field = v`.
///
/// A bridge that echoes the written value becomes an assignment expression, so the call may
/// keep its place inside a larger expression. A `void` bridge becomes a plain `putfield`.
pub(super) fn inline_put_field(
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
            match <[Instruction; 2]>::try_from(args) {
                Ok([objectref, value]) => {
                    inlined = true;
                    if echoes {
                        let target = InstructionKind::GetField {
                            index,
                            objectref: Box::new(objectref),
                        };
                        InstructionKind::Assignment {
                            op: None,
                            target: Box::new(Instruction::new(offset, line, target)),
                            value: Box::new(value),
                        }
                    } else {
                        InstructionKind::PutField {
                            index,
                            objectref: Box::new(objectref),
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
