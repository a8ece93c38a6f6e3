//! Canonicalization of captured outer instances.
//!
//! An inner class reaches its enclosing instance through a synthetic field named `this$N`,
//! where `N` is the nesting depth of the enclosing class. Reads of that field, chains of them
//! (`this.this$1.this$0`) and getter bridges returning such a field are all replaced by an
//! [`InstructionKind::OuterThis`] node, which prints as `Outer.this`.

use crate::{
    classfile::{descriptor::class_entry_name, Accessor, AccessorKind, ClassFile, FieldAccessFlags},
    instruction::{Instruction, InstructionKind},
    normalizer::PassContext,
    Result,
};

const OUTER_FIELD_PREFIX: &str = "this$";

/// Checks that `node` is the instance of the current method or an enclosing instance.
fn is_instance_root(node: &Instruction, is_static: bool) -> bool {
    match node.kind {
        InstructionKind::ALoad { slot: 0, .. } => !is_static,
        InstructionKind::OuterThis { .. } => true,
        _ => false,
    }
}

/// Returns the enclosing class an outer-instance field of type `descriptor` refers to.
fn enclosing_of<'a>(ctx: &'a PassContext, descriptor: &str) -> Option<&'a ClassFile> {
    ctx.class.enclosing_class(class_entry_name(descriptor)?)
}

/// Replaces `node` by the canonical outer instance of `outer`.
fn make_outer_this(node: &mut Instruction, outer: &ClassFile, ctx: &PassContext) -> Result<()> {
    let class_index = ctx.pool().intern_class(&outer.name)?;
    node.kind = InstructionKind::OuterThis { class_index };
    Ok(())
}

/// Rewrites a read of a synthetic `this$N` field on an instance root.
pub(super) fn canonicalize_field_read(
    node: &mut Instruction,
    ctx: &PassContext,
    is_static: bool,
) -> Result<bool> {
    let InstructionKind::GetField { index, objectref } = &node.kind else {
        return Ok(false);
    };
    if !is_instance_root(objectref, is_static) {
        return Ok(false);
    }
    let Ok(member) = ctx.pool().member_ref(*index) else {
        return Ok(false);
    };
    if !member.name.starts_with(OUTER_FIELD_PREFIX) {
        return Ok(false);
    }

    let declaring = if member.class_name == ctx.class.name {
        Some(&*ctx.class)
    } else {
        ctx.class.enclosing_class(&member.class_name)
    };
    let synthetic = declaring
        .and_then(|class| class.find_field(&member.name, &member.descriptor))
        .is_some_and(|field| field.access_flags.contains(FieldAccessFlags::SYNTHETIC));
    if !synthetic {
        return Ok(false);
    }
    let Some(outer) = enclosing_of(ctx, &member.descriptor) else {
        return Ok(false);
    };

    make_outer_this(node, outer, ctx)?;
    Ok(true)
}

/// Rewrites a getter bridge returning a `this$N` field of an instance root.
pub(super) fn canonicalize_accessor(
    node: &mut Instruction,
    accessor: &Accessor,
    ctx: &PassContext,
    is_static: bool,
) -> Result<bool> {
    if accessor.kind != AccessorKind::GetField
        || !accessor.target_name.starts_with(OUTER_FIELD_PREFIX)
    {
        return Ok(false);
    }
    let InstructionKind::InvokeStatic { args, .. } = &node.kind else {
        return Ok(false);
    };
    if !matches!(args.as_slice(), [receiver] if is_instance_root(receiver, is_static)) {
        return Ok(false);
    }
    let Some(outer) = enclosing_of(ctx, &accessor.target_descriptor) else {
        return Ok(false);
    };

    make_outer_this(node, outer, ctx)?;
    Ok(true)
}
