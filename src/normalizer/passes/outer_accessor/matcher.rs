//! Recognition of accessor bridge calls.

use crate::{
    classfile::AccessorRc,
    instruction::{Instruction, InstructionKind},
    normalizer::PassContext,
};

/// Returns the accessor a static call invokes, if every precondition holds.
///
/// The call must be an `invokestatic` whose resolved owner is one of the lexically enclosing
/// classes of the class being normalized, the resolved method must be declared there with both
/// `ACC_SYNTHETIC` and `ACC_STATIC`, a decoded accessor must be registered for it, and the
/// accessor's descriptor must be consistent with its kind and with the number of arguments the
/// call passes. Any failure yields `None`.
pub(super) fn match_accessor(node: &Instruction, ctx: &PassContext) -> Option<AccessorRc> {
    let InstructionKind::InvokeStatic { index, args } = &node.kind else {
        return None;
    };
    let member = ctx.pool().member_ref(*index).ok()?;

    let owner = ctx.class.enclosing_class(&member.class_name)?;
    let method = owner.find_method(&member.name, &member.descriptor)?;
    if !method.access_flags.is_synthetic_static() {
        return None;
    }

    let accessor = ctx
        .accessors
        .lookup(&member.class_name, &member.name, &member.descriptor)?;
    if !accessor.shape_matches() || accessor.argument_count() != Some(args.len()) {
        return None;
    }
    Some(accessor)
}
