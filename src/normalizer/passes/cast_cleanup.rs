//! Redundant cast removal and call-argument constant typing.
//!
//! Two rewrites share one post-order walk:
//!
//! - `(A)((B)x)` collapses to `(A)x`. Nested casts arise when cast insertion and the stack
//!   simulation both cast the same operand.
//! - Integer literals passed to a call are retyped against the formal parameter. The JVM
//!   pushes every small integer with `bipush`/`sipush`/`iconst`, so `m((byte) 1)` and `m(1)`
//!   compile to the same bytecode. Printing the literal bare would pick a different overload,
//!   or fail to compile, once the source is recompiled.

use std::mem;

use crate::{
    classfile::descriptor::{MethodDescriptor, TypeMask},
    instruction::{Instruction, InstructionKind, MethodBody},
    normalizer::{walk, DiagnosticCategory, EventKind, PassContext, TreePass},
    Result,
};

/// Pass collapsing nested casts and typing literal call arguments.
pub struct CastCleanupPass;

impl Default for CastCleanupPass {
    fn default() -> Self {
        Self::new()
    }
}

impl CastCleanupPass {
    /// Creates a new cast cleanup pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit(&self, node: &mut Instruction, method: &str, ctx: &PassContext) -> Result<bool> {
        if self.collapse_cast(node) {
            ctx.events
                .record(EventKind::CastCollapsed)
                .at(node.offset)
                .method(method)
                .pass(self.name());
            return Ok(true);
        }
        Ok(self.retype_arguments(node, method, ctx))
    }

    /// Replaces the operand of a cast by the operand of its inner cast.
    fn collapse_cast(&self, node: &mut Instruction) -> bool {
        let InstructionKind::CheckCast { objectref, .. } = &mut node.kind else {
            return false;
        };
        let InstructionKind::CheckCast { objectref: inner, .. } = &mut objectref.kind else {
            return false;
        };
        let operand = mem::replace(
            &mut **inner,
            Instruction::new(0, None, InstructionKind::AConstNull),
        );
        **objectref = operand;
        true
    }

    /// Retypes integer literal arguments of a resolved call.
    fn retype_arguments(&self, node: &mut Instruction, method: &str, ctx: &PassContext) -> bool {
        let (index, args) = match &mut node.kind {
            InstructionKind::InvokeVirtual { index, args, .. }
            | InstructionKind::InvokeSpecial { index, args, .. }
            | InstructionKind::InvokeInterface { index, args, .. }
            | InstructionKind::InvokeStatic { index, args }
            | InstructionKind::InvokeNew { index, args } => (*index, args),
            _ => return false,
        };
        let Ok(member) = ctx.pool().member_ref(index) else {
            return false;
        };
        let Ok(descriptor) = MethodDescriptor::parse(&member.descriptor) else {
            return false;
        };
        if descriptor.parameters.len() != args.len() {
            return false;
        }

        let mut changed = false;
        for (arg, parameter) in args.iter_mut().zip(&descriptor.parameters) {
            if let Some(message) = retype_literal(arg, parameter) {
                ctx.events
                    .record(EventKind::ConstantRetyped)
                    .at(arg.offset)
                    .method(method)
                    .message(message)
                    .pass(self.name());
                changed = true;
            }
        }
        changed
    }
}

/// Types one literal argument for `parameter`; returns a description of the change.
///
/// `boolean` parameters retag the literal, since a cast from `int` to `boolean` is not
/// expressible in source. Every other mismatch wraps the literal in a conversion.
fn retype_literal(arg: &mut Instruction, parameter: &str) -> Option<String> {
    let InstructionKind::IConst { signature, value } = &mut arg.kind else {
        return None;
    };
    if !matches!(signature.as_str(), "B" | "S" | "I") {
        return None;
    }

    let literal = TypeMask::for_literal(signature);
    let expected = TypeMask::for_parameter(parameter);
    if expected == TypeMask::BOOLEAN {
        if !matches!(*value, 0 | 1) {
            return None;
        }
        *signature = parameter.to_string();
        return Some(format!("{value} retagged as {parameter}"));
    }
    if expected.is_empty() || expected.contains(TypeMask::REFERENCE) {
        return None;
    }
    if literal.intersects(expected) && !matches!(parameter, "B" | "S") {
        return None;
    }

    let message = format!("({parameter}) {value}");
    arg.wrap(|inner| InstructionKind::Convert {
        signature: parameter.to_string(),
        value: inner,
    });
    Some(message)
}

impl TreePass for CastCleanupPass {
    fn name(&self) -> &'static str {
        "cast-cleanup"
    }

    fn category(&self) -> DiagnosticCategory {
        DiagnosticCategory::CastCleanup
    }

    fn run_on_method(&self, method: &mut MethodBody, ctx: &PassContext) -> Result<bool> {
        let MethodBody {
            name, statements, ..
        } = method;
        let name = name.as_str();
        walk::post_order(statements, ctx, self.category(), &mut |node| {
            self.visit(node, name, ctx)
        })
    }

    fn description(&self) -> &'static str {
        "Collapses nested casts and types literal call arguments"
    }
}
