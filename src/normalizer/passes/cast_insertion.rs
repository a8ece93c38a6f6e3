//! Restoration of casts erased by verification.
//!
//! The stack simulation types every value it cannot prove narrower as `java/lang/Object`.
//! When such a value is a load of a local variable whose declared type is known, printing the
//! load bare produces source that no longer compiles (`throw o;`, `s.length()` on an
//! `Object`). This pass wraps those loads in a cast to the declared type at every site that
//! consumes a typed value.
//!
//! # Sites
//!
//! | Consumer | Expected type |
//! |----------|---------------|
//! | `athrow` | `java/lang/Throwable` |
//! | `astore` | declared type of the destination local |
//! | invocation receiver | owner class of the method reference |
//! | invocation argument | formal parameter type |
//! | `putfield` / `putstatic` value | field type |
//! | `getfield` / `putfield` receiver | owner class of the field reference |
//! | `areturn` value | method return type |
//! | array operand of loads and stores | array of the element type |
//!
//! A load of a local declared narrower than `Object` is cast to its declared type unless the
//! site itself expects `Object`. A load of a local declared as `Object` is cast to the type
//! the site expects, if that type is a narrower reference type. Locals declared with a
//! primitive type get a numeric conversion instead of a reference cast.
//!
//! Locals are matched by identity: the load's slot is resolved against the local variable
//! table at the load's own offset, so two loads of a reused slot are told apart.

use crate::{
    classfile::{
        descriptor::{
            class_entry_name, class_signature, is_primitive, is_reference, MethodDescriptor,
            OBJECT_SIGNATURE, THROWABLE_CLASS,
        },
        LocalVariables,
    },
    instruction::{Instruction, InstructionKind, MethodBody},
    normalizer::{walk, DiagnosticCategory, EventKind, PassContext, TreePass},
    Result,
};

/// What a consuming site expects of its operand.
#[derive(Debug, Clone, Copy)]
enum Site<'a> {
    /// The operand of `athrow`
    Throw,
    /// A value of the given field-type signature
    Typed(&'a str),
}

/// Per-method state the visitor reads.
struct MethodScope<'a> {
    name: &'a str,
    locals: &'a LocalVariables,
    return_type: Option<String>,
}

/// Pass restoring casts of generically typed local loads.
pub struct CastInsertionPass;

impl Default for CastInsertionPass {
    fn default() -> Self {
        Self::new()
    }
}

impl CastInsertionPass {
    /// Creates a new cast insertion pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Casts the operands of `node` that feed a typed site.
    fn visit(
        &self,
        node: &mut Instruction,
        scope: &MethodScope<'_>,
        ctx: &PassContext,
    ) -> Result<bool> {
        let pool = ctx.pool();
        let offset = node.offset;

        match &mut node.kind {
            InstructionKind::AThrow { value } => self.cast_operand(value, Site::Throw, scope, ctx),
            InstructionKind::AStore { slot, value } => {
                let Some(destination) = scope.locals.resolve_store(*slot, offset) else {
                    return Ok(false);
                };
                if let InstructionKind::ALoad { slot: source, .. } = &value.kind {
                    let same = scope
                        .locals
                        .resolve(*source, value.offset)
                        .is_some_and(|lv| lv.id == destination.id);
                    if same {
                        return Ok(false);
                    }
                }
                let expected = destination.signature.clone();
                self.cast_operand(value, Site::Typed(&expected), scope, ctx)
            }
            InstructionKind::InvokeVirtual { index, objectref, args }
            | InstructionKind::InvokeSpecial { index, objectref, args }
            | InstructionKind::InvokeInterface { index, objectref, args } => {
                let Ok(member) = pool.member_ref(*index) else {
                    return Ok(false);
                };
                let owner = class_signature(&member.class_name);
                let mut changed = self.cast_operand(objectref, Site::Typed(&owner), scope, ctx)?;
                changed |= self.cast_arguments(args, &member.descriptor, scope, ctx)?;
                Ok(changed)
            }
            InstructionKind::InvokeStatic { index, args }
            | InstructionKind::InvokeNew { index, args } => {
                let Ok(member) = pool.member_ref(*index) else {
                    return Ok(false);
                };
                self.cast_arguments(args, &member.descriptor, scope, ctx)
            }
            InstructionKind::GetField { index, objectref } => {
                let Ok(member) = pool.member_ref(*index) else {
                    return Ok(false);
                };
                let owner = class_signature(&member.class_name);
                self.cast_operand(objectref, Site::Typed(&owner), scope, ctx)
            }
            InstructionKind::PutField {
                index,
                objectref,
                value,
            } => {
                let Ok(member) = pool.member_ref(*index) else {
                    return Ok(false);
                };
                let owner = class_signature(&member.class_name);
                let mut changed = self.cast_operand(objectref, Site::Typed(&owner), scope, ctx)?;
                changed |= self.cast_operand(value, Site::Typed(&member.descriptor), scope, ctx)?;
                Ok(changed)
            }
            InstructionKind::PutStatic { index, value } => {
                let Ok(member) = pool.member_ref(*index) else {
                    return Ok(false);
                };
                self.cast_operand(value, Site::Typed(&member.descriptor), scope, ctx)
            }
            InstructionKind::XReturn { value } => match scope.return_type.as_deref() {
                Some(return_type) => self.cast_operand(value, Site::Typed(return_type), scope, ctx),
                None => Ok(false),
            },
            InstructionKind::ArrayLoad {
                signature, array, ..
            } => {
                let expected = format!("[{signature}");
                self.cast_operand(array, Site::Typed(&expected), scope, ctx)
            }
            InstructionKind::ArrayStore {
                signature,
                array,
                value,
                ..
            } => {
                let expected = format!("[{signature}");
                let mut changed = self.cast_operand(array, Site::Typed(&expected), scope, ctx)?;
                changed |= self.cast_operand(value, Site::Typed(signature.as_str()), scope, ctx)?;
                Ok(changed)
            }
            _ => Ok(false),
        }
    }

    /// Casts call arguments against the formal parameters of `descriptor`.
    ///
    /// Calls whose argument count disagrees with the descriptor are left alone.
    fn cast_arguments(
        &self,
        args: &mut [Instruction],
        descriptor: &str,
        scope: &MethodScope<'_>,
        ctx: &PassContext,
    ) -> Result<bool> {
        let Ok(descriptor) = MethodDescriptor::parse(descriptor) else {
            return Ok(false);
        };
        if descriptor.parameters.len() != args.len() {
            return Ok(false);
        }

        let mut changed = false;
        for (arg, parameter) in args.iter_mut().zip(&descriptor.parameters) {
            changed |= self.cast_operand(arg, Site::Typed(parameter), scope, ctx)?;
        }
        Ok(changed)
    }

    /// Wraps `operand` in a cast if it is an erased load of a typed local.
    fn cast_operand(
        &self,
        operand: &mut Instruction,
        site: Site<'_>,
        scope: &MethodScope<'_>,
        ctx: &PassContext,
    ) -> Result<bool> {
        let InstructionKind::ALoad { slot, signature } = &operand.kind else {
            return Ok(false);
        };
        if signature != OBJECT_SIGNATURE {
            return Ok(false);
        }
        let Some(local) = scope.locals.resolve(*slot, operand.offset) else {
            return Ok(false);
        };

        let target = if local.signature == OBJECT_SIGNATURE {
            match site {
                Site::Throw => class_signature(THROWABLE_CLASS),
                Site::Typed(expected) if is_reference(expected) && expected != OBJECT_SIGNATURE => {
                    expected.to_string()
                }
                Site::Typed(_) => return Ok(false),
            }
        } else {
            match site {
                Site::Typed(expected) if expected == OBJECT_SIGNATURE => return Ok(false),
                _ => local.signature.clone(),
            }
        };

        if is_primitive(&target) {
            operand.wrap(|inner| InstructionKind::Convert {
                signature: target.clone(),
                value: inner,
            });
            ctx.events
                .record(EventKind::ConversionInserted)
                .at(operand.offset)
                .method(scope.name)
                .message(format!("({target}) on slot {slot}", slot = local.slot))
                .pass(self.name());
            return Ok(true);
        }

        let Some(class_name) = class_entry_name(&target) else {
            return Ok(false);
        };
        let class_index = ctx.pool().intern_class(class_name)?;
        operand.wrap(|inner| InstructionKind::CheckCast {
            class_index,
            objectref: inner,
        });
        ctx.events
            .record(EventKind::CastInserted)
            .at(operand.offset)
            .method(scope.name)
            .message(format!("({class_name}) on slot {}", local.slot))
            .pass(self.name());
        Ok(true)
    }
}

impl TreePass for CastInsertionPass {
    fn name(&self) -> &'static str {
        "cast-insertion"
    }

    fn category(&self) -> DiagnosticCategory {
        DiagnosticCategory::CastInsertion
    }

    fn should_run(&self, method: &MethodBody, _ctx: &PassContext) -> bool {
        !method.locals.is_empty()
    }

    fn run_on_method(&self, method: &mut MethodBody, ctx: &PassContext) -> Result<bool> {
        let MethodBody {
            name,
            descriptor,
            statements,
            locals,
            ..
        } = method;
        let scope = MethodScope {
            name: name.as_str(),
            locals: &*locals,
            return_type: MethodDescriptor::parse(descriptor)
                .ok()
                .map(|d| d.return_type),
        };

        walk::post_order(statements, ctx, self.category(), &mut |node| {
            self.visit(node, &scope, ctx)
        })
    }

    fn description(&self) -> &'static str {
        "Restores casts of erased local variable loads"
    }
}
