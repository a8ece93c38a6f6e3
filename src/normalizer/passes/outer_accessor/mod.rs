//! Inlining of synthetic outer-class accessors.
//!
//! Before nest-based access control (Java 11), a nested class could not touch a `private`
//! member of an enclosing class directly. javac routes every such access through a static
//! synthetic bridge on the class declaring the member:
//!
//! ```text
//! Outer.access$000(o)         →  o.count
//! Outer.access$002(o, v)      →  o.count = v
//! Outer.access$100()          →  Outer.total
//! Outer.access$102(v)         →  Outer.total = v
//! Outer.access$200(o, a)      →  o.helper(a)
//! Inner.access$300(this)      →  Outer.this
//! ```
//!
//! # Architecture
//!
//! - [`matcher`] - decides whether a call is a bridge of an enclosing class
//! - [`field`], [`static_field`], [`method`] - rewrite a matched call by accessor kind
//! - [`outer_this`] - canonicalizes captured outer instances
//!
//! A call is rewritten only when every precondition holds; otherwise it is left exactly as it
//! was. The fabricated field and method references are interned into the constant pool of the
//! class being normalized, and the rewritten node keeps the offset and line of the call.

mod field;
mod matcher;
mod method;
mod outer_this;
mod static_field;

use crate::{
    classfile::{Accessor, AccessorKind},
    instruction::{Instruction, MethodBody},
    normalizer::{walk, DiagnosticCategory, EventKind, PassContext, TreePass},
    Result,
};

/// Pass inlining accessor bridges of enclosing classes.
pub struct OuterAccessorPass;

impl Default for OuterAccessorPass {
    fn default() -> Self {
        Self::new()
    }
}

impl OuterAccessorPass {
    /// Creates a new outer accessor pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit(
        &self,
        node: &mut Instruction,
        method: &str,
        is_static: bool,
        ctx: &PassContext,
    ) -> Result<bool> {
        if let Some(accessor) = matcher::match_accessor(node, ctx) {
            if outer_this::canonicalize_accessor(node, &accessor, ctx, is_static)? {
                self.record(EventKind::OuterThisCanonicalized, node, method, &accessor, ctx);
                return Ok(true);
            }
            let inlined = match accessor.kind {
                AccessorKind::GetField => field::inline_get_field(node, &accessor, ctx)?,
                AccessorKind::PutField => field::inline_put_field(node, &accessor, ctx)?,
                AccessorKind::GetStatic => static_field::inline_get_static(node, &accessor, ctx)?,
                AccessorKind::PutStatic => static_field::inline_put_static(node, &accessor, ctx)?,
                AccessorKind::InvokeMethod | AccessorKind::InvokeStaticMethod => {
                    method::inline_invocation(node, &accessor, ctx)?
                }
            };
            if inlined {
                self.record(EventKind::AccessorInlined, node, method, &accessor, ctx);
            }
            return Ok(inlined);
        }

        if outer_this::canonicalize_field_read(node, ctx, is_static)? {
            ctx.events
                .record(EventKind::OuterThisCanonicalized)
                .at(node.offset)
                .method(method)
                .pass(self.name());
            return Ok(true);
        }
        Ok(false)
    }

    fn record(
        &self,
        kind: EventKind,
        node: &Instruction,
        method: &str,
        accessor: &Accessor,
        ctx: &PassContext,
    ) {
        ctx.events
            .record(kind)
            .at(node.offset)
            .method(method)
            .message(format!(
                "{}.{} -> {}.{}",
                accessor.class_name,
                accessor.method_name,
                accessor.target_class,
                accessor.target_name
            ))
            .pass(self.name());
    }
}

impl TreePass for OuterAccessorPass {
    fn name(&self) -> &'static str {
        "outer-accessors"
    }

    fn category(&self) -> DiagnosticCategory {
        DiagnosticCategory::OuterAccessor
    }

    fn should_run(&self, _method: &MethodBody, ctx: &PassContext) -> bool {
        ctx.class.outer_class.is_some()
    }

    fn run_on_method(&self, method: &mut MethodBody, ctx: &PassContext) -> Result<bool> {
        let is_static = method.is_static();
        let MethodBody {
            name, statements, ..
        } = method;
        let name = name.as_str();
        walk::post_order(statements, ctx, self.category(), &mut |node| {
            self.visit(node, name, is_static, ctx)
        })
    }

    fn description(&self) -> &'static str {
        "Inlines synthetic accessor bridges of enclosing classes"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        classfile::{AccessorRegistry, ClassFile, FieldAccessFlags, MethodAccessFlags},
        instruction::InstructionKind,
        test::factories::{
            classfile::{
                create_accessor, create_context, create_nested_context, create_pool, NestedClasses,
            },
            instruction::{aload, iload, node},
        },
    };

    const OUTER_SIG: &str = "Lcom/example/Outer;";

    fn run(ctx: &PassContext, statement: Instruction) -> (bool, Instruction) {
        let mut method = MethodBody::new("run", "()V").with_statement(statement);
        let changed = OuterAccessorPass::new()
            .run_on_method(&mut method, ctx)
            .unwrap();
        (changed, method.statements.remove(0))
    }

    fn bridge_call(
        classes: &NestedClasses,
        name: &str,
        desc: &str,
        args: Vec<Instruction>,
    ) -> Instruction {
        let index = classes
            .pool
            .intern_methodref(NestedClasses::OUTER, name, desc)
            .unwrap();
        node(InstructionKind::InvokeStatic { index, args })
    }

    #[test]
    fn test_get_field_bridge_inlined() {
        let desc = "(Lcom/example/Outer;)I";
        let classes = NestedClasses::new().with_bridge("access$000", desc);
        let call = bridge_call(&classes, "access$000", desc, vec![aload(1, OUTER_SIG)]);
        let ctx = create_nested_context(classes, vec![create_accessor(
            NestedClasses::OUTER,
            "access$000",
            desc,
            AccessorKind::GetField,
            "count",
            "I",
        )]);

        let (changed, tree) = run(&ctx, call);

        assert!(changed);
        let InstructionKind::GetField { index, objectref } = tree.kind else {
            panic!("expected getfield");
        };
        let member = ctx.pool().member_ref(index).unwrap();
        assert_eq!(member.class_name, NestedClasses::OUTER);
        assert_eq!(member.name, "count");
        assert_eq!(member.descriptor, "I");
        assert!(matches!(objectref.kind, InstructionKind::ALoad { slot: 1, .. }));
        assert!(ctx.events.has(EventKind::AccessorInlined));
    }

    #[test]
    fn test_echoing_put_field_becomes_assignment() {
        let desc = "(Lcom/example/Outer;I)I";
        let classes = NestedClasses::new().with_bridge("access$002", desc);
        let call = bridge_call(&classes, "access$002", desc, vec![aload(1, OUTER_SIG), iload(2)]);
        let ctx = create_nested_context(classes, vec![create_accessor(
            NestedClasses::OUTER,
            "access$002",
            desc,
            AccessorKind::PutField,
            "count",
            "I",
        )]);

        let (changed, tree) = run(&ctx, call);

        assert!(changed);
        let InstructionKind::Assignment { op: None, target, value } = tree.kind else {
            panic!("expected assignment");
        };
        assert!(matches!(target.kind, InstructionKind::GetField { .. }));
        assert!(matches!(value.kind, InstructionKind::ILoad { slot: 2 }));
    }

    #[test]
    fn test_void_put_static_becomes_putstatic() {
        let desc = "(I)V";
        let classes = NestedClasses::new().with_bridge("access$102", desc);
        let call = bridge_call(&classes, "access$102", desc, vec![iload(1)]);
        let ctx = create_nested_context(classes, vec![create_accessor(
            NestedClasses::OUTER,
            "access$102",
            desc,
            AccessorKind::PutStatic,
            "total",
            "I",
        )]);

        let (changed, tree) = run(&ctx, call);

        assert!(changed);
        assert!(matches!(tree.kind, InstructionKind::PutStatic { .. }));
    }

    #[test]
    fn test_get_static_bridge_inlined() {
        let desc = "()Ljava/lang/String;";
        let classes = NestedClasses::new().with_bridge("access$100", desc);
        let call = bridge_call(&classes, "access$100", desc, vec![]);
        let ctx = create_nested_context(classes, vec![create_accessor(
            NestedClasses::OUTER,
            "access$100",
            desc,
            AccessorKind::GetStatic,
            "NAME",
            "Ljava/lang/String;",
        )]);

        let (changed, tree) = run(&ctx, call);

        assert!(changed);
        let InstructionKind::GetStatic { index } = tree.kind else {
            panic!("expected getstatic");
        };
        assert_eq!(ctx.pool().member_ref(index).unwrap().name, "NAME");
    }

    #[test]
    fn test_method_bridge_becomes_virtual_call() {
        let desc = "(Lcom/example/Outer;I)V";
        let classes = NestedClasses::new().with_bridge("access$200", desc);
        let call = bridge_call(&classes, "access$200", desc, vec![aload(1, OUTER_SIG), iload(2)]);
        let ctx = create_nested_context(classes, vec![create_accessor(
            NestedClasses::OUTER,
            "access$200",
            desc,
            AccessorKind::InvokeMethod,
            "helper",
            "(I)V",
        )]);

        let (changed, tree) = run(&ctx, call);

        assert!(changed);
        let InstructionKind::InvokeVirtual { index, objectref, args } = tree.kind else {
            panic!("expected invokevirtual");
        };
        let member = ctx.pool().member_ref(index).unwrap();
        assert_eq!((member.name.as_str(), member.descriptor.as_str()), ("helper", "(I)V"));
        assert!(matches!(objectref.kind, InstructionKind::ALoad { slot: 1, .. }));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_outer_this_field_read() {
        let classes = NestedClasses::new();
        let index = classes
            .pool
            .intern_fieldref(NestedClasses::INNER, "this$0", OUTER_SIG)
            .unwrap();
        let read = node(InstructionKind::GetField {
            index,
            objectref: Box::new(aload(0, "Lcom/example/Outer$Inner;")),
        });
        let ctx = create_nested_context(classes, vec![]);

        let (changed, tree) = run(&ctx, read);

        assert!(changed);
        let InstructionKind::OuterThis { class_index } = tree.kind else {
            panic!("expected outer this");
        };
        assert_eq!(ctx.pool().class_name(class_index).unwrap(), NestedClasses::OUTER);
    }

    #[test]
    fn test_bridge_returning_enclosing_instance_becomes_outer_this() {
        const DEEP: &str = "com/example/Outer$Inner$Deep";
        const INNER_SIG: &str = "Lcom/example/Outer$Inner;";
        let bridge_desc = "(Lcom/example/Outer$Inner;)Lcom/example/Outer;";
        let captured = FieldAccessFlags::SYNTHETIC | FieldAccessFlags::FINAL;

        let outer = ClassFile::new(NestedClasses::OUTER, create_pool());
        let inner = ClassFile::new(NestedClasses::INNER, create_pool())
            .with_outer(Arc::new(outer))
            .with_field("this$0", OUTER_SIG, captured)
            .with_method(
                "access$000",
                bridge_desc,
                MethodAccessFlags::STATIC | MethodAccessFlags::SYNTHETIC,
            );

        let pool = create_pool();
        let this_field = pool.intern_fieldref(DEEP, "this$1", INNER_SIG).unwrap();
        let bridge = pool
            .intern_methodref(NestedClasses::INNER, "access$000", bridge_desc)
            .unwrap();
        let deep = ClassFile::new(DEEP, pool)
            .with_outer(Arc::new(inner))
            .with_field("this$1", INNER_SIG, captured);

        let registry = AccessorRegistry::new();
        registry.register(create_accessor(
            NestedClasses::INNER,
            "access$000",
            bridge_desc,
            AccessorKind::GetField,
            "this$0",
            OUTER_SIG,
        ));
        let ctx = PassContext::new(Arc::new(deep), Arc::new(registry));

        // Outer$Inner.access$000(this.this$1)
        let call = node(InstructionKind::InvokeStatic {
            index: bridge,
            args: vec![node(InstructionKind::GetField {
                index: this_field,
                objectref: Box::new(aload(0, "Lcom/example/Outer$Inner$Deep;")),
            })],
        });

        let (changed, tree) = run(&ctx, call);

        assert!(changed);
        let InstructionKind::OuterThis { class_index } = tree.kind else {
            panic!("expected outer this, got {:?}", tree.kind);
        };
        assert_eq!(ctx.pool().class_name(class_index).unwrap(), NestedClasses::OUTER);
        assert_eq!(ctx.events.count_kind(EventKind::OuterThisCanonicalized), 2);
        assert!(!ctx.events.has(EventKind::AccessorInlined));
    }

    #[test]
    fn test_outer_this_needs_synthetic_field() {
        let classes =
            NestedClasses::new().with_inner_field("this$9", OUTER_SIG, FieldAccessFlags::FINAL);
        let index = classes
            .pool
            .intern_fieldref(NestedClasses::INNER, "this$9", OUTER_SIG)
            .unwrap();
        let read = node(InstructionKind::GetField {
            index,
            objectref: Box::new(aload(0, "Lcom/example/Outer$Inner;")),
        });
        let ctx = create_nested_context(classes, vec![]);

        let (changed, _) = run(&ctx, read);
        assert!(!changed);
    }

    #[test]
    fn test_static_method_slot_zero_is_not_this() {
        let classes = NestedClasses::new();
        let index = classes
            .pool
            .intern_fieldref(NestedClasses::INNER, "this$0", OUTER_SIG)
            .unwrap();
        let read = node(InstructionKind::GetField {
            index,
            objectref: Box::new(aload(0, "Lcom/example/Outer$Inner;")),
        });
        let ctx = create_nested_context(classes, vec![]);
        let mut method =
            MethodBody::new("helper", "(Lcom/example/Outer$Inner;)V").with_statement(read);
        method.access_flags = MethodAccessFlags::STATIC;

        assert!(!OuterAccessorPass::new().run_on_method(&mut method, &ctx).unwrap());
    }

    #[test]
    fn test_skips_top_level_classes() {
        let ctx = create_context(create_pool());
        let method = MethodBody::new("run", "()V");
        assert!(!OuterAccessorPass::new().should_run(&method, &ctx));
    }
}
