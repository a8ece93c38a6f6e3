//! Normalizer integration tests.
//!
//! These tests drive the public API the way a decompiler front end does:
//! 1. Build a class with its constant pool and enclosing chain
//! 2. Build a method forest by hand
//! 3. Run the conventional pipeline through `PassScheduler`
//! 4. Inspect the rewritten forest, the event log and the diagnostics

use std::sync::Arc;

use jnorm::prelude::*;

const OUTER: &str = "com/example/Outer";
const INNER: &str = "com/example/Outer$Inner";
const OUTER_SIG: &str = "Lcom/example/Outer;";
const OBJECT_SIG: &str = "Ljava/lang/Object;";
const STRING_SIG: &str = "Ljava/lang/String;";
const SIBLING: &str = "com/example/Outer$Helper";
const BUILDER: &str = "java/lang/StringBuilder";

fn at(offset: u32, kind: InstructionKind) -> Instruction {
    Instruction::new(offset, Some(offset / 2 + 1), kind)
}

fn aload(offset: u32, slot: u16, signature: &str) -> Instruction {
    at(
        offset,
        InstructionKind::ALoad {
            slot,
            signature: signature.to_string(),
        },
    )
}

fn byte_literal(offset: u32, value: i32) -> Instruction {
    at(
        offset,
        InstructionKind::IConst {
            signature: "B".to_string(),
            value,
        },
    )
}

fn ldc(pool: &ConstantPool, offset: u32, text: &str) -> Instruction {
    let index = pool.intern_string(text).unwrap();
    at(offset, InstructionKind::Ldc { index })
}

fn top_level_context(pool: ConstantPool) -> PassContext {
    let class = ClassFile::new("com/example/Subject", pool);
    PassContext::new(Arc::new(class), Arc::new(AccessorRegistry::new()))
}

fn normalize(method: &mut MethodBody, ctx: &PassContext) -> bool {
    PassScheduler::from_config(&ctx.config)
        .run_method(method, ctx)
        .unwrap()
}

const BRIDGE: &str = "access$0";
const BRIDGE_DESC: &str = "(Lcom/example/Outer;)I";

fn bridge_flags() -> MethodAccessFlags {
    MethodAccessFlags::STATIC | MethodAccessFlags::SYNTHETIC
}

/// The accessor `owner.access$0` decodes to: a read of its private field `count:I`.
fn count_accessor(owner: &ClassFile) -> Accessor {
    Accessor {
        class_name: owner.name.clone(),
        method_name: BRIDGE.to_string(),
        method_descriptor: BRIDGE_DESC.to_string(),
        kind: AccessorKind::GetField,
        target_class: owner.name.clone(),
        target_name: "count".to_string(),
        target_descriptor: "I".to_string(),
    }
}

fn inner_class(outer: ClassFileRc) -> ClassFile {
    ClassFile::new(INNER, ConstantPool::new())
        .with_outer(outer)
        .with_field(
            "this$0",
            OUTER_SIG,
            FieldAccessFlags::SYNTHETIC | FieldAccessFlags::FINAL,
        )
}

/// Builds `Outer$Inner` nested in `Outer`, where `Outer` declares the bridge `access$0`
/// reading the private field `count:I`.
fn nested_context() -> PassContext {
    let outer = ClassFile::new(OUTER, ConstantPool::new())
        .with_field("count", "I", FieldAccessFlags::empty())
        .with_method(BRIDGE, BRIDGE_DESC, bridge_flags());
    let registry = AccessorRegistry::new();
    registry.register(count_accessor(&outer));
    PassContext::new(Arc::new(inner_class(Arc::new(outer))), Arc::new(registry))
}

/// Builds `Outer$Inner` next to its sibling `Outer$Helper`. The sibling declares a bridge with
/// the same name, descriptor and flags as `Outer.access$0`; `Outer` itself declares none.
fn sibling_bridge_context() -> (PassContext, ClassFileRc) {
    let outer = Arc::new(ClassFile::new(OUTER, ConstantPool::new()));
    let sibling = Arc::new(
        ClassFile::new(SIBLING, ConstantPool::new())
            .with_outer(Arc::clone(&outer))
            .with_field("count", "I", FieldAccessFlags::empty())
            .with_method(BRIDGE, BRIDGE_DESC, bridge_flags()),
    );
    let registry = AccessorRegistry::new();
    registry.register(count_accessor(&sibling));
    let ctx = PassContext::new(Arc::new(inner_class(outer)), Arc::new(registry));
    (ctx, sibling)
}

fn bridge_call(ctx: &PassContext, owner: &str, receiver: Instruction) -> Instruction {
    let index = ctx
        .pool()
        .intern_methodref(owner, BRIDGE, BRIDGE_DESC)
        .unwrap();
    at(
        8,
        InstructionKind::XReturn {
            value: Box::new(at(
                4,
                InstructionKind::InvokeStatic {
                    index,
                    args: vec![receiver],
                },
            )),
        },
    )
}

fn returned(method: &MethodBody) -> &Instruction {
    match &method.statements[0].kind {
        InstructionKind::XReturn { value } => value,
        other => panic!("expected return, got {other:?}"),
    }
}

#[test]
fn test_throw_of_object_local_casts_to_throwable() {
    let ctx = top_level_context(ConstantPool::new());
    let mut locals = LocalVariables::new();
    locals.add(1, 0, 20, Some("failure"), OBJECT_SIG);
    let mut method = MethodBody::new("rethrow", "(Ljava/lang/Object;)V")
        .with_locals(locals)
        .with_statement(at(
            3,
            InstructionKind::AThrow {
                value: Box::new(aload(2, 1, OBJECT_SIG)),
            },
        ));

    assert!(normalize(&mut method, &ctx));

    let InstructionKind::AThrow { value } = &method.statements[0].kind else {
        panic!("expected throw");
    };
    let InstructionKind::CheckCast {
        class_index,
        objectref,
    } = &value.kind
    else {
        panic!("expected cast, got {:?}", value.kind);
    };
    assert_eq!(ctx.pool().class_name(*class_index).unwrap(), "java/lang/Throwable");
    assert!(matches!(objectref.kind, InstructionKind::ALoad { slot: 1, .. }));
    assert_eq!(value.offset, 2);
    assert!(ctx.events.has(EventKind::CastInserted));
}

#[test]
fn test_value_of_concatenation_folds_to_plus() {
    let pool = ConstantPool::new();
    let init = pool.intern_methodref(BUILDER, "<init>", "()V").unwrap();
    let append = pool
        .intern_methodref(BUILDER, "append", "(Ljava/lang/String;)Ljava/lang/StringBuilder;")
        .unwrap();
    let to_string = pool
        .intern_methodref(BUILDER, "toString", "()Ljava/lang/String;")
        .unwrap();
    let value_of = pool
        .intern_methodref("java/lang/String", "valueOf", "(Ljava/lang/Object;)Ljava/lang/String;")
        .unwrap();

    let builder = at(0, InstructionKind::InvokeNew { index: init, args: vec![] });
    let wrapped = at(
        8,
        InstructionKind::InvokeStatic {
            index: value_of,
            args: vec![aload(7, 1, OBJECT_SIG)],
        },
    );
    let first = at(
        11,
        InstructionKind::InvokeVirtual {
            index: append,
            objectref: Box::new(builder),
            args: vec![wrapped],
        },
    );
    let second = at(
        16,
        InstructionKind::InvokeVirtual {
            index: append,
            objectref: Box::new(first),
            args: vec![ldc(&pool, 14, "-")],
        },
    );
    let chain = at(
        19,
        InstructionKind::InvokeVirtual {
            index: to_string,
            objectref: Box::new(second),
            args: vec![],
        },
    );
    let ctx = top_level_context(pool);
    let mut method = MethodBody::new("label", "(Ljava/lang/Object;)Ljava/lang/String;")
        .with_statement(at(22, InstructionKind::XReturn { value: Box::new(chain) }));

    assert!(normalize(&mut method, &ctx));

    let folded = returned(&method);
    let InstructionKind::BinaryOp {
        op: BinaryOperator::Add,
        signature,
        left,
        right,
    } = &folded.kind
    else {
        panic!("expected concatenation, got {:?}", folded.kind);
    };
    assert_eq!(signature, STRING_SIG);
    assert_eq!((folded.offset, folded.line), (19, Some(10)));
    assert!(matches!(left.kind, InstructionKind::ALoad { slot: 1, .. }));
    let InstructionKind::Ldc { index } = right.kind else {
        panic!("expected string constant");
    };
    assert_eq!(ctx.pool().string_value(index).unwrap(), "-");
    assert_eq!(ctx.events.count_kind(EventKind::ConcatenationFolded), 1);
}

#[test]
fn test_accessor_call_inlines_field_read() {
    let ctx = nested_context();
    let call = bridge_call(&ctx, OUTER, aload(2, 1, OUTER_SIG));
    let mut method = MethodBody::new("read", "(Lcom/example/Outer;)I").with_statement(call);

    assert!(normalize(&mut method, &ctx));

    let read = returned(&method);
    let InstructionKind::GetField { index, objectref } = &read.kind else {
        panic!("expected field read, got {:?}", read.kind);
    };
    let member = ctx.pool().member_ref(*index).unwrap();
    assert_eq!(
        (member.class_name.as_str(), member.name.as_str(), member.descriptor.as_str()),
        (OUTER, "count", "I")
    );
    assert!(matches!(objectref.kind, InstructionKind::ALoad { slot: 1, .. }));
    assert_eq!(read.offset, 4);
    assert!(ctx.events.has(EventKind::AccessorInlined));
}

#[test]
fn test_accessor_call_on_outer_this_reads_through_it() {
    let ctx = nested_context();
    let this_field = ctx.pool().intern_fieldref(INNER, "this$0", OUTER_SIG).unwrap();
    let receiver = at(
        1,
        InstructionKind::GetField {
            index: this_field,
            objectref: Box::new(aload(0, 0, "Lcom/example/Outer$Inner;")),
        },
    );
    let call = bridge_call(&ctx, OUTER, receiver);
    let mut method = MethodBody::new("read", "()I").with_statement(call);

    assert!(normalize(&mut method, &ctx));

    let InstructionKind::GetField { objectref, .. } = &returned(&method).kind else {
        panic!("expected field read");
    };
    let InstructionKind::OuterThis { class_index } = objectref.kind else {
        panic!("expected outer this, got {:?}", objectref.kind);
    };
    assert_eq!(ctx.pool().class_name(class_index).unwrap(), OUTER);
    assert!(ctx.events.has(EventKind::OuterThisCanonicalized));
    assert!(ctx.events.has(EventKind::AccessorInlined));
}

#[test]
fn test_accessor_on_unrelated_class_is_not_inlined() {
    let unrelated = "com/example/Unrelated";
    let ctx = nested_context();
    ctx.accessors
        .register(count_accessor(&ClassFile::new(unrelated, ConstantPool::new())));
    let call = bridge_call(&ctx, unrelated, aload(2, 1, OUTER_SIG));
    let mut method = MethodBody::new("read", "(Lcom/example/Outer;)I").with_statement(call);
    let before = method.statements.clone();

    normalize(&mut method, &ctx);

    assert_eq!(method.statements, before);
    assert!(!ctx.events.has(EventKind::AccessorInlined));
}

#[test]
fn test_same_shaped_bridge_on_sibling_class_is_not_inlined() {
    let (ctx, sibling) = sibling_bridge_context();
    let bridge = sibling.find_method(BRIDGE, BRIDGE_DESC).unwrap();
    assert!(bridge.access_flags.is_synthetic_static());
    assert!(ctx.accessors.lookup(SIBLING, BRIDGE, BRIDGE_DESC).is_some());
    assert!(ctx.class.enclosing_class(SIBLING).is_none());

    let call = bridge_call(&ctx, SIBLING, aload(2, 1, OUTER_SIG));
    let mut method = MethodBody::new("read", "(Lcom/example/Outer;)I").with_statement(call);
    let before = method.statements.clone();

    normalize(&mut method, &ctx);

    assert_eq!(method.statements, before);
    assert!(!ctx.events.has(EventKind::AccessorInlined));
}

#[test]
fn test_index_of_literal_becomes_char() {
    let pool = ConstantPool::new();
    let index_of = pool.intern_methodref("java/lang/String", "indexOf", "(I)I").unwrap();
    let call = at(
        5,
        InstructionKind::InvokeVirtual {
            index: index_of,
            objectref: Box::new(ldc(&pool, 0, "abc")),
            args: vec![byte_literal(2, 65)],
        },
    );
    let ctx = top_level_context(pool);
    let mut method = MethodBody::new("find", "()I")
        .with_statement(at(8, InstructionKind::XReturn { value: Box::new(call) }));

    assert!(normalize(&mut method, &ctx));

    let InstructionKind::InvokeVirtual { args, .. } = &returned(&method).kind else {
        panic!("expected call");
    };
    assert!(matches!(
        &args[0].kind,
        InstructionKind::IConst { signature, value: 65 } if signature == "C"
    ));
    assert_eq!(args[0].offset, 2);
}

#[test]
fn test_equality_ignores_branch_targets() {
    let condition = |target| {
        at(
            3,
            InstructionKind::If {
                cmp: CompareOperator::Ne,
                value: Box::new(byte_literal(1, 7)),
                target,
            },
        )
    };
    let (a, b) = (condition(10), condition(42));

    assert!(instructions_equal(&a, &a));
    assert!(instructions_equal(&a, &b));
    assert!(instructions_equal(&b, &a));
    assert_ne!(a, b);

    let other = at(
        3,
        InstructionKind::If {
            cmp: CompareOperator::Eq,
            value: Box::new(byte_literal(1, 7)),
            target: 10,
        },
    );
    assert!(!instructions_equal(&a, &other));
    assert!(!instructions_equal(&other, &a));
}

#[test]
fn test_cast_cleanup_is_idempotent() {
    let pool = ConstantPool::new();
    let target = pool
        .intern_methodref("com/example/Sink", "accept", "(BLjava/lang/String;)V")
        .unwrap();
    let outer_cast = pool.intern_class("java/lang/String").unwrap();
    let inner_cast = pool.intern_class("java/lang/CharSequence").unwrap();
    let nested = at(
        6,
        InstructionKind::CheckCast {
            class_index: outer_cast,
            objectref: Box::new(at(
                5,
                InstructionKind::CheckCast {
                    class_index: inner_cast,
                    objectref: Box::new(aload(4, 2, OBJECT_SIG)),
                },
            )),
        },
    );
    let call = at(
        9,
        InstructionKind::InvokeStatic {
            index: target,
            args: vec![byte_literal(1, 3), nested],
        },
    );
    let ctx = top_level_context(pool);
    let config = NormalizerConfig::disabled().with_passes(false, false, true, false, false);
    let scheduler = PassScheduler::from_config(&config);
    let mut method = MethodBody::new("send", "()V").with_statement(call);

    assert!(scheduler.run_method(&mut method, &ctx).unwrap());
    let once = method.statements.clone();
    assert!(!scheduler.run_method(&mut method, &ctx).unwrap());

    assert_eq!(method.statements, once);
    assert!(ctx.events.has(EventKind::CastCollapsed));
}

#[test]
fn test_concatenation_preserves_append_order() {
    let pool = ConstantPool::new();
    let init = pool.intern_methodref(BUILDER, "<init>", "()V").unwrap();
    let append = pool
        .intern_methodref(BUILDER, "append", "(Ljava/lang/String;)Ljava/lang/StringBuilder;")
        .unwrap();
    let to_string = pool
        .intern_methodref(BUILDER, "toString", "()Ljava/lang/String;")
        .unwrap();

    let texts = ["alpha", "beta", "gamma", "delta"];
    let mut chain = at(0, InstructionKind::InvokeNew { index: init, args: vec![] });
    for (i, text) in texts.iter().enumerate() {
        let offset = 4 + 4 * i as u32;
        chain = at(
            offset + 2,
            InstructionKind::InvokeVirtual {
                index: append,
                objectref: Box::new(chain),
                args: vec![ldc(&pool, offset, text)],
            },
        );
    }
    let chain = at(
        30,
        InstructionKind::InvokeVirtual {
            index: to_string,
            objectref: Box::new(chain),
            args: vec![],
        },
    );
    let ctx = top_level_context(pool);
    let mut method = MethodBody::new("join", "()Ljava/lang/String;")
        .with_statement(at(33, InstructionKind::XReturn { value: Box::new(chain) }));

    assert!(normalize(&mut method, &ctx));

    fn flatten(node: &Instruction, ctx: &PassContext, out: &mut String) {
        match &node.kind {
            InstructionKind::BinaryOp { left, right, .. } => {
                // `+` is left-associative: the right operand never nests.
                assert!(!matches!(right.kind, InstructionKind::BinaryOp { .. }));
                flatten(left, ctx, out);
                flatten(right, ctx, out);
            }
            InstructionKind::Ldc { index } => out.push_str(&ctx.pool().string_value(*index).unwrap()),
            other => panic!("unexpected operand {other:?}"),
        }
    }
    let mut printed = String::new();
    flatten(returned(&method), &ctx, &mut printed);
    assert_eq!(printed, texts.concat());
}

#[test]
fn test_char_and_boolean_concatenation_literals_keep_their_type() {
    let pool = ConstantPool::new();
    let init = pool.intern_methodref(BUILDER, "<init>", "()V").unwrap();
    let append = |param: &str| {
        pool.intern_methodref(BUILDER, "append", &format!("({param})Ljava/lang/StringBuilder;"))
            .unwrap()
    };
    let to_string = pool
        .intern_methodref(BUILDER, "toString", "()Ljava/lang/String;")
        .unwrap();

    let operands = [
        (STRING_SIG, ldc(&pool, 4, "a")),
        ("C", byte_literal(8, 120)),
        (
            "Z",
            at(
                12,
                InstructionKind::IConst {
                    signature: "I".to_string(),
                    value: 1,
                },
            ),
        ),
    ];
    let mut chain = at(0, InstructionKind::InvokeNew { index: init, args: vec![] });
    for (param, operand) in operands {
        let offset = operand.offset + 2;
        chain = at(
            offset,
            InstructionKind::InvokeVirtual {
                index: append(param),
                objectref: Box::new(chain),
                args: vec![operand],
            },
        );
    }
    let chain = at(
        20,
        InstructionKind::InvokeVirtual {
            index: to_string,
            objectref: Box::new(chain),
            args: vec![],
        },
    );
    let ctx = top_level_context(pool);
    let mut method = MethodBody::new("label", "()Ljava/lang/String;")
        .with_statement(at(23, InstructionKind::XReturn { value: Box::new(chain) }));

    assert!(normalize(&mut method, &ctx));

    // ("a" + 'x') + true
    let InstructionKind::BinaryOp { left, right, .. } = &returned(&method).kind else {
        panic!("expected concatenation");
    };
    assert!(matches!(
        &right.kind,
        InstructionKind::IConst { signature, value: 1 } if signature == "Z"
    ));
    let InstructionKind::BinaryOp { left, right, .. } = &left.kind else {
        panic!("expected nested concatenation");
    };
    assert!(matches!(left.kind, InstructionKind::Ldc { .. }));
    assert!(matches!(
        &right.kind,
        InstructionKind::IConst { signature, value: 120 } if signature == "C"
    ));
}

#[test]
fn test_cast_insertion_covers_every_declared_type() {
    let declared = [
        "Ljava/lang/String;",
        "Ljava/lang/RuntimeException;",
        "Ljava/util/List;",
        "[I",
        "[Ljava/lang/String;",
    ];

    for signature in declared {
        let ctx = top_level_context(ConstantPool::new());
        let mut locals = LocalVariables::new();
        locals.add(3, 0, 40, None, signature);
        let mut method = MethodBody::new("use", "()V")
            .with_locals(locals)
            .with_statement(at(
                6,
                InstructionKind::AThrow {
                    value: Box::new(aload(5, 3, OBJECT_SIG)),
                },
            ));

        assert!(normalize(&mut method, &ctx), "{signature}");

        let InstructionKind::AThrow { value } = &method.statements[0].kind else {
            panic!("expected throw");
        };
        let InstructionKind::CheckCast { class_index, .. } = value.kind else {
            panic!("{signature}: load left uncast");
        };
        let expected = signature
            .strip_prefix('L')
            .and_then(|s| s.strip_suffix(';'))
            .unwrap_or(signature);
        assert_eq!(ctx.pool().class_name(class_index).unwrap(), expected);
    }
}

#[test]
fn test_parallel_class_run_matches_sequential() {
    let build = || {
        let mut locals = LocalVariables::new();
        locals.add(1, 0, 20, None, OBJECT_SIG);
        (0..8)
            .map(|i| {
                MethodBody::new(&format!("m{i}"), "()V")
                    .with_locals(locals.clone())
                    .with_statement(at(
                        3,
                        InstructionKind::AThrow {
                            value: Box::new(aload(2, 1, OBJECT_SIG)),
                        },
                    ))
            })
            .collect::<Vec<_>>()
    };

    let sequential_ctx = top_level_context(ConstantPool::new())
        .with_config(NormalizerConfig::default().with_parallel(false));
    let parallel_ctx = top_level_context(ConstantPool::new())
        .with_config(NormalizerConfig::default().with_parallel(true));
    let scheduler = PassScheduler::from_config(&NormalizerConfig::default());

    let mut sequential = build();
    let mut parallel = build();
    assert_eq!(scheduler.run_class(&mut sequential, &sequential_ctx).unwrap(), 8);
    assert_eq!(scheduler.run_class(&mut parallel, &parallel_ctx).unwrap(), 8);

    for (a, b) in sequential.iter().zip(&parallel) {
        assert!(StructuralComparator::new().equal_blocks(&a.statements, &b.statements));
    }
    assert_eq!(parallel_ctx.pool().len(), sequential_ctx.pool().len());
}

#[test]
fn test_opaque_nodes_are_reported_and_untouched() {
    let ctx = top_level_context(ConstantPool::new());
    let opaque = at(
        0,
        InstructionKind::Opaque {
            opcode: 0xca,
            operands: vec![byte_literal(0, 1)],
        },
    );
    let mut method = MethodBody::new("odd", "()V").with_statement(opaque.clone());

    assert!(!normalize(&mut method, &ctx));

    assert_eq!(method.statements[0], opaque);
    assert!(ctx.diagnostics.has_warnings());
}
