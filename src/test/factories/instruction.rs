//! Factory methods for instruction trees.
//!
//! All nodes are created at offset 0 without a line unless stated otherwise.

use crate::{
    classfile::ConstantPool,
    instruction::{Instruction, InstructionKind},
};

/// Signature of `java.lang.Object`
pub const OBJECT: &str = "Ljava/lang/Object;";

/// Creates a node at offset 0.
pub fn node(kind: InstructionKind) -> Instruction {
    Instruction::new(0, None, kind)
}

/// Creates a node at the given offset.
pub fn node_at(offset: u32, kind: InstructionKind) -> Instruction {
    Instruction::new(offset, None, kind)
}

/// Integer literal printed as `signature`.
pub fn iconst(signature: &str, value: i32) -> Instruction {
    node(InstructionKind::IConst {
        signature: signature.to_string(),
        value,
    })
}

pub fn iload(slot: u16) -> Instruction {
    node(InstructionKind::ILoad { slot })
}

pub fn aload(slot: u16, signature: &str) -> Instruction {
    node(InstructionKind::ALoad {
        slot,
        signature: signature.to_string(),
    })
}

/// `ldc` of a string constant interned into `pool`.
pub fn ldc_string(pool: &ConstantPool, text: &str) -> Instruction {
    let index = pool.intern_string(text).unwrap();
    node(InstructionKind::Ldc { index })
}

/// `new Builder()` for the internal class name `builder`.
pub fn new_builder(pool: &ConstantPool, builder: &str) -> Instruction {
    let index = pool.intern_methodref(builder, "<init>", "()V").unwrap();
    node(InstructionKind::InvokeNew {
        index,
        args: Vec::new(),
    })
}

/// `receiver.append(arg)` with the overload taking `param`.
pub fn append(
    pool: &ConstantPool,
    builder: &str,
    param: &str,
    receiver: Instruction,
    arg: Instruction,
) -> Instruction {
    let descriptor = format!("({param})L{builder};");
    let index = pool.intern_methodref(builder, "append", &descriptor).unwrap();
    node(InstructionKind::InvokeVirtual {
        index,
        objectref: Box::new(receiver),
        args: vec![arg],
    })
}

/// `receiver.toString()` on a builder.
pub fn to_string(pool: &ConstantPool, builder: &str, receiver: Instruction) -> Instruction {
    let index = pool
        .intern_methodref(builder, "toString", "()Ljava/lang/String;")
        .unwrap();
    node(InstructionKind::InvokeVirtual {
        index,
        objectref: Box::new(receiver),
        args: Vec::new(),
    })
}
