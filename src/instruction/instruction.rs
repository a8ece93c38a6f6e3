//! Instruction nodes of the per-method expression/statement forest.
//!
//! # Ownership
//!
//! Every child is owned by exactly one parent through a `Box` or a `Vec`. The one documented
//! exception is stack `dup` aliasing: a value produced once and consumed at two divergent sites
//! is held by a single [`InstructionKind::DupStore`], and every further reader is an
//! [`InstructionKind::DupLoad`] naming the store by [`DupId`]. The relation is many readers to
//! one writer and is resolved by id, never by pointer.
//!
//! # Positions
//!
//! Each node records the byte offset of the bytecode it came from and its source line (`None`
//! when unknown). Nodes synthesized by a pass inherit the position of the node they replace or
//! wrap, see [`Instruction::wrap`] and [`Instruction::replace_kind`].

use std::{fmt, mem};

use crate::instruction::{
    ops::{
        BinaryOperator, CompareKind, CompareOperator, LogicalOperator, LoopKind, UnaryOperator,
    },
    Opcode,
};

/// Identity of a `dup`-ed stack value within one method.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DupId(u32);

impl DupId {
    /// Creates a new identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for DupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dup{}", self.0)
    }
}

/// One `case` group of a reconstructed `switch`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// Case labels sharing this body
    pub labels: Vec<i32>,
    /// True if the group also carries the `default` label
    pub is_default: bool,
    /// Statements of the group
    pub body: Vec<Instruction>,
}

/// One `catch` clause of a reconstructed `try`.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    /// Constant-pool `Class` index of the caught type, `None` for a catch-all handler
    pub class_index: Option<u16>,
    /// Slot receiving the exception
    pub slot: u16,
    /// Statements of the handler
    pub body: Vec<Instruction>,
}

/// Opcode-specific payload of an [`Instruction`].
///
/// Constant-pool references (`index`, `class_index`) are `u16` indices into the class's
/// [`crate::classfile::ConstantPool`]. Branch targets are byte offsets.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum InstructionKind {
    // ========================================================================
    // Constants
    // ========================================================================
    /// `null`
    AConstNull,
    /// Integer constant pushed by `iconst`, `bipush` or `sipush`.
    ///
    /// `signature` records the type the literal prints as: `B`, `S` or `I` by push width,
    /// retagged to `C`/`Z` when the consuming context demands it.
    IConst { signature: String, value: i32 },
    LConst { value: i64 },
    FConst { value: f32 },
    DConst { value: f64 },
    /// `ldc`/`ldc_w` of an `Integer`, `Float`, `String` or `Class` constant
    Ldc { index: u16 },
    /// `ldc2_w` of a `Long` or `Double` constant
    Ldc2W { index: u16 },

    // ========================================================================
    // Locals
    // ========================================================================
    ILoad { slot: u16 },
    LLoad { slot: u16 },
    FLoad { slot: u16 },
    DLoad { slot: u16 },
    /// Reference load; `signature` is the type stack simulation assigned to the value.
    ALoad { slot: u16, signature: String },
    IStore { slot: u16, value: Box<Instruction> },
    LStore { slot: u16, value: Box<Instruction> },
    FStore { slot: u16, value: Box<Instruction> },
    DStore { slot: u16, value: Box<Instruction> },
    AStore { slot: u16, value: Box<Instruction> },
    IInc { slot: u16, delta: i32 },
    /// The exception object at the entry of a handler
    ExceptionLoad { slot: u16, class_index: Option<u16> },
    /// The return address pushed by `jsr`
    ReturnAddressLoad,

    // ========================================================================
    // Stack bookkeeping
    // ========================================================================
    /// Canonical producer of a value read again by [`InstructionKind::DupLoad`]
    DupStore { id: DupId, value: Box<Instruction> },
    /// Second read of the value held by the [`InstructionKind::DupStore`] with the same id
    DupLoad { id: DupId },
    Pop { value: Box<Instruction> },

    // ========================================================================
    // Operators
    // ========================================================================
    BinaryOp {
        op: BinaryOperator,
        signature: String,
        left: Box<Instruction>,
        right: Box<Instruction>,
    },
    UnaryOp {
        op: UnaryOperator,
        signature: String,
        value: Box<Instruction>,
    },
    /// Three-way comparison (`lcmp`, `fcmpl`, ...)
    Compare {
        kind: CompareKind,
        left: Box<Instruction>,
        right: Box<Instruction>,
    },
    /// Numeric conversion to `signature`, from bytecode (`i2l`, ...) or synthesized
    Convert { signature: String, value: Box<Instruction> },
    PreIncrement { delta: i32, value: Box<Instruction> },
    PostIncrement { delta: i32, value: Box<Instruction> },
    /// `target = value`, or `target op= value` when `op` is set
    Assignment {
        op: Option<BinaryOperator>,
        target: Box<Instruction>,
        value: Box<Instruction>,
    },
    Ternary {
        test: Box<Instruction>,
        then_value: Box<Instruction>,
        else_value: Box<Instruction>,
    },

    // ========================================================================
    // Fields
    // ========================================================================
    GetField { index: u16, objectref: Box<Instruction> },
    PutField {
        index: u16,
        objectref: Box<Instruction>,
        value: Box<Instruction>,
    },
    GetStatic { index: u16 },
    PutStatic { index: u16, value: Box<Instruction> },
    /// Canonical `Outer.this`; `class_index` names the enclosing class
    OuterThis { class_index: u16 },

    // ========================================================================
    // Arrays
    // ========================================================================
    ArrayLoad {
        signature: String,
        array: Box<Instruction>,
        index: Box<Instruction>,
    },
    ArrayStore {
        signature: String,
        array: Box<Instruction>,
        index: Box<Instruction>,
        value: Box<Instruction>,
    },
    ArrayLength { array: Box<Instruction> },
    /// `newarray` of a primitive element type given by `signature`
    NewArray { signature: String, dimension: Box<Instruction> },
    ANewArray { class_index: u16, dimension: Box<Instruction> },
    MultiANewArray { class_index: u16, dimensions: Vec<Instruction> },
    /// Array creation with initializer, `new T[] { values }`
    InitArray { signature: String, values: Vec<Instruction> },

    // ========================================================================
    // Objects
    // ========================================================================
    New { class_index: u16 },
    CheckCast { class_index: u16, objectref: Box<Instruction> },
    InstanceOf { class_index: u16, objectref: Box<Instruction> },

    // ========================================================================
    // Invocations
    // ========================================================================
    InvokeVirtual {
        index: u16,
        objectref: Box<Instruction>,
        args: Vec<Instruction>,
    },
    InvokeSpecial {
        index: u16,
        objectref: Box<Instruction>,
        args: Vec<Instruction>,
    },
    InvokeInterface {
        index: u16,
        objectref: Box<Instruction>,
        args: Vec<Instruction>,
    },
    InvokeStatic { index: u16, args: Vec<Instruction> },
    /// `new T(args)`, the fused `new`/`dup`/`invokespecial <init>` sequence
    InvokeNew { index: u16, args: Vec<Instruction> },
    InvokeDynamic { index: u16, args: Vec<Instruction> },

    // ========================================================================
    // Exits
    // ========================================================================
    Return,
    XReturn { value: Box<Instruction> },
    AThrow { value: Box<Instruction> },

    // ========================================================================
    // Branches
    // ========================================================================
    Goto { target: u32 },
    /// Compares `value` against zero
    If {
        cmp: CompareOperator,
        value: Box<Instruction>,
        target: u32,
    },
    IfCmp {
        cmp: CompareOperator,
        left: Box<Instruction>,
        right: Box<Instruction>,
        target: u32,
    },
    /// Compares `value` against `null`; `cmp` is `Eq` or `Ne`
    IfNull {
        cmp: CompareOperator,
        value: Box<Instruction>,
        target: u32,
    },
    /// Several branch conditions joined by `&&` or `||`
    ComplexIf {
        op: LogicalOperator,
        conditions: Vec<Instruction>,
        target: u32,
    },
    Jsr { target: u32 },
    Ret { slot: u16 },
    TableSwitch {
        key: Box<Instruction>,
        default_target: u32,
        low: i32,
        targets: Vec<u32>,
    },
    LookupSwitch {
        key: Box<Instruction>,
        default_target: u32,
        keys: Vec<i32>,
        targets: Vec<u32>,
    },

    // ========================================================================
    // Monitors
    // ========================================================================
    MonitorEnter { objectref: Box<Instruction> },
    MonitorExit { objectref: Box<Instruction> },

    // ========================================================================
    // Reconstructed control flow
    // ========================================================================
    StructuredIf {
        test: Box<Instruction>,
        then_block: Vec<Instruction>,
        else_block: Vec<Instruction>,
    },
    Loop {
        kind: LoopKind,
        init: Vec<Instruction>,
        test: Option<Box<Instruction>>,
        update: Vec<Instruction>,
        body: Vec<Instruction>,
    },
    ForEach {
        variable: Box<Instruction>,
        iterable: Box<Instruction>,
        body: Vec<Instruction>,
    },
    Switch {
        key: Box<Instruction>,
        cases: Vec<SwitchCase>,
    },
    Try {
        body: Vec<Instruction>,
        catches: Vec<CatchClause>,
        finally_block: Vec<Instruction>,
    },
    Synchronized {
        monitor: Box<Instruction>,
        body: Vec<Instruction>,
    },
    Labeled { label: u32, body: Vec<Instruction> },
    Break { label: Option<u32> },
    Continue { label: Option<u32> },
    /// Local variable declaration, with optional initializer
    Declaration {
        slot: u16,
        value: Option<Box<Instruction>>,
    },

    // ========================================================================
    // Raw bytecode
    // ========================================================================
    /// A bytecode stack simulation passed through without a dedicated node.
    ///
    /// No pass understands it: each reports it through diagnostics and leaves it untouched.
    Opaque { opcode: u8, operands: Vec<Instruction> },
}

/// A node of the instruction forest.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Byte offset of the originating bytecode
    pub offset: u32,
    /// Source line, `None` when unknown
    pub line: Option<u32>,
    /// Opcode-specific payload
    pub kind: InstructionKind,
}

impl Instruction {
    /// Creates a node.
    #[must_use]
    pub fn new(offset: u32, line: Option<u32>, kind: InstructionKind) -> Self {
        Instruction { offset, line, kind }
    }

    /// Creates a node positioned at `template`.
    #[must_use]
    pub fn at(template: &Instruction, kind: InstructionKind) -> Self {
        Instruction {
            offset: template.offset,
            line: template.line,
            kind,
        }
    }

    /// Returns the opcode tag of this node.
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        self.kind.opcode()
    }

    /// Replaces this node by a wrapper built around it, keeping offset and line.
    ///
    /// ```rust
    /// use jnorm::instruction::{Instruction, InstructionKind};
    ///
    /// let mut node = Instruction::new(4, Some(12), InstructionKind::ALoad {
    ///     slot: 1,
    ///     signature: "Ljava/lang/Object;".to_string(),
    /// });
    /// node.wrap(|inner| InstructionKind::CheckCast { class_index: 7, objectref: inner });
    /// assert_eq!(node.offset, 4);
    /// assert!(matches!(node.kind, InstructionKind::CheckCast { class_index: 7, .. }));
    /// ```
    pub fn wrap(&mut self, build: impl FnOnce(Box<Instruction>) -> InstructionKind) {
        let offset = self.offset;
        let line = self.line;
        let inner = mem::replace(self, Instruction::new(offset, line, InstructionKind::Return));
        self.kind = build(Box::new(inner));
    }

    /// Rebuilds this node from its own payload, keeping offset and line.
    ///
    /// The closure receives the current payload by value, so children can be moved into the
    /// replacement without cloning.
    pub fn replace_kind(&mut self, build: impl FnOnce(InstructionKind) -> InstructionKind) {
        let kind = mem::replace(&mut self.kind, InstructionKind::Return);
        self.kind = build(kind);
    }

    /// Returns the children in operand order.
    ///
    /// Operand order is the order values were pushed: receiver before arguments, left before
    /// right. Structured nodes list their test or key first, followed by their blocks.
    #[must_use]
    pub fn children(&self) -> Vec<&Instruction> {
        let mut out = Vec::new();
        match &self.kind {
            InstructionKind::AConstNull
            | InstructionKind::IConst { .. }
            | InstructionKind::LConst { .. }
            | InstructionKind::FConst { .. }
            | InstructionKind::DConst { .. }
            | InstructionKind::Ldc { .. }
            | InstructionKind::Ldc2W { .. }
            | InstructionKind::ILoad { .. }
            | InstructionKind::LLoad { .. }
            | InstructionKind::FLoad { .. }
            | InstructionKind::DLoad { .. }
            | InstructionKind::ALoad { .. }
            | InstructionKind::IInc { .. }
            | InstructionKind::ExceptionLoad { .. }
            | InstructionKind::ReturnAddressLoad
            | InstructionKind::DupLoad { .. }
            | InstructionKind::GetStatic { .. }
            | InstructionKind::OuterThis { .. }
            | InstructionKind::New { .. }
            | InstructionKind::Return
            | InstructionKind::Goto { .. }
            | InstructionKind::Jsr { .. }
            | InstructionKind::Ret { .. }
            | InstructionKind::Break { .. }
            | InstructionKind::Continue { .. } => {}
            InstructionKind::IStore { value, .. }
            | InstructionKind::LStore { value, .. }
            | InstructionKind::FStore { value, .. }
            | InstructionKind::DStore { value, .. }
            | InstructionKind::AStore { value, .. }
            | InstructionKind::DupStore { value, .. }
            | InstructionKind::Pop { value }
            | InstructionKind::UnaryOp { value, .. }
            | InstructionKind::Convert { value, .. }
            | InstructionKind::PreIncrement { value, .. }
            | InstructionKind::PostIncrement { value, .. }
            | InstructionKind::PutStatic { value, .. }
            | InstructionKind::XReturn { value }
            | InstructionKind::AThrow { value }
            | InstructionKind::If { value, .. }
            | InstructionKind::IfNull { value, .. } => out.push(&**value),
            InstructionKind::BinaryOp { left, right, .. }
            | InstructionKind::Compare { left, right, .. }
            | InstructionKind::IfCmp { left, right, .. } => {
                out.push(&**left);
                out.push(&**right);
            }
            InstructionKind::Assignment { target, value, .. } => {
                out.push(&**target);
                out.push(&**value);
            }
            InstructionKind::Ternary {
                test,
                then_value,
                else_value,
            } => {
                out.push(&**test);
                out.push(&**then_value);
                out.push(&**else_value);
            }
            InstructionKind::GetField { objectref, .. }
            | InstructionKind::CheckCast { objectref, .. }
            | InstructionKind::InstanceOf { objectref, .. }
            | InstructionKind::MonitorEnter { objectref }
            | InstructionKind::MonitorExit { objectref } => out.push(&**objectref),
            InstructionKind::PutField {
                objectref, value, ..
            } => {
                out.push(&**objectref);
                out.push(&**value);
            }
            InstructionKind::ArrayLoad { array, index, .. } => {
                out.push(&**array);
                out.push(&**index);
            }
            InstructionKind::ArrayStore {
                array,
                index,
                value,
                ..
            } => {
                out.push(&**array);
                out.push(&**index);
                out.push(&**value);
            }
            InstructionKind::ArrayLength { array } => out.push(&**array),
            InstructionKind::NewArray { dimension, .. }
            | InstructionKind::ANewArray { dimension, .. } => out.push(&**dimension),
            InstructionKind::MultiANewArray { dimensions, .. } => out.extend(dimensions.iter()),
            InstructionKind::InitArray { values, .. } => out.extend(values.iter()),
            InstructionKind::InvokeVirtual {
                objectref, args, ..
            }
            | InstructionKind::InvokeSpecial {
                objectref, args, ..
            }
            | InstructionKind::InvokeInterface {
                objectref, args, ..
            } => {
                out.push(&**objectref);
                out.extend(args.iter());
            }
            InstructionKind::InvokeStatic { args, .. }
            | InstructionKind::InvokeNew { args, .. }
            | InstructionKind::InvokeDynamic { args, .. } => out.extend(args.iter()),
            InstructionKind::ComplexIf { conditions, .. } => out.extend(conditions.iter()),
            InstructionKind::TableSwitch { key, .. } | InstructionKind::LookupSwitch { key, .. } => {
                out.push(&**key);
            }
            InstructionKind::StructuredIf {
                test,
                then_block,
                else_block,
            } => {
                out.push(&**test);
                out.extend(then_block.iter());
                out.extend(else_block.iter());
            }
            InstructionKind::Loop {
                init,
                test,
                update,
                body,
                ..
            } => {
                out.extend(init.iter());
                if let Some(test) = test {
                    out.push(&**test);
                }
                out.extend(update.iter());
                out.extend(body.iter());
            }
            InstructionKind::ForEach {
                variable,
                iterable,
                body,
            } => {
                out.push(&**variable);
                out.push(&**iterable);
                out.extend(body.iter());
            }
            InstructionKind::Switch { key, cases } => {
                out.push(&**key);
                for case in cases {
                    out.extend(case.body.iter());
                }
            }
            InstructionKind::Try {
                body,
                catches,
                finally_block,
            } => {
                out.extend(body.iter());
                for clause in catches {
                    out.extend(clause.body.iter());
                }
                out.extend(finally_block.iter());
            }
            InstructionKind::Synchronized { monitor, body } => {
                out.push(&**monitor);
                out.extend(body.iter());
            }
            InstructionKind::Labeled { body, .. } => out.extend(body.iter()),
            InstructionKind::Declaration { value, .. } => {
                if let Some(value) = value {
                    out.push(&**value);
                }
            }
            InstructionKind::Opaque { operands, .. } => out.extend(operands.iter()),
        }
        out
    }

    /// Returns mutable references to the children, in the same order as [`Self::children`].
    pub fn children_mut(&mut self) -> Vec<&mut Instruction> {
        let mut out = Vec::new();
        match &mut self.kind {
            InstructionKind::AConstNull
            | InstructionKind::IConst { .. }
            | InstructionKind::LConst { .. }
            | InstructionKind::FConst { .. }
            | InstructionKind::DConst { .. }
            | InstructionKind::Ldc { .. }
            | InstructionKind::Ldc2W { .. }
            | InstructionKind::ILoad { .. }
            | InstructionKind::LLoad { .. }
            | InstructionKind::FLoad { .. }
            | InstructionKind::DLoad { .. }
            | InstructionKind::ALoad { .. }
            | InstructionKind::IInc { .. }
            | InstructionKind::ExceptionLoad { .. }
            | InstructionKind::ReturnAddressLoad
            | InstructionKind::DupLoad { .. }
            | InstructionKind::GetStatic { .. }
            | InstructionKind::OuterThis { .. }
            | InstructionKind::New { .. }
            | InstructionKind::Return
            | InstructionKind::Goto { .. }
            | InstructionKind::Jsr { .. }
            | InstructionKind::Ret { .. }
            | InstructionKind::Break { .. }
            | InstructionKind::Continue { .. } => {}
            InstructionKind::IStore { value, .. }
            | InstructionKind::LStore { value, .. }
            | InstructionKind::FStore { value, .. }
            | InstructionKind::DStore { value, .. }
            | InstructionKind::AStore { value, .. }
            | InstructionKind::DupStore { value, .. }
            | InstructionKind::Pop { value }
            | InstructionKind::UnaryOp { value, .. }
            | InstructionKind::Convert { value, .. }
            | InstructionKind::PreIncrement { value, .. }
            | InstructionKind::PostIncrement { value, .. }
            | InstructionKind::PutStatic { value, .. }
            | InstructionKind::XReturn { value }
            | InstructionKind::AThrow { value }
            | InstructionKind::If { value, .. }
            | InstructionKind::IfNull { value, .. } => out.push(&mut **value),
            InstructionKind::BinaryOp { left, right, .. }
            | InstructionKind::Compare { left, right, .. }
            | InstructionKind::IfCmp { left, right, .. } => {
                out.push(&mut **left);
                out.push(&mut **right);
            }
            InstructionKind::Assignment { target, value, .. } => {
                out.push(&mut **target);
                out.push(&mut **value);
            }
            InstructionKind::Ternary {
                test,
                then_value,
                else_value,
            } => {
                out.push(&mut **test);
                out.push(&mut **then_value);
                out.push(&mut **else_value);
            }
            InstructionKind::GetField { objectref, .. }
            | InstructionKind::CheckCast { objectref, .. }
            | InstructionKind::InstanceOf { objectref, .. }
            | InstructionKind::MonitorEnter { objectref }
            | InstructionKind::MonitorExit { objectref } => out.push(&mut **objectref),
            InstructionKind::PutField {
                objectref, value, ..
            } => {
                out.push(&mut **objectref);
                out.push(&mut **value);
            }
            InstructionKind::ArrayLoad { array, index, .. } => {
                out.push(&mut **array);
                out.push(&mut **index);
            }
            InstructionKind::ArrayStore {
                array,
                index,
                value,
                ..
            } => {
                out.push(&mut **array);
                out.push(&mut **index);
                out.push(&mut **value);
            }
            InstructionKind::ArrayLength { array } => out.push(&mut **array),
            InstructionKind::NewArray { dimension, .. }
            | InstructionKind::ANewArray { dimension, .. } => out.push(&mut **dimension),
            InstructionKind::MultiANewArray { dimensions, .. } => {
                out.extend(dimensions.iter_mut());
            }
            InstructionKind::InitArray { values, .. } => out.extend(values.iter_mut()),
            InstructionKind::InvokeVirtual {
                objectref, args, ..
            }
            | InstructionKind::InvokeSpecial {
                objectref, args, ..
            }
            | InstructionKind::InvokeInterface {
                objectref, args, ..
            } => {
                out.push(&mut **objectref);
                out.extend(args.iter_mut());
            }
            InstructionKind::InvokeStatic { args, .. }
            | InstructionKind::InvokeNew { args, .. }
            | InstructionKind::InvokeDynamic { args, .. } => out.extend(args.iter_mut()),
            InstructionKind::ComplexIf { conditions, .. } => out.extend(conditions.iter_mut()),
            InstructionKind::TableSwitch { key, .. } | InstructionKind::LookupSwitch { key, .. } => {
                out.push(&mut **key);
            }
            InstructionKind::StructuredIf {
                test,
                then_block,
                else_block,
            } => {
                out.push(&mut **test);
                out.extend(then_block.iter_mut());
                out.extend(else_block.iter_mut());
            }
            InstructionKind::Loop {
                init,
                test,
                update,
                body,
                ..
            } => {
                out.extend(init.iter_mut());
                if let Some(test) = test {
                    out.push(&mut **test);
                }
                out.extend(update.iter_mut());
                out.extend(body.iter_mut());
            }
            InstructionKind::ForEach {
                variable,
                iterable,
                body,
            } => {
                out.push(&mut **variable);
                out.push(&mut **iterable);
                out.extend(body.iter_mut());
            }
            InstructionKind::Switch { key, cases } => {
                out.push(&mut **key);
                for case in cases {
                    out.extend(case.body.iter_mut());
                }
            }
            InstructionKind::Try {
                body,
                catches,
                finally_block,
            } => {
                out.extend(body.iter_mut());
                for clause in catches {
                    out.extend(clause.body.iter_mut());
                }
                out.extend(finally_block.iter_mut());
            }
            InstructionKind::Synchronized { monitor, body } => {
                out.push(&mut **monitor);
                out.extend(body.iter_mut());
            }
            InstructionKind::Labeled { body, .. } => out.extend(body.iter_mut()),
            InstructionKind::Declaration { value, .. } => {
                if let Some(value) = value {
                    out.push(&mut **value);
                }
            }
            InstructionKind::Opaque { operands, .. } => out.extend(operands.iter_mut()),
        }
        out
    }

    /// Returns the number of nodes in this subtree, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Instruction::node_count)
            .sum::<usize>()
    }
}

impl InstructionKind {
    /// Returns the opcode tag of this payload.
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        match self {
            InstructionKind::AConstNull => Opcode::AConstNull,
            InstructionKind::IConst { .. } => Opcode::IConst,
            InstructionKind::LConst { .. } => Opcode::LConst,
            InstructionKind::FConst { .. } => Opcode::FConst,
            InstructionKind::DConst { .. } => Opcode::DConst,
            InstructionKind::Ldc { .. } => Opcode::Ldc,
            InstructionKind::Ldc2W { .. } => Opcode::Ldc2W,
            InstructionKind::ILoad { .. } => Opcode::ILoad,
            InstructionKind::LLoad { .. } => Opcode::LLoad,
            InstructionKind::FLoad { .. } => Opcode::FLoad,
            InstructionKind::DLoad { .. } => Opcode::DLoad,
            InstructionKind::ALoad { .. } => Opcode::ALoad,
            InstructionKind::IStore { .. } => Opcode::IStore,
            InstructionKind::LStore { .. } => Opcode::LStore,
            InstructionKind::FStore { .. } => Opcode::FStore,
            InstructionKind::DStore { .. } => Opcode::DStore,
            InstructionKind::AStore { .. } => Opcode::AStore,
            InstructionKind::IInc { .. } => Opcode::IInc,
            InstructionKind::ExceptionLoad { .. } => Opcode::ExceptionLoad,
            InstructionKind::ReturnAddressLoad => Opcode::ReturnAddressLoad,
            InstructionKind::DupStore { .. } => Opcode::DupStore,
            InstructionKind::DupLoad { .. } => Opcode::DupLoad,
            InstructionKind::Pop { .. } => Opcode::Pop,
            InstructionKind::BinaryOp { .. } => Opcode::BinaryOp,
            InstructionKind::UnaryOp { .. } => Opcode::UnaryOp,
            InstructionKind::Compare { .. } => Opcode::Compare,
            InstructionKind::Convert { .. } => Opcode::Convert,
            InstructionKind::PreIncrement { .. } => Opcode::PreIncrement,
            InstructionKind::PostIncrement { .. } => Opcode::PostIncrement,
            InstructionKind::Assignment { .. } => Opcode::Assignment,
            InstructionKind::Ternary { .. } => Opcode::Ternary,
            InstructionKind::GetField { .. } => Opcode::GetField,
            InstructionKind::PutField { .. } => Opcode::PutField,
            InstructionKind::GetStatic { .. } => Opcode::GetStatic,
            InstructionKind::PutStatic { .. } => Opcode::PutStatic,
            InstructionKind::OuterThis { .. } => Opcode::OuterThis,
            InstructionKind::ArrayLoad { .. } => Opcode::ArrayLoad,
            InstructionKind::ArrayStore { .. } => Opcode::ArrayStore,
            InstructionKind::ArrayLength { .. } => Opcode::ArrayLength,
            InstructionKind::NewArray { .. } => Opcode::NewArray,
            InstructionKind::ANewArray { .. } => Opcode::ANewArray,
            InstructionKind::MultiANewArray { .. } => Opcode::MultiANewArray,
            InstructionKind::InitArray { .. } => Opcode::InitArray,
            InstructionKind::New { .. } => Opcode::New,
            InstructionKind::CheckCast { .. } => Opcode::CheckCast,
            InstructionKind::InstanceOf { .. } => Opcode::InstanceOf,
            InstructionKind::InvokeVirtual { .. } => Opcode::InvokeVirtual,
            InstructionKind::InvokeSpecial { .. } => Opcode::InvokeSpecial,
            InstructionKind::InvokeInterface { .. } => Opcode::InvokeInterface,
            InstructionKind::InvokeStatic { .. } => Opcode::InvokeStatic,
            InstructionKind::InvokeNew { .. } => Opcode::InvokeNew,
            InstructionKind::InvokeDynamic { .. } => Opcode::InvokeDynamic,
            InstructionKind::Return => Opcode::Return,
            InstructionKind::XReturn { .. } => Opcode::XReturn,
            InstructionKind::AThrow { .. } => Opcode::AThrow,
            InstructionKind::Goto { .. } => Opcode::Goto,
            InstructionKind::If { .. } => Opcode::If,
            InstructionKind::IfCmp { .. } => Opcode::IfCmp,
            InstructionKind::IfNull { .. } => Opcode::IfNull,
            InstructionKind::ComplexIf { .. } => Opcode::ComplexIf,
            InstructionKind::Jsr { .. } => Opcode::Jsr,
            InstructionKind::Ret { .. } => Opcode::Ret,
            InstructionKind::TableSwitch { .. } => Opcode::TableSwitch,
            InstructionKind::LookupSwitch { .. } => Opcode::LookupSwitch,
            InstructionKind::MonitorEnter { .. } => Opcode::MonitorEnter,
            InstructionKind::MonitorExit { .. } => Opcode::MonitorExit,
            InstructionKind::StructuredIf { .. } => Opcode::StructuredIf,
            InstructionKind::Loop { .. } => Opcode::Loop,
            InstructionKind::ForEach { .. } => Opcode::ForEach,
            InstructionKind::Switch { .. } => Opcode::Switch,
            InstructionKind::Try { .. } => Opcode::Try,
            InstructionKind::Synchronized { .. } => Opcode::Synchronized,
            InstructionKind::Labeled { .. } => Opcode::Labeled,
            InstructionKind::Break { .. } => Opcode::Break,
            InstructionKind::Continue { .. } => Opcode::Continue,
            InstructionKind::Declaration { .. } => Opcode::Declaration,
            InstructionKind::Opaque { .. } => Opcode::Opaque,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(slot: u16) -> Instruction {
        Instruction::new(
            u32::from(slot),
            None,
            InstructionKind::ILoad { slot },
        )
    }

    #[test]
    fn test_children_operand_order() {
        let call = Instruction::new(
            9,
            Some(3),
            InstructionKind::InvokeVirtual {
                index: 1,
                objectref: Box::new(load(0)),
                args: vec![load(1), load(2)],
            },
        );
        let offsets: Vec<u32> = call.children().iter().map(|c| c.offset).collect();
        assert_eq!(offsets, vec![0, 1, 2]);
        assert_eq!(call.node_count(), 4);
    }

    #[test]
    fn test_wrap_keeps_position() {
        let mut node = load(5);
        node.line = Some(42);
        node.wrap(|inner| InstructionKind::Convert {
            signature: "J".to_string(),
            value: inner,
        });

        assert_eq!(node.offset, 5);
        assert_eq!(node.line, Some(42));
        match &node.kind {
            InstructionKind::Convert { value, .. } => assert_eq!(value.opcode(), Opcode::ILoad),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_replace_kind_moves_children() {
        let mut node = Instruction::new(
            0,
            None,
            InstructionKind::Pop {
                value: Box::new(load(1)),
            },
        );
        node.replace_kind(|kind| match kind {
            InstructionKind::Pop { value } => InstructionKind::XReturn { value },
            other => other,
        });
        assert_eq!(node.opcode(), Opcode::XReturn);
        assert_eq!(node.children()[0].offset, 1);
    }

    #[test]
    fn test_children_mut_allows_rewrite() {
        let mut node = Instruction::new(
            0,
            None,
            InstructionKind::BinaryOp {
                op: BinaryOperator::Add,
                signature: "I".to_string(),
                left: Box::new(load(1)),
                right: Box::new(load(2)),
            },
        );
        for child in node.children_mut() {
            child.kind = InstructionKind::IConst {
                signature: "I".to_string(),
                value: 0,
            };
        }
        assert!(node
            .children()
            .iter()
            .all(|c| c.opcode() == Opcode::IConst));
    }
}
