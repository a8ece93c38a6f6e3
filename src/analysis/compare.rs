//! Structural equality of instruction trees.
//!
//! Two trees are structurally equal when their node kinds match, every scalar payload field
//! (operator, signature, constant value, slot, constant-pool index, dup identity) is equal, and
//! all children are pairwise equal in order. Byte offsets and line numbers are never compared.
//!
//! # Branch Targets
//!
//! Branch targets are excluded: `Goto`, `If`, `IfCmp`, `IfNull`, `ComplexIf` and `Jsr` compare
//! equal regardless of where they jump, and `TableSwitch`/`LookupSwitch` compare their key,
//! their case values and the number of targets but not the target offsets. javac copies a
//! `finally` body onto every exit edge, and each copy branches to a different successor; with
//! targets excluded the copies compare equal and can be merged back into one block.
//!
//! Labels of reconstructed `Labeled` blocks and of `break`/`continue` statements are compared.
//!
//! # Unrecognized Nodes
//!
//! An [`InstructionKind::Opaque`] node never compares equal, not even to itself. The comparator
//! reports it through [`Diagnostics`] when one is attached, so callers can tell a genuine
//! mismatch from a conservative one.
//!
//! # Depth
//!
//! Comparison recurses once per nesting level. Trees nested deeper than the limit (by default
//! [`DEFAULT_MAX_DEPTH`], the same limit the passes descend to) compare unequal and are
//! reported as too deep.

use std::cell::Cell;

use crate::{
    instruction::{CatchClause, Instruction, InstructionKind, SwitchCase},
    normalizer::{DiagnosticCategory, Diagnostics, DEFAULT_MAX_DEPTH},
};

/// Deep equality predicate over instruction trees.
///
/// # Examples
///
/// ```rust
/// use jnorm::analysis::StructuralComparator;
/// use jnorm::instruction::{Instruction, InstructionKind};
///
/// let jump = |target| Instruction::new(0, None, InstructionKind::Goto { target });
/// assert!(StructuralComparator::new().equal(&jump(10), &jump(42)));
/// ```
#[derive(Debug, Clone)]
pub struct StructuralComparator<'a> {
    diagnostics: Option<&'a Diagnostics>,
    max_depth: usize,
    depth: Cell<usize>,
}

impl Default for StructuralComparator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> StructuralComparator<'a> {
    /// Creates a comparator that reports nothing.
    #[must_use]
    pub fn new() -> Self {
        StructuralComparator {
            diagnostics: None,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: Cell::new(0),
        }
    }

    /// Creates a comparator that reports unrecognized and too deeply nested nodes to
    /// `diagnostics`.
    #[must_use]
    pub fn with_diagnostics(diagnostics: &'a Diagnostics) -> Self {
        StructuralComparator {
            diagnostics: Some(diagnostics),
            ..Self::new()
        }
    }

    /// Sets the maximum nesting depth compared.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns true if two statement lists are pairwise structurally equal.
    #[must_use]
    pub fn equal_blocks(&self, a: &[Instruction], b: &[Instruction]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.equal(x, y))
    }

    /// Returns true if `a` and `b` are structurally equal.
    ///
    /// Returns false once the nesting exceeds the depth limit.
    #[must_use]
    pub fn equal(&self, a: &Instruction, b: &Instruction) -> bool {
        let depth = self.depth.get() + 1;
        if depth > self.max_depth {
            if let Some(diagnostics) = self.diagnostics {
                diagnostics.too_deep(DiagnosticCategory::Comparator, a, self.max_depth);
            }
            return false;
        }
        self.depth.set(depth);
        let equal = self.equal_kind(a, b);
        self.depth.set(depth - 1);
        equal
    }

    #[allow(clippy::too_many_lines)]
    fn equal_kind(&self, a: &Instruction, b: &Instruction) -> bool {
        use InstructionKind as K;

        macro_rules! other {
            ($pattern:pat) => {
                let $pattern = &b.kind else {
                    return false;
                };
            };
        }

        match &a.kind {
            K::AConstNull => matches!(b.kind, K::AConstNull),
            K::IConst { signature, value } => {
                other!(K::IConst { signature: s2, value: v2 });
                signature == s2 && value == v2
            }
            K::LConst { value } => {
                other!(K::LConst { value: v2 });
                value == v2
            }
            K::FConst { value } => {
                other!(K::FConst { value: v2 });
                value.to_bits() == v2.to_bits()
            }
            K::DConst { value } => {
                other!(K::DConst { value: v2 });
                value.to_bits() == v2.to_bits()
            }
            K::Ldc { index } => {
                other!(K::Ldc { index: i2 });
                index == i2
            }
            K::Ldc2W { index } => {
                other!(K::Ldc2W { index: i2 });
                index == i2
            }
            K::ILoad { slot } => {
                other!(K::ILoad { slot: s2 });
                slot == s2
            }
            K::LLoad { slot } => {
                other!(K::LLoad { slot: s2 });
                slot == s2
            }
            K::FLoad { slot } => {
                other!(K::FLoad { slot: s2 });
                slot == s2
            }
            K::DLoad { slot } => {
                other!(K::DLoad { slot: s2 });
                slot == s2
            }
            K::ALoad { slot, signature } => {
                other!(K::ALoad { slot: s2, signature: sig2 });
                slot == s2 && signature == sig2
            }
            K::IStore { slot, value } => {
                other!(K::IStore { slot: s2, value: v2 });
                slot == s2 && self.equal(value, v2)
            }
            K::LStore { slot, value } => {
                other!(K::LStore { slot: s2, value: v2 });
                slot == s2 && self.equal(value, v2)
            }
            K::FStore { slot, value } => {
                other!(K::FStore { slot: s2, value: v2 });
                slot == s2 && self.equal(value, v2)
            }
            K::DStore { slot, value } => {
                other!(K::DStore { slot: s2, value: v2 });
                slot == s2 && self.equal(value, v2)
            }
            K::AStore { slot, value } => {
                other!(K::AStore { slot: s2, value: v2 });
                slot == s2 && self.equal(value, v2)
            }
            K::IInc { slot, delta } => {
                other!(K::IInc { slot: s2, delta: d2 });
                slot == s2 && delta == d2
            }
            K::ExceptionLoad { slot, class_index } => {
                other!(K::ExceptionLoad { slot: s2, class_index: c2 });
                slot == s2 && class_index == c2
            }
            K::ReturnAddressLoad => matches!(b.kind, K::ReturnAddressLoad),
            K::DupStore { id, value } => {
                other!(K::DupStore { id: id2, value: v2 });
                id == id2 && self.equal(value, v2)
            }
            K::DupLoad { id } => {
                other!(K::DupLoad { id: id2 });
                id == id2
            }
            K::Pop { value } => {
                other!(K::Pop { value: v2 });
                self.equal(value, v2)
            }
            K::BinaryOp {
                op,
                signature,
                left,
                right,
            } => {
                other!(K::BinaryOp {
                    op: op2,
                    signature: s2,
                    left: l2,
                    right: r2,
                });
                op == op2 && signature == s2 && self.equal(left, l2) && self.equal(right, r2)
            }
            K::UnaryOp {
                op,
                signature,
                value,
            } => {
                other!(K::UnaryOp {
                    op: op2,
                    signature: s2,
                    value: v2,
                });
                op == op2 && signature == s2 && self.equal(value, v2)
            }
            K::Compare { kind, left, right } => {
                other!(K::Compare {
                    kind: k2,
                    left: l2,
                    right: r2,
                });
                kind == k2 && self.equal(left, l2) && self.equal(right, r2)
            }
            K::Convert { signature, value } => {
                other!(K::Convert {
                    signature: s2,
                    value: v2,
                });
                signature == s2 && self.equal(value, v2)
            }
            K::PreIncrement { delta, value } => {
                other!(K::PreIncrement { delta: d2, value: v2 });
                delta == d2 && self.equal(value, v2)
            }
            K::PostIncrement { delta, value } => {
                other!(K::PostIncrement { delta: d2, value: v2 });
                delta == d2 && self.equal(value, v2)
            }
            K::Assignment { op, target, value } => {
                other!(K::Assignment {
                    op: op2,
                    target: t2,
                    value: v2,
                });
                op == op2 && self.equal(target, t2) && self.equal(value, v2)
            }
            K::Ternary {
                test,
                then_value,
                else_value,
            } => {
                other!(K::Ternary {
                    test: t2,
                    then_value: th2,
                    else_value: e2,
                });
                self.equal(test, t2) && self.equal(then_value, th2) && self.equal(else_value, e2)
            }
            K::GetField { index, objectref } => {
                other!(K::GetField {
                    index: i2,
                    objectref: o2,
                });
                index == i2 && self.equal(objectref, o2)
            }
            K::PutField {
                index,
                objectref,
                value,
            } => {
                other!(K::PutField {
                    index: i2,
                    objectref: o2,
                    value: v2,
                });
                index == i2 && self.equal(objectref, o2) && self.equal(value, v2)
            }
            K::GetStatic { index } => {
                other!(K::GetStatic { index: i2 });
                index == i2
            }
            K::PutStatic { index, value } => {
                other!(K::PutStatic { index: i2, value: v2 });
                index == i2 && self.equal(value, v2)
            }
            K::OuterThis { class_index } => {
                other!(K::OuterThis { class_index: c2 });
                class_index == c2
            }
            K::ArrayLoad {
                signature,
                array,
                index,
            } => {
                other!(K::ArrayLoad {
                    signature: s2,
                    array: a2,
                    index: i2,
                });
                signature == s2 && self.equal(array, a2) && self.equal(index, i2)
            }
            K::ArrayStore {
                signature,
                array,
                index,
                value,
            } => {
                other!(K::ArrayStore {
                    signature: s2,
                    array: a2,
                    index: i2,
                    value: v2,
                });
                signature == s2
                    && self.equal(array, a2)
                    && self.equal(index, i2)
                    && self.equal(value, v2)
            }
            K::ArrayLength { array } => {
                other!(K::ArrayLength { array: a2 });
                self.equal(array, a2)
            }
            K::NewArray {
                signature,
                dimension,
            } => {
                other!(K::NewArray {
                    signature: s2,
                    dimension: d2,
                });
                signature == s2 && self.equal(dimension, d2)
            }
            K::ANewArray {
                class_index,
                dimension,
            } => {
                other!(K::ANewArray {
                    class_index: c2,
                    dimension: d2,
                });
                class_index == c2 && self.equal(dimension, d2)
            }
            K::MultiANewArray {
                class_index,
                dimensions,
            } => {
                other!(K::MultiANewArray {
                    class_index: c2,
                    dimensions: d2,
                });
                class_index == c2 && self.equal_blocks(dimensions, d2)
            }
            K::InitArray { signature, values } => {
                other!(K::InitArray {
                    signature: s2,
                    values: v2,
                });
                signature == s2 && self.equal_blocks(values, v2)
            }
            K::New { class_index } => {
                other!(K::New { class_index: c2 });
                class_index == c2
            }
            K::CheckCast {
                class_index,
                objectref,
            } => {
                other!(K::CheckCast {
                    class_index: c2,
                    objectref: o2,
                });
                class_index == c2 && self.equal(objectref, o2)
            }
            K::InstanceOf {
                class_index,
                objectref,
            } => {
                other!(K::InstanceOf {
                    class_index: c2,
                    objectref: o2,
                });
                class_index == c2 && self.equal(objectref, o2)
            }
            K::InvokeVirtual {
                index,
                objectref,
                args,
            } => {
                other!(K::InvokeVirtual {
                    index: i2,
                    objectref: o2,
                    args: a2,
                });
                index == i2 && self.equal(objectref, o2) && self.equal_blocks(args, a2)
            }
            K::InvokeSpecial {
                index,
                objectref,
                args,
            } => {
                other!(K::InvokeSpecial {
                    index: i2,
                    objectref: o2,
                    args: a2,
                });
                index == i2 && self.equal(objectref, o2) && self.equal_blocks(args, a2)
            }
            K::InvokeInterface {
                index,
                objectref,
                args,
            } => {
                other!(K::InvokeInterface {
                    index: i2,
                    objectref: o2,
                    args: a2,
                });
                index == i2 && self.equal(objectref, o2) && self.equal_blocks(args, a2)
            }
            K::InvokeStatic { index, args } => {
                other!(K::InvokeStatic { index: i2, args: a2 });
                index == i2 && self.equal_blocks(args, a2)
            }
            K::InvokeNew { index, args } => {
                other!(K::InvokeNew { index: i2, args: a2 });
                index == i2 && self.equal_blocks(args, a2)
            }
            K::InvokeDynamic { index, args } => {
                other!(K::InvokeDynamic { index: i2, args: a2 });
                index == i2 && self.equal_blocks(args, a2)
            }
            K::Return => matches!(b.kind, K::Return),
            K::XReturn { value } => {
                other!(K::XReturn { value: v2 });
                self.equal(value, v2)
            }
            K::AThrow { value } => {
                other!(K::AThrow { value: v2 });
                self.equal(value, v2)
            }
            K::Goto { .. } => matches!(b.kind, K::Goto { .. }),
            K::If { cmp, value, .. } => {
                other!(K::If {
                    cmp: c2, value: v2, ..
                });
                cmp == c2 && self.equal(value, v2)
            }
            K::IfCmp {
                cmp, left, right, ..
            } => {
                other!(K::IfCmp {
                    cmp: c2,
                    left: l2,
                    right: r2,
                    ..
                });
                cmp == c2 && self.equal(left, l2) && self.equal(right, r2)
            }
            K::IfNull { cmp, value, .. } => {
                other!(K::IfNull {
                    cmp: c2, value: v2, ..
                });
                cmp == c2 && self.equal(value, v2)
            }
            K::ComplexIf { op, conditions, .. } => {
                other!(K::ComplexIf {
                    op: op2,
                    conditions: c2,
                    ..
                });
                op == op2 && self.equal_blocks(conditions, c2)
            }
            K::Jsr { .. } => matches!(b.kind, K::Jsr { .. }),
            K::Ret { slot } => {
                other!(K::Ret { slot: s2 });
                slot == s2
            }
            K::TableSwitch {
                key, low, targets, ..
            } => {
                other!(K::TableSwitch {
                    key: k2,
                    low: l2,
                    targets: t2,
                    ..
                });
                low == l2 && targets.len() == t2.len() && self.equal(key, k2)
            }
            K::LookupSwitch {
                key, keys, targets, ..
            } => {
                other!(K::LookupSwitch {
                    key: k2,
                    keys: ks2,
                    targets: t2,
                    ..
                });
                keys == ks2 && targets.len() == t2.len() && self.equal(key, k2)
            }
            K::MonitorEnter { objectref } => {
                other!(K::MonitorEnter { objectref: o2 });
                self.equal(objectref, o2)
            }
            K::MonitorExit { objectref } => {
                other!(K::MonitorExit { objectref: o2 });
                self.equal(objectref, o2)
            }
            K::StructuredIf {
                test,
                then_block,
                else_block,
            } => {
                other!(K::StructuredIf {
                    test: t2,
                    then_block: th2,
                    else_block: e2,
                });
                self.equal(test, t2)
                    && self.equal_blocks(then_block, th2)
                    && self.equal_blocks(else_block, e2)
            }
            K::Loop {
                kind,
                init,
                test,
                update,
                body,
            } => {
                other!(K::Loop {
                    kind: k2,
                    init: i2,
                    test: t2,
                    update: u2,
                    body: b2,
                });
                let tests_equal = match (test, t2) {
                    (Some(x), Some(y)) => self.equal(x, y),
                    (None, None) => true,
                    _ => false,
                };
                kind == k2
                    && tests_equal
                    && self.equal_blocks(init, i2)
                    && self.equal_blocks(update, u2)
                    && self.equal_blocks(body, b2)
            }
            K::ForEach {
                variable,
                iterable,
                body,
            } => {
                other!(K::ForEach {
                    variable: v2,
                    iterable: i2,
                    body: b2,
                });
                self.equal(variable, v2) && self.equal(iterable, i2) && self.equal_blocks(body, b2)
            }
            K::Switch { key, cases } => {
                other!(K::Switch { key: k2, cases: c2 });
                self.equal(key, k2)
                    && cases.len() == c2.len()
                    && cases.iter().zip(c2).all(|(x, y)| self.equal_cases(x, y))
            }
            K::Try {
                body,
                catches,
                finally_block,
            } => {
                other!(K::Try {
                    body: b2,
                    catches: c2,
                    finally_block: f2,
                });
                self.equal_blocks(body, b2)
                    && catches.len() == c2.len()
                    && catches.iter().zip(c2).all(|(x, y)| self.equal_catches(x, y))
                    && self.equal_blocks(finally_block, f2)
            }
            K::Synchronized { monitor, body } => {
                other!(K::Synchronized {
                    monitor: m2,
                    body: b2,
                });
                self.equal(monitor, m2) && self.equal_blocks(body, b2)
            }
            K::Labeled { label, body } => {
                other!(K::Labeled {
                    label: l2,
                    body: b2,
                });
                label == l2 && self.equal_blocks(body, b2)
            }
            K::Break { label } => {
                other!(K::Break { label: l2 });
                label == l2
            }
            K::Continue { label } => {
                other!(K::Continue { label: l2 });
                label == l2
            }
            K::Declaration { slot, value } => {
                other!(K::Declaration {
                    slot: s2,
                    value: v2,
                });
                slot == s2
                    && match (value, v2) {
                        (Some(x), Some(y)) => self.equal(x, y),
                        (None, None) => true,
                        _ => false,
                    }
            }
            K::Opaque { .. } => {
                if let Some(diagnostics) = self.diagnostics {
                    diagnostics.unrecognized(DiagnosticCategory::Comparator, a);
                }
                false
            }
        }
    }

    fn equal_cases(&self, a: &SwitchCase, b: &SwitchCase) -> bool {
        a.labels == b.labels && a.is_default == b.is_default && self.equal_blocks(&a.body, &b.body)
    }

    fn equal_catches(&self, a: &CatchClause, b: &CatchClause) -> bool {
        a.class_index == b.class_index && a.slot == b.slot && self.equal_blocks(&a.body, &b.body)
    }
}

/// Returns true if `a` and `b` are structurally equal, without diagnostics.
#[must_use]
pub fn instructions_equal(a: &Instruction, b: &Instruction) -> bool {
    StructuralComparator::new().equal(a, b)
}
