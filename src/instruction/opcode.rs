//! Opcode tags of instruction nodes.

use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

/// The tag of every [`crate::instruction::InstructionKind`] variant.
///
/// Tags are used where a node kind must be named without its payload: searching a tree for
/// the first node of a kind, and identifying the offending node in a diagnostic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumCount, EnumIter, IntoStaticStr,
)]
#[allow(missing_docs)]
pub enum Opcode {
    // Constants
    AConstNull,
    IConst,
    LConst,
    FConst,
    DConst,
    Ldc,
    Ldc2W,

    // Locals
    ILoad,
    LLoad,
    FLoad,
    DLoad,
    ALoad,
    IStore,
    LStore,
    FStore,
    DStore,
    AStore,
    IInc,
    ExceptionLoad,
    ReturnAddressLoad,

    // Stack bookkeeping
    DupStore,
    DupLoad,
    Pop,

    // Operators
    BinaryOp,
    UnaryOp,
    Compare,
    Convert,
    PreIncrement,
    PostIncrement,
    Assignment,
    Ternary,

    // Fields
    GetField,
    PutField,
    GetStatic,
    PutStatic,
    OuterThis,

    // Arrays
    ArrayLoad,
    ArrayStore,
    ArrayLength,
    NewArray,
    ANewArray,
    MultiANewArray,
    InitArray,

    // Objects
    New,
    CheckCast,
    InstanceOf,

    // Invocations
    InvokeVirtual,
    InvokeSpecial,
    InvokeInterface,
    InvokeStatic,
    InvokeNew,
    InvokeDynamic,

    // Exits
    Return,
    XReturn,
    AThrow,

    // Branches
    Goto,
    If,
    IfCmp,
    IfNull,
    ComplexIf,
    Jsr,
    Ret,
    TableSwitch,
    LookupSwitch,

    // Monitors
    MonitorEnter,
    MonitorExit,

    // Reconstructed control flow
    StructuredIf,
    Loop,
    ForEach,
    Switch,
    Try,
    Synchronized,
    Labeled,
    Break,
    Continue,
    Declaration,

    // Raw bytecode without a dedicated node
    Opaque,
}

impl Opcode {
    /// Returns true for the conditional and unconditional raw branch instructions.
    #[must_use]
    pub fn is_branch(self) -> bool {
        matches!(
            self,
            Opcode::Goto
                | Opcode::If
                | Opcode::IfCmp
                | Opcode::IfNull
                | Opcode::ComplexIf
                | Opcode::Jsr
                | Opcode::TableSwitch
                | Opcode::LookupSwitch
        )
    }

    /// Returns true for the invocation instructions.
    #[must_use]
    pub fn is_invocation(self) -> bool {
        matches!(
            self,
            Opcode::InvokeVirtual
                | Opcode::InvokeSpecial
                | Opcode::InvokeInterface
                | Opcode::InvokeStatic
                | Opcode::InvokeNew
                | Opcode::InvokeDynamic
        )
    }

    /// Returns true for nodes produced by control-flow reconstruction.
    #[must_use]
    pub fn is_structured(self) -> bool {
        matches!(
            self,
            Opcode::StructuredIf
                | Opcode::Loop
                | Opcode::ForEach
                | Opcode::Switch
                | Opcode::Try
                | Opcode::Synchronized
                | Opcode::Labeled
                | Opcode::Break
                | Opcode::Continue
                | Opcode::Declaration
        )
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_opcode_names() {
        assert_eq!(Opcode::InvokeStatic.to_string(), "InvokeStatic");
        let name: &'static str = Opcode::CheckCast.into();
        assert_eq!(name, "CheckCast");
    }

    #[test]
    fn test_categories_are_disjoint() {
        for opcode in Opcode::iter() {
            let categories = [opcode.is_branch(), opcode.is_invocation(), opcode.is_structured()];
            assert!(categories.iter().filter(|&&c| c).count() <= 1, "{opcode}");
        }
        assert_eq!(Opcode::iter().count(), Opcode::COUNT);
    }
}
