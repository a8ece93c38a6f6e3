//! # jnorm Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the jnorm library. Import this module to get quick access to the essential types for
//! building instruction forests and normalizing them.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all jnorm operations
pub use crate::Error;

/// The result type used throughout jnorm
pub use crate::Result;

// ================================================================================================
// Class File Collaborators
// ================================================================================================

/// Constant pool with deduplicating, thread-safe interning
pub use crate::classfile::{ConstantInfo, ConstantPool, MemberRef};

/// Classes and their enclosing chain
pub use crate::classfile::{ClassFile, ClassFileRc, FieldInfo, MethodInfo};

/// Access flags
pub use crate::classfile::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};

/// Local variable tables
pub use crate::classfile::{LocalVariable, LocalVariableId, LocalVariables};

/// Decoded accessor bridges
pub use crate::classfile::{Accessor, AccessorKind, AccessorRegistry};

/// Descriptor parsing
pub use crate::classfile::descriptor::MethodDescriptor;

// ================================================================================================
// Instruction Forest
// ================================================================================================

/// Nodes of the instruction forest
pub use crate::instruction::{
    CatchClause, DupId, Instruction, InstructionKind, MethodBody, Opcode, SwitchCase,
};

/// Operators carried by expression nodes
pub use crate::instruction::ops::{
    BinaryOperator, CompareKind, CompareOperator, LogicalOperator, LoopKind, UnaryOperator,
};

// ================================================================================================
// Analysis
// ================================================================================================

/// Structural equality and tree searches
pub use crate::analysis::{
    find_by_offset, find_by_opcode, find_duplicate_consumer, instructions_equal,
    StructuralComparator,
};

// ================================================================================================
// Normalization
// ================================================================================================

/// Pipeline driver and its configuration
pub use crate::normalizer::{NormalizerConfig, PassContext, PassScheduler, TreePass};

/// Rewrite events and diagnostics
pub use crate::normalizer::{
    Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics, Event, EventKind, EventLog,
};

/// Built-in passes
pub use crate::normalizer::{
    CastCleanupPass, CastInsertionPass, IndexOfPass, OuterAccessorPass, StringConcatPass,
};
