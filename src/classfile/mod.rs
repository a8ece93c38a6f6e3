//! Class file collaborators of the normalization passes.
//!
//! Parsing a class file is not part of this crate. This module holds the already-parsed pieces
//! the passes read and, in the case of the constant pool, extend:
//!
//! - [`ConstantPool`] - append-only, deduplicating table of structural constants
//! - [`ClassFile`] - class name, members and the lexical enclosing class
//! - [`LocalVariables`] - per-method table resolving `(slot, offset)` to a variable identity
//! - [`AccessorRegistry`] - decoded javac `access$NNN` bridges
//! - [`descriptor`] - descriptor parsing and type bit-fields
//! - [`access_flags`] - class, method and field access flags

pub mod access_flags;
mod accessor;
mod class_file;
mod constant_pool;
pub mod descriptor;
mod local_variables;

pub use access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
pub use accessor::{Accessor, AccessorKind, AccessorRc, AccessorRegistry};
pub use class_file::{ClassFile, ClassFileRc, FieldInfo, MethodInfo};
pub use constant_pool::{ConstantInfo, ConstantPool, MemberRef};
pub use local_variables::{LocalVariable, LocalVariableId, LocalVariables};
