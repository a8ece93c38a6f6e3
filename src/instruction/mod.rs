//! The instruction forest.
//!
//! Every method is represented as a list of statement roots, each the root of a tree of
//! [`Instruction`] nodes produced by stack simulation of the method's bytecode. The node kinds
//! form a closed sum type, [`InstructionKind`], so every pass matches on it exhaustively and a
//! new kind cannot be silently skipped.
//!
//! # Key Components
//!
//! - [`Instruction`] - a positioned node
//! - [`InstructionKind`] - the opcode-specific payload of a node
//! - [`Opcode`] - payload-free tag of a node kind
//! - [`MethodBody`] - statements plus the local variable table of one method
//! - [`ops`] - operator enums carried by arithmetic, comparison and loop nodes

mod body;
#[allow(clippy::module_inception)]
mod instruction;
mod opcode;
pub mod ops;

pub use body::MethodBody;
pub use instruction::{CatchClause, DupId, Instruction, InstructionKind, SwitchCase};
pub use opcode::Opcode;
