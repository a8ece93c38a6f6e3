//! Read-only analyses over the instruction forest.
//!
//! These are the leaves of the normalization pipeline: the passes and the out-of-scope
//! control-flow reconstruction (ternary recovery, `finally` deduplication) build on them, while
//! they depend on nothing but the data model.
//!
//! - [`StructuralComparator`] - deep equality that ignores positions and branch targets
//! - [`find_by_opcode`], [`find_by_offset`], [`find_duplicate_consumer`] - tree searches

mod compare;
mod search;

pub use compare::{instructions_equal, StructuralComparator};
pub use search::{
    find_by_offset, find_by_offset_in, find_by_opcode, find_by_opcode_in,
    find_duplicate_consumer,
};
