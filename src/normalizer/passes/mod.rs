//! Built-in normalization passes.
//!
//! Each pass rewrites one compiler idiom back into the source construct it came from:
//!
//! - [`OuterAccessorPass`] - synthetic `access$NNN` bridges, captured `this$N` fields
//! - [`StringConcatPass`] - `StringBuilder` append chains
//! - [`CastCleanupPass`] - nested casts, untyped literal call arguments
//! - [`CastInsertionPass`] - casts erased by verification
//! - [`IndexOfPass`] - `char` literals of `String.indexOf`

mod cast_cleanup;
mod cast_insertion;
mod index_of;
mod outer_accessor;
mod string_concat;

pub use cast_cleanup::CastCleanupPass;
pub use cast_insertion::CastInsertionPass;
pub use index_of::IndexOfPass;
pub use outer_accessor::OuterAccessorPass;
pub use string_concat::StringConcatPass;
