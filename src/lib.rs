// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![warn(missing_docs)]
#![allow(dead_code)]
#![allow(clippy::too_many_arguments)]
#![deny(unsafe_code)]

//! # jnorm
//!
//! Instruction-tree normalization for Java decompilation. Given the expression forest a
//! bytecode stack simulation produced for each method, `jnorm` rewrites the idioms javac
//! leaves behind into the shapes a developer would have written, ready for control-flow
//! reconstruction and printing.
//!
//! ## Features
//!
//! - **Cast recovery** - restores casts erased by verification, collapses redundant ones
//! - **Literal typing** - types integer literals by the overload they are passed to
//! - **String concatenation** - folds `StringBuilder` append chains back into `+`
//! - **Accessor inlining** - replaces `access$NNN` bridges by direct member access
//! - **Outer instances** - canonicalizes `this$N` reads to `Outer.this`
//! - **Tree analysis** - structural equality and searches over the instruction forest
//! - **Parallel** - the methods of a class are normalized concurrently
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use jnorm::prelude::*;
//!
//! let pool = ConstantPool::new();
//! let index = pool.intern_methodref("java/lang/String", "indexOf", "(I)I")?;
//! let text = pool.intern_string("abc")?;
//!
//! // "abc".indexOf(65)
//! let call = Instruction::new(4, Some(10), InstructionKind::InvokeVirtual {
//!     index,
//!     objectref: Box::new(Instruction::new(0, Some(10), InstructionKind::Ldc { index: text })),
//!     args: vec![Instruction::new(2, Some(10), InstructionKind::IConst {
//!         signature: "B".to_string(),
//!         value: 65,
//!     })],
//! });
//! let mut method = MethodBody::new("find", "()I")
//!     .with_statement(Instruction::new(7, Some(10), InstructionKind::XReturn {
//!         value: Box::new(call),
//!     }));
//!
//! let class = Arc::new(ClassFile::new("com/example/Main", pool));
//! let ctx = PassContext::new(class, Arc::new(AccessorRegistry::new()));
//! let scheduler = PassScheduler::from_config(&ctx.config);
//!
//! assert!(scheduler.run_method(&mut method, &ctx)?);
//! assert!(ctx.events.has(EventKind::ConstantRetyped));
//! # Ok::<(), jnorm::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`classfile`] - constant pool, classes, local variable tables, accessor metadata
//! - [`instruction`] - the instruction forest: [`instruction::Instruction`] and its closed
//!   set of node kinds
//! - [`analysis`] - read-only structural comparison and tree searches
//! - [`normalizer`] - the passes, their scheduler, events and diagnostics
//! - [`prelude`] - convenient re-exports of commonly used types
//! - [`Error`] and [`Result`] - error handling
//!
//! ### Error Handling
//!
//! Failing to recognize an idiom is never an error: the node is left as it was. Nodes a pass
//! cannot interpret are reported through [`normalizer::Diagnostics`]. [`Error`] is reserved
//! for broken input and for invariant violations of upstream stages, such as a missing
//! instruction handed to a search.
//!
//! ### Thread Safety
//!
//! The constant pool serializes interning behind a lock, the accessor registry is a
//! concurrent map, and the event log and diagnostics are append-only concurrent vectors.
//! Method bodies are owned by the worker normalizing them.
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use jnorm::prelude::*;
///
/// let pool = ConstantPool::new();
/// let index = pool.intern_class("java/lang/Throwable")?;
/// assert_eq!(pool.class_name(index)?, "java/lang/Throwable");
/// # Ok::<(), jnorm::Error>(())
/// ```
pub mod prelude;

/// Upstream collaborators: constant pool, class files, local variables and accessors.
pub mod classfile;

/// The instruction forest produced by stack simulation.
pub mod instruction;

/// Read-only analyses over the instruction forest.
pub mod analysis;

/// The normalization passes and their scheduler.
pub mod normalizer;

/// `jnorm` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `jnorm` Error type
///
/// See [`Error`] for the conditions that are reported as errors rather than diagnostics.
pub use error::Error;
