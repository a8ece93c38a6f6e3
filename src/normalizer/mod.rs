//! Tree-rewriting normalization of decompiled method bodies.
//!
//! The normalizer sits between stack simulation and control-flow reconstruction. It receives
//! the instruction forest of each method and rewrites compiler idioms in place, so that the
//! printed source reads like what a developer wrote.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Normalization Pipeline                       │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  PassContext                 Shared per-class state              │
//! │    ├─ ClassFile               (constant pool, enclosing chain)   │
//! │    ├─ AccessorRegistry        (decoded bridge methods)           │
//! │    ├─ EventLog                (rewrites performed)               │
//! │    └─ Diagnostics             (nodes skipped)                    │
//! │                                                                  │
//! │  PassScheduler               Runs each pass once per method      │
//! │    ├─ Outer accessors         access$NNN → member access         │
//! │    ├─ String concatenation    StringBuilder chain → a + b        │
//! │    ├─ Cast cleanup            (A)(B)x → (A)x, literal typing     │
//! │    ├─ Cast insertion          erased local loads → (T)x          │
//! │    └─ indexOf typing          indexOf(65) → indexOf('A')         │
//! │    Methods of a class run in parallel (rayon)                    │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use jnorm::prelude::*;
//!
//! let class = Arc::new(ClassFile::new("com/example/Main", ConstantPool::new()));
//! let ctx = PassContext::new(class, Arc::new(AccessorRegistry::new()));
//! let scheduler = PassScheduler::from_config(&ctx.config);
//!
//! let mut methods = vec![MethodBody::new("main", "([Ljava/lang/String;)V")];
//! let changed = scheduler.run_class(&mut methods, &ctx)?;
//! assert_eq!(changed, 0);
//! # Ok::<(), jnorm::Error>(())
//! ```

mod config;
mod context;
mod diagnostics;
mod events;
mod pass;
mod passes;
mod scheduler;
pub(crate) mod walk;

pub use config::{NormalizerConfig, DEFAULT_MAX_DEPTH};
pub use context::PassContext;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics};
pub use events::{Event, EventBuilder, EventKind, EventLog, EventLogIter};
pub use pass::TreePass;
pub use passes::{
    CastCleanupPass, CastInsertionPass, IndexOfPass, OuterAccessorPass, StringConcatPass,
};
pub use scheduler::PassScheduler;
