//! Pass scheduler for orchestrating tree pass execution.
//!
//! The `PassScheduler` runs every registered pass once per method, in registration order. The
//! passes of this pipeline are idempotent and each one only relies on shapes produced by the
//! passes before it, so no fixpoint iteration is needed.

use rayon::prelude::*;

use crate::{
    instruction::MethodBody,
    normalizer::{
        passes::{
            CastCleanupPass, CastInsertionPass, IndexOfPass, OuterAccessorPass, StringConcatPass,
        },
        EventKind, NormalizerConfig, PassContext, TreePass,
    },
    Result,
};

/// Orchestrates tree pass execution over the methods of a class.
///
/// Built with [`PassScheduler::from_config`], the pipeline runs:
///
/// 1. **Outer accessors**: bridge calls become direct member accesses
/// 2. **String concatenation**: builder chains become `+`
/// 3. **Cast cleanup**: nested casts collapse, literal call arguments are typed
/// 4. **Cast insertion**: erased casts of local loads are restored
/// 5. **indexOf typing**: `char` literals of `String.indexOf` are recovered
#[derive(Default)]
pub struct PassScheduler {
    /// Passes, in execution order.
    passes: Vec<Box<dyn TreePass>>,
}

impl PassScheduler {
    /// Creates a scheduler without passes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler with the passes enabled in `config`, in pipeline order.
    #[must_use]
    pub fn from_config(config: &NormalizerConfig) -> Self {
        let mut scheduler = Self::new();
        if config.enable_outer_accessors {
            scheduler.add(Box::new(OuterAccessorPass::new()));
        }
        if config.enable_string_concat {
            scheduler.add(Box::new(StringConcatPass::new()));
        }
        if config.enable_cast_cleanup {
            scheduler.add(Box::new(CastCleanupPass::new()));
        }
        if config.enable_cast_insertion {
            scheduler.add(Box::new(CastInsertionPass::new()));
        }
        if config.enable_index_of {
            scheduler.add(Box::new(IndexOfPass::new()));
        }
        scheduler
    }

    /// Appends a pass to the pipeline.
    pub fn add(&mut self, pass: Box<dyn TreePass>) {
        self.passes.push(pass);
    }

    /// Returns the names of the registered passes, in execution order.
    #[must_use]
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Returns true if no pass is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Runs every pass once on a single method.
    ///
    /// Returns `true` if any pass changed the method. Events are accumulated in `ctx.events`,
    /// skipped nodes in `ctx.diagnostics`.
    ///
    /// # Errors
    ///
    /// Returns the first error a pass reports. Passes after the failing one do not run.
    pub fn run_method(&self, method: &mut MethodBody, ctx: &PassContext) -> Result<bool> {
        let mut changed = false;

        for pass in &self.passes {
            if !pass.should_run(method, ctx) {
                continue;
            }

            ctx.events
                .record(EventKind::PassStarted)
                .method(method.name.as_str())
                .pass(pass.name());
            log::debug!("{}: running on {}", pass.name(), method.name);

            let pass_changed = pass.run_on_method(method, ctx)?;
            changed |= pass_changed;

            ctx.events
                .record(EventKind::PassCompleted)
                .method(method.name.as_str())
                .message(if pass_changed { "changed" } else { "unchanged" })
                .pass(pass.name());
        }

        Ok(changed)
    }

    /// Runs the pipeline on every method of a class.
    ///
    /// Methods are processed in parallel when `ctx.config.parallel` is set. Each method body
    /// is owned by one worker; the constant pool, event log and diagnostics are shared.
    ///
    /// Returns the number of methods that changed.
    ///
    /// # Errors
    ///
    /// Returns an error if a pass fails on any method. With parallel execution, the other
    /// methods may already have been rewritten when the error is returned.
    pub fn run_class(&self, methods: &mut [MethodBody], ctx: &PassContext) -> Result<usize> {
        let results: Vec<bool> = if ctx.config.parallel {
            methods
                .par_iter_mut()
                .map(|method| self.run_method(method, ctx))
                .collect::<Result<_>>()?
        } else {
            methods
                .iter_mut()
                .map(|method| self.run_method(method, ctx))
                .collect::<Result<_>>()?
        };

        let changed = results.into_iter().filter(|&changed| changed).count();
        log::debug!(
            "{}: {} of {} method(s) changed",
            ctx.class.name,
            changed,
            methods.len()
        );
        Ok(changed)
    }
}
