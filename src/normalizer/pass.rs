//! Pass trait for the normalization pipeline.

use crate::{
    instruction::MethodBody,
    normalizer::{DiagnosticCategory, PassContext},
    Result,
};

/// A normalization pass that rewrites the instruction forest of one method.
///
/// All passes must be thread-safe (Send + Sync) so the methods of a class can be processed in
/// parallel. Passes receive mutable access to the method body and shared access to the
/// per-class context.
///
/// # Pipeline Integration
///
/// Passes don't declare their own ordering. The scheduler runs them in the conventional
/// order, where later passes assume the call shapes earlier ones produced:
///
/// 1. **Outer accessors**: bridge calls become direct member accesses
/// 2. **String concatenation**: builder chains become `+`
/// 3. **Cast cleanup**: nested casts collapse, call literals are retyped
/// 4. **Cast insertion**: erased casts are restored
/// 5. **indexOf typing**: `char` literals of `indexOf` calls are recovered
pub trait TreePass: Send + Sync {
    /// Unique name for logging and debugging.
    fn name(&self) -> &'static str;

    /// The diagnostic category this pass reports under.
    fn category(&self) -> DiagnosticCategory;

    /// Should this pass run on a specific method?
    ///
    /// Called before `run_on_method`. Override to skip methods that cannot contain the idiom
    /// the pass rewrites.
    fn should_run(&self, _method: &MethodBody, _ctx: &PassContext) -> bool {
        true
    }

    /// Run the pass on a single method.
    ///
    /// Returns `true` if any changes were made, `false` otherwise. Rewrites should be recorded
    /// to `ctx.events`, skipped nodes to `ctx.diagnostics`.
    ///
    /// # Errors
    ///
    /// Returns an error if the forest violates an invariant the pass relies on, or if the
    /// constant pool cannot take a fabricated entry.
    fn run_on_method(&self, method: &mut MethodBody, ctx: &PassContext) -> Result<bool>;

    /// Get a description of what this pass does.
    fn description(&self) -> &'static str {
        "No description available"
    }
}
