//! Configuration for the normalization pipeline.

/// Default limit on the nesting depth a pass descends into.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Configuration for the normalization pipeline.
///
/// Controls pass selection, parallel execution across the methods of a class, and the depth
/// limit guarding recursive descent into pathologically nested trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Enable outer-accessor inlining and outer-this canonicalization.
    pub enable_outer_accessors: bool,

    /// Enable string concatenation reconstruction.
    pub enable_string_concat: bool,

    /// Enable redundant cast collapse and call-argument constant typing.
    pub enable_cast_cleanup: bool,

    /// Enable cast insertion.
    pub enable_cast_insertion: bool,

    /// Enable `indexOf`/`lastIndexOf` literal typing.
    pub enable_index_of: bool,

    /// Normalize the methods of a class on the rayon thread pool.
    pub parallel: bool,

    /// Maximum nesting depth a pass descends into (default: 512).
    ///
    /// Deeper subtrees are reported through diagnostics and left untouched.
    pub max_depth: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            enable_outer_accessors: true,
            enable_string_concat: true,
            enable_cast_cleanup: true,
            enable_cast_insertion: true,
            enable_index_of: true,
            parallel: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl NormalizerConfig {
    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration with every pass disabled.
    ///
    /// Useful as a starting point for enabling a single pass in tests.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enable_outer_accessors: false,
            enable_string_concat: false,
            enable_cast_cleanup: false,
            enable_cast_insertion: false,
            enable_index_of: false,
            parallel: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets whether methods are normalized in parallel.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets which passes are enabled.
    ///
    /// # Arguments
    ///
    /// * `outer_accessors` - Outer-accessor inlining
    /// * `string_concat` - String concatenation reconstruction
    /// * `cast_cleanup` - Cast cleanup and constant typing
    /// * `cast_insertion` - Cast insertion
    /// * `index_of` - `indexOf` literal typing
    #[must_use]
    pub fn with_passes(
        mut self,
        outer_accessors: bool,
        string_concat: bool,
        cast_cleanup: bool,
        cast_insertion: bool,
        index_of: bool,
    ) -> Self {
        self.enable_outer_accessors = outer_accessors;
        self.enable_string_concat = string_concat;
        self.enable_cast_cleanup = cast_cleanup;
        self.enable_cast_insertion = cast_insertion;
        self.enable_index_of = index_of;
        self
    }

    /// Returns true if at least one pass is enabled.
    #[must_use]
    pub fn any_enabled(&self) -> bool {
        self.enable_outer_accessors
            || self.enable_string_concat
            || self.enable_cast_cleanup
            || self.enable_cast_insertion
            || self.enable_index_of
    }
}
