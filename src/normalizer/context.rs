//! Shared state handed to every pass.
//!
//! A [`PassContext`] is created once per class. It holds the collaborators the passes read
//! (the class with its enclosing chain, the accessor registry), the only state they mutate
//! besides the trees themselves (the constant pool, reached through the class), and the
//! event and diagnostic channels. All fields are safe to share between the worker threads
//! normalizing the methods of the class.

use std::sync::Arc;

use crate::{
    classfile::{AccessorRegistry, ClassFileRc, ConstantPool},
    normalizer::{Diagnostics, EventLog, NormalizerConfig},
};

/// Per-class context shared by all passes.
#[derive(Debug)]
pub struct PassContext {
    /// The class whose methods are being normalized.
    pub class: ClassFileRc,

    /// Decoded accessor bridges of this class and its enclosing classes.
    pub accessors: Arc<AccessorRegistry>,

    /// Accumulated rewrite events from all passes.
    pub events: EventLog,

    /// Nodes the passes skipped.
    pub diagnostics: Arc<Diagnostics>,

    /// Pipeline configuration.
    pub config: NormalizerConfig,
}

impl PassContext {
    /// Creates a context with the default configuration.
    #[must_use]
    pub fn new(class: ClassFileRc, accessors: Arc<AccessorRegistry>) -> Self {
        PassContext {
            class,
            accessors,
            events: EventLog::new(),
            diagnostics: Arc::new(Diagnostics::new()),
            config: NormalizerConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: NormalizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares an existing diagnostics container, e.g. one collecting for a whole archive.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Returns the constant pool of the class.
    #[must_use]
    pub fn pool(&self) -> &ConstantPool {
        &self.class.constant_pool
    }
}
