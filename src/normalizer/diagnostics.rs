//! Diagnostics collection for the normalization passes.
//!
//! A pass that reaches a node it does not understand does not fail: it reports the node here
//! and leaves the subtree untouched, so decompilation of the class continues in a degraded but
//! complete state. Callers and tests inspect the collected entries to learn what was skipped.
//!
//! The [`Diagnostics`] container uses `boxcar::Vec` for thread-safe, lock-free append
//! operations, allowing diagnostics to be collected from methods normalized in parallel.
//!
//! # Usage Examples
//!
//! ```rust
//! use jnorm::normalizer::{Diagnostics, DiagnosticCategory};
//!
//! let diagnostics = Diagnostics::new();
//! diagnostics.warning(DiagnosticCategory::Comparator, "unrecognized opcode 0xba");
//!
//! assert!(diagnostics.has_warnings());
//! assert_eq!(diagnostics.by_category(DiagnosticCategory::Comparator).len(), 1);
//! ```

use std::fmt::{self, Write};

use crate::instruction::{Instruction, InstructionKind, Opcode};

/// Severity level of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Informational message, not indicating a problem.
    Info,

    /// A node was skipped; the output for that expression is less idiomatic than it could be.
    Warning,

    /// Something failed that the caller should look at.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// The component that reported a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Structural equality comparison.
    Comparator,
    /// Cast insertion pass.
    CastInsertion,
    /// Cast cleanup and constant typing pass.
    CastCleanup,
    /// `indexOf`/`lastIndexOf` constant typing pass.
    IndexOf,
    /// String concatenation reconstruction pass.
    StringConcat,
    /// Outer-accessor inlining pass.
    OuterAccessor,
    /// The pass scheduler itself.
    Scheduler,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Comparator => write!(f, "Comparator"),
            DiagnosticCategory::CastInsertion => write!(f, "CastInsertion"),
            DiagnosticCategory::CastCleanup => write!(f, "CastCleanup"),
            DiagnosticCategory::IndexOf => write!(f, "IndexOf"),
            DiagnosticCategory::StringConcat => write!(f, "StringConcat"),
            DiagnosticCategory::OuterAccessor => write!(f, "OuterAccessor"),
            DiagnosticCategory::Scheduler => write!(f, "Scheduler"),
        }
    }
}

/// A single diagnostic entry with context information.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level of this diagnostic.
    pub severity: DiagnosticSeverity,

    /// Component that reported this diagnostic.
    pub category: DiagnosticCategory,

    /// Human-readable description of the issue.
    pub message: String,

    /// Byte offset of the offending node.
    pub offset: Option<u32>,

    /// Opcode of the offending node.
    pub opcode: Option<Opcode>,

    /// Raw bytecode of the offending node, for nodes without a dedicated kind.
    pub raw_opcode: Option<u8>,
}

impl Diagnostic {
    /// Creates a new diagnostic entry.
    ///
    /// # Arguments
    ///
    /// * `severity` - Severity level of the diagnostic
    /// * `category` - Component reporting the diagnostic
    /// * `message` - Human-readable description
    pub fn new(
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            offset: None,
            opcode: None,
            raw_opcode: None,
        }
    }

    /// Adds the byte offset of the offending node.
    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Adds the opcode of the offending node.
    #[must_use]
    pub fn with_opcode(mut self, opcode: Opcode) -> Self {
        self.opcode = Some(opcode);
        self
    }

    /// Adds the position and opcode of `node`.
    #[must_use]
    pub fn with_node(mut self, node: &Instruction) -> Self {
        self.offset = Some(node.offset);
        self.opcode = Some(node.opcode());
        if let InstructionKind::Opaque { opcode, .. } = node.kind {
            self.raw_opcode = Some(opcode);
        }
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;

        if let Some(opcode) = self.opcode {
            write!(f, " (opcode: {opcode})")?;
        }

        if let Some(raw) = self.raw_opcode {
            write!(f, " (bytecode: 0x{raw:02x})")?;
        }

        if let Some(offset) = self.offset {
            write!(f, " (offset: {offset})")?;
        }

        Ok(())
    }
}

/// Thread-safe container for collecting diagnostic entries.
#[derive(Debug)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Creates a new empty diagnostics container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Adds an informational diagnostic.
    pub fn info(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message));
    }

    /// Adds a warning diagnostic.
    pub fn warning(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            message,
        ));
    }

    /// Adds an error diagnostic.
    pub fn error(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Error,
            category,
            message,
        ));
    }

    /// Reports a node the component has no handling for.
    ///
    /// The entry is a warning carrying the node's offset and opcode, mirrored to `log::warn!`.
    pub fn unrecognized(&self, category: DiagnosticCategory, node: &Instruction) {
        let diagnostic = Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            "unrecognized opcode, subtree left untouched",
        )
        .with_node(node);
        log::warn!("{diagnostic}");
        self.push(diagnostic);
    }

    /// Reports a subtree nested deeper than the configured limit.
    pub fn too_deep(&self, category: DiagnosticCategory, node: &Instruction, max_depth: usize) {
        let diagnostic = Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            format!("nesting exceeds {max_depth} levels, subtree left untouched"),
        )
        .with_node(node);
        log::warn!("{diagnostic}");
        self.push(diagnostic);
    }

    /// Adds a diagnostic entry directly.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns true if any diagnostics have been collected.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns true if any error-level diagnostics have been collected.
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns true if any warning-level diagnostics have been collected.
    pub fn has_warnings(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Warning)
    }

    /// Returns the total number of diagnostics.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns the number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.count_severity(DiagnosticSeverity::Error)
    }

    /// Returns the number of warning-level diagnostics.
    pub fn warning_count(&self) -> usize {
        self.count_severity(DiagnosticSeverity::Warning)
    }

    fn count_severity(&self, severity: DiagnosticSeverity) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == severity)
            .count()
    }

    /// Returns an iterator over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Returns all warnings as a vector.
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Warning)
            .map(|(_, d)| d)
            .collect()
    }

    /// Returns diagnostics filtered by category.
    pub fn by_category(&self, category: DiagnosticCategory) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|(_, d)| d.category == category)
            .map(|(_, d)| d)
            .collect()
    }

    /// Formats a summary of all diagnostics for display.
    pub fn summary(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "Diagnostics: {} error(s), {} warning(s)",
            self.error_count(),
            self.warning_count()
        );

        for diag in self.iter() {
            let _ = writeln!(output, "  {diag}");
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
