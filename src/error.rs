use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Most problems the normalization passes run into are *not* errors: an idiom that does not
/// match is silently skipped, and an opcode a pass does not understand is reported through
/// [`crate::normalizer::Diagnostics`] while the subtree is left untouched. This enum covers the
/// remaining conditions, which indicate either structurally broken input (a descriptor that does
/// not parse, a constant-pool index pointing at the wrong kind of entry) or a bug in an upstream
/// collaborator.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - Corrupted constant pool data or descriptors
/// - [`Error::InvalidConstantIndex`] - A constant-pool index that does not resolve
/// - [`Error::ConstantPoolOverflow`] - Interning would exceed the 16-bit index space
///
/// ## Invariant Violations
/// - [`Error::NullInstruction`] - A missing instruction reached a search utility
///
/// # Examples
///
/// ```rust
/// use jnorm::{Error, classfile::ConstantPool};
///
/// let pool = ConstantPool::new();
/// match pool.class_name(42) {
///     Ok(name) => println!("class {name}"),
///     Err(Error::InvalidConstantIndex(index)) => println!("no entry at #{index}"),
///     Err(e) => println!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be interpreted.
    ///
    /// Raised for descriptors that do not follow the JVM grammar and for constant-pool entries
    /// that exist but have a different kind than the referencing instruction requires. The
    /// error includes the source location where the malformation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A constant-pool index does not refer to a usable entry.
    ///
    /// Index 0, indices past the end of the table and the unusable second slot of a
    /// `Long`/`Double` entry all produce this error.
    #[error("Invalid constant pool index - #{0}")]
    InvalidConstantIndex(u16),

    /// The constant pool has no room for another entry.
    ///
    /// Class files address the pool with unsigned 16-bit indices, so a fabricated entry that
    /// would land past index 65534 cannot be referenced.
    #[error("Constant pool is full, no index left for a new entry")]
    ConstantPoolOverflow,

    /// A missing instruction was handed to an operation that requires one.
    ///
    /// A null slot in the instruction forest is always a bug in the stage that produced the
    /// forest, never a legitimate "absent" value, so operations fail fast instead of treating
    /// it as "not found".
    #[error("Null instruction passed to {operation}")]
    NullInstruction {
        /// The operation that received the missing instruction
        operation: &'static str,
    },
}
