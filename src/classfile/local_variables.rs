//! Per-method local variable table.
//!
//! A JVM local variable slot is reused freely: the same slot can hold a `String` in one block
//! and an unrelated `int` in the next. A load instruction therefore identifies a source-level
//! variable only together with its byte offset. [`LocalVariables::resolve`] performs that
//! lookup and returns a [`LocalVariable`] whose [`LocalVariableId`] is the identity passes must
//! compare, never the slot number.

use std::fmt;

/// Identity of a resolved local variable within one method.
///
/// Two loads of the same slot refer to the same source variable exactly when they resolve to
/// the same `LocalVariableId`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalVariableId(usize);

impl LocalVariableId {
    /// Creates an identifier from an index into the owning table.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for LocalVariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lv{}", self.0)
    }
}

/// A local variable with its live range and declared signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    /// Identity within the owning table
    pub id: LocalVariableId,
    /// Slot index in the frame
    pub slot: u16,
    /// First byte offset at which the variable is live
    pub start_pc: u32,
    /// Length of the live range in bytes
    pub length: u32,
    /// Source name, if known
    pub name: Option<String>,
    /// Declared field-type signature
    pub signature: String,
}

impl LocalVariable {
    /// Returns true if `offset` falls inside the live range.
    #[must_use]
    pub fn is_live_at(&self, offset: u32) -> bool {
        offset >= self.start_pc && u64::from(offset) < u64::from(self.start_pc) + u64::from(self.length)
    }
}

/// The local variable table of one method.
#[derive(Debug, Clone, Default)]
pub struct LocalVariables {
    variables: Vec<LocalVariable>,
}

impl LocalVariables {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable and returns its identity.
    ///
    /// # Arguments
    ///
    /// * `slot` - Frame slot of the variable
    /// * `start_pc` - First offset of the live range
    /// * `length` - Length of the live range
    /// * `name` - Source name, if the class carries debug information
    /// * `signature` - Declared field-type signature
    pub fn add(
        &mut self,
        slot: u16,
        start_pc: u32,
        length: u32,
        name: Option<&str>,
        signature: &str,
    ) -> LocalVariableId {
        let id = LocalVariableId::new(self.variables.len());
        self.variables.push(LocalVariable {
            id,
            slot,
            start_pc,
            length,
            name: name.map(str::to_string),
            signature: signature.to_string(),
        });
        id
    }

    /// Resolves the variable occupying `slot` at byte `offset`.
    ///
    /// When ranges of the same slot overlap, the innermost (latest starting) one wins.
    #[must_use]
    pub fn resolve(&self, slot: u16, offset: u32) -> Option<&LocalVariable> {
        self.variables
            .iter()
            .filter(|lv| lv.slot == slot && lv.is_live_at(offset))
            .max_by_key(|lv| lv.start_pc)
    }

    /// Resolves the variable written by a store at `offset`.
    ///
    /// Compilers start a variable's live range after the store that initializes it, so when no
    /// range covers `offset` the variable of `slot` starting closest after it is returned.
    #[must_use]
    pub fn resolve_store(&self, slot: u16, offset: u32) -> Option<&LocalVariable> {
        self.resolve(slot, offset).or_else(|| {
            self.variables
                .iter()
                .filter(|lv| lv.slot == slot && lv.start_pc > offset)
                .min_by_key(|lv| lv.start_pc)
        })
    }

    /// Returns the variable with the given identity.
    #[must_use]
    pub fn get(&self, id: LocalVariableId) -> Option<&LocalVariable> {
        self.variables.get(id.index())
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Returns an iterator over all variables.
    pub fn iter(&self) -> impl Iterator<Item = &LocalVariable> {
        self.variables.iter()
    }
}
