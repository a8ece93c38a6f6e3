//! Append-only, deduplicating constant pool.
//!
//! The constant pool is the only state the normalization passes mutate outside the instruction
//! forest itself. Passes that fabricate nodes (a cast target class, a field reference for an
//! inlined accessor, an empty string for a folded concatenation) intern the entries those nodes
//! reference through this table.
//!
//! # Indexing
//!
//! Indices follow the class file format: slot 0 is never used, and `Long`/`Double` entries
//! occupy two slots where the second one is unusable. Existing indices never change; new entries
//! are appended.
//!
//! # Interning
//!
//! Every `intern_*` call returns the index of an existing, structurally equal entry if one is
//! present, and appends a new entry otherwise. Composite entries (`Fieldref`, `Methodref`, ...)
//! intern their dependencies first, so two passes synthesizing the same reference share every
//! slot involved.
//!
//! # Thread Safety
//!
//! The table is guarded by an [`RwLock`]. Lookups take the read lock; an intern call holds the
//! write lock across its lookup-or-append sequence, so concurrent callers interning the same
//! entry always observe a single slot.

use std::{collections::HashMap, sync::RwLock};

use crate::{Error, Result};

/// Highest index a constant pool entry may occupy.
///
/// `constant_pool_count` is a `u16` and valid indices run from 1 to `count - 1`.
const MAX_POOL_INDEX: usize = u16::MAX as usize - 1;

/// A single constant pool entry.
///
/// Floating point constants are stored by bit pattern so entries can be hashed for interning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstantInfo {
    /// `CONSTANT_Utf8`
    Utf8(String),
    /// `CONSTANT_Integer`
    Integer(i32),
    /// `CONSTANT_Float`, as raw IEEE 754 bits
    Float(u32),
    /// `CONSTANT_Long`, occupies two slots
    Long(i64),
    /// `CONSTANT_Double`, as raw IEEE 754 bits, occupies two slots
    Double(u64),
    /// `CONSTANT_Class`
    Class {
        /// Index of the `Utf8` internal name
        name_index: u16,
    },
    /// `CONSTANT_String`
    String {
        /// Index of the `Utf8` value
        string_index: u16,
    },
    /// `CONSTANT_Fieldref`
    Fieldref {
        /// Index of the owning `Class`
        class_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// `CONSTANT_Methodref`
    Methodref {
        /// Index of the owning `Class`
        class_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// `CONSTANT_InterfaceMethodref`
    InterfaceMethodref {
        /// Index of the owning `Class`
        class_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// `CONSTANT_NameAndType`
    NameAndType {
        /// Index of the `Utf8` member name
        name_index: u16,
        /// Index of the `Utf8` descriptor
        descriptor_index: u16,
    },
}

impl ConstantInfo {
    /// Returns true if the entry occupies two slots.
    #[must_use]
    pub fn is_wide(&self) -> bool {
        matches!(self, ConstantInfo::Long(_) | ConstantInfo::Double(_))
    }
}

/// A field or method reference resolved down to its strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    /// Index of the owning `Class` entry
    pub class_index: u16,
    /// Internal name of the owning class
    pub class_name: String,
    /// Member name
    pub name: String,
    /// Field or method descriptor
    pub descriptor: String,
}

#[derive(Debug)]
struct PoolTable {
    entries: Vec<Option<ConstantInfo>>,
    lookup: HashMap<ConstantInfo, u16>,
}

impl PoolTable {
    fn get(&self, index: u16) -> Result<&ConstantInfo> {
        self.entries
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidConstantIndex(index))
    }

    fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            ConstantInfo::Utf8(value) => Ok(value.as_str()),
            other => Err(malformed_error!(
                "Expected Utf8 at #{}, found {:?}",
                index,
                other
            )),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            ConstantInfo::Class { name_index } => self.utf8(*name_index),
            other => Err(malformed_error!(
                "Expected Class at #{}, found {:?}",
                index,
                other
            )),
        }
    }

    fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            ConstantInfo::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            other => Err(malformed_error!(
                "Expected NameAndType at #{}, found {:?}",
                index,
                other
            )),
        }
    }

    fn member_ref(&self, index: u16) -> Result<MemberRef> {
        let (class_index, name_and_type_index) = match self.get(index)? {
            ConstantInfo::Fieldref {
                class_index,
                name_and_type_index,
            }
            | ConstantInfo::Methodref {
                class_index,
                name_and_type_index,
            }
            | ConstantInfo::InterfaceMethodref {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index),
            other => {
                return Err(malformed_error!(
                    "Expected member reference at #{}, found {:?}",
                    index,
                    other
                ))
            }
        };

        let (name, descriptor) = self.name_and_type(name_and_type_index)?;
        Ok(MemberRef {
            class_index,
            class_name: self.class_name(class_index)?.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        })
    }

    fn intern(&mut self, entry: ConstantInfo) -> Result<u16> {
        if let Some(&index) = self.lookup.get(&entry) {
            return Ok(index);
        }

        let slots = if entry.is_wide() { 2 } else { 1 };
        if self.entries.len() + slots - 1 > MAX_POOL_INDEX {
            return Err(Error::ConstantPoolOverflow);
        }

        let index = u16::try_from(self.entries.len()).map_err(|_| Error::ConstantPoolOverflow)?;
        let wide = entry.is_wide();
        self.lookup.insert(entry.clone(), index);
        self.entries.push(Some(entry));
        if wide {
            self.entries.push(None);
        }
        Ok(index)
    }

    fn intern_utf8(&mut self, value: &str) -> Result<u16> {
        self.intern(ConstantInfo::Utf8(value.to_string()))
    }

    fn intern_class(&mut self, name: &str) -> Result<u16> {
        let name_index = self.intern_utf8(name)?;
        self.intern(ConstantInfo::Class { name_index })
    }

    fn intern_name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16> {
        let name_index = self.intern_utf8(name)?;
        let descriptor_index = self.intern_utf8(descriptor)?;
        self.intern(ConstantInfo::NameAndType {
            name_index,
            descriptor_index,
        })
    }
}

/// The per-class constant pool.
///
/// # Examples
///
/// ```rust
/// use jnorm::classfile::ConstantPool;
///
/// let pool = ConstantPool::new();
/// let first = pool.intern_class("java/lang/Throwable")?;
/// let second = pool.intern_class("java/lang/Throwable")?;
/// assert_eq!(first, second);
/// assert_eq!(pool.class_name(first)?, "java/lang/Throwable");
/// # Ok::<(), jnorm::Error>(())
/// ```
#[derive(Debug)]
pub struct ConstantPool {
    table: RwLock<PoolTable>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPool {
    /// Creates an empty pool; only the reserved slot 0 exists.
    #[must_use]
    pub fn new() -> Self {
        ConstantPool {
            table: RwLock::new(PoolTable {
                entries: vec![None],
                lookup: HashMap::new(),
            }),
        }
    }

    /// Creates a pool from the entries of a parsed class file.
    ///
    /// `entries[0]` corresponds to index 1. The second slot of a wide entry must be `None`, as
    /// produced by a class file parser. When the parsed table contains duplicates, interning
    /// resolves to the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConstantPoolOverflow`] if the table has more than 65534 slots, or
    /// [`Error::Malformed`] if a wide entry is not followed by an empty slot.
    pub fn from_entries(entries: Vec<Option<ConstantInfo>>) -> Result<Self> {
        if entries.len() > MAX_POOL_INDEX {
            return Err(Error::ConstantPoolOverflow);
        }

        let mut table = PoolTable {
            entries: Vec::with_capacity(entries.len() + 1),
            lookup: HashMap::new(),
        };
        table.entries.push(None);

        let mut expect_gap = false;
        for entry in entries {
            let index = table.entries.len() as u16;
            if expect_gap {
                if entry.is_some() {
                    return Err(malformed_error!(
                        "Slot #{} follows a wide constant and must be empty",
                        index
                    ));
                }
                expect_gap = false;
            } else if let Some(info) = &entry {
                expect_gap = info.is_wide();
                table.lookup.entry(info.clone()).or_insert(index);
            }
            table.entries.push(entry);
        }

        Ok(ConstantPool {
            table: RwLock::new(table),
        })
    }

    /// Returns the number of slots, including the reserved slot 0.
    #[must_use]
    pub fn len(&self) -> usize {
        read_lock!(self.table).entries.len()
    }

    /// Returns true if the pool holds no entries besides the reserved slot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Returns a copy of the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConstantIndex`] if the slot is empty or out of range.
    pub fn get(&self, index: u16) -> Result<ConstantInfo> {
        read_lock!(self.table).get(index).cloned()
    }

    /// Returns the string stored in a `Utf8` entry.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is invalid or not a `Utf8` entry.
    pub fn utf8(&self, index: u16) -> Result<String> {
        read_lock!(self.table).utf8(index).map(str::to_string)
    }

    /// Returns the internal name referenced by a `Class` entry.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is invalid or not a `Class` entry.
    pub fn class_name(&self, index: u16) -> Result<String> {
        read_lock!(self.table).class_name(index).map(str::to_string)
    }

    /// Returns the `(name, descriptor)` pair of a `NameAndType` entry.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is invalid or not a `NameAndType` entry.
    pub fn name_and_type(&self, index: u16) -> Result<(String, String)> {
        let table = read_lock!(self.table);
        let (name, descriptor) = table.name_and_type(index)?;
        Ok((name.to_string(), descriptor.to_string()))
    }

    /// Resolves a `Fieldref`, `Methodref` or `InterfaceMethodref` entry.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` or any entry it depends on is invalid.
    pub fn member_ref(&self, index: u16) -> Result<MemberRef> {
        read_lock!(self.table).member_ref(index)
    }

    /// Returns the string value of a `String` entry.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is invalid or not a `String` entry.
    pub fn string_value(&self, index: u16) -> Result<String> {
        let table = read_lock!(self.table);
        match table.get(index)? {
            ConstantInfo::String { string_index } => table.utf8(*string_index).map(str::to_string),
            other => Err(malformed_error!(
                "Expected String at #{}, found {:?}",
                index,
                other
            )),
        }
    }

    /// Interns an entry exactly as given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConstantPoolOverflow`] if the pool is full.
    pub fn intern(&self, entry: ConstantInfo) -> Result<u16> {
        write_lock!(self.table).intern(entry)
    }

    /// Interns a `Utf8` entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConstantPoolOverflow`] if the pool is full.
    pub fn intern_utf8(&self, value: &str) -> Result<u16> {
        write_lock!(self.table).intern_utf8(value)
    }

    /// Interns a `Class` entry and its name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConstantPoolOverflow`] if the pool is full.
    pub fn intern_class(&self, name: &str) -> Result<u16> {
        write_lock!(self.table).intern_class(name)
    }

    /// Interns a `String` entry and its value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConstantPoolOverflow`] if the pool is full.
    pub fn intern_string(&self, value: &str) -> Result<u16> {
        let mut table = write_lock!(self.table);
        let string_index = table.intern_utf8(value)?;
        table.intern(ConstantInfo::String { string_index })
    }

    /// Interns a `NameAndType` entry and its strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConstantPoolOverflow`] if the pool is full.
    pub fn intern_name_and_type(&self, name: &str, descriptor: &str) -> Result<u16> {
        write_lock!(self.table).intern_name_and_type(name, descriptor)
    }

    /// Interns a `Fieldref` entry together with its class and name-and-type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConstantPoolOverflow`] if the pool is full.
    pub fn intern_fieldref(&self, class_name: &str, name: &str, descriptor: &str) -> Result<u16> {
        let mut table = write_lock!(self.table);
        let class_index = table.intern_class(class_name)?;
        let name_and_type_index = table.intern_name_and_type(name, descriptor)?;
        table.intern(ConstantInfo::Fieldref {
            class_index,
            name_and_type_index,
        })
    }

    /// Interns a `Methodref` entry together with its class and name-and-type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConstantPoolOverflow`] if the pool is full.
    pub fn intern_methodref(&self, class_name: &str, name: &str, descriptor: &str) -> Result<u16> {
        let mut table = write_lock!(self.table);
        let class_index = table.intern_class(class_name)?;
        let name_and_type_index = table.intern_name_and_type(name, descriptor)?;
        table.intern(ConstantInfo::Methodref {
            class_index,
            name_and_type_index,
        })
    }
}
