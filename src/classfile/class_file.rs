//! Class-level metadata consumed by the normalization passes.
//!
//! A [`ClassFile`] here is the slice of a parsed class the passes need: its name, members with
//! access flags, the constant pool, and the lexical enclosing class recovered from the
//! `InnerClasses` attribute. The enclosing class is held as a shared [`ClassFile`] so passes can
//! walk the inner/outer chain and inspect members declared on enclosing classes.

use std::sync::Arc;

use crate::classfile::{
    access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags},
    ConstantPool,
};

/// Shared reference to a [`ClassFile`].
pub type ClassFileRc = Arc<ClassFile>;

/// A method declared by a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    /// Method name
    pub name: String,
    /// Method descriptor
    pub descriptor: String,
    /// Access flags
    pub access_flags: MethodAccessFlags,
}

/// A field declared by a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Field descriptor
    pub descriptor: String,
    /// Access flags
    pub access_flags: FieldAccessFlags,
}

/// A class being decompiled, or one of its enclosing classes.
#[derive(Debug)]
pub struct ClassFile {
    /// Internal name, e.g. `com/example/Outer$Inner`
    pub name: String,
    /// Access flags
    pub access_flags: ClassAccessFlags,
    /// The constant pool; passes intern fabricated entries here
    pub constant_pool: ConstantPool,
    /// Declared methods
    pub methods: Vec<MethodInfo>,
    /// Declared fields
    pub fields: Vec<FieldInfo>,
    /// Lexically enclosing class, if this is a nested class
    pub outer_class: Option<ClassFileRc>,
}

impl ClassFile {
    /// Creates a top-level class without members.
    #[must_use]
    pub fn new(name: &str, constant_pool: ConstantPool) -> Self {
        ClassFile {
            name: name.to_string(),
            access_flags: ClassAccessFlags::SUPER,
            constant_pool,
            methods: Vec::new(),
            fields: Vec::new(),
            outer_class: None,
        }
    }

    /// Sets the lexically enclosing class.
    #[must_use]
    pub fn with_outer(mut self, outer: ClassFileRc) -> Self {
        self.outer_class = Some(outer);
        self
    }

    /// Adds a method declaration.
    #[must_use]
    pub fn with_method(mut self, name: &str, descriptor: &str, flags: MethodAccessFlags) -> Self {
        self.methods.push(MethodInfo {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access_flags: flags,
        });
        self
    }

    /// Adds a field declaration.
    #[must_use]
    pub fn with_field(mut self, name: &str, descriptor: &str, flags: FieldAccessFlags) -> Self {
        self.fields.push(FieldInfo {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access_flags: flags,
        });
        self
    }

    /// Finds a declared method by name and descriptor.
    #[must_use]
    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    /// Finds a declared field by name and descriptor.
    #[must_use]
    pub fn find_field(&self, name: &str, descriptor: &str) -> Option<&FieldInfo> {
        self.fields
            .iter()
            .find(|f| f.name == name && f.descriptor == descriptor)
    }

    /// Returns an iterator over the enclosing classes, innermost first.
    pub fn enclosing_classes(&self) -> impl Iterator<Item = &ClassFile> {
        std::iter::successors(self.outer_class.as_deref(), |class| {
            class.outer_class.as_deref()
        })
    }

    /// Returns the enclosing class named `name`, walking the inner/outer chain.
    #[must_use]
    pub fn enclosing_class(&self, name: &str) -> Option<&ClassFile> {
        self.enclosing_classes().find(|class| class.name == name)
    }

    /// Returns the simple source name, e.g. `Inner` for `com/example/Outer$Inner`.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        let tail = self.name.rsplit('/').next().unwrap_or(&self.name);
        tail.rsplit('$').next().unwrap_or(tail)
    }
}
