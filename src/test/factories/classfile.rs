//! Factory methods for class file collaborators and pass contexts.

use std::sync::Arc;

use crate::{
    classfile::{
        Accessor, AccessorKind, AccessorRegistry, ClassFile, ConstantPool, FieldAccessFlags,
        LocalVariables, MethodAccessFlags,
    },
    normalizer::PassContext,
};

/// Builds a local variable table from `(slot, start_pc, length, signature)` entries.
pub fn create_locals(entries: &[(u16, u32, u32, &str)]) -> LocalVariables {
    let mut locals = LocalVariables::new();
    for &(slot, start_pc, length, signature) in entries {
        locals.add(slot, start_pc, length, None, signature);
    }
    locals
}

/// Creates an empty constant pool.
pub fn create_pool() -> ConstantPool {
    ConstantPool::new()
}

/// Creates a context for a top-level class owning `pool`, with no accessors.
pub fn create_context(pool: ConstantPool) -> PassContext {
    let class = ClassFile::new("com/example/Subject", pool);
    PassContext::new(Arc::new(class), Arc::new(AccessorRegistry::new()))
}

/// Creates an accessor declared on `class` whose target lives in the same class.
pub fn create_accessor(
    class: &str,
    method: &str,
    descriptor: &str,
    kind: AccessorKind,
    target_name: &str,
    target_descriptor: &str,
) -> Accessor {
    Accessor {
        class_name: class.to_string(),
        method_name: method.to_string(),
        method_descriptor: descriptor.to_string(),
        kind,
        target_class: class.to_string(),
        target_name: target_name.to_string(),
        target_descriptor: target_descriptor.to_string(),
    }
}

/// An `Outer`/`Outer$Inner` pair under construction.
///
/// The inner class is the one being normalized; `pool` becomes its constant pool. The inner
/// class starts with the synthetic `this$0` field javac emits for a non-static member class.
pub struct NestedClasses {
    pub pool: ConstantPool,
    outer: ClassFile,
    inner_fields: Vec<(String, String, FieldAccessFlags)>,
}

impl NestedClasses {
    pub const OUTER: &'static str = "com/example/Outer";
    pub const INNER: &'static str = "com/example/Outer$Inner";
    pub const UNRELATED: &'static str = "com/example/Unrelated";

    pub fn new() -> Self {
        NestedClasses {
            pool: create_pool(),
            outer: ClassFile::new(Self::OUTER, create_pool()),
            inner_fields: vec![(
                "this$0".to_string(),
                format!("L{};", Self::OUTER),
                FieldAccessFlags::SYNTHETIC | FieldAccessFlags::FINAL,
            )],
        }
    }

    /// Declares a static synthetic bridge on the outer class.
    pub fn with_bridge(self, name: &str, descriptor: &str) -> Self {
        self.with_outer_method(
            name,
            descriptor,
            MethodAccessFlags::STATIC | MethodAccessFlags::SYNTHETIC,
        )
    }

    pub fn with_outer_method(mut self, name: &str, descriptor: &str, flags: MethodAccessFlags) -> Self {
        self.outer = self.outer.with_method(name, descriptor, flags);
        self
    }

    pub fn with_inner_field(mut self, name: &str, descriptor: &str, flags: FieldAccessFlags) -> Self {
        self.inner_fields
            .push((name.to_string(), descriptor.to_string(), flags));
        self
    }
}

/// Creates a context normalizing the inner class of `classes`.
pub fn create_nested_context(classes: NestedClasses, accessors: Vec<Accessor>) -> PassContext {
    let NestedClasses {
        pool,
        outer,
        inner_fields,
    } = classes;

    let mut inner = ClassFile::new(NestedClasses::INNER, pool).with_outer(Arc::new(outer));
    for (name, descriptor, flags) in inner_fields {
        inner = inner.with_field(&name, &descriptor, flags);
    }

    let registry = AccessorRegistry::new();
    for accessor in accessors {
        registry.register(accessor);
    }
    PassContext::new(Arc::new(inner), Arc::new(registry))
}
