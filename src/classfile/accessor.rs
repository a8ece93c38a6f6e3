//! Synthetic accessor metadata.
//!
//! javac cannot let a nested class touch a `private` member of its enclosing class directly
//! (before nest-based access control), so it generates a static bridge on the class that
//! declares the member, named `access$NNN`:
//!
//! ```text
//! static int access$000(Outer o)          { return o.count; }        // GetField
//! static int access$002(Outer o, int v)   { return o.count = v; }    // PutField
//! static int access$100()                 { return Outer.total; }    // GetStatic
//! static int access$102(int v)            { return Outer.total = v; }// PutStatic
//! static void access$200(Outer o, int a)  { o.helper(a); }           // InvokeMethod
//! ```
//!
//! An upstream analysis decodes the body of each bridge once and registers the result as an
//! [`Accessor`]. The registry is keyed by `(class, bridge name, bridge descriptor)`.

use std::sync::Arc;

use dashmap::DashMap;

use crate::classfile::descriptor::{is_reference, MethodDescriptor};

/// The semantic shape of an accessor bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    /// Reads an instance field of its sole argument
    GetField,
    /// Writes its second argument into an instance field of its first argument
    PutField,
    /// Reads a static field, takes no arguments
    GetStatic,
    /// Writes its sole argument into a static field
    PutStatic,
    /// Invokes an instance method on its first argument with the remaining arguments
    InvokeMethod,
    /// Invokes a static method with all of its arguments
    InvokeStaticMethod,
}

/// A decoded accessor bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    /// Internal name of the class declaring the bridge
    pub class_name: String,
    /// Bridge method name, e.g. `access$000`
    pub method_name: String,
    /// Bridge method descriptor
    pub method_descriptor: String,
    /// Shape of the bridge
    pub kind: AccessorKind,
    /// Internal name of the class declaring the proxied member
    pub target_class: String,
    /// Name of the proxied field or method
    pub target_name: String,
    /// Descriptor of the proxied field or method
    pub target_descriptor: String,
}

impl Accessor {
    /// Number of arguments a call to this bridge must pass.
    ///
    /// Returns `None` when the bridge descriptor does not parse.
    #[must_use]
    pub fn argument_count(&self) -> Option<usize> {
        MethodDescriptor::parse(&self.method_descriptor)
            .ok()
            .map(|d| d.parameters.len())
    }

    /// Checks that the bridge descriptor is consistent with the kind and target.
    ///
    /// Field writers may either return nothing or echo the written value. Method proxies must
    /// mirror the target's parameters (after the receiver, for instance methods) and return
    /// type exactly.
    #[must_use]
    pub fn shape_matches(&self) -> bool {
        let Ok(bridge) = MethodDescriptor::parse(&self.method_descriptor) else {
            return false;
        };
        let params = &bridge.parameters;
        let target = self.target_descriptor.as_str();
        let echoes = |ret: &str| ret == "V" || ret == target;

        match self.kind {
            AccessorKind::GetStatic => params.is_empty() && bridge.return_type == target,
            AccessorKind::GetField => {
                params.len() == 1 && is_reference(&params[0]) && bridge.return_type == target
            }
            AccessorKind::PutStatic => {
                params.len() == 1 && params[0] == target && echoes(&bridge.return_type)
            }
            AccessorKind::PutField => {
                params.len() == 2
                    && is_reference(&params[0])
                    && params[1] == target
                    && echoes(&bridge.return_type)
            }
            AccessorKind::InvokeStaticMethod | AccessorKind::InvokeMethod => {
                let Ok(proxied) = MethodDescriptor::parse(target) else {
                    return false;
                };
                let forwarded = if self.kind == AccessorKind::InvokeMethod {
                    match params.split_first() {
                        Some((receiver, rest)) if is_reference(receiver) => rest,
                        _ => return false,
                    }
                } else {
                    params.as_slice()
                };
                forwarded == proxied.parameters.as_slice()
                    && bridge.return_type == proxied.return_type
            }
        }
    }
}

/// Shared reference to an [`Accessor`].
pub type AccessorRc = Arc<Accessor>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AccessorKey {
    class_name: String,
    method_name: String,
    descriptor: String,
}

/// Concurrent registry of decoded accessors.
///
/// Accessors are registered once per declaring class and looked up from any number of worker
/// threads while methods of nested classes are normalized.
#[derive(Debug, Default)]
pub struct AccessorRegistry {
    accessors: DashMap<AccessorKey, AccessorRc>,
}

impl AccessorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an accessor, replacing an earlier registration with the same key.
    pub fn register(&self, accessor: Accessor) {
        let key = AccessorKey {
            class_name: accessor.class_name.clone(),
            method_name: accessor.method_name.clone(),
            descriptor: accessor.method_descriptor.clone(),
        };
        self.accessors.insert(key, Arc::new(accessor));
    }

    /// Looks up the accessor for a bridge method.
    #[must_use]
    pub fn lookup(&self, class_name: &str, method_name: &str, descriptor: &str) -> Option<AccessorRc> {
        let key = AccessorKey {
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
            descriptor: descriptor.to_string(),
        };
        self.accessors.get(&key).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the number of registered accessors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    /// Returns true if no accessor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}
