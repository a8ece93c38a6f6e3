//! Access flags of classes, methods and fields.
//!
//! The values follow the class file format. Only the flags the normalization passes actually
//! inspect are named; unknown bits survive `from_bits_retain` so a round trip through these
//! types never loses information.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method access and property flags
    pub struct MethodAccessFlags: u16 {
        /// Declared `public`
        const PUBLIC = 0x0001;
        /// Declared `private`
        const PRIVATE = 0x0002;
        /// Declared `protected`
        const PROTECTED = 0x0004;
        /// Declared `static`
        const STATIC = 0x0008;
        /// Declared `final`
        const FINAL = 0x0010;
        /// Declared `synchronized`
        const SYNCHRONIZED = 0x0020;
        /// A bridge method, generated by the compiler
        const BRIDGE = 0x0040;
        /// Declared with a variable number of arguments
        const VARARGS = 0x0080;
        /// Declared `native`
        const NATIVE = 0x0100;
        /// Declared `abstract`
        const ABSTRACT = 0x0400;
        /// Declared `strictfp`
        const STRICT = 0x0800;
        /// Not present in the source code, generated by the compiler
        const SYNTHETIC = 0x1000;
    }
}

impl Default for MethodAccessFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl MethodAccessFlags {
    /// Returns true if the method is a compiler-generated static method.
    ///
    /// This is the flag combination every javac accessor bridge carries.
    #[must_use]
    pub fn is_synthetic_static(self) -> bool {
        self.contains(Self::SYNTHETIC | Self::STATIC)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Field access and property flags
    pub struct FieldAccessFlags: u16 {
        /// Declared `public`
        const PUBLIC = 0x0001;
        /// Declared `private`
        const PRIVATE = 0x0002;
        /// Declared `protected`
        const PROTECTED = 0x0004;
        /// Declared `static`
        const STATIC = 0x0008;
        /// Declared `final`
        const FINAL = 0x0010;
        /// Declared `volatile`
        const VOLATILE = 0x0040;
        /// Declared `transient`
        const TRANSIENT = 0x0080;
        /// Not present in the source code, generated by the compiler
        const SYNTHETIC = 0x1000;
        /// Declared as an element of an `enum`
        const ENUM = 0x4000;
    }
}

impl Default for FieldAccessFlags {
    fn default() -> Self {
        Self::empty()
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Class access and property flags
    pub struct ClassAccessFlags: u16 {
        /// Declared `public`
        const PUBLIC = 0x0001;
        /// Declared `final`
        const FINAL = 0x0010;
        /// Treat superclass methods specially when invoked by `invokespecial`
        const SUPER = 0x0020;
        /// Is an interface, not a class
        const INTERFACE = 0x0200;
        /// Declared `abstract`
        const ABSTRACT = 0x0400;
        /// Not present in the source code, generated by the compiler
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation type
        const ANNOTATION = 0x2000;
        /// Declared as an `enum` type
        const ENUM = 0x4000;
    }
}

impl Default for ClassAccessFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_static() {
        let flags = MethodAccessFlags::STATIC | MethodAccessFlags::SYNTHETIC;
        assert!(flags.is_synthetic_static());
        assert!(!MethodAccessFlags::STATIC.is_synthetic_static());
        assert!(!MethodAccessFlags::SYNTHETIC.is_synthetic_static());
    }

    #[test]
    fn test_unknown_bits_retained() {
        let flags = FieldAccessFlags::from_bits_retain(0x1000 | 0x8000);
        assert!(flags.contains(FieldAccessFlags::SYNTHETIC));
        assert_eq!(flags.bits(), 0x9000);
    }
}
