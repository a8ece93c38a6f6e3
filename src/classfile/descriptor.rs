//! Field and method descriptor utilities.
//!
//! Descriptors are kept in their class-file string form (`I`, `Ljava/lang/String;`,
//! `(I[J)V`) throughout the crate. This module splits method descriptors into their parameter
//! and return signatures, classifies signatures, and computes the type bit-fields used when
//! retyping integer literals.
//!
//! # Grammar
//!
//! ```text
//! FieldType   := B | C | D | F | I | J | S | Z | L ClassName ; | [ FieldType
//! MethodDesc  := ( FieldType* ) ( FieldType | V )
//! ```

use bitflags::bitflags;

use crate::Result;

/// Signature of `java.lang.Object`, the type stack simulation assigns to values it cannot
/// narrow further.
pub const OBJECT_SIGNATURE: &str = "Ljava/lang/Object;";

/// Signature of `java.lang.String`.
pub const STRING_SIGNATURE: &str = "Ljava/lang/String;";

/// Internal name of `java.lang.String`.
pub const STRING_CLASS: &str = "java/lang/String";

/// Internal name of `java.lang.Throwable`.
pub const THROWABLE_CLASS: &str = "java/lang/Throwable";

/// Internal name of `java.lang.StringBuilder`.
pub const STRING_BUILDER_CLASS: &str = "java/lang/StringBuilder";

/// Internal name of `java.lang.StringBuffer`.
pub const STRING_BUFFER_CLASS: &str = "java/lang/StringBuffer";

/// A method descriptor split into its components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Signatures of the formal parameters, in declaration order
    pub parameters: Vec<String>,
    /// Signature of the return type, `V` for `void`
    pub return_type: String,
}

impl MethodDescriptor {
    /// Parses a method descriptor such as `(ILjava/lang/String;)V`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the descriptor does not follow the grammar.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let bytes = descriptor.as_bytes();
        if bytes.first() != Some(&b'(') {
            return Err(malformed_error!(
                "Method descriptor must start with '(' - {}",
                descriptor
            ));
        }

        let mut parameters = Vec::new();
        let mut pos = 1;
        loop {
            match bytes.get(pos) {
                Some(b')') => break,
                Some(_) => {
                    let end = field_type_end(bytes, pos).ok_or_else(|| {
                        malformed_error!("Invalid parameter type in descriptor - {}", descriptor)
                    })?;
                    parameters.push(descriptor[pos..end].to_string());
                    pos = end;
                }
                None => {
                    return Err(malformed_error!(
                        "Unterminated parameter list in descriptor - {}",
                        descriptor
                    ))
                }
            }
        }

        let return_type = &descriptor[pos + 1..];
        let valid_return = return_type == "V"
            || field_type_end(return_type.as_bytes(), 0) == Some(return_type.len());
        if !valid_return {
            return Err(malformed_error!(
                "Invalid return type in descriptor - {}",
                descriptor
            ));
        }

        Ok(MethodDescriptor {
            parameters,
            return_type: return_type.to_string(),
        })
    }

    /// Returns true if the method returns `void`.
    #[must_use]
    pub fn returns_void(&self) -> bool {
        self.return_type == "V"
    }
}

/// Finds the end of the field type starting at `start`.
fn field_type_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;
    while bytes.get(pos) == Some(&b'[') {
        pos += 1;
    }

    match bytes.get(pos)? {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => Some(pos + 1),
        b'L' => {
            let semicolon = bytes[pos..].iter().position(|&b| b == b';')?;
            if semicolon < 2 {
                return None;
            }
            Some(pos + semicolon + 1)
        }
        _ => None,
    }
}

/// Returns true if `signature` names a primitive type.
#[must_use]
pub fn is_primitive(signature: &str) -> bool {
    matches!(
        signature,
        "B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z"
    )
}

/// Returns true if `signature` names a class or array type.
#[must_use]
pub fn is_reference(signature: &str) -> bool {
    signature.starts_with('L') || signature.starts_with('[')
}

/// Returns the name a `CONSTANT_Class` entry uses for `signature`.
///
/// Class types map to their internal name (`Ljava/lang/String;` → `java/lang/String`); array
/// types keep their descriptor form, as the class file format requires. Primitive signatures
/// have no class entry.
#[must_use]
pub fn class_entry_name(signature: &str) -> Option<&str> {
    if signature.starts_with('[') {
        Some(signature)
    } else if signature.len() > 2 && signature.starts_with('L') && signature.ends_with(';') {
        Some(&signature[1..signature.len() - 1])
    } else {
        None
    }
}

/// Returns the field signature of the class named by a `CONSTANT_Class` entry.
#[must_use]
pub fn class_signature(class_name: &str) -> String {
    if class_name.starts_with('[') {
        class_name.to_string()
    } else {
        format!("L{class_name};")
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Bit-field describing which primitive types a value or parameter is compatible with.
    ///
    /// A literal is compatible with a parameter when their masks intersect.
    pub struct TypeMask: u16 {
        /// `byte`
        const BYTE = 0x0001;
        /// `char`
        const CHAR = 0x0002;
        /// `short`
        const SHORT = 0x0004;
        /// `int`
        const INT = 0x0008;
        /// `boolean`
        const BOOLEAN = 0x0010;
        /// `long`
        const LONG = 0x0020;
        /// `float`
        const FLOAT = 0x0040;
        /// `double`
        const DOUBLE = 0x0080;
        /// Any class or array type
        const REFERENCE = 0x0100;
    }
}

impl TypeMask {
    /// Mask of a declared parameter: exactly the declared type.
    #[must_use]
    pub fn for_parameter(signature: &str) -> Self {
        match signature {
            "B" => Self::BYTE,
            "C" => Self::CHAR,
            "S" => Self::SHORT,
            "I" => Self::INT,
            "Z" => Self::BOOLEAN,
            "J" => Self::LONG,
            "F" => Self::FLOAT,
            "D" => Self::DOUBLE,
            _ if is_reference(signature) => Self::REFERENCE,
            _ => Self::empty(),
        }
    }

    /// Mask of an integer literal printed with its default type.
    ///
    /// A literal pushed as a `byte` prints as an `int` constant that javac also accepts for
    /// `byte` and `short` contexts of the same value range, but never for `char`, `long`,
    /// `float` or `double` overloads.
    #[must_use]
    pub fn for_literal(signature: &str) -> Self {
        match signature {
            "B" => Self::BYTE | Self::SHORT | Self::INT,
            "S" => Self::SHORT | Self::INT,
            "I" => Self::INT,
            "C" => Self::CHAR | Self::INT,
            "Z" => Self::BOOLEAN,
            _ => Self::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_descriptor() {
        let desc = MethodDescriptor::parse("(I[JLjava/lang/String;[[Ljava/lang/Object;)V").unwrap();
        assert_eq!(
            desc.parameters,
            vec!["I", "[J", "Ljava/lang/String;", "[[Ljava/lang/Object;"]
        );
        assert!(desc.returns_void());
    }

    #[test]
    fn test_parse_no_parameters() {
        let desc = MethodDescriptor::parse("()Ljava/lang/String;").unwrap();
        assert!(desc.parameters.is_empty());
        assert_eq!(desc.return_type, STRING_SIGNATURE);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(MethodDescriptor::parse("I)V").is_err());
        assert!(MethodDescriptor::parse("(I").is_err());
        assert!(MethodDescriptor::parse("(Q)V").is_err());
        assert!(MethodDescriptor::parse("(Ljava/lang/String)V").is_err());
        assert!(MethodDescriptor::parse("(I)").is_err());
        assert!(MethodDescriptor::parse("(I)VV").is_err());
    }

    #[test]
    fn test_class_entry_name() {
        assert_eq!(class_entry_name("Ljava/lang/String;"), Some("java/lang/String"));
        assert_eq!(class_entry_name("[I"), Some("[I"));
        assert_eq!(class_entry_name("I"), None);
        assert_eq!(class_signature("java/lang/String"), STRING_SIGNATURE);
        assert_eq!(class_signature("[I"), "[I");
    }

    #[test]
    fn test_type_masks() {
        assert!(TypeMask::for_literal("B").intersects(TypeMask::for_parameter("I")));
        assert!(TypeMask::for_literal("B").intersects(TypeMask::for_parameter("S")));
        assert!(!TypeMask::for_literal("B").intersects(TypeMask::for_parameter("C")));
        assert!(!TypeMask::for_literal("I").intersects(TypeMask::for_parameter("J")));
        assert!(!TypeMask::for_literal("S").intersects(TypeMask::for_parameter("B")));
        assert_eq!(TypeMask::for_parameter("[I"), TypeMask::REFERENCE);
    }
}
