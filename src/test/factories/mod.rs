//! Factory methods for test data.

pub mod classfile;
pub mod instruction;
