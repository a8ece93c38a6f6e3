//! Shared fixtures for unit tests.
//!
//! - [`factories::instruction`] - terse constructors for instruction trees
//! - [`factories::classfile`] - constant pools, nested class hierarchies, accessors and contexts

pub mod factories;
