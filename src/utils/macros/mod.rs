//! Crate-wide macros.

pub mod deserialization;
