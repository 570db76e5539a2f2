//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Short code generation and shape checks

pub mod code_generator;
