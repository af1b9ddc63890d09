//! Final concatenation of composited scenes.

pub mod assembler;
pub mod manifest;
