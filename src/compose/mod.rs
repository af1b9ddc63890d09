//! Per-scene layer composition.

pub mod compositor;
pub mod graph;
