//! Scene-marker script parsing.

pub mod marker;
pub mod parser;
