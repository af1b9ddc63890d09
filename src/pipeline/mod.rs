//! Stage functions wired together by [`stages::run_all`].
//!
//! Every stage takes the scene sequence by value, returns it updated together with a
//! [`report::StageReport`], and persists the scene state file before returning so a later
//! invocation can pick up from there.

pub mod context;
pub mod report;
pub mod stages;
