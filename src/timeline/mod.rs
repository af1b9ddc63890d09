pub mod accumulate;
pub mod captions;
pub mod estimate;
