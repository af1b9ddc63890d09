//! Encoder abstraction.
//!
//! An [`job::EncodeJob`] describes inputs, filters and output format. [`ffmpeg::FfmpegEncoder`]
//! runs it through the system `ffmpeg`; [`fallback`] adds atomic placement and the
//! hardware-then-software retry on top of any [`ffmpeg::Encoder`].

pub mod fallback;
pub mod ffmpeg;
pub mod job;
pub mod process;
/// Recording encoder for tests and dry runs.
pub mod recording;
