//! Narration audio: synthesis behind [`synth::Synthesizer`], durations measured from the result.

pub mod synth;
