use std::path::Path;

use crate::encode::ffmpeg::Encoder;
use crate::encode::job::{EncodeFailure, EncodeJob, VideoOutput};

/// In-process encoder for tests and dry runs.
///
/// Records every job it receives and writes a small placeholder file at the job's output path.
/// Codecs listed in `failing_codecs` fail with a non-zero exit, which is how fallback paths are
/// exercised without a GPU.
#[derive(Debug, Default)]
pub struct RecordingEncoder {
    jobs: Vec<EncodeJob>,
    failing_codecs: Vec<String>,
    fail_copy: bool,
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every job that encodes with `codec`.
    pub fn failing_codec(mut self, codec: impl Into<String>) -> Self {
        self.failing_codecs.push(codec.into());
        self
    }

    /// Fail every stream-copy job.
    pub fn failing_copy(mut self) -> Self {
        self.fail_copy = true;
        self
    }

    /// Every job received, including failed ones, in call order.
    pub fn jobs(&self) -> &[EncodeJob] {
        &self.jobs
    }
}

impl Encoder for RecordingEncoder {
    fn encode(&mut self, job: &EncodeJob) -> Result<(), EncodeFailure> {
        self.jobs.push(job.clone());
        let fail = match &job.video {
            VideoOutput::Copy => self.fail_copy,
            VideoOutput::Encode { codec, .. } => self.failing_codecs.contains(&codec.name),
        };
        if fail {
            return Err(EncodeFailure::Exit {
                code: Some(1),
                stderr: "recording encoder: configured to fail".to_string(),
            });
        }
        write_placeholder(&job.out_path).map_err(|e| EncodeFailure::Output {
            path: job.out_path.clone(),
            message: e.to_string(),
        })
    }
}

fn write_placeholder(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, b"scenecut placeholder\n")
}
