use tracing::{debug, warn};

use crate::encode::ffmpeg::Encoder;
use crate::encode::job::{EncodeFailure, EncodeJob, EncoderStrategy, partial_path};
use crate::foundation::config::EncoderConfig;

/// One failed strategy attempt, kept for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attempt {
    pub strategy: EncoderStrategy,
    pub codec: String,
    pub failure: EncodeFailure,
}

impl std::fmt::Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.strategy, self.codec, self.failure)
    }
}

/// Join attempts into one diagnostic line.
pub fn describe_attempts(attempts: &[Attempt]) -> String {
    attempts
        .iter()
        .map(Attempt::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Run `job` into a `.partial` sibling and rename it over `job.out_path` on success.
///
/// A failed run never leaves anything at `job.out_path`; the partial file is removed.
pub fn commit_encode(encoder: &mut dyn Encoder, job: &EncodeJob) -> Result<(), EncodeFailure> {
    let partial = partial_path(&job.out_path);
    remove_if_present(&partial);

    let result = encoder.encode(&job.with_out_path(&partial));
    if let Err(e) = result {
        remove_if_present(&partial);
        return Err(e);
    }

    std::fs::rename(&partial, &job.out_path).map_err(|e| {
        remove_if_present(&partial);
        EncodeFailure::Output {
            path: job.out_path.clone(),
            message: e.to_string(),
        }
    })
}

/// Try each configured strategy in order until one produces `job.out_path`.
///
/// Returns the strategy that succeeded, or every failed attempt when none did.
pub fn encode_with_fallback(
    encoder: &mut dyn Encoder,
    job: &EncodeJob,
    cfg: &EncoderConfig,
) -> Result<EncoderStrategy, Vec<Attempt>> {
    let mut attempts = Vec::new();
    for strategy in EncoderStrategy::plan(cfg) {
        let Some(codec) = strategy.codec(cfg) else {
            continue;
        };
        let codec_name = codec.name.clone();
        match commit_encode(encoder, &job.with_codec(codec)) {
            Ok(()) => {
                debug!(%strategy, codec = %codec_name, out = %job.out_path.display(), "encoded");
                return Ok(strategy);
            }
            Err(failure) => {
                warn!(%strategy, codec = %codec_name, error = %failure, "encode attempt failed");
                attempts.push(Attempt {
                    strategy,
                    codec: codec_name,
                    failure,
                });
            }
        }
    }
    Err(attempts)
}

fn remove_if_present(path: &std::path::Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "could not remove partial output");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/fallback.rs"]
mod tests;
