use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::assemble::manifest::{Manifest, build_manifest, write_manifest};
use crate::assets::media::probe_media;
use crate::assets::paths::AssetPaths;
use crate::encode::fallback::{commit_encode, describe_attempts, encode_with_fallback};
use crate::encode::ffmpeg::Encoder;
use crate::encode::job::{AudioOutput, EncodeJob, EncoderStrategy, MediaInput, VideoOutput};
use crate::foundation::config::PipelineConfig;
use crate::foundation::error::{ScenecutError, ScenecutResult};
use crate::scene::model::Scene;

/// Allowed gap between the probed output duration and the narration total.
pub const DURATION_TOLERANCE_SEC: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssemblyMode {
    StreamCopy,
    Reencoded(EncoderStrategy),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssemblySummary {
    pub output: PathBuf,
    pub mode: AssemblyMode,
    pub included: usize,
    pub skipped: Vec<u32>,
    /// Sum of the included scenes' narration durations.
    pub total_duration: f64,
    /// Duration reported by `ffprobe`, when it could be probed.
    pub probed_duration: Option<f64>,
}

/// Concatenate every composited scene into `output`.
///
/// Stream copy is tried first when every scene file came from the same encoder; otherwise, or if
/// the copy fails, the list is re-encoded with the usual hardware-then-software plan. An empty manifest or a failed re-encode is an
/// [`ScenecutError::Assembly`].
pub fn assemble(
    encoder: &mut dyn Encoder,
    scenes: &[Scene],
    paths: &AssetPaths,
    cfg: &PipelineConfig,
    output: &Path,
) -> ScenecutResult<AssemblySummary> {
    let manifest = build_manifest(scenes, paths);
    if manifest.is_empty() {
        return Err(ScenecutError::assembly(format!(
            "no composited scenes to assemble ({} skipped)",
            manifest.skipped.len()
        )));
    }
    let list = paths.concat_manifest();
    write_manifest(&list, &manifest)?;
    info!(
        scenes = manifest.entries.len(),
        skipped = manifest.skipped.len(),
        list = %list.display(),
        "assembling"
    );

    let mode = concat(encoder, &manifest, &list, output, cfg)?;
    let probed_duration = verify_duration(cfg, output, &manifest);

    Ok(AssemblySummary {
        output: output.to_path_buf(),
        mode,
        included: manifest.entries.len(),
        total_duration: manifest.total_duration(),
        skipped: manifest.skipped,
        probed_duration,
    })
}

fn concat(
    encoder: &mut dyn Encoder,
    manifest: &Manifest,
    list: &Path,
    output: &Path,
    cfg: &PipelineConfig,
) -> ScenecutResult<AssemblyMode> {
    let copy = EncodeJob {
        inputs: vec![MediaInput::concat_list(list)],
        filter: None,
        maps: Vec::new(),
        video: VideoOutput::Copy,
        audio: AudioOutput::Copy,
        duration: None,
        out_path: output.to_path_buf(),
    };
    // The concat demuxer does not check parameter sets, so mixed encoders produce a broken
    // stream instead of an error.
    let copy_err = if manifest.stream_copy_safe() {
        match commit_encode(encoder, &copy) {
            Ok(()) => return Ok(AssemblyMode::StreamCopy),
            Err(e) => {
                warn!(error = %e, "stream copy concat failed, re-encoding");
                Some(e)
            }
        }
    } else {
        warn!(
            codecs = ?manifest.codecs(),
            "scene encoders differ or are unknown, re-encoding instead of stream copy"
        );
        None
    };

    let software = EncoderStrategy::Software
        .codec(&cfg.encoder)
        .ok_or_else(|| ScenecutError::validation("no software codec configured"))?;
    let reencode = EncodeJob {
        video: VideoOutput::Encode {
            codec: software,
            bitrate: cfg.video.video_bitrate.clone(),
            fps: cfg.video.fps,
        },
        audio: AudioOutput::canonical(&cfg.video),
        ..copy
    };
    match encode_with_fallback(encoder, &reencode, &cfg.encoder) {
        Ok(strategy) => Ok(AssemblyMode::Reencoded(strategy)),
        Err(attempts) => {
            let reencode_err = describe_attempts(&attempts);
            Err(ScenecutError::assembly(match copy_err {
                Some(e) => format!("stream copy: {e}; re-encode: {reencode_err}"),
                None => format!("re-encode: {reencode_err}"),
            }))
        }
    }
}

fn verify_duration(cfg: &PipelineConfig, output: &Path, manifest: &Manifest) -> Option<f64> {
    let ffprobe = &cfg.encoder.ffprobe_bin;
    let probed = match probe_media(ffprobe, output, cfg.process.timeout()) {
        Ok(info) => info.duration_sec,
        Err(e) => {
            debug!(error = %e, "could not probe assembled output");
            return None;
        }
    };
    let expected = manifest.total_duration();
    if (probed - expected).abs() > DURATION_TOLERANCE_SEC {
        warn!(
            expected,
            probed,
            output = %output.display(),
            "assembled duration drifts from narration total"
        );
    }
    Some(probed)
}

#[cfg(test)]
#[path = "../../tests/unit/assemble/assembler.rs"]
mod tests;
