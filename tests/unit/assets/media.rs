use std::path::PathBuf;
use std::time::Instant;

use super::*;

fn write_wav(path: &Path, sample_rate: u32, channels: u16, frames: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut w = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..frames * u32::from(channels) {
        w.write_sample(0i16).unwrap();
    }
    w.finalize().unwrap();
}

#[test]
fn wav_duration_counts_frames_not_samples() {
    let path = PathBuf::from("target/unit_assets_media/stereo.wav");
    write_wav(&path, 22_050, 2, 44_100);
    let d = wav_duration(&path).unwrap();
    assert!((d - 2.0).abs() < 1e-9, "got {d}");
}

#[test]
fn media_duration_reads_wav_without_ffprobe() {
    let path = PathBuf::from("target/unit_assets_media/mono.WAV");
    write_wav(&path, 16_000, 1, 8_000);
    let d = media_duration(
        Path::new("scenecut-no-such-ffprobe"),
        &path,
        Duration::from_secs(5),
    )
    .unwrap();
    assert!((d - 0.5).abs() < 1e-9, "got {d}");
}

#[test]
fn garbage_wav_is_an_error() {
    let path = PathBuf::from("target/unit_assets_media/garbage.wav");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"not a wav").unwrap();
    assert!(wav_duration(&path).is_err());
}

#[test]
fn missing_ffprobe_is_an_error() {
    let err = probe_media(
        Path::new("scenecut-no-such-ffprobe"),
        Path::new("whatever.mp4"),
        Duration::from_secs(5),
    )
    .unwrap_err();
    assert!(err.to_string().contains("failed to run"));
}

/// Stand-in `ffprobe`: a shell script that ignores its arguments.
#[cfg(unix)]
fn fake_ffprobe(name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt as _;

    let path = PathBuf::from("target/unit_assets_media").join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn probe_reads_ffprobe_json_from_stdout() {
    let ffprobe = fake_ffprobe(
        "ffprobe_json.sh",
        r#"echo '{"streams":[{"codec_type":"video","width":320,"height":180},{"codec_type":"audio"}],"format":{"duration":"1.250"}}'"#,
    );
    let info = probe_media(&ffprobe, Path::new("clip.mp4"), Duration::from_secs(10)).unwrap();
    assert_eq!(
        info,
        MediaInfo {
            duration_sec: 1.25,
            width: Some(320),
            height: Some(180),
            has_video: true,
            has_audio: true,
        }
    );
}

#[cfg(unix)]
#[test]
fn hung_ffprobe_times_out() {
    let ffprobe = fake_ffprobe("ffprobe_hang.sh", "sleep 5");
    let started = Instant::now();
    let err =
        probe_media(&ffprobe, Path::new("clip.mp4"), Duration::from_millis(200)).unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(err.to_string().contains("timed out"), "{err}");
}
