use super::*;

#[test]
fn tail_lines_keeps_the_end() {
    assert_eq!(tail_lines("a\nb\nc\nd", 2), "c\nd");
    assert_eq!(tail_lines("a", 5), "a");
    assert_eq!(tail_lines("", 3), "");
}

#[test]
fn missing_program_is_a_spawn_error() {
    let mut cmd = Command::new("scenecut-definitely-not-a-real-binary");
    let err = run_with_timeout(&mut cmd, None, Duration::from_secs(5)).unwrap_err();
    assert!(matches!(err, ProcessError::Spawn { .. }));
}

#[cfg(unix)]
#[test]
fn captures_stderr_and_status() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "echo oops >&2; exit 3"]);
    let out = run_with_timeout(&mut cmd, None, Duration::from_secs(10)).unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert_eq!(out.stderr_lossy(), "oops");
}

#[cfg(unix)]
#[test]
fn stdin_is_delivered_then_closed() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "cat >&2"]);
    let out = run_with_timeout(&mut cmd, Some(b"hello narration"), Duration::from_secs(10))
        .unwrap();
    assert!(out.status.success());
    assert_eq!(out.stderr_lossy(), "hello narration");
}

#[cfg(unix)]
#[test]
fn slow_child_is_killed_on_timeout() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "sleep 5"]);
    let started = Instant::now();
    let err = run_with_timeout(&mut cmd, None, Duration::from_millis(200)).unwrap_err();
    assert!(matches!(err, ProcessError::TimedOut { .. }));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[cfg(unix)]
#[test]
fn timeout_reaches_grandchildren_holding_stderr() {
    let dir = std::path::PathBuf::from("target/unit_process_group");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let marker = dir.join("survived");

    // The backgrounded subshell inherits stderr; only a group kill stops it.
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(format!("(sleep 1; touch '{}') & wait", marker.display()));
    let started = Instant::now();
    let err = run_with_timeout(&mut cmd, None, Duration::from_millis(200)).unwrap_err();
    assert!(matches!(err, ProcessError::TimedOut { .. }));
    assert!(started.elapsed() < Duration::from_millis(900));

    std::thread::sleep(Duration::from_millis(1500));
    assert!(!marker.exists());
}
