use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn cachesim(config: &Path, trace: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cachesim"))
        .arg(config)
        .arg(trace)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

#[test]
fn writes_codes_next_to_the_trace() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "cacheconfig.txt", "L1:\n16\n1\n1\nL2:\n16\n4\n4\n");
    let trace = write(&dir, "trace.txt", "R 0x0\nR 0x0\nW 0x0\nW 0xfff0\nR 0x400\n");

    let out = cachesim(&config, &trace);
    assert!(out.status.success());
    let codes = fs::read_to_string(dir.path().join("trace.txt.out")).unwrap();
    assert_eq!(codes, "2 2 5\n1 0 5\n3 0 5\n4 4 6\n2 2 5\n");
}

#[test]
fn output_flag_overrides_default_path() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "cfg", "L1: 32 0 1\nL2: 32 8 16");
    let trace = write(&dir, "t", "W 0x10\n");
    let target = dir.path().join("codes.txt");

    let status = Command::new(env!("CARGO_BIN_EXE_cachesim"))
        .arg(&config)
        .arg(&trace)
        .arg("--output")
        .arg(&target)
        .env("RUST_LOG", "off")
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(fs::read_to_string(target).unwrap(), "4 4 6\n");
}

#[test]
fn block_size_mismatch_exits_before_tracing() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "cacheconfig.txt", "L1: 16 1 1\nL2: 32 4 4\n");
    let trace = write(&dir, "trace.txt", "R 0x0\n");

    let out = cachesim(&config, &trace);
    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("trace.txt.out").exists());
}

#[test]
fn missing_trace_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "cacheconfig.txt", "L1: 16 1 1\nL2: 16 4 4\n");

    let out = cachesim(&config, &dir.path().join("nope.txt"));
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn truncated_trace_keeps_earlier_output() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "cacheconfig.txt", "L1: 16 1 1\nL2: 16 4 4\n");
    let trace = write(&dir, "trace.txt", "R 0x20\nR\nR 0x20\n");

    let out = cachesim(&config, &trace);
    assert!(out.status.success());
    let codes = fs::read_to_string(dir.path().join("trace.txt.out")).unwrap();
    assert_eq!(codes, "2 2 5\n");
}
