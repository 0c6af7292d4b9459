#![cfg(feature = "cli")]

use assert_cmd::Command;
use aruco_nano::dict::builtins::ARUCO_MIP_36H12;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

/// Write a 320x320 PNG holding marker `id` with 20 px cells at (80, 80).
fn write_marker_png(dir: &Path, id: u32) -> PathBuf {
    let code = ARUCO_MIP_36H12.code(id).expect("id in dictionary");
    let img = image::GrayImage::from_fn(320, 320, |x, y| {
        let (x, y) = (x as i64 - 80, y as i64 - 80);
        if !(0..160).contains(&x) || !(0..160).contains(&y) {
            return image::Luma([255]);
        }
        let (r, c) = (y / 20, x / 20);
        let inner = (1..7).contains(&r) && (1..7).contains(&c);
        let white = inner && (code >> (35 - (6 * (r - 1) + (c - 1)))) & 1 == 1;
        image::Luma([if white { 255 } else { 0 }])
    });
    let path = dir.join(format!("marker_{id}.png"));
    img.save(&path).expect("write png");
    path
}

fn cli() -> Command {
    Command::cargo_bin("aruco-nano").expect("binary built")
}

fn run_json(args: &[&std::ffi::OsStr]) -> serde_json::Value {
    let out = cli().args(args).output().expect("run cli");
    assert!(
        out.status.success(),
        "cli failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("json stdout")
}

#[test]
fn dict_info_describes_the_builtin_dictionary() {
    cli()
        .arg("dict-info")
        .assert()
        .success()
        .stdout(predicate::str::contains("ARUCO_MIP_36h12"))
        .stdout(predicate::str::contains("250"));
}

#[test]
fn detect_reports_marker_as_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let png = write_marker_png(dir.path(), 42);

    let report = run_json(&["detect".as_ref(), png.as_os_str(), "--json".as_ref()]);
    let markers = report["markers"].as_array().expect("markers array");
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0]["id"], 42);
    assert_eq!(markers[0]["rotation"], 0);
    assert!(markers[0].get("pose").is_none());
    assert_eq!(report["width"], 320);
}

#[test]
fn configured_camera_adds_pose() {
    let dir = tempfile::tempdir().expect("tempdir");
    let png = write_marker_png(dir.path(), 7);
    let cfg = dir.path().join("run.json");
    std::fs::write(
        &cfg,
        r#"{
            "detector": { "max_attempts_per_candidate": 3 },
            "camera": { "intrinsics": { "fx": 400.0, "fy": 400.0, "cx": 159.5, "cy": 159.5 } },
            "marker_size": 0.2
        }"#,
    )
    .expect("write config");

    let report = run_json(&[
        "detect".as_ref(),
        png.as_os_str(),
        "--config".as_ref(),
        cfg.as_os_str(),
        "--json".as_ref(),
    ]);
    let marker = &report["markers"][0];
    assert_eq!(marker["id"], 7);
    let tvec: Vec<f64> = marker["pose"]["tvec"]
        .as_array()
        .expect("tvec")
        .iter()
        .map(|v| v.as_f64().expect("number"))
        .collect();
    // 160 px side at f = 400 px with a 0.2 side puts the marker 0.5 away.
    assert!((tvec[2] - 0.5).abs() < 0.01, "tvec {tvec:?}");
    assert!(tvec[0].abs() < 0.01 && tvec[1].abs() < 0.01, "tvec {tvec:?}");
}

#[test]
fn output_writes_annotated_image() {
    let dir = tempfile::tempdir().expect("tempdir");
    let png = write_marker_png(dir.path(), 3);
    let out = dir.path().join("annotated.png");

    cli()
        .arg("detect")
        .arg(&png)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 markers"))
        .stdout(predicate::str::contains("id   3"));

    let annotated = image::open(&out).expect("annotated png").to_rgb8();
    assert_eq!(annotated.dimensions(), (320, 320));
    assert!(annotated.pixels().any(|p| p.0 == [255, 0, 0]));
}

#[test]
fn missing_image_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    cli()
        .arg("detect")
        .arg(dir.path().join("nope.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open image"));
}

#[test]
fn malformed_config_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let png = write_marker_png(dir.path(), 1);
    let cfg = dir.path().join("bad.json");
    std::fs::write(&cfg, "{ not json").expect("write config");
    cli()
        .arg("detect")
        .arg(&png)
        .arg("--config")
        .arg(&cfg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}
