use std::path::PathBuf;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_framefold")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "framefold.exe"
            } else {
                "framefold"
            });
            p
        })
}

#[test]
fn cli_run_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let out_path = dir.join("out.png");
    let _ = std::fs::remove_file(&out_path);

    let out_arg = out_path.to_string_lossy().to_string();
    let status = std::process::Command::new(exe())
        .args([
            "run", "-w", "16", "-H", "12", "-s", "2", "--frames", "5", "--trigger-at", "2",
            "--out",
        ])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    let img = image::open(&out_path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (16, 12));
}

#[test]
fn cli_reads_config_file() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let cfg_path = dir.join("session.json");
    let out_path = dir.join("from_config.png");
    let _ = std::fs::remove_file(&out_path);

    std::fs::write(
        &cfg_path,
        r#"{"width": 8, "height": 8, "scale": 3, "frames": 3, "parallel": true, "threads": 2}"#,
    )
    .unwrap();

    let status = std::process::Command::new(exe())
        .args(["run", "--config"])
        .arg(cfg_path.as_os_str())
        .arg("--out")
        .arg(out_path.as_os_str())
        .status()
        .unwrap();

    assert!(status.success());
    let img = image::open(&out_path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (8, 8));
}

#[test]
fn cli_rejects_zero_scale() {
    let status = std::process::Command::new(exe())
        .args(["run", "-s", "0", "--frames", "1"])
        .status()
        .unwrap();
    assert!(!status.success());
}
