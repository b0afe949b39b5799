#![allow(dead_code)]

use std::fs::read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

#[allow(clippy::expect_used)]
pub fn run(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gen-cmake-lists"))
        .args(args)
        .arg("--dir")
        .arg(dir)
        .stdin(Stdio::null())
        .output()
        .expect("gen-cmake-lists should be invoked")
}

#[allow(clippy::unwrap_used)]
pub fn cmp(test_name: &'static str) {
    let mut path = PathBuf::from(test_name);

    path.push("target.txt");
    let target = read(&path).unwrap();
    let target = String::from_utf8_lossy(&target);

    path.set_file_name("source");
    let cmd = run(&["--emit", "stdout"], &path);
    assert!(
        cmd.status.success(),
        "`gen-cmake-lists --emit stdout --dir {:?}` finished with a non-zero exit code\noutput:\n{}",
        &path,
        String::from_utf8_lossy(&cmd.stderr)
    );
    let source = String::from_utf8_lossy(&cmd.stdout);
    assert!(
        source == target,
        "source and target differ:\n{}",
        diffy::create_patch(&target, &source)
    );
}
