#![allow(dead_code)]

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

pub fn base_cmd(data_dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_abtool"));
    cmd.env("DOTENV_PATH", data_dir.path().join("no.env"))
        .env_remove("ABTOOL_TABLE")
        .env_remove("ABTOOL_DB_FILE")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir.path().join("Database"))
        .arg("--export-dir")
        .arg(data_dir.path().join("books"));
    cmd
}

pub fn run(data_dir: &TempDir, args: &[&str]) -> Output {
    base_cmd(data_dir).args(args).output().expect("run abtool")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn run_shell(data_dir: &TempDir, script: &str) -> Output {
    let mut child = base_cmd(data_dir)
        .arg("shell")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn abtool shell");
    child
        .stdin
        .take()
        .expect("shell stdin")
        .write_all(script.as_bytes())
        .expect("write script");
    child.wait_with_output().expect("wait for shell")
}
