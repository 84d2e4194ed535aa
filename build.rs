extern crate time;

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::Command;

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set by cargo");
    write_file(&out_dir, "git-commit", &git_rev());
    write_file(&out_dir, "compile-date", &compile_date());
}

fn write_file(out_dir: &str, name: &str, contents: &str) {
    let dst_path = Path::new(out_dir).join(name);
    let mut f = File::create(&dst_path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
}

/// Short hash of HEAD, prefixed with "WIP " when the working tree is dirty.
fn git_rev() -> String {
    let hash = Command::new("git").args(&["rev-parse", "--short", "HEAD"]).output();
    let status = Command::new("git").args(&["status", "--porcelain"]).output();

    match (hash, status) {
        (Ok(ref hash), Ok(ref status)) if hash.status.success() && status.status.success() => {
            let hash = String::from_utf8_lossy(&hash.stdout).trim().to_string();
            if status.stdout.is_empty() {
                hash
            } else {
                format!("WIP {}", hash)
            }
        }
        _ => "unknown commit".to_string(),
    }
}

fn compile_date() -> String {
    let now = time::now_utc();
    time::strftime("%Y-%m-%d", &now).unwrap_or_else(|_| "unknown date".to_string())
}
