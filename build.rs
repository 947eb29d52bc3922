//! Build script for openalt
//!
//! Stamps the binary with the git revision and build time reported by `/version`.

use std::process::Command;

fn git(args: &[&str]) -> String {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    println!(
        "cargo:rustc-env=OPENALT_GIT_COMMIT={}",
        git(&["rev-parse", "--short", "HEAD"])
    );

    let built_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    println!("cargo:rustc-env=OPENALT_BUILT_AT={}", built_at);

    println!("cargo:rerun-if-changed=.git/HEAD");
}
