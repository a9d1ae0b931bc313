//! Build identification for the `bgg-enricher` binary
//!
//! Exposes `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE` to `env!()` so
//! the startup log can say exactly which build produced a given output file.

use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    let identity = [
        ("GIT_HASH", git_short_hash()),
        ("BUILD_TIMESTAMP", Some(build_timestamp())),
        ("BUILD_PROFILE", std::env::var("PROFILE").ok()),
    ];

    for (key, value) in identity {
        println!(
            "cargo:rustc-env={}={}",
            key,
            value.as_deref().unwrap_or(UNKNOWN)
        );
    }

    // No rerun-if-changed: the script reruns on every build so the hash stays current
}

/// Short commit hash, or `None` outside a git checkout
fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string()).filter(|h| !h.is_empty())
}

/// Local time with offset, e.g. `2025-10-26T14:30:45-05:00`
fn build_timestamp() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
}
