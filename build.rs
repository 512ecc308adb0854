//! Build script: stamps the binary with its version and commit.
//!
//! Resolution order, first hit wins:
//! - RC_VERSION: env var, then the nearest `v*` git tag, then CARGO_PKG_VERSION
//! - RC_GIT_SHA: env var, then GITHUB_SHA (short form), then `git rev-parse`

use std::env;
use std::process::Command;

fn main() {
    let version = env::var("RC_VERSION")
        .ok()
        .or_else(version_from_tag)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    let git_sha = env::var("RC_GIT_SHA")
        .ok()
        .or_else(|| {
            env::var("GITHUB_SHA")
                .ok()
                .map(|sha| sha.chars().take(7).collect())
        })
        .or_else(|| git(&["rev-parse", "--short", "HEAD"]))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=RC_VERSION={version}");
    println!("cargo:rustc-env=RC_GIT_SHA={git_sha}");

    for var in ["RC_VERSION", "RC_GIT_SHA", "GITHUB_SHA"] {
        println!("cargo:rerun-if-env-changed={var}");
    }
    // New commits and tags move HEAD
    println!("cargo:rerun-if-changed=.git/HEAD");
}

/// Nearest release tag without its prefix, `v1.4.0` → `1.4.0`
fn version_from_tag() -> Option<String> {
    let described = git(&["describe", "--tags", "--match", "v*", "--abbrev=0"])?;
    let version = described.trim_start_matches('v');
    (!version.is_empty()).then(|| version.to_string())
}

/// Trimmed stdout of a successful git invocation
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
