//! Build script for xrep-check
//!
//! Embeds build identification for the startup banner (`build_banner`):
//! - `GIT_HASH`: short commit hash, or `unknown` outside a git checkout
//! - `BUILD_TIMESTAMP`: UTC time of the build, RFC 3339
//! - `BUILD_PROFILE`: cargo profile (debug/release)
//!
//! The script reruns when the checked-out commit changes, not on every build.

use std::fs;
use std::path::Path;
use std::process::Command;

const GIT_DIR: &str = "../.git";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    watch_git_head(Path::new(GIT_DIR));

    let build_timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", short_commit_hash());
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);
}

/// Rerun when HEAD moves: HEAD itself for a checkout or detach, and the
/// branch ref it points at for a new commit on that branch.
fn watch_git_head(git_dir: &Path) {
    let head = git_dir.join("HEAD");
    println!("cargo:rerun-if-changed={}", head.display());

    let branch_ref = fs::read_to_string(&head)
        .ok()
        .and_then(|content| content.strip_prefix("ref: ").map(|r| r.trim().to_string()));
    if let Some(branch_ref) = branch_ref {
        println!("cargo:rerun-if-changed={}", git_dir.join(branch_ref).display());
    }
}

fn short_commit_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
