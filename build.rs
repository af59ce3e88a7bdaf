//! Build script for curator-repo.

use std::process::Command;

fn main() {
    // Prefer CURATOR_REPO_VERSION if set (e.g. by the release workflow),
    // otherwise fall back to git describe for local builds.
    if let Ok(version) = std::env::var("CURATOR_REPO_VERSION") {
        println!("cargo:rustc-env=CURATOR_REPO_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=CURATOR_REPO_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=CURATOR_REPO_VERSION");
}
