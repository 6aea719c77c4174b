// Build script: expose GEORISK_VERSION for `georisk --version`
//
// Taken from `git describe` when the source tree is a git checkout, otherwise
// the package version from Cargo.toml.

use std::process::Command;

fn main() {
    let version = git_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=GEORISK_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

fn git_version() -> Option<String> {
    // "v0.2.0", "v0.2.0-3-gabc123", "abc123-dirty"
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();

    if let Some(tagged) = described.strip_prefix('v') {
        // Keep only the tag, dropping commit count and hash
        let tag = tagged.split('-').next().unwrap_or(tagged);
        return Some(tag.to_string());
    }

    let base = env!("CARGO_PKG_VERSION");
    Some(format!("{}-{}", base, described))
}
