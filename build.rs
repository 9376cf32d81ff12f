use std::process::Command;

const SHORT_SHA_LEN: usize = 7;

fn main() {
    println!("cargo:rustc-env=GIT_COMMIT={}", git_commit());
    println!(
        "cargo:rustc-env=BUILD_DATE={}",
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );

    println!("cargo:rerun-if-env-changed=GITHUB_SHA");
    if std::path::Path::new(".git/HEAD").exists() {
        println!("cargo:rerun-if-changed=.git/HEAD");
    }
}

/// CI builds export `GITHUB_SHA`; local builds ask git directly.
fn git_commit() -> String {
    std::env::var("GITHUB_SHA")
        .ok()
        .filter(|sha| sha.len() >= SHORT_SHA_LEN)
        .map(|sha| sha[..SHORT_SHA_LEN].to_string())
        .or_else(commit_from_git)
        .unwrap_or_else(|| "unknown".to_string())
}

fn commit_from_git() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}
