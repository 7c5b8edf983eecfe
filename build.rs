use std::process::Command;

fn main() {
    // Embedded in the startup log line so a deployed binary can be traced
    // back to the revision it was built from.
    let rev = Command::new("git")
        .args(["describe", "--always", "--dirty=-modified"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|| "unreleased".to_string());

    println!("cargo:rustc-env=REFERRAL_BUILD_REV={}", rev);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
}
