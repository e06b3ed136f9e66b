//! Preflight checks before provisioning.
//!
//! Run with `sidecars preflight` to see whether the host has the tools the
//! strategy for a target needs.

mod host_tools;
mod types;

use anyhow::{bail, Result};
use std::path::Path;

pub use types::{CheckResult, CheckStatus, PreflightReport};

use crate::platform::PlatformTarget;
use crate::process;

/// Run all checks for `target`.
pub fn run_preflight(target: PlatformTarget, output_dir: &Path) -> PreflightReport {
    let mut checks = host_tools::check_host_tools(target, |tool| {
        process::which(tool).map(|p| p.display().to_string())
    });
    checks.push(check_output_dir(output_dir));
    PreflightReport { checks }
}

/// Run checks and fail if any failed.
pub fn run_preflight_or_fail(target: PlatformTarget, output_dir: &Path) -> Result<()> {
    let report = run_preflight(target, output_dir);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above first.",
            report.fail_count()
        );
    }
    Ok(())
}

fn check_output_dir(output_dir: &Path) -> CheckResult {
    const NAME: &str = "output dir";
    if output_dir.is_dir() {
        CheckResult::pass(NAME, output_dir.display().to_string())
    } else if output_dir.exists() {
        CheckResult::fail(NAME, format!("{} is not a directory", output_dir.display()))
    } else {
        CheckResult::warn(NAME, format!("{} will be created", output_dir.display()))
    }
}
