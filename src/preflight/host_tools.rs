//! Host tool availability checks.

use super::types::CheckResult;
use crate::platform::{Os, PlatformTarget};

/// Check the external tools provisioning for `target` shells out to.
///
/// `lookup` returns the resolved path of a program, if installed.
pub fn check_host_tools(
    target: PlatformTarget,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<CheckResult> {
    let mut results = Vec::new();

    // Downloads: curl preferred, wget as fallback.
    results.push(match (lookup("curl"), lookup("wget")) {
        (Some(path), _) => CheckResult::pass("curl", path),
        (None, Some(path)) => {
            CheckResult::warn("curl", format!("Not found, falling back to wget ({})", path))
        }
        (None, None) => CheckResult::fail("curl", "Neither curl nor wget found. Install curl."),
    });

    match target.os {
        Os::Linux => {
            results.push(require(&lookup, "tar", "Required to unpack the static build"));
            results.push(require(&lookup, "xz", "Required by tar -J for .tar.xz archives"));
        }
        Os::MacOs => {
            results.push(zip_tool(&lookup, "unzip", "tar"));
        }
        Os::Windows => {
            results.push(zip_tool(&lookup, "tar", "powershell"));
        }
    }

    results
}

fn require(lookup: &impl Fn(&str) -> Option<String>, tool: &str, purpose: &str) -> CheckResult {
    match lookup(tool) {
        Some(path) => CheckResult::pass(tool, path),
        None => CheckResult::fail(tool, format!("Not found. {}", purpose)),
    }
}

/// A zip extractor with one fallback.
fn zip_tool(
    lookup: &impl Fn(&str) -> Option<String>,
    preferred: &str,
    fallback: &str,
) -> CheckResult {
    match (lookup(preferred), lookup(fallback)) {
        (Some(path), _) => CheckResult::pass(preferred, path),
        (None, Some(path)) => CheckResult::warn(
            preferred,
            format!("Not found, zip archives will use {} ({})", fallback, path),
        ),
        (None, None) => CheckResult::fail(
            preferred,
            format!("Not found and no {} fallback. Cannot unpack zip archives.", fallback),
        ),
    }
}
