//! Preflight command - checks host tools.

use anyhow::Result;
use std::path::Path;

use crate::platform::PlatformTarget;
use crate::preflight;

/// Execute the preflight command.
pub fn cmd_preflight(target: PlatformTarget, output_dir: &Path, strict: bool) -> Result<()> {
    if strict {
        preflight::run_preflight_or_fail(target, output_dir)?;
        println!("All preflight checks passed.");
    } else {
        let report = preflight::run_preflight(target, output_dir);
        report.print();
        if !report.all_passed() {
            println!("Some checks failed. Use --strict to exit non-zero.");
        }
    }
    Ok(())
}
