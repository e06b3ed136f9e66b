//! Prepare command - provisions sidecars for a target.

use anyhow::Result;

use crate::config::Config;
use crate::download::HostDownloader;
use crate::extract::HostExtractor;
use crate::platform::PlatformTarget;
use crate::strategy::{self, Host, Report};
use crate::timing::Timer;

/// Execute the prepare command with the host's real download and extract tools.
pub fn cmd_prepare(config: &Config, target: Option<PlatformTarget>) -> Result<Report> {
    let downloader = HostDownloader::default();
    let extractor = HostExtractor::default();
    let host = Host::new(&downloader, &extractor);

    let timer = Timer::start("prepare sidecars");
    let report = strategy::run(target, config, &host)?;
    timer.finish();

    print_summary(&report);
    Ok(report)
}

fn print_summary(report: &Report) {
    for path in &report.present {
        println!("  present:   {}", path.display());
    }
    for path in &report.installed {
        println!("  installed: {}", path.display());
    }
    for path in &report.aliases {
        println!("  alias:     {}", path.display());
    }
    if report.warnings.is_empty() {
        println!("Sidecars ready.");
    } else {
        println!("Sidecars prepared with {} warning(s):", report.warnings.len());
        for warning in &report.warnings {
            println!("  ⚠ {}", warning);
        }
    }
}
