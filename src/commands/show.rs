//! Show command - displays configuration and provisioning status.

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::artifact::{self, Role};
use crate::common::is_executable;
use crate::config::Config;
use crate::platform::PlatformTarget;

/// Show target for the show command.
pub enum ShowTarget {
    Config,
    Status { target: PlatformTarget, json: bool },
}

/// One row of `show status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub path: PathBuf,
    /// `binary` or `alias`.
    pub kind: &'static str,
    pub role: Option<Role>,
    pub present: bool,
    pub executable: bool,
}

/// Required binaries and aliases for `target`, with their presence.
pub fn status(target: PlatformTarget, output_dir: &Path) -> Vec<StatusEntry> {
    let binaries = artifact::required(target, output_dir)
        .into_iter()
        .map(|a| StatusEntry {
            present: a.exists(),
            executable: is_executable(&a.path),
            path: a.path,
            kind: "binary",
            role: Some(a.role),
        });
    let aliases = artifact::aliases(target, output_dir)
        .into_iter()
        .map(|a| StatusEntry {
            present: a.path.exists(),
            executable: is_executable(&a.path),
            path: a.path,
            kind: "alias",
            role: None,
        });
    binaries.chain(aliases).collect()
}

/// Execute the show command.
pub fn cmd_show(config: &Config, what: ShowTarget) -> Result<()> {
    match what {
        ShowTarget::Config => {
            config.print();
        }
        ShowTarget::Status { target, json } => {
            let entries = status(target, &config.output_dir);
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }

            println!("Sidecars for {} ({}):", target, target.triple());
            for entry in &entries {
                let state = match (entry.present, entry.executable) {
                    (false, _) => "MISSING",
                    (true, false) => "NOT EXECUTABLE",
                    (true, true) => "OK",
                };
                println!("  [{:>14}] {:<6} {}", state, entry.kind, entry.path.display());
            }
            let missing = entries.iter().filter(|e| !e.present).count();
            if missing > 0 {
                println!("\n{} missing. Run 'sidecars prepare'.", missing);
            }
        }
    }
    Ok(())
}
