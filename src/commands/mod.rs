//! CLI command handlers.
//!
//! - `prepare` - provision sidecars (default)
//! - `show` - display configuration or status
//! - `clean` - remove provisioned sidecars
//! - `preflight` - check host tools
//! - `hash` - print file digests

pub mod clean;
mod hash;
mod preflight;
pub mod prepare;
pub mod show;

pub use clean::cmd_clean;
pub use hash::cmd_hash;
pub use preflight::cmd_preflight;
pub use prepare::cmd_prepare;
pub use show::cmd_show;
