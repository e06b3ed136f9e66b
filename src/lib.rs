//! Sidecars - provisions ffmpeg/ffprobe binaries for a desktop app bundle.
//!
//! The dispatcher picks a strategy for the host platform; each strategy
//! downloads, verifies, and installs binaries into the output directory
//! under the names the bundler expects.
//!
//! See `tests/` for end-to-end scenarios driven through fake download and
//! extract backends.

pub mod artifact;
pub mod checksum;
pub mod commands;
pub mod common;
pub mod config;
pub mod download;
pub mod extract;
pub mod platform;
pub mod preflight;
pub mod process;
pub mod strategy;
pub mod timing;
