//! Filesystem primitives shared by the acquisition strategies.

pub mod files;
pub mod temp;

pub use files::{
    ensure_dir, install_binary, is_executable, make_executable, place_alias_copy, remove_existing,
    replace_symlink,
};
pub use temp::WorkDir;
