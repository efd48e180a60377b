//! Filesystem module.
//!
//! Provides:
//! - Destination directory management
//! - Filename derivation and sanitisation

pub mod naming;
pub mod paths;

pub use naming::{
    medium_target, sanitize_filename, sanitize_path_component, video_file_name, MediumTarget,
};
pub use paths::{ensure_dir, get_account_folder};
