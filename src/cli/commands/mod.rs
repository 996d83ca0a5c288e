//! CLI command implementations
//!
//! Each command is implemented in its own module.

pub mod info;
pub mod init;
pub mod status;
pub mod sync;
