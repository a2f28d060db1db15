//! Command implementations behind the CLI

pub mod clean;
pub mod init;
pub mod list;
pub mod render;
