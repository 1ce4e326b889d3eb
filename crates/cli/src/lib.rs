//! Command-line front end for the dispatch layer.
//!
//! Provides:
//! - A named service directory
//! - An async call adapter with a deadline
//! - Textual argument conversion driven by signatures
//! - The `qi` commands run against a demo service

pub mod commands;
pub mod config;
pub mod convert;
pub mod demo;
pub mod directory;
pub mod transport;

pub use commands::{Command, CommandResult, Session};
pub use config::CliConfig;
pub use convert::ConvertError;
pub use directory::{Directory, DirectoryError};
pub use transport::call_with_timeout;
