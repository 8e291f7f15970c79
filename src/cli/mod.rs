//! CLI module
//!
//! Command-line interface for walking paged HTTP sources.
//!
//! # Commands
//!
//! - `count` - Show total records and pages
//! - `read` - Stream records from either end
//! - `page` - Fetch a single page
//! - `validate` - Validate a walk definition

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
