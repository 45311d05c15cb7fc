//! # athena
//!
//! Command-line host for the Athena action plugins.
//!
//! ## Commands
//!
//! - `athena actions`: List registered actions and whether they can run
//! - `athena run <ACTION> <TEXT>`: Invoke one action and print its reply
//! - `athena chat`: Pick and run actions for each line typed on stdin

pub mod commands;

pub use commands::{Cli, build_runtime};
