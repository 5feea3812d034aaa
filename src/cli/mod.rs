//! CLI module for bgremove-studio
//!
//! This module is only available when the "cli" feature is enabled.

mod config;
#[path = "main.rs"]
mod main_impl;

pub use main_impl::{collect_inputs, main, process_inputs, Cli, RunSummary};
