//! Command-line interface for loadscope
//!
//! This module contains CLI argument parsing and configuration

pub mod args;

pub use args::{Args, Command};
