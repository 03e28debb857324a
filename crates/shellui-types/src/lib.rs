//! Foundation types for ShellUI.
//!
//! This crate contains the host-agnostic types shared by all ShellUI crates:
//! input events, the shell configuration, and error types.

pub mod config;
pub mod error;
pub mod input;
