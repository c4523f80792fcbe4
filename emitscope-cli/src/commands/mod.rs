//! CLI subcommands.

pub mod classify;
pub mod common;
pub mod config;
pub mod inventory;
