//! Crew duty-time tracker CLI library.
//!
//! This crate provides the command-line interface over `safehours-core` and
//! the `SQLite` store in `safehours-db`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, FileFormat};
pub use config::Config;
