//! CLI subcommand implementations.

pub mod add;
pub mod edit;
pub mod export;
pub mod import;
pub mod list;
pub mod status;
pub mod timeline;
pub mod util;
pub mod week;
