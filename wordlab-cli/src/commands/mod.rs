//! Subcommand implementations

pub mod check_key;
pub mod expand;
pub mod list;
pub mod models;
pub mod run;
pub mod show;
