//! CLI subcommand implementations for the netxml binary.

pub mod check_cmd;
pub mod list_cmd;
pub mod output;
pub mod rewrite_cmd;
