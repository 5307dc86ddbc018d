//! CLI subcommands.

pub mod batch;
pub mod page;
