//! CLI module for ytb - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
