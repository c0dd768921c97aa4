//! CLI module for autocoder - argument parsing and console output.

pub mod commands;
pub mod reporter;

pub use commands::Cli;
pub use reporter::ConsoleReporter;
