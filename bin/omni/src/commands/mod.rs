//! Contains subcommands for the omni CLI.

mod network;
pub use network::{NetworkCommand, StreamsCommand, ValidateCommand};
