//! CLI command implementations.

pub mod args;
pub mod output;
pub mod prompt;

pub mod destinations;
pub mod info;
pub mod settings;
pub mod transfer;

pub use args::{Cli, Commands};
pub use output::Output;
