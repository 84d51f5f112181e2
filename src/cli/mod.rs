//! Command-line interface module.

mod args;
mod inject;
mod source;

pub use args::Cli;
pub use inject::run;
