//! Definitions file parsing, environment merging and placeholder substitution

mod env_file;
mod environment;
mod substitution;

pub use env_file::*;
pub use environment::*;
pub use substitution::*;
