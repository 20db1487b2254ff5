//! Runtime components for launching the target command

pub mod plan;
pub mod process;

pub use plan::*;
pub use process::*;
