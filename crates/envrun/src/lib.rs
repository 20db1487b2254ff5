//! envrun
//!
//! Runs a command with environment variables loaded from a dotenv-style file.
//!
//! # Overview
//!
//! The launcher:
//! - Parses `KEY=value` definitions, skipping comments and rejecting invalid names
//! - Merges them with the ambient process environment
//! - Resolves `${KEY}` and `${KEY|default}` placeholders in the merged values
//! - Starts the target command with exactly that environment and relays its output
//! - Propagates the child's exit code
//!
//! # Example Definitions File
//!
//! ```text
//! # comment lines start with optional whitespace then '#'
//! KEY=value
//! PATH_LIKE=${HOME}/bin
//! WITH_DEFAULT=${UNSET_VAR|fallback}
//! ```
//!
//! By default values from the file win over the ambient environment. With
//! [`Precedence::AmbientWins`] the ambient values win, but file values may
//! still reference them as placeholders.

pub mod cli;
pub mod config;
pub mod runtime;

pub use cli::EnvRunArgs;
pub use config::{
    compose, is_valid_name, EnvFile, EnvFileError, Environment, Precedence, Resolved,
    SubstitutionError,
};
pub use runtime::{
    LaunchPlan, Launcher, PlanError, ProcessConfig, ProcessError, ProcessOutcome,
    FAILURE_EXIT_CODE,
};
