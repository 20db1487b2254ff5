//! Launch plan: the final environment plus the command to run

use crate::config::Environment;
use crate::runtime::process::ProcessConfig;

/// Everything needed to start the target command
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    /// Executable name or path
    pub executable: String,
    /// Arguments passed to the executable
    pub args: Vec<String>,
    /// Complete environment of the child
    pub env: Environment,
}

impl LaunchPlan {
    /// Build a plan with an empty environment from `command + args`
    pub fn new(command: Vec<String>) -> Result<Self, PlanError> {
        let mut command = command.into_iter();
        let executable = command.next().ok_or(PlanError::NoCommand)?;

        Ok(Self {
            executable,
            args: command.collect(),
            env: Environment::new(),
        })
    }

    /// Set the complete environment of the child
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// Process configuration for the launcher
    pub fn process_config(&self) -> ProcessConfig {
        ProcessConfig {
            name: self.executable.clone(),
            executable: self.executable.clone(),
            args: self.args.clone(),
            env: self.env.clone(),
        }
    }
}

impl std::fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Launch Plan")?;
        writeln!(f, "===========")?;
        writeln!(f)?;

        if !self.env.is_empty() {
            writeln!(f, "Environment:")?;
            for (key, value) in self.env.sorted() {
                writeln!(f, "  {}={}", key, value)?;
            }
            writeln!(f)?;
        }

        write!(f, "Command: {}", self.executable)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        writeln!(f)
    }
}

/// Errors that can occur when building a launch plan
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("No command to run")]
    NoCommand,
}
