//! Secret references in configuration values.
//!
//! - `pass::entry/name` reads the first line of `pass show entry/name`
//! - `env::VAR` reads `$VAR`
//! - anything else is the value itself

use std::process::Command;

use thiserror::Error;

/// Errors raised while resolving a secret reference.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("environment variable `{0}` is not set")]
    MissingEnv(String),

    #[error("could not run `pass show {entry}`: {source}")]
    PassSpawn {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`pass show {entry}` exited with {status}: {stderr}")]
    PassFailed {
        entry: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("`pass show {0}` printed nothing")]
    PassEmpty(String),
}

/// A parsed configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretRef<'a> {
    Pass(&'a str),
    Env(&'a str),
    Plain(&'a str),
}

impl<'a> SecretRef<'a> {
    /// Parses a raw configuration value.
    pub fn parse(value: &'a str) -> Self {
        if let Some(entry) = value.strip_prefix("pass::") {
            Self::Pass(entry)
        } else if let Some(var) = value.strip_prefix("env::") {
            Self::Env(var)
        } else {
            Self::Plain(value)
        }
    }

    /// Returns true for values that point elsewhere rather than holding the
    /// secret inline.
    pub fn is_reference(&self) -> bool {
        !matches!(self, Self::Plain(_))
    }

    /// Resolves the reference to its value.
    pub fn resolve(&self) -> Result<String, SecretError> {
        match *self {
            Self::Plain(value) => Ok(value.to_string()),
            Self::Env(var) => std::env::var(var).map_err(|_| SecretError::MissingEnv(var.to_string())),
            Self::Pass(entry) => read_pass(entry),
        }
    }
}

/// Resolves a raw configuration value.
pub fn resolve(value: &str) -> Result<String, SecretError> {
    SecretRef::parse(value).resolve()
}

fn read_pass(entry: &str) -> Result<String, SecretError> {
    let output = Command::new("pass")
        .arg("show")
        .arg(entry)
        .output()
        .map_err(|source| SecretError::PassSpawn {
            entry: entry.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(SecretError::PassFailed {
            entry: entry.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| SecretError::PassEmpty(entry.to_string()))
}
