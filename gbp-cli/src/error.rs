use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Opening or querying the live store failed
    #[error("Store error: {0}")]
    Store(String),

    /// Seeding, dumping or hashing failed
    #[error("Seed error: {0}")]
    Seed(String),

    #[error("Config error: {0}")]
    Config(String),

    /// Runtime creation or server error
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CliError {
    pub(crate) fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub(crate) fn seed(msg: impl Into<String>) -> Self {
        Self::Seed(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}
