use thiserror::Error;

/// Errors raised while bootstrapping the runtime.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Logging already initialized or unavailable: {0}")]
    LoggingInit(String),
}

pub type Result<T> = std::result::Result<T, Error>;
