use thiserror::Error;

/// Library error type for autoplay operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings that cannot drive a timer (zero interval, bad cadence, ...).
    #[error("invalid autoplay configuration: {0}")]
    InvalidConfig(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
