use thiserror::Error;

/// Errors that can occur when starting or reconfiguring the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (reading the config file, binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The plugin refused to activate.
    #[error("activation failed: {0}")]
    Activation(String),
}
