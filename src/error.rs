use thiserror::Error;

/// Design-level error kinds surfaced by the framers to the connection
/// driver. The driver never retries; any of these abort and close the
/// connection (and, since each client owns a dedicated backend connection,
/// that backend connection too).
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
