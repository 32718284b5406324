/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Opening the connection failed before any traffic flowed.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// Sending a frame failed, usually because the connection is gone.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The connection was closed.
    #[error("connection closed")]
    Closed,
}
