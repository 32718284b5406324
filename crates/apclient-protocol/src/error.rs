/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an outbound command failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// An inbound frame or command failed to parse.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The frame is structurally wrong (not an array of objects with a
    /// string `cmd`).
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}
