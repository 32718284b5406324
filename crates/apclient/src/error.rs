//! Unified error type for the client crate.

use apclient_datapackage::StoreError;
use apclient_protocol::ProtocolError;
use apclient_transport::TransportError;

use crate::render::RenderFormat;

/// Top-level error wrapping the layer-specific errors.
///
/// Most failure paths never reach the caller: transport and protocol
/// problems are logged and handled by reconnecting or dropping the bad
/// frame. What remains are synchronous failures of direct calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An encode/decode failure surfaced from a direct call.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A transport-level failure surfaced from a direct call.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A data package cache failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The requested render format is not implemented.
    #[error("rendering to {0:?} is not supported")]
    UnsupportedRenderFormat(RenderFormat),
}
