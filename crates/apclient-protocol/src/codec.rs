//! Frame codec: one WebSocket text frame holds a JSON array of commands.
//!
//! Decoding is all-or-nothing. The whole frame is parsed and every known
//! command is converted to its typed form before anything is handed to
//! the dispatcher, so a malformed command never leaves half a frame
//! applied. Commands with an unrecognised `cmd` are skipped; a command
//! missing `cmd` entirely (or a frame that is not an array of objects)
//! fails the frame.

use serde_json::Value;

use crate::command::{ClientCommand, ServerCommand};
use crate::error::ProtocolError;

/// Encodes outbound commands as a single text frame.
///
/// # Errors
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_frame(commands: &[ClientCommand]) -> Result<String, ProtocolError> {
    serde_json::to_string(commands).map_err(ProtocolError::Encode)
}

/// Decodes an inbound text frame into typed commands.
///
/// # Errors
/// - [`ProtocolError::Decode`] — the frame is not valid JSON, or a known
///   command fails schema validation.
/// - [`ProtocolError::InvalidFrame`] — the frame is not an array of
///   objects each carrying a string `cmd`.
pub fn decode_frame(text: &str) -> Result<Vec<ServerCommand>, ProtocolError> {
    let values: Vec<Value> = serde_json::from_str(text).map_err(ProtocolError::Decode)?;

    let mut commands = Vec::with_capacity(values.len());
    for value in values {
        let Some(cmd) = value.get("cmd").and_then(Value::as_str) else {
            return Err(ProtocolError::InvalidFrame(
                "command object without a string `cmd`".into(),
            ));
        };
        if !ServerCommand::KNOWN.contains(&cmd) {
            tracing::debug!(cmd, "skipping unknown command");
            continue;
        }
        commands.push(serde_json::from_value(value).map_err(ProtocolError::Decode)?);
    }
    Ok(commands)
}
