//! Decoding of the provider's flat `{"result": ..., "data": ...}` envelope

use serde::Deserialize;
use serde_json::Value;

use crate::error::DecodeError;
use crate::types::{CommandOutcome, CommandStatus};

#[derive(Debug, Deserialize)]
struct Envelope {
    result: Option<String>,
    data: Option<Value>,
}

/// Split a response body into its verdict and raw `data` payload
///
/// Both fields are required; a body that parses but omits either one is a
/// contract change and must not be read as a provider failure.
pub(crate) fn decode_envelope(body: &str) -> Result<(CommandStatus, Value), DecodeError> {
    let envelope: Envelope = serde_json::from_str(body)?;

    let result = envelope.result.ok_or(DecodeError::MissingField("result"))?;
    let data = envelope.data.ok_or(DecodeError::MissingField("data"))?;

    let status = match result.as_str() {
        "success" => CommandStatus::Success,
        "error" => CommandStatus::Failure,
        _ => return Err(DecodeError::UnexpectedResult(result)),
    };

    Ok((status, data))
}

/// Decode a body into a [`CommandOutcome`]
pub(crate) fn decode_outcome(body: &str) -> Result<CommandOutcome, DecodeError> {
    let (status, data) = decode_envelope(body)?;
    Ok(CommandOutcome {
        status,
        detail: detail_text(data),
    })
}

/// Text form of a `data` payload
pub(crate) fn detail_text(data: Value) -> String {
    match data {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
