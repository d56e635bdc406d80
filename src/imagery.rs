//! Image payload conventions for the model boundary.
//!
//! Every image sent to the AI service travels as raw base64: any
//! `data:<mime>;base64,` prefix the browser attached is stripped first.
//! Every image received back is re-wrapped as a displayable
//! `data:image/jpeg;base64,` source before it reaches the UI.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use once_cell::sync::Lazy;
use regex::Regex;

static DATA_URI_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/[\w.+-]+;base64,").unwrap());

/// Strip a leading `data:image/...;base64,` prefix, leaving raw base64.
///
/// Input without a prefix passes through unchanged, so stripping is
/// idempotent.
pub fn strip_data_uri(payload: &str) -> &str {
    match DATA_URI_PREFIX.find(payload) {
        Some(m) => &payload[m.end()..],
        None => payload,
    }
}

/// Whether a payload carries embedded image data rather than a URL.
pub fn is_data_uri(payload: &str) -> bool {
    payload.starts_with("data:")
}

/// Re-wrap raw base64 returned by the model as a displayable image source.
pub fn wrap_jpeg(data: &str) -> String {
    format!("data:image/jpeg;base64,{data}")
}

/// Decode an uploaded payload to raw bytes, validating the base64 body.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(strip_data_uri(payload))
}
