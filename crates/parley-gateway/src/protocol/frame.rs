//! Binary frame codec
//!
//! Frame layout, bit-exact:
//!
//! ```text
//! LE_UINT32(total_length) || UINT8(type) || payload bytes
//! ```
//!
//! `total_length` counts the whole frame including the 5-byte header. The
//! transport delivers exactly one frame per read (one WebSocket binary
//! message); trailing bytes past `total_length` are ignored here. The 8 KiB
//! size cap is enforced by the transport's read limit, not by this codec.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Length + type byte
pub const HEADER_LEN: usize = 5;

/// Maximum total frame size, enforced as the WebSocket max-message-size
pub const MAX_FRAME_LEN: usize = 8192;

/// Frame decoding/encoding errors. All non-fatal: the connection answers
/// with a reject frame and stays open.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame too short: {len} bytes, need at least {HEADER_LEN}")]
    TooShort { len: usize },

    #[error("declared length {declared} smaller than header")]
    InvalidLength { declared: u32 },

    #[error("declared length {declared} exceeds buffer of {actual} bytes")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("payload serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a frame from a type code and raw payload bytes
#[must_use]
pub fn encode(type_code: u8, payload: &[u8]) -> Vec<u8> {
    let total_length = HEADER_LEN + payload.len();
    let mut buf = Vec::with_capacity(total_length);
    buf.extend_from_slice(&(total_length as u32).to_le_bytes());
    buf.push(type_code);
    buf.extend_from_slice(payload);
    buf
}

/// Encode a frame with a JSON payload
pub fn encode_json<T: Serialize>(type_code: u8, payload: &T) -> Result<Vec<u8>, FrameError> {
    let bytes = serde_json::to_vec(payload)?;
    Ok(encode(type_code, &bytes))
}

/// Decode a received buffer into `(type, payload)`
///
/// # Errors
/// Fails on buffers shorter than the header and on declared lengths that do
/// not fit the buffer. Never panics.
pub fn decode(buf: &[u8]) -> Result<(u8, &[u8]), FrameError> {
    if buf.len() < HEADER_LEN {
        return Err(FrameError::TooShort { len: buf.len() });
    }

    let declared = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if (declared as usize) < HEADER_LEN {
        return Err(FrameError::InvalidLength { declared });
    }
    if declared as usize > buf.len() {
        return Err(FrameError::LengthMismatch {
            declared: declared as usize,
            actual: buf.len(),
        });
    }

    let type_code = buf[4];
    Ok((type_code, &buf[HEADER_LEN..declared as usize]))
}

/// Deserialize a JSON payload slice into a typed request
///
/// An empty payload decodes as an empty JSON object, so parameterless
/// requests may omit the body entirely.
pub fn decode_json<T: DeserializeOwned>(payload: &[u8]) -> Result<T, FrameError> {
    if payload.is_empty() {
        return Ok(serde_json::from_slice(b"{}")?);
    }
    Ok(serde_json::from_slice(payload)?)
}
