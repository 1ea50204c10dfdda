//! Self-delimited wire framing for bridge messages.
//!
//! Wire format:
//! ```text
//! [len:4][body:len]
//! ```
//! `len` is the body length in bytes, big-endian. The body is the
//! JSON-encoded message envelope. A frame is written and read as a unit; a
//! partial frame never crosses the transport.

use crate::error::FrameError;

/// Size of the frame header in bytes.
pub const FRAME_HEADER_LEN: usize = 4;

/// Default upper bound for one frame body, in bytes.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

/// Encode one message body into a self-delimited frame.
///
/// Fails with [`FrameError::TooLarge`] before anything is written; a partial
/// frame is never produced.
pub fn encode_frame(body: &[u8], max_len: usize) -> Result<Vec<u8>, FrameError> {
    if body.len() > max_len {
        return Err(FrameError::TooLarge {
            len: body.len(),
            max: max_len,
        });
    }

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(body);
    Ok(frame)
}

/// Decode one self-delimited frame, returning the message body.
pub fn decode_frame(frame: &[u8], max_len: usize) -> Result<&[u8], FrameError> {
    if frame.len() < FRAME_HEADER_LEN {
        return Err(FrameError::Truncated {
            needed: FRAME_HEADER_LEN,
            available: frame.len(),
        });
    }

    let declared = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
    if declared > max_len {
        return Err(FrameError::TooLarge {
            len: declared,
            max: max_len,
        });
    }

    let body = &frame[FRAME_HEADER_LEN..];
    if body.len() != declared {
        return Err(FrameError::LengthMismatch {
            declared,
            actual: body.len(),
        });
    }

    Ok(body)
}
