//! Binary framing between the console and the host.
//!
//! Every frame is one transport message whose first byte is a tag:
//!
//! | Direction | Tag | Payload |
//! |---|---|---|
//! | console → host | `C` | u8 length, command text |
//! | console → host | `A` | u8 length, autocomplete query |
//! | host → console | `M` | u8 severity, f32 timestamp, u16 length, UTF-8 text |
//! | host → console | `L` | u16 count, then count × (u8 length, `name#flags&value`) |
//! | host → console | `X` | none, graceful disconnect |
//!
//! Multi-byte numbers are little-endian. There is no version byte, so any layout
//! change is a breaking wire change. Decoding never touches I/O or state.

mod reader;

use crate::error::codec::CodecError;

use reader::FrameReader;

use common::ErrorLocation;

use std::panic::Location;

use log::trace;
use models::{AutocompleteBuffer, AutocompleteEntry, ConsoleMessage, Severity};

pub const TAG_COMMAND: u8 = b'C';
pub const TAG_AUTOCOMPLETE_REQUEST: u8 = b'A';
pub const TAG_MESSAGE: u8 = b'M';
pub const TAG_AUTOCOMPLETE_LIST: u8 = b'L';
pub const TAG_DISCONNECT: u8 = b'X';

/// Longest command or autocomplete query a single-byte length can describe.
pub const MAX_COMMAND_LEN: usize = u8::MAX as usize;

/// Longest message body a two-byte length can describe.
pub const MAX_MESSAGE_LEN: usize = u16::MAX as usize;

/// Size of the fixed `M` header: tag, severity, timestamp, length.
const MESSAGE_HEADER_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Command {
        text: String,
    },
    AutocompleteRequest {
        query: String,
    },
    Message {
        severity: Severity,
        timestamp: f32,
        text: String,
    },
    AutocompleteList {
        entries: AutocompleteBuffer,
    },
    Disconnect,
}

impl Frame {
    pub fn tag(&self) -> u8 {
        match self {
            Frame::Command { .. } => TAG_COMMAND,
            Frame::AutocompleteRequest { .. } => TAG_AUTOCOMPLETE_REQUEST,
            Frame::Message { .. } => TAG_MESSAGE,
            Frame::AutocompleteList { .. } => TAG_AUTOCOMPLETE_LIST,
            Frame::Disconnect => TAG_DISCONNECT,
        }
    }

    /// Serialize the frame for the wire.
    ///
    /// # Errors
    ///
    /// - [`CodecError::CommandTooLong`] if a command or query exceeds [`MAX_COMMAND_LEN`]
    /// - [`CodecError::PayloadTooLong`] if a message body, entry count or entry
    ///   exceeds what its length prefix can express
    #[track_caller]
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Frame::Command { text } => encode_short_text(TAG_COMMAND, text),
            Frame::AutocompleteRequest { query } => {
                encode_short_text(TAG_AUTOCOMPLETE_REQUEST, query)
            }
            Frame::Message {
                severity,
                timestamp,
                text,
            } => {
                let length = u16::try_from(text.len()).map_err(|_| CodecError::PayloadTooLong {
                    message: format!(
                        "Message body is {} bytes, limit is {MAX_MESSAGE_LEN}",
                        text.len()
                    ),
                    location: ErrorLocation::from(Location::caller()),
                })?;

                let mut buf = Vec::with_capacity(MESSAGE_HEADER_LEN + text.len());
                buf.push(TAG_MESSAGE);
                buf.push(severity.as_byte());
                buf.extend_from_slice(&timestamp.to_le_bytes());
                buf.extend_from_slice(&length.to_le_bytes());
                buf.extend_from_slice(text.as_bytes());
                Ok(buf)
            }
            Frame::AutocompleteList { entries } => {
                let count =
                    u16::try_from(entries.len()).map_err(|_| CodecError::PayloadTooLong {
                        message: format!(
                            "Autocomplete list has {} entries, limit is {}",
                            entries.len(),
                            u16::MAX
                        ),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

                let mut buf = vec![TAG_AUTOCOMPLETE_LIST];
                buf.extend_from_slice(&count.to_le_bytes());
                for entry in entries.entries() {
                    let wire = entry.to_wire();
                    let length =
                        u8::try_from(wire.len()).map_err(|_| CodecError::PayloadTooLong {
                            message: format!(
                                "Autocomplete entry '{}' is {} bytes, limit is {MAX_COMMAND_LEN}",
                                entry.name,
                                wire.len()
                            ),
                            location: ErrorLocation::from(Location::caller()),
                        })?;
                    buf.push(length);
                    buf.extend_from_slice(wire.as_bytes());
                }
                Ok(buf)
            }
            Frame::Disconnect => Ok(vec![TAG_DISCONNECT]),
        }
    }

    /// The log line carried by an `M` frame, if this is one.
    pub fn into_console_message(self) -> Option<ConsoleMessage> {
        match self {
            Frame::Message {
                severity,
                timestamp,
                text,
            } => Some(ConsoleMessage::new(text, timestamp, severity)),
            _ => None,
        }
    }
}

/// Encode an operator command as a `C` frame.
///
/// The command is never truncated; callers validate the length up front.
///
/// # Errors
///
/// Returns [`CodecError::CommandTooLong`] if `text` is longer than 255 bytes.
#[track_caller]
pub fn encode_command(text: &str) -> Result<Vec<u8>, CodecError> {
    encode_short_text(TAG_COMMAND, text)
}

/// Encode an autocomplete query as an `A` frame.
///
/// # Errors
///
/// Returns [`CodecError::CommandTooLong`] if `query` is longer than 255 bytes.
#[track_caller]
pub fn encode_autocomplete_request(query: &str) -> Result<Vec<u8>, CodecError> {
    encode_short_text(TAG_AUTOCOMPLETE_REQUEST, query)
}

/// Decode one received frame.
///
/// # Errors
///
/// - [`CodecError::TruncatedFrame`] if the buffer is empty or shorter than a
///   declared length
/// - [`CodecError::InvalidSeverity`] if an `M` frame carries a severity above 5
/// - [`CodecError::UnknownFrame`] for any unrecognized tag
///
/// All three are protocol errors: the connection loop logs and drops the frame.
#[track_caller]
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, CodecError> {
    let mut reader = FrameReader::new(bytes);
    let tag = reader.read_u8("tag")?;

    match tag {
        TAG_DISCONNECT => Ok(Frame::Disconnect),
        TAG_MESSAGE => {
            let severity = Severity::try_from(reader.read_u8("severity")?)?;
            let timestamp = reader.read_f32_le("timestamp")?;
            let length = usize::from(reader.read_u16_le("length")?);
            let text = reader.read_text(length, "message text")?;
            Ok(Frame::Message {
                severity,
                timestamp,
                text,
            })
        }
        TAG_COMMAND => {
            let length = usize::from(reader.read_u8("length")?);
            let text = reader.read_text(length, "command text")?;
            Ok(Frame::Command { text })
        }
        TAG_AUTOCOMPLETE_REQUEST => {
            let length = usize::from(reader.read_u8("length")?);
            let query = reader.read_text(length, "autocomplete query")?;
            Ok(Frame::AutocompleteRequest { query })
        }
        TAG_AUTOCOMPLETE_LIST => {
            let count = reader.read_u16_le("entry count")?;
            let mut entries = Vec::with_capacity(usize::from(count).min(reader.remaining()));
            for _ in 0..count {
                let length = usize::from(reader.read_u8("entry length")?);
                let raw = reader.read_text(length, "autocomplete entry")?;
                match AutocompleteEntry::parse(&raw) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => trace!("Skipping autocomplete entry: {e}"),
                }
            }
            Ok(Frame::AutocompleteList {
                entries: AutocompleteBuffer::new(entries),
            })
        }
        other => Err(CodecError::UnknownFrame {
            tag: other,
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

#[track_caller]
fn encode_short_text(tag: u8, text: &str) -> Result<Vec<u8>, CodecError> {
    let length = u8::try_from(text.len()).map_err(|_| CodecError::CommandTooLong {
        length: text.len(),
        max: MAX_COMMAND_LEN,
        location: ErrorLocation::from(Location::caller()),
    })?;

    let mut buf = Vec::with_capacity(2 + text.len());
    buf.push(tag);
    buf.push(length);
    buf.extend_from_slice(text.as_bytes());
    Ok(buf)
}
