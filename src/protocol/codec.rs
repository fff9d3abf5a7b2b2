//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - PUSH:  key_len (4) + key + record
//! - POP:   key_len (4) + key
//! - LEN:   key_len (4) + key
//! - RANGE: key_len (4) + key + start (8) + end (8)
//! - DEL:   key_len (4) + key
//! - PING:  empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! All integers are big-endian.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{BacklogError, Result};

use super::{Command, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut payload = BytesMut::new();

    match command {
        Command::Push { key, record } => {
            put_key(&mut payload, key);
            payload.put_slice(record.as_bytes());
        }
        Command::Pop { key } | Command::Len { key } | Command::Del { key } => {
            put_key(&mut payload, key);
        }
        Command::Range { key, start, end } => {
            put_key(&mut payload, key);
            payload.put_i64(*start);
            payload.put_i64(*end);
        }
        Command::Ping => {}
    }

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, mut payload) = split_frame(bytes, "command")?;

    let command = match cmd_type {
        0x01 => {
            let key = take_key(&mut payload, "PUSH")?;
            let record = take_string(payload, "PUSH record")?;
            payload = &payload[payload.len()..];
            Command::Push { key, record }
        }
        0x02 => Command::Pop {
            key: take_key(&mut payload, "POP")?,
        },
        0x03 => Command::Len {
            key: take_key(&mut payload, "LEN")?,
        },
        0x04 => {
            let key = take_key(&mut payload, "RANGE")?;
            if payload.remaining() < 16 {
                return Err(BacklogError::Protocol(format!(
                    "RANGE command: expected 16 bytes of bounds, got {}",
                    payload.remaining()
                )));
            }
            let start = payload.get_i64();
            let end = payload.get_i64();
            Command::Range { key, start, end }
        }
        0x05 => Command::Del {
            key: take_key(&mut payload, "DEL")?,
        },
        0x06 => Command::Ping,
        _ => {
            return Err(BacklogError::Protocol(format!(
                "Unknown command type: 0x{:02x}",
                cmd_type
            )))
        }
    };

    if payload.has_remaining() {
        return Err(BacklogError::Protocol(format!(
            "{:?} command: unexpected trailing {} bytes",
            command.command_type(),
            payload.remaining()
        )));
    }

    Ok(command)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    frame(response.status as u8, response.body())
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::Error,
        _ => {
            return Err(BacklogError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

/// Encode a RANGE result: count (4) + [len (4) + record]*
pub fn encode_records(records: &[String]) -> Vec<u8> {
    let size = 4 + records.iter().map(|r| 4 + r.len()).sum::<usize>();
    let mut buf = BytesMut::with_capacity(size);
    buf.put_u32(records.len() as u32);
    for record in records {
        buf.put_u32(record.len() as u32);
        buf.put_slice(record.as_bytes());
    }
    buf.to_vec()
}

/// Decode a RANGE result
pub fn decode_records(mut bytes: &[u8]) -> Result<Vec<String>> {
    if bytes.remaining() < 4 {
        return Err(BacklogError::Protocol(
            "RANGE result: missing record count".to_string(),
        ));
    }

    let count = bytes.get_u32() as usize;
    let mut records = Vec::with_capacity(count.min(1024));

    for i in 0..count {
        if bytes.remaining() < 4 {
            return Err(BacklogError::Protocol(format!(
                "RANGE result: missing length of record {}",
                i
            )));
        }
        let len = bytes.get_u32() as usize;
        if bytes.remaining() < len {
            return Err(BacklogError::Protocol(format!(
                "RANGE result: record {} truncated (expected {}, got {})",
                i,
                len,
                bytes.remaining()
            )));
        }
        records.push(take_string(&bytes[..len], "RANGE record")?);
        bytes.advance(len);
    }

    Ok(records)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    decode_command(&read_frame(reader)?)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    decode_response(&read_frame(reader)?)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Build header + payload
fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(tag);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.to_vec()
}

/// Validate a frame and split it into (tag, payload)
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(BacklogError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let tag = bytes[0];
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);

    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(BacklogError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len as usize;
    if bytes.len() < total_len {
        return Err(BacklogError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[HEADER_SIZE..total_len]))
}

/// Read header then payload from a stream into one buffer
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(BacklogError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = vec![0u8; HEADER_SIZE + payload_len as usize];
    message[..HEADER_SIZE].copy_from_slice(&header);
    reader.read_exact(&mut message[HEADER_SIZE..])?;
    Ok(message)
}

fn put_key(buf: &mut BytesMut, key: &str) {
    buf.put_u32(key.len() as u32);
    buf.put_slice(key.as_bytes());
}

/// Consume key_len (4) + key from the front of a payload
fn take_key(payload: &mut &[u8], cmd: &str) -> Result<String> {
    if payload.remaining() < 4 {
        return Err(BacklogError::Protocol(format!(
            "{} command: missing key length",
            cmd
        )));
    }

    let key_len = payload.get_u32() as usize;
    if payload.remaining() < key_len {
        return Err(BacklogError::Protocol(format!(
            "{} command: incomplete key (expected {}, got {})",
            cmd,
            key_len,
            payload.remaining()
        )));
    }

    let key = take_string(&payload[..key_len], cmd)?;
    payload.advance(key_len);
    Ok(key)
}

fn take_string(bytes: &[u8], what: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| BacklogError::Protocol(format!("{}: invalid UTF-8: {}", what, e)))
}
