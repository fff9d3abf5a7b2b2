//! Protocol Module
//!
//! Defines the wire protocol between `RemoteList` and the list service.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! Every payload but PING starts with key_len (4) + key (list name).
//! - 0x01: PUSH  - key, then record bytes
//! - 0x02: POP   - key
//! - 0x03: LEN   - key
//! - 0x04: RANGE - key, then start (8, signed) + end (8, signed)
//! - 0x05: DEL   - key
//! - 0x06: PING  - empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK        (LEN: u64; RANGE: count (4) + [len (4) + record]*;
//!   POP: record)
//! - 0x01: NOT_FOUND (POP on an empty list)
//! - 0x02: ERROR     (payload: message)

mod command;
mod response;
mod codec;

pub use codec::{
    decode_command, decode_records, decode_response, encode_command, encode_records,
    encode_response, read_command, read_response, write_command, write_response, HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};
pub use command::{Command, CommandType};
pub use response::{Response, Status};
