//! Tests for the list wire protocol
//!
//! These tests verify:
//! - Command and response framing
//! - RANGE result encoding
//! - Rejection of truncated, oversized, unknown or padded frames
//! - Stream read/write helpers

use std::io::Cursor;

use backlog::protocol::{
    decode_command, decode_records, decode_response, encode_command, encode_records,
    encode_response, read_command, read_response, write_command, write_response, Command,
    CommandType, Response, Status, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
use backlog::BacklogError;

fn key(k: &str) -> String {
    k.to_string()
}

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_command_round_trips() {
    let commands = vec![
        Command::Push {
            key: key("__BACKLOG__LOG"),
            record: "{\"message\":\"hi\"}".to_string(),
        },
        Command::Pop { key: key("a") },
        Command::Len { key: key("a") },
        Command::Range {
            key: key("a"),
            start: -50,
            end: -1,
        },
        Command::Del { key: key("a") },
        Command::Ping,
    ];

    for command in commands {
        let bytes = encode_command(&command);
        assert_eq!(decode_command(&bytes).unwrap(), command);
    }
}

#[test]
fn test_push_frame_layout() {
    let bytes = encode_command(&Command::Push {
        key: key("ab"),
        record: "xyz".to_string(),
    });

    assert_eq!(bytes[0], CommandType::Push as u8);
    assert_eq!(&bytes[1..5], &(4u32 + 2 + 3).to_be_bytes());
    assert_eq!(&bytes[5..9], &2u32.to_be_bytes());
    assert_eq!(&bytes[9..11], b"ab");
    assert_eq!(&bytes[11..], b"xyz");
}

#[test]
fn test_push_with_empty_record() {
    let command = Command::Push {
        key: key("a"),
        record: String::new(),
    };

    assert_eq!(decode_command(&encode_command(&command)).unwrap(), command);
}

#[test]
fn test_range_bounds_are_signed() {
    let bytes = encode_command(&Command::Range {
        key: key("k"),
        start: i64::MIN,
        end: -1,
    });

    match decode_command(&bytes).unwrap() {
        Command::Range { start, end, .. } => {
            assert_eq!(start, i64::MIN);
            assert_eq!(end, -1);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_ping_has_empty_payload() {
    let bytes = encode_command(&Command::Ping);

    assert_eq!(bytes.len(), HEADER_SIZE);
    assert_eq!(Command::Ping.key(), None);
}

#[test]
fn test_unknown_command_type() {
    let bytes = [0x7F, 0, 0, 0, 0];

    assert!(matches!(decode_command(&bytes), Err(BacklogError::Protocol(_))));
}

#[test]
fn test_truncated_header() {
    assert!(matches!(decode_command(&[0x01, 0, 0]), Err(BacklogError::Protocol(_))));
}

#[test]
fn test_truncated_payload() {
    let bytes = encode_command(&Command::Len { key: key("abc") });

    let result = decode_command(&bytes[..bytes.len() - 1]);

    assert!(matches!(result, Err(BacklogError::Protocol(_))));
}

#[test]
fn test_oversized_payload_rejected() {
    let mut bytes = vec![0x03];
    bytes.extend_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());

    assert!(matches!(decode_command(&bytes), Err(BacklogError::Protocol(_))));
}

#[test]
fn test_trailing_bytes_rejected() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&1u32.to_be_bytes());
    payload.extend_from_slice(b"a");
    payload.extend_from_slice(b"junk");

    let mut bytes = vec![CommandType::Pop as u8];
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&payload);

    assert!(matches!(decode_command(&bytes), Err(BacklogError::Protocol(_))));
}

#[test]
fn test_range_missing_bounds() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&1u32.to_be_bytes());
    payload.extend_from_slice(b"a");
    payload.extend_from_slice(&[0u8; 8]);

    let mut bytes = vec![CommandType::Range as u8];
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&payload);

    assert!(matches!(decode_command(&bytes), Err(BacklogError::Protocol(_))));
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_round_trips() {
    let responses = vec![
        Response::ok(None),
        Response::ok(Some(b"PONG".to_vec())),
        Response::not_found(),
        Response::error("list unavailable"),
    ];

    for response in responses {
        let bytes = encode_response(&response);
        assert_eq!(decode_response(&bytes).unwrap(), response);
    }
}

#[test]
fn test_empty_payload_decodes_as_none() {
    let bytes = encode_response(&Response::ok(Some(Vec::new())));

    let decoded = decode_response(&bytes).unwrap();

    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.payload, None);
    assert!(decoded.body().is_empty());
}

#[test]
fn test_unknown_status() {
    assert!(matches!(
        decode_response(&[0x09, 0, 0, 0, 0]),
        Err(BacklogError::Protocol(_))
    ));
}

// =============================================================================
// Record List Tests
// =============================================================================

#[test]
fn test_records_round_trip() {
    let records = vec!["{\"a\":1}".to_string(), String::new(), "ünïcødé".to_string()];

    assert_eq!(decode_records(&encode_records(&records)).unwrap(), records);
}

#[test]
fn test_empty_record_list() {
    let bytes = encode_records(&[]);

    assert_eq!(bytes, 0u32.to_be_bytes().to_vec());
    assert!(decode_records(&bytes).unwrap().is_empty());
}

#[test]
fn test_truncated_record_list() {
    let bytes = encode_records(&["hello".to_string()]);

    assert!(decode_records(&bytes[..bytes.len() - 2]).is_err());
    assert!(decode_records(&[]).is_err());
}

// =============================================================================
// Stream Tests
// =============================================================================

#[test]
fn test_stream_command_round_trip() {
    let mut buffer = Vec::new();
    write_command(&mut buffer, &Command::Len { key: key("x") }).unwrap();
    write_command(&mut buffer, &Command::Ping).unwrap();

    let mut reader = Cursor::new(buffer);

    assert_eq!(read_command(&mut reader).unwrap(), Command::Len { key: key("x") });
    assert_eq!(read_command(&mut reader).unwrap(), Command::Ping);
    assert!(matches!(read_command(&mut reader), Err(BacklogError::Io(_))));
}

#[test]
fn test_stream_response_round_trip() {
    let mut buffer = Vec::new();
    write_response(&mut buffer, &Response::not_found()).unwrap();

    let response = read_response(&mut Cursor::new(buffer)).unwrap();

    assert_eq!(response, Response::not_found());
}
