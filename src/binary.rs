//! [Memcached Binary Protocol](https://github.com/memcached/memcached/wiki/BinaryProtocolRevamped)
//!
//! Only the 24-byte fixed header is modeled here. The proxy never interprets
//! extras, keys or values. It only needs `opcode` and `total_body_length` to
//! find the next unit boundary, and it forwards the raw bytes unchanged.
use crate::error::{ProxyError, Result};
use bytes::Buf;
use std::convert::TryInto;

/// Binary opcode acting as the explicit sentinel that terminates a
/// pipelined burst of "quiet" commands.
pub const NO_OP: u8 = 0x0a;

/// Opcodes whose successful responses are suppressed by the server,
/// allowing clients to pipeline several commands before a terminating
/// [`NO_OP`].
pub const QUIET_OPCODES: [u8; 19] = [
    0x09, 0x0d, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1e, 0x32, 0x34, 0x36,
    0x38, 0x3a, 0x3c,
];

#[inline]
pub fn is_quiet(opcode: u8) -> bool {
    QUIET_OPCODES.contains(&opcode)
}

/// Size in bytes of the fixed binary protocol header.
pub const HEADER_LEN: usize = 24;

/// A decoded 24-byte binary header, with the original bytes retained
/// alongside the parsed fields since the framer forwards them verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub raw: [u8; HEADER_LEN],
    pub magic: u8,
    pub opcode: u8,
    pub key_length: u16,
    pub extra_length: u8,
    pub data_type: u8,
    /// `vbucket_id` on a request, `status` on a response.
    pub vbucket_id_or_status: u16,
    pub total_body_length: u32,
    pub opaque: u32,
    pub cas: u64,
}

impl Header {
    fn decode(raw: [u8; HEADER_LEN]) -> Self {
        let mut buf = &raw[..];
        Self {
            raw,
            magic: buf.get_u8(),
            opcode: buf.get_u8(),
            key_length: buf.get_u16(),
            extra_length: buf.get_u8(),
            data_type: buf.get_u8(),
            vbucket_id_or_status: buf.get_u16(),
            total_body_length: buf.get_u32(),
            opaque: buf.get_u32(),
            cas: buf.get_u64(),
        }
    }
}

/// Decode a client-sent request header. Fails with [`ProxyError::MalformedHeader`]
/// if `bytes` is not exactly [`HEADER_LEN`] long.
///
/// No validation of `magic` or `opcode` is performed beyond what the framer
/// needs (the bytes are forwarded unchanged regardless).
pub fn decode_request(bytes: &[u8]) -> Result<Header> {
    decode(bytes)
}

/// Decode a backend-sent response header. Identical layout to a request
/// header modulo the `vbucket_id`/`status` semantic at offset 6.
pub fn decode_response(bytes: &[u8]) -> Result<Header> {
    decode(bytes)
}

fn decode(bytes: &[u8]) -> Result<Header> {
    let raw: [u8; HEADER_LEN] = bytes
        .try_into()
        .map_err(|_| ProxyError::MalformedHeader(format!("expected 24 header bytes, got {}", bytes.len())))?;
    Ok(Header::decode(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> [u8; HEADER_LEN] {
        // magic=0x80 opcode=0x01(Set) key_len=3 extra_len=8 data_type=0
        // vbucket=0 body_len=14 opaque=0 cas=0
        [
            0x80, 0x01, 0x00, 0x03, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0e, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ]
    }

    #[test]
    fn decodes_fields_big_endian() {
        let raw = sample_header();
        let header = decode_request(&raw).unwrap();
        assert_eq!(header.magic, 0x80);
        assert_eq!(header.opcode, 0x01);
        assert_eq!(header.key_length, 3);
        assert_eq!(header.extra_length, 8);
        assert_eq!(header.total_body_length, 0x0e);
        assert_eq!(header.raw, raw);
    }

    #[test]
    fn idempotent_decode() {
        let raw = sample_header();
        assert_eq!(decode_request(&raw).unwrap(), decode_request(&raw).unwrap());
    }

    #[test]
    fn rejects_wrong_length() {
        let raw = vec![0u8; 23];
        assert!(decode_request(&raw).is_err());
    }

    #[test]
    fn quiet_set_matches_spec() {
        for op in QUIET_OPCODES {
            assert!(is_quiet(op));
        }
        assert!(!is_quiet(NO_OP));
        assert!(!is_quiet(0x00)); // Get is not quiet
    }
}
