//! Fixed-width little-endian integer coding.
//!
//! Bytes are always emitted least-significant first, independent of the
//! host byte order.

use std::mem::size_of;

pub fn encode_fixed16(dst: &mut [u8], value: u16) {
    dst[..size_of::<u16>()].copy_from_slice(&value.to_le_bytes());
}

pub fn encode_fixed32(dst: &mut [u8], value: u32) {
    dst[..size_of::<u32>()].copy_from_slice(&value.to_le_bytes());
}

pub fn encode_fixed64(dst: &mut [u8], value: u64) {
    dst[..size_of::<u64>()].copy_from_slice(&value.to_le_bytes());
}

pub fn decode_fixed16(input: &[u8]) -> u16 {
    let mut bytes = [0u8; size_of::<u16>()];
    bytes.copy_from_slice(&input[..size_of::<u16>()]);
    u16::from_le_bytes(bytes)
}

pub fn decode_fixed32(input: &[u8]) -> u32 {
    let mut bytes = [0u8; size_of::<u32>()];
    bytes.copy_from_slice(&input[..size_of::<u32>()]);
    u32::from_le_bytes(bytes)
}

pub fn decode_fixed64(input: &[u8]) -> u64 {
    let mut bytes = [0u8; size_of::<u64>()];
    bytes.copy_from_slice(&input[..size_of::<u64>()]);
    u64::from_le_bytes(bytes)
}

/// Two's-complement bit pattern of `input`'s first 8 bytes.
pub fn decode_fixed_i64(input: &[u8]) -> i64 {
    decode_fixed64(input) as i64
}

pub fn extend_fixed16(dst: &mut Vec<u8>, value: u16) {
    let mut buf = [0u8; size_of::<u16>()];
    encode_fixed16(&mut buf, value);
    dst.extend_from_slice(&buf);
}

pub fn extend_fixed32(dst: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; size_of::<u32>()];
    encode_fixed32(&mut buf, value);
    dst.extend_from_slice(&buf);
}

pub fn extend_fixed64(dst: &mut Vec<u8>, value: u64) {
    let mut buf = [0u8; size_of::<u64>()];
    encode_fixed64(&mut buf, value);
    dst.extend_from_slice(&buf);
}

pub fn extend_fixed_i64(dst: &mut Vec<u8>, value: i64) {
    extend_fixed64(dst, value as u64);
}
