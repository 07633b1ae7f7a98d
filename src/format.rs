use std::fmt::Display;

use crate::util::{Error, Result};

pub const VERSION: u32 = 1;

pub const DEFAULT_PAGE_SIZE: u32 = 4096;

pub const FILE_MAGIC: &[u8; 8] = b"TBFDATA1";
pub const INDEX_MAGIC: &[u8; 8] = b"TBFIDX01";
pub const FOOTER_MAGIC: &[u8; 8] = b"TBFTRLR1";

/// File header is magic (8 bytes), version (4 bytes), reserved (4 bytes).
pub const FILE_HEADER_SIZE: usize = 8 + 4 + 4;

/// Index header is magic (8 bytes), version (4 bytes), entry count (8 bytes),
/// record count (8 bytes).
pub const INDEX_HEADER_SIZE: usize = 8 + 4 + 8 + 8;

/// Fixed part of an index entry: record id (8), key length (4), dtype code (2),
/// ndim (2), data offset (8), nbytes (8). Followed by ndim * 8 bytes of shape
/// and the key bytes.
pub const INDEX_ENTRY_PREFIX_SIZE: usize = 8 + 4 + 2 + 2 + 8 + 8;

/// Footer is magic (8), version (4), index offset (8), index size (8), then
/// reserved zeros up to 64 bytes.
pub const FOOTER_SIZE: usize = 64;

pub const FOOTER_RESERVED_SIZE: usize = FOOTER_SIZE - (8 + 4 + 8 + 8);

/// Scalar element type of a stored tensor.
///
/// The discriminants are the on-disk `dtype_code` values and form a stable
/// wire contract: existing files depend on them, so codes are never reused or
/// reordered. New types get new codes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u16)]
pub enum DType {
    Float32 = 1,
    Float64 = 2,
    Float16 = 3,
    BFloat16 = 4,
    Int8 = 5,
    UInt8 = 6,
    Int16 = 7,
    Int32 = 8,
    Int64 = 9,
    Bool = 10,
}

impl DType {
    pub const ALL: [DType; 10] = [
        DType::Float32,
        DType::Float64,
        DType::Float16,
        DType::BFloat16,
        DType::Int8,
        DType::UInt8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::Bool,
    ];

    pub fn code(self) -> u16 {
        self as u16
    }

    /// Width of one element in bytes.
    pub fn element_size(self) -> u64 {
        match self {
            DType::Float32 | DType::Int32 => 4,
            DType::Float64 | DType::Int64 => 8,
            DType::Float16 | DType::BFloat16 | DType::Int16 => 2,
            DType::Int8 | DType::UInt8 | DType::Bool => 1,
        }
    }
}

impl TryFrom<u16> for DType {
    type Error = Error;

    fn try_from(code: u16) -> Result<Self> {
        match code {
            1 => Ok(DType::Float32),
            2 => Ok(DType::Float64),
            3 => Ok(DType::Float16),
            4 => Ok(DType::BFloat16),
            5 => Ok(DType::Int8),
            6 => Ok(DType::UInt8),
            7 => Ok(DType::Int16),
            8 => Ok(DType::Int32),
            9 => Ok(DType::Int64),
            10 => Ok(DType::Bool),
            _ => Err(Error::invalid_argument(&format!(
                "unsupported dtype code: {}",
                code
            ))),
        }
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Float16 => "float16",
            DType::BFloat16 => "bfloat16",
            DType::Int8 => "int8",
            DType::UInt8 => "uint8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Bool => "bool",
        };
        f.write_str(str)
    }
}

/// Element size for a raw dtype code, e.g. one read back from an index.
pub fn element_size(code: u16) -> Result<u64> {
    Ok(DType::try_from(code)?.element_size())
}

/// Round `value` up to the next multiple of `alignment`.
pub fn round_up(value: u64, alignment: u64) -> u64 {
    assert!(alignment > 0);
    let rem = value % alignment;
    if rem == 0 {
        value
    } else {
        value + (alignment - rem)
    }
}

/// Payload size implied by `shape` and `dtype`. An empty shape is a scalar.
pub fn expected_nbytes(shape: &[i64], dtype: DType) -> Result<u64> {
    let mut count: u64 = 1;
    for &dim in shape {
        if dim < 0 {
            return Err(Error::invalid_argument(&format!(
                "negative shape dim: {}",
                dim
            )));
        }
        count = count
            .checked_mul(dim as u64)
            .ok_or_else(|| Error::invalid_argument("shape element count overflows u64"))?;
    }
    count
        .checked_mul(dtype.element_size())
        .ok_or_else(|| Error::invalid_argument("tensor byte size overflows u64"))
}
