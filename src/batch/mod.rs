//! Tensor batch files.
//!
//! A batch file is a sequence of records, each holding zero or more named
//! tensors. Layout (all integers little-endian):
//!
//! ```text
//! file header   "TBFDATA1" | version u32 | reserved u32
//! tensor data   (zero padding, payload)*   payloads start at page multiples
//! index         "TBFIDX01" | version u32 | entry count u64 | record count u64
//!               entry*
//! footer        "TBFTRLR1" | version u32 | index offset u64 | index size u64
//!               | 36 zero bytes
//! ```
//!
//! An index entry is record id u64 | key length u32 | dtype code u16 |
//! ndim u16 | data offset u64 | nbytes u64 | ndim * i64 dims | key bytes.

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::{write_batch_file, Writer};

use crate::{
    format::{expected_nbytes, DType, INDEX_ENTRY_PREFIX_SIZE},
    util::{
        decode_fixed16, decode_fixed32, decode_fixed64, decode_fixed_i64, extend_fixed16,
        extend_fixed32, extend_fixed64, extend_fixed_i64, Error, Result,
    },
};

/// One named tensor handed to the writer.
#[derive(Clone, PartialEq, Debug)]
pub struct TensorItem {
    pub key: String,
    pub dtype: DType,
    /// Dimension sizes. Empty for a scalar.
    pub shape: Vec<i64>,
    /// Raw element bytes, `product(shape) * dtype.element_size()` long.
    pub data: Vec<u8>,
}

impl TensorItem {
    pub fn new(key: &str, dtype: DType, shape: &[i64], data: Vec<u8>) -> Self {
        Self {
            key: key.to_owned(),
            dtype,
            shape: shape.to_vec(),
            data,
        }
    }

    pub fn scalar(key: &str, dtype: DType, data: Vec<u8>) -> Self {
        Self::new(key, dtype, &[], data)
    }

    pub fn expected_nbytes(&self) -> Result<u64> {
        expected_nbytes(&self.shape, self.dtype)
    }

    /// Checks everything the writer requires before any byte of this
    /// tensor is written.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(Error::invalid_argument("tensor key cannot be empty"));
        }
        if self.key.len() > u32::MAX as usize {
            return Err(Error::invalid_argument(&format!(
                "tensor key too long: {} bytes",
                self.key.len()
            )));
        }
        if self.shape.len() > u16::MAX as usize {
            return Err(Error::invalid_argument(&format!(
                "too many dimensions for {:?}: {}",
                self.key,
                self.shape.len()
            )));
        }
        let expected = self.expected_nbytes()?;
        if self.data.len() as u64 != expected {
            return Err(Error::invalid_argument(&format!(
                "data length mismatch for key {:?}: got={} expect={}",
                self.key,
                self.data.len(),
                expected
            )));
        }
        Ok(())
    }
}

/// Index metadata for one stored tensor.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IndexEntry {
    pub record_id: u64,
    pub key: String,
    pub dtype: DType,
    pub shape: Vec<i64>,
    /// Absolute file offset of the payload, a multiple of the page size
    /// the file was written with.
    pub data_offset: u64,
    pub nbytes: u64,
}

impl IndexEntry {
    /// Append the serialization of this entry to `dst`.
    pub(crate) fn encode_to(&self, dst: &mut Vec<u8>) {
        extend_fixed64(dst, self.record_id);
        extend_fixed32(dst, self.key.len() as u32);
        extend_fixed16(dst, self.dtype.code());
        extend_fixed16(dst, self.shape.len() as u16);
        extend_fixed64(dst, self.data_offset);
        extend_fixed64(dst, self.nbytes);
        for &dim in &self.shape {
            extend_fixed_i64(dst, dim);
        }
        dst.extend_from_slice(self.key.as_bytes());
    }

    /// Parse one entry from the front of `input`. Returns the entry and the
    /// number of bytes it occupied.
    pub(crate) fn decode_from(input: &[u8]) -> Result<(Self, usize)> {
        if input.len() < INDEX_ENTRY_PREFIX_SIZE {
            return Err(Error::corruption("truncated index entry"));
        }
        let record_id = decode_fixed64(input);
        let key_len = decode_fixed32(&input[8..]) as usize;
        let dtype_code = decode_fixed16(&input[12..]);
        let ndim = decode_fixed16(&input[14..]) as usize;
        let data_offset = decode_fixed64(&input[16..]);
        let nbytes = decode_fixed64(&input[24..]);
        let mut index = INDEX_ENTRY_PREFIX_SIZE;

        if input.len() - index < ndim * 8 {
            return Err(Error::corruption("truncated index shape"));
        }
        let shape = input[index..index + ndim * 8]
            .chunks_exact(8)
            .map(decode_fixed_i64)
            .collect();
        index += ndim * 8;

        if input.len() - index < key_len {
            return Err(Error::corruption("truncated index key"));
        }
        let key = match std::str::from_utf8(&input[index..index + key_len]) {
            Ok(key) => key.to_owned(),
            Err(_) => return Err(Error::corruption("index key is not valid utf-8")),
        };
        index += key_len;

        let dtype = DType::try_from(dtype_code)?;
        Ok((
            Self {
                record_id,
                key,
                dtype,
                shape,
                data_offset,
                nbytes,
            },
            index,
        ))
    }
}
