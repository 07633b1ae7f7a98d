use std::sync::Arc;

use super::{IndexEntry, TensorItem};
use crate::{
    env::{log, Env, Logger, PosixEnv, WritableFile},
    format::{
        round_up, FILE_HEADER_SIZE, FILE_MAGIC, FOOTER_MAGIC, FOOTER_RESERVED_SIZE, FOOTER_SIZE,
        INDEX_HEADER_SIZE, INDEX_MAGIC, VERSION,
    },
    options::WriterOptions,
    util::{encode_fixed32, encode_fixed64, extend_fixed32, extend_fixed64, Error, Result},
};

/// Padding is written from this buffer in chunks of at most its size.
const ZEROS: [u8; 4096] = [0; 4096];

/// Streams records of tensors into a batch file.
///
/// The file header is written when the writer is created. Each appended
/// tensor is placed at the next multiple of the page size and its metadata
/// is kept in memory until `finalize` writes the index and footer. A writer
/// that is dropped without being finalized finalizes itself; any error on
/// that path goes to the info log and is otherwise ignored.
pub struct Writer {
    dest: Box<dyn WritableFile>,
    page_size: u64,
    record_count: u64,
    entries: Vec<IndexEntry>,
    closed: bool,
    /// Set when a write fails part way. The stream position is then unknown,
    /// so no further tensors or index can be placed.
    failed: bool,
    info_log: Option<Arc<dyn Logger>>,
    /// Reused when serializing index entries.
    scratch: Vec<u8>,
}

impl Writer {
    /// Create `fname` (truncating it) on the local filesystem.
    pub fn create(fname: &str, page_size: u32) -> Result<Self> {
        Self::open(
            &PosixEnv::new(),
            fname,
            &WriterOptions::with_page_size(page_size),
        )
    }

    pub fn open(env: &dyn Env, fname: &str, options: &WriterOptions) -> Result<Self> {
        check_page_size(options.page_size)?;
        let dest = env.new_writable_file(fname)?;
        let writer = Self::new(dest, options)?;
        log(
            writer.info_log.as_deref(),
            &format!("tbf: opened {} page_size={}", fname, options.page_size),
        );
        Ok(writer)
    }

    /// Start a batch file in `dest`, which must be empty.
    pub fn new(mut dest: Box<dyn WritableFile>, options: &WriterOptions) -> Result<Self> {
        check_page_size(options.page_size)?;
        write_file_header(dest.as_mut())?;
        Ok(Self {
            dest,
            page_size: options.page_size as u64,
            record_count: 0,
            entries: vec![],
            closed: false,
            failed: false,
            info_log: options.info_log.clone(),
            scratch: vec![],
        })
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn is_finalized(&self) -> bool {
        self.closed
    }

    /// Append `items` as one record. Every item shares the current record id,
    /// and the record count grows by one even if `items` is empty.
    ///
    /// All items are validated first, so an invalid item leaves both the
    /// file and the record count untouched.
    pub fn append_record(&mut self, items: &[TensorItem]) -> Result<()> {
        self.check_open()?;
        for item in items {
            item.validate()?;
        }
        let record_id = self.record_count;
        for item in items {
            self.write_tensor(record_id, item)?;
        }
        self.record_count += 1;
        Ok(())
    }

    pub fn append_records(&mut self, records: &[Vec<TensorItem>]) -> Result<()> {
        for items in records {
            self.append_record(items)?;
        }
        Ok(())
    }

    /// Append a single tensor under an explicit record id. The record count
    /// is not changed.
    pub fn append_tensor(&mut self, record_id: u64, item: &TensorItem) -> Result<()> {
        self.check_open()?;
        item.validate()?;
        self.write_tensor(record_id, item)
    }

    /// Write the index and footer and close the file. Calling it again is a
    /// no-op. The writer is sealed even if writing fails.
    ///
    /// If an earlier append failed with an I/O error, no index is written:
    /// the file is closed and the failure reported again.
    pub fn finalize(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let result = if self.failed {
            Err(Error::io_error("an earlier write failed, index not written"))
        } else {
            self.write_index_and_footer()
        };
        self.closed = true;
        let close_result = self.dest.close();
        let (index_offset, index_size) = result?;
        close_result?;
        log(
            self.info_log.as_deref(),
            &format!(
                "tbf: finalized entries={} records={} index_offset={} index_size={}",
                self.entries.len(),
                self.record_count,
                index_offset,
                index_size
            ),
        );
        Ok(())
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::invalid_state("writer already finalized"))
        } else if self.failed {
            Err(Error::invalid_state("writer failed on an earlier write"))
        } else {
            Ok(())
        }
    }

    /// `item` must already be validated.
    fn write_tensor(&mut self, record_id: u64, item: &TensorItem) -> Result<()> {
        let result = self.place_tensor(record_id, item);
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn place_tensor(&mut self, record_id: u64, item: &TensorItem) -> Result<()> {
        let cur = self.dest.offset();
        let aligned = round_up(cur, self.page_size);
        let mut pad = (aligned - cur) as usize;
        while pad > 0 {
            let n = pad.min(ZEROS.len());
            self.dest.append(&ZEROS[..n])?;
            pad -= n;
        }
        if !item.data.is_empty() {
            self.dest.append(&item.data)?;
        }
        self.entries.push(IndexEntry {
            record_id,
            key: item.key.clone(),
            dtype: item.dtype,
            shape: item.shape.clone(),
            data_offset: aligned,
            nbytes: item.data.len() as u64,
        });
        Ok(())
    }

    /// Returns the index offset and size.
    fn write_index_and_footer(&mut self) -> Result<(u64, u64)> {
        let index_offset = self.dest.offset();

        let mut header = Vec::with_capacity(INDEX_HEADER_SIZE);
        header.extend_from_slice(INDEX_MAGIC);
        extend_fixed32(&mut header, VERSION);
        extend_fixed64(&mut header, self.entries.len() as u64);
        extend_fixed64(&mut header, self.record_count);
        self.dest.append(&header)?;

        for entry in &self.entries {
            self.scratch.clear();
            entry.encode_to(&mut self.scratch);
            self.dest.append(&self.scratch)?;
        }

        let index_size = self.dest.offset() - index_offset;
        let mut footer = [0u8; FOOTER_SIZE];
        footer[..8].copy_from_slice(FOOTER_MAGIC);
        encode_fixed32(&mut footer[8..], VERSION);
        encode_fixed64(&mut footer[12..], index_offset);
        encode_fixed64(&mut footer[20..], index_size);
        debug_assert!(footer[FOOTER_SIZE - FOOTER_RESERVED_SIZE..]
            .iter()
            .all(|&b| b == 0));
        self.dest.append(&footer)?;
        self.dest.flush()?;
        Ok((index_offset, index_size))
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(error) = self.finalize() {
            log(
                self.info_log.as_deref(),
                &format!("tbf: finalize on drop failed: {}", error),
            );
        }
    }
}

fn check_page_size(page_size: u32) -> Result<()> {
    if page_size == 0 {
        Err(Error::invalid_argument("page_size must be > 0"))
    } else {
        Ok(())
    }
}

fn write_file_header(dest: &mut dyn WritableFile) -> Result<()> {
    let mut header = [0u8; FILE_HEADER_SIZE];
    header[..8].copy_from_slice(FILE_MAGIC);
    encode_fixed32(&mut header[8..], VERSION);
    // bytes 12..16 are reserved
    dest.append(&header)
}

/// Write `records` to a new file at `fname` and finalize it.
pub fn write_batch_file(fname: &str, records: &[Vec<TensorItem>], page_size: u32) -> Result<()> {
    let mut writer = Writer::create(fname, page_size)?;
    writer.append_records(records)?;
    writer.finalize()
}
