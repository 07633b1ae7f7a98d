use super::IndexEntry;
use crate::{
    env::{Env, PosixEnv, RandomAccessFile},
    format::{
        FILE_HEADER_SIZE, FILE_MAGIC, FOOTER_MAGIC, FOOTER_SIZE, INDEX_HEADER_SIZE, INDEX_MAGIC,
        VERSION,
    },
    util::{decode_fixed32, decode_fixed64, Error, Result},
};

/// Reads a finalized batch file: locates the index through the footer and
/// serves tensor payloads straight from their recorded offsets.
pub struct Reader {
    file: Box<dyn RandomAccessFile>,
    /// End of the data region, i.e. where the index starts.
    index_offset: u64,
    record_count: u64,
    entries: Vec<IndexEntry>,
}

impl Reader {
    pub fn open(env: &dyn Env, fname: &str) -> Result<Self> {
        let file_size = env.get_file_size(fname)?;
        let file = env.new_random_access_file(fname)?;
        Self::new(file, file_size)
    }

    /// Open `fname` on the local filesystem.
    pub fn open_path(fname: &str) -> Result<Self> {
        Self::open(&PosixEnv::new(), fname)
    }

    pub fn new(file: Box<dyn RandomAccessFile>, file_size: u64) -> Result<Self> {
        if file_size < (FILE_HEADER_SIZE + FOOTER_SIZE) as u64 {
            return Err(Error::corruption("file too small"));
        }

        let mut header = [0u8; FILE_HEADER_SIZE];
        file.read(0, &mut header)?;
        check_magic(&header, FILE_MAGIC, "file")?;

        let footer_start = file_size - FOOTER_SIZE as u64;
        let mut footer = [0u8; FOOTER_SIZE];
        file.read(footer_start, &mut footer)?;
        check_magic(&footer, FOOTER_MAGIC, "footer")?;
        let index_offset = decode_fixed64(&footer[12..]);
        let index_size = decode_fixed64(&footer[20..]);
        match index_offset.checked_add(index_size) {
            Some(end) if end <= footer_start && index_offset >= FILE_HEADER_SIZE as u64 => {}
            _ => return Err(Error::corruption("index points outside payload region")),
        }
        if index_size < INDEX_HEADER_SIZE as u64 {
            return Err(Error::corruption("truncated index"));
        }

        let mut index = vec![0u8; index_size as usize];
        file.read(index_offset, &mut index)?;
        check_magic(&index, INDEX_MAGIC, "index")?;
        let entry_count = decode_fixed64(&index[12..]);
        let record_count = decode_fixed64(&index[20..]);

        let mut entries = vec![];
        let mut pos = INDEX_HEADER_SIZE;
        for _ in 0..entry_count {
            let (entry, len) = IndexEntry::decode_from(&index[pos..])?;
            entries.push(entry);
            pos += len;
        }
        if pos != index.len() {
            return Err(Error::corruption("unexpected trailing bytes in index"));
        }
        if let Some(entry) = entries.iter().find(|e| e.record_id >= record_count) {
            return Err(Error::corruption(&format!(
                "record id {} out of range, index has {} records",
                entry.record_id, record_count
            )));
        }

        Ok(Self {
            file,
            index_offset,
            record_count,
            entries,
        })
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.len() as u64
    }

    /// All index entries in the order they were written.
    pub fn metadata(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Entries and payloads of record `record_id`, in append order.
    pub fn record(&self, record_id: u64) -> Result<Vec<(IndexEntry, Vec<u8>)>> {
        if record_id >= self.record_count {
            return Err(Error::invalid_argument(&format!(
                "record {} out of range, file has {}",
                record_id, self.record_count
            )));
        }
        self.entries
            .iter()
            .filter(|entry| entry.record_id == record_id)
            .map(|entry| Ok((entry.clone(), self.read_tensor(entry)?)))
            .collect()
    }

    pub fn read_tensor(&self, entry: &IndexEntry) -> Result<Vec<u8>> {
        match entry.data_offset.checked_add(entry.nbytes) {
            Some(end) if end <= self.index_offset => {}
            _ => {
                return Err(Error::corruption(&format!(
                    "payload of {:?} lies outside the data region",
                    entry.key
                )))
            }
        }
        let mut data = vec![0u8; entry.nbytes as usize];
        self.file.read(entry.data_offset, &mut data)?;
        Ok(data)
    }
}

/// Verify the magic and version that open every region of the file.
fn check_magic(region: &[u8], magic: &[u8; 8], what: &str) -> Result<()> {
    if &region[..8] != magic {
        return Err(Error::corruption(&format!("invalid {} magic", what)));
    }
    let version = decode_fixed32(&region[8..]);
    if version != VERSION {
        return Err(Error::not_supported(&format!(
            "unsupported {} version: {}",
            what, version
        )));
    }
    Ok(())
}
