use crate::util::Result;

mod posix_env;

pub use posix_env::PosixEnv;

/// An Env is an interface used by the tbf writer and reader to access
/// operating system functionality like the filesystem. Callers may
/// provide a custom Env, e.g. to keep files in memory or to inject
/// failures.
pub trait Env {
    /// Create a new file for writing, truncating any existing file with
    /// the same name. The returned file will only be accessed by one
    /// writer at a time.
    fn new_writable_file(&self, fname: &str) -> Result<Box<dyn WritableFile>>;

    /// The returned file may be read at arbitrary offsets.
    fn new_random_access_file(&self, fname: &str) -> Result<Box<dyn RandomAccessFile>>;

    fn file_exists(&self, fname: &str) -> bool;
    fn remove_file(&self, fname: &str) -> Result<()>;
    fn get_file_size(&self, fname: &str) -> Result<u64>;
    fn new_logger(&self, fname: &str) -> Result<Box<dyn Logger>>;
}

/// A file abstraction for randomly reading the contents of a file.
pub trait RandomAccessFile {
    /// Fill `dst` with the bytes starting at `offset`. Fails if the file
    /// ends before `dst` is full.
    fn read(&self, offset: u64, dst: &mut [u8]) -> Result<()>;
}

/// A file abstraction for sequential writing.  The implementation
/// must provide buffering since callers may append small fragments
/// at a time to the file.
pub trait WritableFile {
    fn append(&mut self, data: &[u8]) -> Result<()>;

    /// Number of bytes appended so far. Only a completed `append`
    /// advances it; querying never moves the write position.
    fn offset(&self) -> u64;

    fn close(&mut self) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn sync(&mut self) -> Result<()>;
}

pub trait Logger {
    fn log(&self, info: &str);
}

/// Write `info` to `info_log` if there is one.
pub fn log(info_log: Option<&dyn Logger>, info: &str) {
    if let Some(logger) = info_log {
        logger.log(info);
    }
}
