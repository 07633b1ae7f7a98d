use std::{
    cell::RefCell,
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    os::unix::fs::FileExt,
    path::Path,
    thread,
};

use chrono::Local;

use super::{Env, Logger, RandomAccessFile, WritableFile};
use crate::util::{Error, Result};

const WRITABLE_FILE_BUFFER_SIZE: usize = 65536;

#[derive(Clone, Copy, Default, Debug)]
pub struct PosixEnv {}

impl PosixEnv {
    pub fn new() -> Self {
        Self {}
    }
}

impl Env for PosixEnv {
    fn new_writable_file(&self, fname: &str) -> Result<Box<dyn WritableFile>> {
        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(fname)
        {
            Ok(file) => Ok(Box::new(PosixWritableFile::new(fname, file))),
            // A file that cannot be created is an I/O failure even when a
            // parent directory is missing.
            Err(error) => Err(Error::io_error(&format!("{}: {}", fname, error))),
        }
    }

    fn new_random_access_file(&self, fname: &str) -> Result<Box<dyn RandomAccessFile>> {
        match File::open(fname) {
            Ok(file) => Ok(Box::new(PosixRandomAccessFile {
                fname: fname.to_owned(),
                file,
            })),
            Err(error) => Err(to_tbf_error(fname, error)),
        }
    }

    fn file_exists(&self, fname: &str) -> bool {
        Path::new(fname).exists()
    }

    fn remove_file(&self, fname: &str) -> Result<()> {
        match fs::remove_file(fname) {
            Ok(()) => Ok(()),
            Err(error) => Err(to_tbf_error(fname, error)),
        }
    }

    fn get_file_size(&self, fname: &str) -> Result<u64> {
        match fs::metadata(fname) {
            Ok(data) => Ok(data.len()),
            Err(error) => Err(to_tbf_error(fname, error)),
        }
    }

    fn new_logger(&self, fname: &str) -> Result<Box<dyn Logger>> {
        match OpenOptions::new().create(true).append(true).open(fname) {
            Ok(file) => Ok(Box::new(PosixLogger::new(file))),
            Err(error) => Err(to_tbf_error(fname, error)),
        }
    }
}

fn to_tbf_error(target: &str, error: io::Error) -> Error {
    let msg = format!("{}: {}", target, error);
    match error.kind() {
        io::ErrorKind::NotFound => Error::not_found(&msg),
        _ => Error::io_error(&msg),
    }
}

struct PosixWritableFile {
    fname: String,
    /// `None` once closed.
    file: Option<BufWriter<File>>,
    offset: u64,
}

impl PosixWritableFile {
    fn new(fname: &str, file: File) -> Self {
        Self {
            fname: fname.to_owned(),
            file: Some(BufWriter::with_capacity(WRITABLE_FILE_BUFFER_SIZE, file)),
            offset: 0,
        }
    }
}

fn closed_error(fname: &str) -> Error {
    Error::io_error(&format!("{}: file already closed", fname))
}

impl WritableFile for PosixWritableFile {
    fn append(&mut self, data: &[u8]) -> Result<()> {
        let file = self.file.as_mut().ok_or_else(|| closed_error(&self.fname))?;
        file.write_all(data)
            .map_err(|error| to_tbf_error(&self.fname, error))?;
        self.offset += data.len() as u64;
        Ok(())
    }

    fn offset(&self) -> u64 {
        self.offset
    }

    fn close(&mut self) -> Result<()> {
        match self.file.take() {
            Some(mut file) => file.flush().map_err(|error| to_tbf_error(&self.fname, error)),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        let file = self.file.as_mut().ok_or_else(|| closed_error(&self.fname))?;
        file.flush().map_err(|error| to_tbf_error(&self.fname, error))
    }

    fn sync(&mut self) -> Result<()> {
        let file = self.file.as_mut().ok_or_else(|| closed_error(&self.fname))?;
        file.flush()
            .map_err(|error| to_tbf_error(&self.fname, error))?;
        file.get_ref()
            .sync_data()
            .map_err(|error| to_tbf_error(&self.fname, error))
    }
}

struct PosixRandomAccessFile {
    fname: String,
    file: File,
}

impl RandomAccessFile for PosixRandomAccessFile {
    fn read(&self, offset: u64, dst: &mut [u8]) -> Result<()> {
        match self.file.read_exact_at(dst, offset) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => Err(Error::corruption(
                &format!("{}: truncated read at offset {}", self.fname, offset),
            )),
            Err(error) => Err(to_tbf_error(&self.fname, error)),
        }
    }
}

struct PosixLogger {
    file: RefCell<File>,
}

impl PosixLogger {
    fn new(file: File) -> Self {
        Self {
            file: RefCell::new(file),
        }
    }
}

impl Logger for PosixLogger {
    fn log(&self, info: &str) {
        // Record the time as close to the log() call as possible.
        let time = Local::now().format("%Y/%m/%d-%H:%M:%S%.6f").to_string();
        // Record the thread ID.
        let thread_id = thread::current().id();
        let mut info = format!("{} {:?} {}", time, thread_id, info);
        if !info.ends_with('\n') {
            info += "\n";
        }
        // Logging is best-effort.
        let mut file_inner = self.file.borrow_mut();
        let _ = file_inner.write_all(info.as_bytes());
        let _ = file_inner.flush();
    }
}
