//! Tensor batch format: named, typed tensors grouped into records, written
//! in one forward pass with page-aligned payloads, a trailing index and a
//! fixed-size footer.

pub mod batch;
pub mod env;
pub mod format;
mod options;
mod util;

pub use batch::{write_batch_file, IndexEntry, Reader, TensorItem, Writer};
pub use format::{element_size, DType, DEFAULT_PAGE_SIZE};
pub use options::WriterOptions;
pub use util::{Error, Result};
