use std::{fmt, sync::Arc};

use crate::{env::Logger, format::DEFAULT_PAGE_SIZE};

/// Options to control the behavior of a tbf writer.
#[derive(Clone)]
pub struct WriterOptions {
    /// Every tensor payload starts at a file offset that is a multiple of
    /// this value. Must be greater than zero.
    ///
    /// Default: 4096
    pub page_size: u32,

    /// Progress and error messages generated by the writer are written to
    /// info_log if it is set.
    ///
    /// Default: None
    pub info_log: Option<Arc<dyn Logger>>,
}

impl WriterOptions {
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            info_log: None,
        }
    }
}

impl fmt::Debug for WriterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterOptions")
            .field("page_size", &self.page_size)
            .field("info_log", &self.info_log.is_some())
            .finish()
    }
}
