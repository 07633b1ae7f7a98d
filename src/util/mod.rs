mod coding;
mod result;

pub use coding::*;
pub use result::{Error, Result};
