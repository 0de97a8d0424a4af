pub mod error;
pub mod format;
pub mod util;

pub use error::{GbxError, Result};
