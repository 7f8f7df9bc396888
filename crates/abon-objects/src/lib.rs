//! Object-store backends for abonement photos.
//!
//! - [`FsObjectStore`]: files under a root directory, served back through a
//!   public base URL.
//! - [`MemoryObjectStore`]: a process-local map, for tests and embedding.

mod fs;
mod memory;

pub mod error;

pub use error::{Error, Result};
pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;
