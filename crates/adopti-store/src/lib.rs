//! adopti-store - Client storage backends.
//!
//! Both backends keep the same document: the key/value entries and the
//! cookie jar. [`MemoryStorage`] holds it in memory, [`FileStorage`]
//! persists it as one JSON file.

mod document;
mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;
