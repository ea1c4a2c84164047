//! Traits at the seams of the harvesting engine.

mod converter;
mod storage;

pub use converter::MetadataConverter;
pub use storage::Storage;
