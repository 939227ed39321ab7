//! Chunked upload temp files.

pub mod writer;

pub use writer::ChunkWriter;
