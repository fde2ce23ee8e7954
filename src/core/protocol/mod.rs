// src/core/protocol/mod.rs

pub mod chunk_codec;
pub use chunk_codec::{ChunkCodec, DEFAULT_READ_BUFFER_SIZE};
