//! Retrieval: chunking, the embedding index, and the retrieval policies.

pub mod chunker;
mod index;
mod models;
pub mod retriever;

pub use index::{CollectionInfo, ScoredChunk, StoredChunk, VectorIndex, VectorIndexError};
pub use models::{chunk_id, Chunk, ChunkMetadata, RetrievedContext};
