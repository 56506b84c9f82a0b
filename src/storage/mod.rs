//! Almacenamiento de ficheros

pub mod blob_store;

pub use blob_store::{BlobContent, BlobError, BlobStore, LocalBlobStore, SignedUrl};
