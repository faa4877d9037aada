#![forbid(unsafe_code)]

pub mod http;
pub mod repository;

pub use repository::{
    CatalogRepository, InMemoryRepository, IngestRepository, IngestRequest, Storage,
    StorageError, UserRecordRepository,
};
