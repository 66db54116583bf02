//! Persistent storage: the content-addressed dedup/counting store.

pub mod repository;

pub use repository::{
    mock_factory, sqlite_factory, CorpusRepository, MockCorpusRepository, RepositoryFactory,
    SharedCorpusRepository, SqliteCorpusRepository,
};
