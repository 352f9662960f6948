mod file;
mod sqlite;


pub use file::FileStore;
pub use sqlite::SqliteStore;

use redwatch_core::{StoreConfig, StoreError};

/// Persistence boundary for "already notified" identifiers. An identifier
/// is present if and only if a notification for it was delivered at least
/// once; records are never updated or deleted.
#[allow(async_fn_in_trait)]
pub trait DedupStore {
    async fn contains(&self, identifier: &str) -> Result<bool, StoreError>;

    /// Idempotent: recording an already-present identifier is a success.
    async fn record(&self, identifier: &str) -> Result<(), StoreError>;
}

/// Backend selected by configuration. The poll loop only ever sees the
/// `DedupStore` trait and must not depend on which variant is active.
pub enum AnyStore {
    File(FileStore),
    Sqlite(SqliteStore),
}

impl AnyStore {
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        match config {
            StoreConfig::File { path } => Ok(AnyStore::File(FileStore::open(path).await?)),
            StoreConfig::Sqlite { url } => Ok(AnyStore::Sqlite(SqliteStore::connect(url).await?)),
        }
    }

    pub fn backend_label(&self) -> &'static str {
        match self {
            AnyStore::File(_) => "file snapshot",
            AnyStore::Sqlite(_) => "sqlite",
        }
    }
}

impl DedupStore for AnyStore {
    async fn contains(&self, identifier: &str) -> Result<bool, StoreError> {
        match self {
            AnyStore::File(store) => store.contains(identifier).await,
            AnyStore::Sqlite(store) => store.contains(identifier).await,
        }
    }

    async fn record(&self, identifier: &str) -> Result<(), StoreError> {
        match self {
            AnyStore::File(store) => store.record(identifier).await,
            AnyStore::Sqlite(store) => store.record(identifier).await,
        }
    }
}
