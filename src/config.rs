use crate::domain::ports::GameStoreBox;
use crate::error::Result;
use crate::infrastructure::document::{DocumentStore, LedgerStrategy};
use crate::infrastructure::in_memory::InMemoryStore;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// In-memory store with native transactions.
    Memory,
    /// In-memory document store; multi-record work is compensated.
    Document,
    /// Persistent RocksDB store (requires the `storage-rocksdb` feature).
    Rocksdb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    Guarded,
    Log,
}

impl From<Strategy> for LedgerStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Guarded => LedgerStrategy::GuardedCounter,
            Strategy::Log => LedgerStrategy::LogReconciliation,
        }
    }
}

/// Storage selection, from flags or the environment.
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// Storage backend.
    #[arg(long, env = "TOURNEY_BACKEND", value_enum, default_value_t = Backend::Memory)]
    pub backend: Backend,

    /// How the document backend guards balances against going negative.
    #[arg(long, env = "TOURNEY_LEDGER_STRATEGY", value_enum, default_value_t = Strategy::Guarded)]
    pub ledger_strategy: Strategy,

    /// Path to the persistent database. Implies `--backend rocksdb`.
    #[arg(long, env = "TOURNEY_DB_PATH")]
    pub db_path: Option<PathBuf>,
}

impl StoreConfig {
    /// The backend actually requested once `db_path` is taken into account.
    pub fn effective_backend(&self) -> Backend {
        if self.db_path.is_some() {
            Backend::Rocksdb
        } else {
            self.backend
        }
    }

    pub fn open(&self) -> Result<GameStoreBox> {
        match self.effective_backend() {
            Backend::Memory => Ok(Box::new(InMemoryStore::new())),
            Backend::Document => Ok(Box::new(DocumentStore::with_strategy(
                self.ledger_strategy.into(),
            ))),
            Backend::Rocksdb => self.open_rocksdb(),
        }
    }

    #[cfg(feature = "storage-rocksdb")]
    fn open_rocksdb(&self) -> Result<GameStoreBox> {
        let path = self.db_path.as_ref().ok_or_else(|| {
            crate::error::GameError::Validation("the rocksdb backend requires --db-path".to_string())
        })?;
        Ok(Box::new(crate::infrastructure::rocksdb::RocksDbStore::open(path)?))
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    fn open_rocksdb(&self) -> Result<GameStoreBox> {
        eprintln!(
            "WARNING: Persistent storage requested, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
        Ok(Box::new(InMemoryStore::new()))
    }
}
