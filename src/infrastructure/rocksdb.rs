use crate::domain::ledger::{LedgerEntry, OperationKind};
use crate::domain::player::Player;
use crate::domain::ports::{Atomicity, GameStore, LedgerStore, OperationLog, TournamentStore};
use crate::domain::tournament::{Tournament, Winner, WinnerClaim};
use crate::error::{GameError, Result};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, Transaction, TransactionDB,
    TransactionDBOptions,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Column Family for player balances.
pub const CF_PLAYERS: &str = "players";
/// Column Family for tournament records.
pub const CF_TOURNAMENTS: &str = "tournaments";
/// Column Family for per-player operation logs.
pub const CF_OPERATIONS: &str = "operations";

/// A persistent store implementation using a RocksDB `TransactionDB`.
///
/// Players, tournaments and operation logs live in separate Column Families.
/// Every mutation runs inside a pessimistic transaction: records are read with
/// `get_for_update` (row lock) and written back on commit, so join and
/// settlement span several Column Families atomically.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<TransactionDB>`).
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<TransactionDB>,
}

type Txn<'a> = Transaction<'a, TransactionDB>;

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_PLAYERS, CF_TOURNAMENTS, CF_OPERATIONS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = TransactionDB::open_cf_descriptors(&opts, &TransactionDBOptions::default(), path, cfs)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| GameError::Storage(format!("{} column family not found", name)))
    }

    /// Runs `work` in one transaction, committing only if it succeeds.
    ///
    /// Synchronous on purpose: a RocksDB transaction must not live across an
    /// `.await`.
    fn transact<T>(&self, work: impl FnOnce(&Self, &Txn<'_>) -> Result<T>) -> Result<T> {
        let txn = self.db.transaction();
        match work(self, &txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(err) => {
                txn.rollback()?;
                Err(err)
            }
        }
    }

    fn read_for_update<T: DeserializeOwned>(
        &self,
        txn: &Txn<'_>,
        cf_name: &str,
        key: &str,
    ) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match txn.get_for_update_cf(cf, key.as_bytes(), true)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, txn: &Txn<'_>, cf_name: &str, key: &str, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        txn.put_cf(cf, key.as_bytes(), serde_json::to_vec(value)?)?;
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: &str) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn player_for_update(&self, txn: &Txn<'_>, id: &str) -> Result<Player> {
        self.read_for_update(txn, CF_PLAYERS, id)?
            .ok_or_else(|| GameError::NotFound(format!("player {}", id)))
    }

    fn tournament_for_update(&self, txn: &Txn<'_>, id: &str) -> Result<Tournament> {
        self.read_for_update(txn, CF_TOURNAMENTS, id)?
            .ok_or_else(|| GameError::NotFound(format!("tournament {}", id)))
    }

    fn log(&self, txn: &Txn<'_>, entry: LedgerEntry) -> Result<()> {
        let mut entries: Vec<LedgerEntry> = self
            .read_for_update(txn, CF_OPERATIONS, &entry.player_id)?
            .unwrap_or_default();
        let key = entry.player_id.clone();
        entries.push(entry);
        self.write(txn, CF_OPERATIONS, &key, &entries)
    }

    fn adjust(&self, txn: &Txn<'_>, id: &str, delta: i64, kind: OperationKind) -> Result<()> {
        let mut player = self.player_for_update(txn, id)?;
        player.apply(delta)?;
        self.write(txn, CF_PLAYERS, id, &player)?;
        self.log(txn, LedgerEntry::new(id, kind, delta))
    }

    fn update_tournament<T>(
        &self,
        id: &str,
        update: impl FnOnce(&mut Tournament) -> Result<T>,
    ) -> Result<T> {
        self.transact(|store, txn| {
            let mut tournament = store.tournament_for_update(txn, id)?;
            let value = update(&mut tournament)?;
            store.write(txn, CF_TOURNAMENTS, id, &tournament)?;
            Ok(value)
        })
    }
}

#[async_trait]
impl LedgerStore for RocksDbStore {
    async fn create_player(&self, id: &str, points: i64) -> Result<Player> {
        self.transact(|store, txn| {
            if store.read_for_update::<Player>(txn, CF_PLAYERS, id)?.is_some() {
                return Err(GameError::DuplicateId(format!("player {}", id)));
            }
            let player = Player::new(id, points);
            store.write(txn, CF_PLAYERS, id, &player)?;
            store.log(txn, LedgerEntry::new(id, OperationKind::Fund, points))?;
            Ok(player)
        })
    }

    async fn get_player(&self, id: &str) -> Result<Player> {
        self.read(CF_PLAYERS, id)?
            .ok_or_else(|| GameError::NotFound(format!("player {}", id)))
    }

    async fn adjust_balance(&self, id: &str, delta: i64, kind: OperationKind) -> Result<()> {
        self.transact(|store, txn| store.adjust(txn, id, delta, kind))
    }

    async fn delete_player(&self, id: &str) -> Result<()> {
        self.transact(|store, txn| {
            // The player row lock comes first: a join that has not committed
            // yet blocks on it at its debit and then finds no player.
            store.player_for_update(txn, id)?;
            let tournaments = store.cf(CF_TOURNAMENTS)?;
            for item in store.db.iterator_cf(tournaments, IteratorMode::Start) {
                let (_key, value) = item?;
                let listed: Tournament = serde_json::from_slice(&value)?;
                if !listed.has_participant(id) {
                    continue;
                }
                let tournament = store.tournament_for_update(txn, &listed.id)?;
                if tournament.is_open && tournament.has_participant(id) {
                    return Err(GameError::Validation(format!(
                        "player {} is registered in open tournament {}",
                        id, tournament.id
                    )));
                }
            }
            txn.delete_cf(store.cf(CF_PLAYERS)?, id.as_bytes())?;
            txn.delete_cf(store.cf(CF_OPERATIONS)?, id.as_bytes())?;
            Ok(())
        })
    }
}

#[async_trait]
impl OperationLog for RocksDbStore {
    async fn operations(&self, player_id: &str) -> Result<Vec<LedgerEntry>> {
        Ok(self.read(CF_OPERATIONS, player_id)?.unwrap_or_default())
    }
}

#[async_trait]
impl TournamentStore for RocksDbStore {
    async fn create_tournament(&self, id: &str, deposit: i64) -> Result<()> {
        self.transact(|store, txn| {
            if store
                .read_for_update::<Tournament>(txn, CF_TOURNAMENTS, id)?
                .is_some()
            {
                return Err(GameError::DuplicateId(format!("tournament {}", id)));
            }
            store.write(txn, CF_TOURNAMENTS, id, &Tournament::new(id, deposit))
        })
    }

    async fn tournament(&self, id: &str) -> Result<Tournament> {
        self.read(CF_TOURNAMENTS, id)?
            .ok_or_else(|| GameError::NotFound(format!("tournament {}", id)))
    }

    async fn close_tournament(&self, id: &str) -> Result<()> {
        self.update_tournament(id, |t| t.close())
    }

    async fn append_participant(&self, id: &str, player_id: &str) -> Result<()> {
        self.update_tournament(id, |t| t.admit(player_id))
    }

    async fn remove_participant(&self, id: &str, player_id: &str) -> Result<()> {
        self.update_tournament(id, |t| t.expel(player_id))
    }

    async fn set_winner(&self, id: &str, winner: Winner) -> Result<WinnerClaim> {
        self.update_tournament(id, |t| t.claim_winner(winner))
    }

    async fn clear_winner(&self, id: &str, winner_id: &str) -> Result<()> {
        self.update_tournament(id, |t| {
            if t.winner.as_ref().is_some_and(|w| w.id == winner_id) {
                t.winner = None;
            }
            Ok(())
        })
    }

    async fn delete_tournament(&self, id: &str) -> Result<()> {
        self.transact(|store, txn| {
            store.tournament_for_update(txn, id)?;
            txn.delete_cf(store.cf(CF_TOURNAMENTS)?, id.as_bytes())?;
            Ok(())
        })
    }
}

#[async_trait]
impl GameStore for RocksDbStore {
    fn atomicity(&self) -> Atomicity {
        Atomicity::NativeTransactional
    }

    async fn join_in_transaction(&self, tournament_id: &str, player_id: &str) -> Result<()> {
        self.transact(|store, txn| {
            let mut tournament = store.tournament_for_update(txn, tournament_id)?;
            tournament.admit(player_id)?;
            store.write(txn, CF_TOURNAMENTS, tournament_id, &tournament)?;
            store.adjust(txn, player_id, -tournament.deposit, OperationKind::Take)
        })?;
        debug!(tournament_id, player_id, "join committed");
        Ok(())
    }

    async fn settle_in_transaction(&self, tournament_id: &str, winner_id: &str) -> Result<Winner> {
        self.transact(|store, txn| {
            let mut tournament = store.tournament_for_update(txn, tournament_id)?;
            let winner = Winner {
                id: winner_id.to_string(),
                points: store.player_for_update(txn, winner_id)?.balance,
                prize: tournament.prize_pool,
            };
            if let WinnerClaim::AlreadySettled(existing) = tournament.claim_winner(winner.clone())? {
                return Ok(existing);
            }
            store.write(txn, CF_TOURNAMENTS, tournament_id, &tournament)?;
            store.adjust(txn, winner_id, winner.prize, OperationKind::Win)?;
            Ok(winner)
        })
    }
}
