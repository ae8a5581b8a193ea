use super::ledger::{LedgerEntry, OperationKind};
use super::player::Player;
use super::tournament::{Tournament, Winner, WinnerClaim};
use crate::error::{GameError, Result};
use async_trait::async_trait;

/// Durable player balances.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn create_player(&self, id: &str, points: i64) -> Result<Player>;
    async fn get_player(&self, id: &str) -> Result<Player>;

    /// Atomically adds `delta` to the balance of `id`.
    ///
    /// A negative delta that would take the balance below zero is refused with
    /// [`GameError::InsufficientBalance`] (or [`GameError::RolledBack`] when the
    /// backend detected it after a speculative apply). Must be race-free for
    /// concurrent calls on the same id.
    async fn adjust_balance(&self, id: &str, delta: i64, kind: OperationKind) -> Result<()>;

    async fn delete_player(&self, id: &str) -> Result<()>;
}

/// Append-only audit trail of balance deltas.
#[async_trait]
pub trait OperationLog: Send + Sync {
    async fn operations(&self, player_id: &str) -> Result<Vec<LedgerEntry>>;
}

/// Durable tournament records.
///
/// Every mutating method is atomic on a single tournament record; the
/// open/closed flag checked inside [`TournamentStore::append_participant`] is
/// the serialization point between joins and settlement.
#[async_trait]
pub trait TournamentStore: Send + Sync {
    async fn create_tournament(&self, id: &str, deposit: i64) -> Result<()>;
    async fn tournament(&self, id: &str) -> Result<Tournament>;

    async fn tournament_state(&self, id: &str) -> Result<bool> {
        Ok(self.tournament(id).await?.is_open)
    }

    async fn participants(&self, id: &str) -> Result<Vec<String>> {
        Ok(self.tournament(id).await?.participants)
    }

    /// `Open -> Closed`. Fails with [`GameError::ClosedTournament`] if another
    /// caller closed it first.
    async fn close_tournament(&self, id: &str) -> Result<()>;

    /// Appends `player_id` and adds one deposit to the prize pool in a single
    /// conditional update (tournament open, player not yet listed).
    async fn append_participant(&self, id: &str, player_id: &str) -> Result<()>;

    /// Compensation for [`TournamentStore::append_participant`].
    async fn remove_participant(&self, id: &str, player_id: &str) -> Result<()>;

    /// Records the winner unless one is already on record.
    async fn set_winner(&self, id: &str, winner: Winner) -> Result<WinnerClaim>;

    /// Compensation for [`TournamentStore::set_winner`]; only clears a winner
    /// whose id matches.
    async fn clear_winner(&self, id: &str, winner_id: &str) -> Result<()>;

    async fn delete_tournament(&self, id: &str) -> Result<()>;
}

/// How a backend makes cross-entity operations all-or-nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atomicity {
    /// The backend commits or rolls back several records as one unit.
    NativeTransactional,
    /// Only single-record updates are atomic; the engine undoes partial work
    /// with explicit compensating actions.
    Compensating,
}

/// Full store contract consumed by the settlement engine.
#[async_trait]
pub trait GameStore: LedgerStore + TournamentStore + OperationLog {
    fn atomicity(&self) -> Atomicity;

    /// Join as a single transaction: admit the player, grow the pool and debit
    /// the deposit, or change nothing.
    async fn join_in_transaction(&self, tournament_id: &str, player_id: &str) -> Result<()> {
        let _ = (tournament_id, player_id);
        Err(GameError::Storage(
            "backend has no native multi-record transactions".to_string(),
        ))
    }

    /// Settlement as a single transaction: credit the prize pool to
    /// `winner_id` and record the winner, or change nothing. Returns the
    /// winner on record, which is the existing one if the tournament was
    /// already settled (nothing is credited in that case).
    async fn settle_in_transaction(&self, tournament_id: &str, winner_id: &str) -> Result<Winner> {
        let _ = (tournament_id, winner_id);
        Err(GameError::Storage(
            "backend has no native multi-record transactions".to_string(),
        ))
    }
}

pub type GameStoreBox = Box<dyn GameStore>;
