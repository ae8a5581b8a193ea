use crate::domain::ledger::{LedgerEntry, OperationKind, log_sum};
use crate::domain::player::Player;
use crate::domain::ports::{Atomicity, GameStore, LedgerStore, OperationLog, TournamentStore};
use crate::domain::tournament::{Tournament, Winner, WinnerClaim};
use crate::error::{GameError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

/// How a [`DocumentStore`] enforces the non-negative balance floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedgerStrategy {
    /// Conditional increment: the update only matches while the balance
    /// stays at or above zero.
    #[default]
    GuardedCounter,
    /// Unconditional increment, then the balance is rebuilt from the
    /// operation log; a negative sum is undone by a compensating increment.
    LogReconciliation,
}

/// A store with document-database semantics.
///
/// Players, tournaments and the operation log are independent collections.
/// An update to one document is atomic, but nothing spans two documents, so
/// the settlement engine drives join and settlement through compensating
/// actions. `Clone` shares the collections.
#[derive(Default, Clone)]
pub struct DocumentStore {
    players: Arc<RwLock<HashMap<String, Player>>>,
    tournaments: Arc<RwLock<HashMap<String, Tournament>>>,
    operations: Arc<RwLock<Vec<LedgerEntry>>>,
    strategy: LedgerStrategy,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: LedgerStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn strategy(&self) -> LedgerStrategy {
        self.strategy
    }

    async fn reconstructed_balance(&self, id: &str) -> i64 {
        let operations = self.operations.read().await;
        log_sum(operations.iter().filter(|entry| entry.player_id == id))
    }

    /// `$inc` without a floor. The entry is logged under the player lock, so a
    /// concurrent delete sees both or neither.
    async fn increment(&self, entry: LedgerEntry) -> Result<()> {
        let mut players = self.players.write().await;
        let player = players
            .get_mut(&entry.player_id)
            .ok_or_else(|| GameError::NotFound(format!("player {}", entry.player_id)))?;
        player.balance = player.balance.checked_add(entry.delta).ok_or_else(|| {
            GameError::Validation(format!("balance overflow for player {}", entry.player_id))
        })?;
        self.operations.write().await.push(entry);
        Ok(())
    }

    /// `$inc` matched on `balance >= -delta`.
    async fn guarded_increment(&self, entry: LedgerEntry) -> Result<()> {
        let mut players = self.players.write().await;
        players
            .get_mut(&entry.player_id)
            .ok_or_else(|| GameError::NotFound(format!("player {}", entry.player_id)))?
            .apply(entry.delta)?;
        self.operations.write().await.push(entry);
        Ok(())
    }

    async fn adjust_reconciled(&self, id: &str, delta: i64, kind: OperationKind) -> Result<()> {
        // An unknown player has an empty log; report it as missing, not poor.
        self.get_player(id).await?;
        let entry = LedgerEntry::new(id, kind, delta);
        if delta >= 0 {
            return self.increment(entry).await;
        }

        let before = self.reconstructed_balance(id).await;
        if before < -delta {
            return Err(GameError::InsufficientBalance(format!(
                "player {} has {} points by the operation log, cannot take {}",
                id, before, -delta
            )));
        }

        self.increment(entry.clone()).await?;

        let after = self.reconstructed_balance(id).await;
        if after >= 0 {
            return Ok(());
        }

        warn!(player_id = id, delta, after, "negative reconstructed balance, rolling back");
        let rolled_back = GameError::RolledBack(format!(
            "taking {} points from player {} would leave a negative balance",
            -delta, id
        ));
        // A crash before the compensation leaves the counter wrong until the
        // log is reconciled.
        if let Err(cause) = self.compensate(&entry).await {
            error!(player_id = id, delta, %cause, "rollback of speculative debit failed");
            return Err(GameError::compensation_failed(rolled_back, cause));
        }
        Err(rolled_back)
    }

    /// Applies the exact negation of `entry` and logs the corrective entry.
    async fn compensate(&self, entry: &LedgerEntry) -> Result<()> {
        self.increment(entry.reversal()).await
    }
}

#[async_trait]
impl LedgerStore for DocumentStore {
    async fn create_player(&self, id: &str, points: i64) -> Result<Player> {
        let player = Player::new(id, points);
        let mut players = self.players.write().await;
        if players.contains_key(id) {
            return Err(GameError::DuplicateId(format!("player {}", id)));
        }
        players.insert(id.to_string(), player.clone());
        self.operations
            .write()
            .await
            .push(LedgerEntry::new(id, OperationKind::Fund, points));
        Ok(player)
    }

    async fn get_player(&self, id: &str) -> Result<Player> {
        let players = self.players.read().await;
        players
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("player {}", id)))
    }

    async fn adjust_balance(&self, id: &str, delta: i64, kind: OperationKind) -> Result<()> {
        debug!(player_id = id, delta, ?kind, strategy = ?self.strategy, "adjusting balance");
        match self.strategy {
            LedgerStrategy::GuardedCounter => {
                self.guarded_increment(LedgerEntry::new(id, kind, delta))
                    .await
            }
            LedgerStrategy::LogReconciliation => self.adjust_reconciled(id, delta, kind).await,
        }
    }

    async fn delete_player(&self, id: &str) -> Result<()> {
        // Lock order: tournaments, players, operations. Holding the
        // tournaments guard keeps joins out until the player is gone.
        let tournaments = self.tournaments.read().await;
        if let Some(tournament) = tournaments
            .values()
            .find(|t| t.is_open && t.has_participant(id))
        {
            return Err(GameError::Validation(format!(
                "player {} is registered in open tournament {}",
                id, tournament.id
            )));
        }
        let mut players = self.players.write().await;
        players
            .remove(id)
            .ok_or_else(|| GameError::NotFound(format!("player {}", id)))?;
        // A player created again under this id starts with an empty log.
        self.operations
            .write()
            .await
            .retain(|entry| entry.player_id != id);
        Ok(())
    }
}

#[async_trait]
impl OperationLog for DocumentStore {
    async fn operations(&self, player_id: &str) -> Result<Vec<LedgerEntry>> {
        let operations = self.operations.read().await;
        Ok(operations
            .iter()
            .filter(|entry| entry.player_id == player_id)
            .cloned()
            .collect())
    }
}

impl DocumentStore {
    /// Runs `update` against one tournament document under the collection lock.
    async fn update_tournament<T>(
        &self,
        id: &str,
        update: impl FnOnce(&mut Tournament) -> Result<T> + Send,
    ) -> Result<T> {
        let mut tournaments = self.tournaments.write().await;
        let tournament = tournaments
            .get_mut(id)
            .ok_or_else(|| GameError::NotFound(format!("tournament {}", id)))?;
        // Work on a copy so a failed update leaves the document as it was.
        let mut next = tournament.clone();
        let value = update(&mut next)?;
        *tournament = next;
        Ok(value)
    }
}

#[async_trait]
impl TournamentStore for DocumentStore {
    async fn create_tournament(&self, id: &str, deposit: i64) -> Result<()> {
        let mut tournaments = self.tournaments.write().await;
        if tournaments.contains_key(id) {
            return Err(GameError::DuplicateId(format!("tournament {}", id)));
        }
        tournaments.insert(id.to_string(), Tournament::new(id, deposit));
        Ok(())
    }

    async fn tournament(&self, id: &str) -> Result<Tournament> {
        let tournaments = self.tournaments.read().await;
        tournaments
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("tournament {}", id)))
    }

    async fn close_tournament(&self, id: &str) -> Result<()> {
        self.update_tournament(id, |t| t.close()).await
    }

    async fn append_participant(&self, id: &str, player_id: &str) -> Result<()> {
        self.update_tournament(id, |t| t.admit(player_id)).await
    }

    async fn remove_participant(&self, id: &str, player_id: &str) -> Result<()> {
        self.update_tournament(id, |t| t.expel(player_id)).await
    }

    async fn set_winner(&self, id: &str, winner: Winner) -> Result<WinnerClaim> {
        self.update_tournament(id, |t| t.claim_winner(winner)).await
    }

    async fn clear_winner(&self, id: &str, winner_id: &str) -> Result<()> {
        self.update_tournament(id, |t| {
            if t.winner.as_ref().is_some_and(|w| w.id == winner_id) {
                t.winner = None;
            }
            Ok(())
        })
        .await
    }

    async fn delete_tournament(&self, id: &str) -> Result<()> {
        let mut tournaments = self.tournaments.write().await;
        tournaments
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| GameError::NotFound(format!("tournament {}", id)))
    }
}

#[async_trait]
impl GameStore for DocumentStore {
    fn atomicity(&self) -> Atomicity {
        Atomicity::Compensating
    }
}
