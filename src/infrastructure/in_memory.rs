use crate::domain::ledger::{LedgerEntry, OperationKind};
use crate::domain::player::Player;
use crate::domain::ports::{Atomicity, GameStore, LedgerStore, OperationLog, TournamentStore};
use crate::domain::tournament::{Tournament, Winner, WinnerClaim};
use crate::error::{GameError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct State {
    players: HashMap<String, Player>,
    tournaments: HashMap<String, Tournament>,
    operations: Vec<LedgerEntry>,
}

/// Staged changes against a locked [`State`].
///
/// Records are copied on first touch and only written back by
/// [`Transaction::commit`]; dropping the transaction discards everything.
struct Transaction<'a> {
    state: &'a mut State,
    players: HashMap<String, Player>,
    tournaments: HashMap<String, Tournament>,
    operations: Vec<LedgerEntry>,
}

impl<'a> Transaction<'a> {
    fn begin(state: &'a mut State) -> Self {
        Self {
            state,
            players: HashMap::new(),
            tournaments: HashMap::new(),
            operations: Vec::new(),
        }
    }

    fn player_mut(&mut self, id: &str) -> Result<&mut Player> {
        match self.players.entry(id.to_string()) {
            Entry::Occupied(staged) => Ok(staged.into_mut()),
            Entry::Vacant(slot) => {
                let player = self
                    .state
                    .players
                    .get(id)
                    .cloned()
                    .ok_or_else(|| GameError::NotFound(format!("player {}", id)))?;
                Ok(slot.insert(player))
            }
        }
    }

    fn tournament_mut(&mut self, id: &str) -> Result<&mut Tournament> {
        match self.tournaments.entry(id.to_string()) {
            Entry::Occupied(staged) => Ok(staged.into_mut()),
            Entry::Vacant(slot) => {
                let tournament = self
                    .state
                    .tournaments
                    .get(id)
                    .cloned()
                    .ok_or_else(|| GameError::NotFound(format!("tournament {}", id)))?;
                Ok(slot.insert(tournament))
            }
        }
    }

    fn adjust(&mut self, id: &str, delta: i64, kind: OperationKind) -> Result<()> {
        self.player_mut(id)?.apply(delta)?;
        self.operations.push(LedgerEntry::new(id, kind, delta));
        Ok(())
    }

    fn commit(self) {
        self.state.players.extend(self.players);
        self.state.tournaments.extend(self.tournaments);
        self.state.operations.extend(self.operations);
    }
}

/// A thread-safe in-memory store with native multi-record transactions.
///
/// All collections sit behind one `Arc<RwLock<_>>`; every operation, including
/// join and settlement, runs under the write lock as one staged transaction.
/// `Clone` shares the underlying state.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn create_player(&self, id: &str, points: i64) -> Result<Player> {
        let mut state = self.state.write().await;
        if state.players.contains_key(id) {
            return Err(GameError::DuplicateId(format!("player {}", id)));
        }
        let player = Player::new(id, points);
        state.players.insert(id.to_string(), player.clone());
        state
            .operations
            .push(LedgerEntry::new(id, OperationKind::Fund, points));
        Ok(player)
    }

    async fn get_player(&self, id: &str) -> Result<Player> {
        let state = self.state.read().await;
        state
            .players
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("player {}", id)))
    }

    async fn adjust_balance(&self, id: &str, delta: i64, kind: OperationKind) -> Result<()> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        tx.adjust(id, delta, kind)?;
        tx.commit();
        Ok(())
    }

    async fn delete_player(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(tournament) = state
            .tournaments
            .values()
            .find(|t| t.is_open && t.has_participant(id))
        {
            return Err(GameError::Validation(format!(
                "player {} is registered in open tournament {}",
                id, tournament.id
            )));
        }
        state
            .players
            .remove(id)
            .ok_or_else(|| GameError::NotFound(format!("player {}", id)))?;
        state.operations.retain(|entry| entry.player_id != id);
        Ok(())
    }
}

#[async_trait]
impl OperationLog for InMemoryStore {
    async fn operations(&self, player_id: &str) -> Result<Vec<LedgerEntry>> {
        let state = self.state.read().await;
        Ok(state
            .operations
            .iter()
            .filter(|entry| entry.player_id == player_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TournamentStore for InMemoryStore {
    async fn create_tournament(&self, id: &str, deposit: i64) -> Result<()> {
        let mut state = self.state.write().await;
        if state.tournaments.contains_key(id) {
            return Err(GameError::DuplicateId(format!("tournament {}", id)));
        }
        state
            .tournaments
            .insert(id.to_string(), Tournament::new(id, deposit));
        Ok(())
    }

    async fn tournament(&self, id: &str) -> Result<Tournament> {
        let state = self.state.read().await;
        state
            .tournaments
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("tournament {}", id)))
    }

    async fn close_tournament(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        tx.tournament_mut(id)?.close()?;
        tx.commit();
        Ok(())
    }

    async fn append_participant(&self, id: &str, player_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        tx.tournament_mut(id)?.admit(player_id)?;
        tx.commit();
        Ok(())
    }

    async fn remove_participant(&self, id: &str, player_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        tx.tournament_mut(id)?.expel(player_id)?;
        tx.commit();
        Ok(())
    }

    async fn set_winner(&self, id: &str, winner: Winner) -> Result<WinnerClaim> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        let claim = tx.tournament_mut(id)?.claim_winner(winner)?;
        tx.commit();
        Ok(claim)
    }

    async fn clear_winner(&self, id: &str, winner_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        let tournament = tx.tournament_mut(id)?;
        if tournament.winner.as_ref().is_some_and(|w| w.id == winner_id) {
            tournament.winner = None;
        }
        tx.commit();
        Ok(())
    }

    async fn delete_tournament(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .tournaments
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| GameError::NotFound(format!("tournament {}", id)))
    }
}

#[async_trait]
impl GameStore for InMemoryStore {
    fn atomicity(&self) -> Atomicity {
        Atomicity::NativeTransactional
    }

    async fn join_in_transaction(&self, tournament_id: &str, player_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        let tournament = tx.tournament_mut(tournament_id)?;
        tournament.admit(player_id)?;
        let deposit = tournament.deposit;
        tx.adjust(player_id, -deposit, OperationKind::Take)?;
        tx.commit();
        debug!(tournament_id, player_id, deposit, "join committed");
        Ok(())
    }

    async fn settle_in_transaction(&self, tournament_id: &str, winner_id: &str) -> Result<Winner> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        let prize = tx.tournament_mut(tournament_id)?.prize_pool;
        let winner = Winner {
            id: winner_id.to_string(),
            points: tx.player_mut(winner_id)?.balance,
            prize,
        };
        if let WinnerClaim::AlreadySettled(existing) =
            tx.tournament_mut(tournament_id)?.claim_winner(winner.clone())?
        {
            return Ok(existing);
        }
        tx.adjust(winner_id, prize, OperationKind::Win)?;
        tx.commit();
        debug!(tournament_id, winner_id, prize, "settlement committed");
        Ok(winner)
    }
}
