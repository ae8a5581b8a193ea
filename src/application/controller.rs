use crate::application::engine::SettlementEngine;
use crate::domain::ledger::Reconciliation;
use crate::domain::player::Player;
use crate::domain::tournament::Winners;
use crate::error::{GameError, Result};

/// Caller-facing façade over the [`SettlementEngine`].
///
/// Rejects bad input before any store call, so a validation failure never
/// has partial effects.
pub struct Game {
    engine: SettlementEngine,
}

fn require_id(operation: &str, name: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(GameError::Validation(format!(
            "{}: {} must not be empty",
            operation, name
        )));
    }
    Ok(())
}

fn require_non_negative(operation: &str, points: i64) -> Result<()> {
    if points < 0 {
        return Err(GameError::Validation(format!(
            "{}: points must not be negative, got {}",
            operation, points
        )));
    }
    Ok(())
}

impl Game {
    pub fn new(engine: SettlementEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &SettlementEngine {
        &self.engine
    }

    pub async fn fund(&self, id: &str, points: i64) -> Result<Player> {
        require_id("fund", "player id", id)?;
        require_non_negative("fund", points)?;
        self.engine.fund(id, points).await
    }

    pub async fn take(&self, id: &str, points: i64) -> Result<()> {
        require_id("take", "player id", id)?;
        require_non_negative("take", points)?;
        self.engine.take(id, points).await
    }

    pub async fn balance(&self, id: &str) -> Result<Player> {
        require_id("balance", "player id", id)?;
        self.engine.balance(id).await
    }

    pub async fn announce_tournament(&self, id: &str, deposit: i64) -> Result<()> {
        require_id("announce", "tournament id", id)?;
        if deposit <= 0 {
            return Err(GameError::Validation(format!(
                "announce: deposit must be positive, got {} for tournament {}",
                deposit, id
            )));
        }
        self.engine.announce(id, deposit).await
    }

    pub async fn join_tournament(&self, tournament_id: &str, player_id: &str) -> Result<()> {
        require_id("join", "tournament id", tournament_id)?;
        require_id("join", "player id", player_id)?;
        self.engine.join(tournament_id, player_id).await
    }

    pub async fn results(&self, tournament_id: &str) -> Result<Winners> {
        require_id("results", "tournament id", tournament_id)?;
        self.engine.results(tournament_id).await.map(Winners::from)
    }

    pub async fn delete_player(&self, id: &str) -> Result<()> {
        require_id("delete player", "player id", id)?;
        self.engine.delete_player(id).await
    }

    pub async fn delete_tournament(&self, id: &str) -> Result<()> {
        require_id("delete tournament", "tournament id", id)?;
        self.engine.delete_tournament(id).await
    }

    pub async fn reconcile(&self, id: &str) -> Result<Reconciliation> {
        require_id("reconcile", "player id", id)?;
        self.engine.reconcile(id).await
    }
}
