use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};

/// The player who won a settled tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub id: String,
    /// Balance of the winner at settlement time, before the prize was credited.
    pub points: i64,
    pub prize: i64,
}

/// Wire shape of a results answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winners {
    pub winners: Vec<Winner>,
}

impl From<Winner> for Winners {
    fn from(winner: Winner) -> Self {
        Self {
            winners: vec![winner],
        }
    }
}

/// Outcome of trying to record a winner on a tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WinnerClaim {
    Recorded,
    /// Someone settled first; carries the winner already on record.
    AlreadySettled(Winner),
}

/// Tournament record.
///
/// Lifecycle: `Open -> Closed(no winner) -> Closed(winner set)`. There is no
/// way back to `Open` and the winner is written at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub deposit: i64,
    pub is_open: bool,
    pub participants: Vec<String>,
    pub prize_pool: i64,
    pub winner: Option<Winner>,
}

impl Tournament {
    pub fn new(id: impl Into<String>, deposit: i64) -> Self {
        Self {
            id: id.into(),
            deposit,
            is_open: true,
            participants: Vec::new(),
            prize_pool: 0,
            winner: None,
        }
    }

    pub fn has_participant(&self, player_id: &str) -> bool {
        self.participants.iter().any(|p| p == player_id)
    }

    /// Checks that `player_id` may join, without mutating anything.
    pub fn check_admission(&self, player_id: &str) -> Result<()> {
        if !self.is_open {
            return Err(GameError::ClosedTournament(format!(
                "cannot join closed tournament {}",
                self.id
            )));
        }
        if self.has_participant(player_id) {
            return Err(GameError::DuplicateParticipant(format!(
                "player {} already joined tournament {}",
                player_id, self.id
            )));
        }
        Ok(())
    }

    /// Appends the participant and grows the prize pool by one deposit.
    pub fn admit(&mut self, player_id: &str) -> Result<()> {
        self.check_admission(player_id)?;
        let prize_pool = self.prize_pool.checked_add(self.deposit).ok_or_else(|| {
            GameError::Validation(format!("prize pool overflow for tournament {}", self.id))
        })?;
        self.participants.push(player_id.to_string());
        self.prize_pool = prize_pool;
        Ok(())
    }

    /// Undoes [`Tournament::admit`] for a player whose debit failed.
    ///
    /// Only an open, unsettled tournament can give a deposit back: once closed,
    /// the pool may already have been paid out.
    pub fn expel(&mut self, player_id: &str) -> Result<()> {
        if !self.is_open || self.winner.is_some() {
            return Err(GameError::ClosedTournament(format!(
                "cannot remove player {} from closed tournament {}",
                player_id, self.id
            )));
        }
        let position = self
            .participants
            .iter()
            .position(|p| p == player_id)
            .ok_or_else(|| {
                GameError::NotFound(format!(
                    "player {} is not a participant of tournament {}",
                    player_id, self.id
                ))
            })?;
        let prize_pool = self.prize_pool.checked_sub(self.deposit).ok_or_else(|| {
            GameError::Validation(format!("prize pool underflow for tournament {}", self.id))
        })?;
        self.participants.remove(position);
        self.prize_pool = prize_pool;
        Ok(())
    }

    /// Transitions `Open -> Closed`. Closing twice is an error, never a reopen.
    pub fn close(&mut self) -> Result<()> {
        if !self.is_open {
            return Err(GameError::ClosedTournament(format!(
                "tournament {} is already closed",
                self.id
            )));
        }
        self.is_open = false;
        Ok(())
    }

    pub fn claim_winner(&mut self, winner: Winner) -> Result<WinnerClaim> {
        if self.is_open {
            return Err(GameError::Validation(format!(
                "cannot set winner of open tournament {}",
                self.id
            )));
        }
        if let Some(existing) = &self.winner {
            return Ok(WinnerClaim::AlreadySettled(existing.clone()));
        }
        if !self.has_participant(&winner.id) {
            return Err(GameError::Validation(format!(
                "winner {} is not a participant of tournament {}",
                winner.id, self.id
            )));
        }
        self.winner = Some(winner);
        Ok(WinnerClaim::Recorded)
    }

    /// `prize_pool == deposit * len(participants)` while open.
    pub fn pool_is_balanced(&self) -> bool {
        if !self.is_open {
            return true;
        }
        i64::try_from(self.participants.len())
            .ok()
            .and_then(|count| self.deposit.checked_mul(count))
            == Some(self.prize_pool)
    }
}
