use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};

/// A player and their point balance.
///
/// The balance never drops below zero through [`Player::apply`]; stores that
/// keep players as plain records use it as their floor guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    #[serde(rename = "points")]
    pub balance: i64,
}

impl Player {
    pub fn new(id: impl Into<String>, balance: i64) -> Self {
        Self {
            id: id.into(),
            balance,
        }
    }

    /// Applies a signed delta, refusing any change that would leave the
    /// balance negative. The player is untouched on error.
    pub fn apply(&mut self, delta: i64) -> Result<()> {
        let next = self.balance.checked_add(delta).ok_or_else(|| {
            GameError::Validation(format!("balance overflow for player {}", self.id))
        })?;
        if next < 0 {
            return Err(GameError::InsufficientBalance(format!(
                "player {} has {} points, cannot take {}",
                self.id, self.balance, -delta
            )));
        }
        self.balance = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_credit_and_debit() {
        let mut player = Player::new("p1", 10);
        player.apply(5).unwrap();
        assert_eq!(player.balance, 15);
        player.apply(-15).unwrap();
        assert_eq!(player.balance, 0);
    }

    #[test]
    fn test_apply_refuses_negative_balance() {
        let mut player = Player::new("p1", 10);
        let result = player.apply(-11);
        assert!(matches!(result, Err(GameError::InsufficientBalance(_))));
        assert_eq!(player.balance, 10);
    }

    #[test]
    fn test_apply_overflow_is_rejected() {
        let mut player = Player::new("p1", i64::MAX);
        assert!(matches!(player.apply(1), Err(GameError::Validation(_))));
        assert_eq!(player.balance, i64::MAX);
    }

    #[test]
    fn test_player_serializes_balance_as_points() {
        let json = serde_json::to_string(&Player::new("p1", 100)).unwrap();
        assert_eq!(json, r#"{"id":"p1","points":100}"#);
    }
}
