use crate::application::selection::{RandomSelector, WinnerSelector};
use crate::domain::ledger::{OperationKind, Reconciliation, log_sum};
use crate::domain::player::Player;
use crate::domain::ports::{
    Atomicity, GameStore, GameStoreBox, LedgerStore, OperationLog, TournamentStore,
};
use crate::domain::tournament::{Winner, WinnerClaim};
use crate::error::{GameError, Result};
use tracing::{error, info, warn};

/// The balance/settlement consistency engine.
///
/// `SettlementEngine` owns a [`GameStore`] and carries no state of its own
/// between calls, so any number of engines may share one backend. Join and
/// settlement are all-or-nothing: backends with native transactions run them
/// as one commit, compensating backends get an explicit undo step whose
/// failure is reported as [`GameError::CompensationFailed`].
pub struct SettlementEngine {
    store: GameStoreBox,
    selector: Box<dyn WinnerSelector>,
}

impl SettlementEngine {
    /// Creates an engine drawing winners uniformly at random.
    ///
    /// # Arguments
    ///
    /// * `store` - The backend holding players, tournaments and the operation log.
    pub fn new(store: GameStoreBox) -> Self {
        Self::with_selector(store, Box::new(RandomSelector))
    }

    pub fn with_selector(store: GameStoreBox, selector: Box<dyn WinnerSelector>) -> Self {
        Self { store, selector }
    }

    pub fn store(&self) -> &dyn GameStore {
        self.store.as_ref()
    }

    /// Credits `points`, creating the player on first funding.
    pub async fn fund(&self, id: &str, points: i64) -> Result<Player> {
        match self.store.get_player(id).await {
            Ok(_) => {}
            Err(GameError::NotFound(_)) => match self.store.create_player(id, points).await {
                Ok(player) => return Ok(player),
                // Lost a creation race; credit the player the winner created.
                Err(GameError::DuplicateId(_)) => {}
                Err(err) => return Err(err),
            },
            Err(err) => return Err(err),
        }
        self.store
            .adjust_balance(id, points, OperationKind::Fund)
            .await?;
        self.store.get_player(id).await
    }

    /// Debits `points` through the store's floor guard.
    pub async fn take(&self, id: &str, points: i64) -> Result<()> {
        self.store
            .adjust_balance(id, -points, OperationKind::Take)
            .await
    }

    pub async fn balance(&self, id: &str) -> Result<Player> {
        self.store.get_player(id).await
    }

    pub async fn announce(&self, id: &str, deposit: i64) -> Result<()> {
        self.store.create_tournament(id, deposit).await?;
        info!(tournament_id = id, deposit, "tournament announced");
        Ok(())
    }

    /// Adds `player_id` to the tournament and debits the deposit, atomically.
    pub async fn join(&self, tournament_id: &str, player_id: &str) -> Result<()> {
        let tournament = self.store.tournament(tournament_id).await?;
        tournament.check_admission(player_id)?;

        match self.store.atomicity() {
            Atomicity::NativeTransactional => {
                self.store
                    .join_in_transaction(tournament_id, player_id)
                    .await?
            }
            Atomicity::Compensating => {
                self.join_with_compensation(tournament_id, player_id, tournament.deposit)
                    .await?
            }
        }
        info!(tournament_id, player_id, deposit = tournament.deposit, "player joined");
        Ok(())
    }

    async fn join_with_compensation(
        &self,
        tournament_id: &str,
        player_id: &str,
        deposit: i64,
    ) -> Result<()> {
        self.store
            .append_participant(tournament_id, player_id)
            .await?;

        let Err(debit_error) = self
            .store
            .adjust_balance(player_id, -deposit, OperationKind::Take)
            .await
        else {
            return Ok(());
        };

        warn!(tournament_id, player_id, %debit_error, "deposit debit failed, removing participant");
        if let Err(cause) = self
            .store
            .remove_participant(tournament_id, player_id)
            .await
        {
            error!(tournament_id, player_id, %cause, "participant removal failed");
            return Err(GameError::compensation_failed(debit_error, cause));
        }
        Err(debit_error)
    }

    /// Closes the tournament and pays its prize pool to a random participant.
    ///
    /// Settled tournaments answer with the winner on record; a tournament
    /// closed without participants keeps answering
    /// [`GameError::NoParticipants`].
    pub async fn results(&self, tournament_id: &str) -> Result<Winner> {
        let tournament = self.store.tournament(tournament_id).await?;
        if let Some(winner) = tournament.winner {
            return Ok(winner);
        }
        if tournament.is_open {
            self.store.close_tournament(tournament_id).await?;
            info!(tournament_id, "tournament closed");
        }

        let participants = self.store.participants(tournament_id).await?;
        let index = self.selector.pick(&participants).ok_or_else(|| {
            GameError::NoParticipants(format!(
                "tournament {} ended without participants",
                tournament_id
            ))
        })?;
        let winner_id = participants.get(index).ok_or_else(|| {
            GameError::Storage(format!(
                "winner index {} out of range for {} participants",
                index,
                participants.len()
            ))
        })?;

        let winner = match self.store.atomicity() {
            Atomicity::NativeTransactional => {
                self.store
                    .settle_in_transaction(tournament_id, winner_id)
                    .await?
            }
            Atomicity::Compensating => {
                self.settle_with_compensation(tournament_id, winner_id)
                    .await?
            }
        };
        info!(tournament_id, winner_id = %winner.id, prize = winner.prize, "tournament settled");
        Ok(winner)
    }

    async fn settle_with_compensation(&self, tournament_id: &str, winner_id: &str) -> Result<Winner> {
        let prize = self.store.tournament(tournament_id).await?.prize_pool;
        let winner = Winner {
            id: winner_id.to_string(),
            points: self.store.get_player(winner_id).await?.balance,
            prize,
        };

        // Recording first makes the winner slot the claim: a concurrent
        // settlement sees it and pays nothing.
        if let WinnerClaim::AlreadySettled(existing) = self
            .store
            .set_winner(tournament_id, winner.clone())
            .await?
        {
            return Ok(existing);
        }

        let Err(credit_error) = self
            .store
            .adjust_balance(winner_id, prize, OperationKind::Win)
            .await
        else {
            return Ok(winner);
        };

        warn!(tournament_id, winner_id, %credit_error, "prize credit failed, clearing winner");
        if let Err(cause) = self.store.clear_winner(tournament_id, winner_id).await {
            error!(tournament_id, winner_id, %cause, "winner removal failed");
            return Err(GameError::compensation_failed(credit_error, cause));
        }
        Err(credit_error)
    }

    /// Compares the stored balance with the sum of the player's operation log.
    /// The stored balance stays authoritative; this is an audit check.
    pub async fn reconcile(&self, player_id: &str) -> Result<Reconciliation> {
        let counter = self.store.get_player(player_id).await?.balance;
        let operations = self.store.operations(player_id).await?;
        let reconciliation = Reconciliation {
            counter,
            log_sum: log_sum(&operations),
        };
        if !reconciliation.is_consistent() {
            warn!(
                player_id,
                counter = reconciliation.counter,
                log_sum = reconciliation.log_sum,
                "balance differs from operation log"
            );
        }
        Ok(reconciliation)
    }

    pub async fn delete_player(&self, id: &str) -> Result<()> {
        self.store.delete_player(id).await
    }

    pub async fn delete_tournament(&self, id: &str) -> Result<()> {
        self.store.delete_tournament(id).await
    }
}
