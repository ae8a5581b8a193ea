#![allow(dead_code)]

use async_trait::async_trait;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::NamedTempFile;
use tourney::application::controller::Game;
use tourney::application::engine::SettlementEngine;
use tourney::application::selection::WinnerSelector;
use tourney::domain::ledger::{LedgerEntry, OperationKind};
use tourney::domain::player::Player;
use tourney::domain::ports::{
    Atomicity, GameStore, GameStoreBox, LedgerStore, OperationLog, TournamentStore,
};
use tourney::domain::tournament::{Tournament, Winner, WinnerClaim};
use tourney::error::{GameError, Result};
use tourney::infrastructure::document::{DocumentStore, LedgerStrategy};
use tourney::infrastructure::in_memory::InMemoryStore;

/// Always picks the participant at a fixed position.
pub struct ScriptedSelector(pub usize);

impl WinnerSelector for ScriptedSelector {
    fn pick(&self, participants: &[String]) -> Option<usize> {
        (!participants.is_empty()).then(|| self.0.min(participants.len() - 1))
    }
}

/// Every backend conformance level the engine must behave identically on.
pub fn backends() -> Vec<(&'static str, GameStoreBox)> {
    vec![
        ("in-memory", Box::new(InMemoryStore::new()) as GameStoreBox),
        ("document", Box::new(DocumentStore::new()) as GameStoreBox),
        (
            "document-log",
            Box::new(DocumentStore::with_strategy(LedgerStrategy::LogReconciliation))
                as GameStoreBox,
        ),
    ]
}

pub fn games() -> Vec<(&'static str, Game)> {
    backends()
        .into_iter()
        .map(|(name, store)| {
            let engine = SettlementEngine::with_selector(store, Box::new(ScriptedSelector(0)));
            (name, Game::new(engine))
        })
        .collect()
}

/// Switches for [`FaultyStore`]; each makes one store call fail.
#[derive(Default)]
pub struct Faults {
    pub fail_debit: AtomicBool,
    pub fail_credit: AtomicBool,
    pub fail_remove_participant: AtomicBool,
    pub fail_clear_winner: AtomicBool,
    /// Closes this tournament just before the next debit runs, as a
    /// concurrent settlement would.
    pub close_before_debit: Mutex<Option<String>>,
}

impl Faults {
    pub fn set(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }
}

fn injected(what: &str) -> GameError {
    GameError::Storage(format!("injected failure: {}", what))
}

/// A [`DocumentStore`] that fails selected calls on demand.
#[derive(Clone)]
pub struct FaultyStore {
    inner: DocumentStore,
    pub faults: Arc<Faults>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self {
            inner: DocumentStore::new(),
            faults: Arc::new(Faults::default()),
        }
    }
}

#[async_trait]
impl LedgerStore for FaultyStore {
    async fn create_player(&self, id: &str, points: i64) -> Result<Player> {
        self.inner.create_player(id, points).await
    }

    async fn get_player(&self, id: &str) -> Result<Player> {
        self.inner.get_player(id).await
    }

    async fn adjust_balance(&self, id: &str, delta: i64, kind: OperationKind) -> Result<()> {
        let closing = if delta < 0 {
            self.faults.close_before_debit.lock().unwrap().take()
        } else {
            None
        };
        if let Some(tournament_id) = closing {
            self.inner.close_tournament(&tournament_id).await?;
        }
        if delta < 0 && self.faults.fail_debit.load(Ordering::SeqCst) {
            return Err(injected("debit"));
        }
        if delta > 0 && self.faults.fail_credit.load(Ordering::SeqCst) {
            return Err(injected("credit"));
        }
        self.inner.adjust_balance(id, delta, kind).await
    }

    async fn delete_player(&self, id: &str) -> Result<()> {
        self.inner.delete_player(id).await
    }
}

#[async_trait]
impl OperationLog for FaultyStore {
    async fn operations(&self, player_id: &str) -> Result<Vec<LedgerEntry>> {
        self.inner.operations(player_id).await
    }
}

#[async_trait]
impl TournamentStore for FaultyStore {
    async fn create_tournament(&self, id: &str, deposit: i64) -> Result<()> {
        self.inner.create_tournament(id, deposit).await
    }

    async fn tournament(&self, id: &str) -> Result<Tournament> {
        self.inner.tournament(id).await
    }

    async fn close_tournament(&self, id: &str) -> Result<()> {
        self.inner.close_tournament(id).await
    }

    async fn append_participant(&self, id: &str, player_id: &str) -> Result<()> {
        self.inner.append_participant(id, player_id).await
    }

    async fn remove_participant(&self, id: &str, player_id: &str) -> Result<()> {
        if self.faults.fail_remove_participant.load(Ordering::SeqCst) {
            return Err(injected("remove participant"));
        }
        self.inner.remove_participant(id, player_id).await
    }

    async fn set_winner(&self, id: &str, winner: Winner) -> Result<WinnerClaim> {
        self.inner.set_winner(id, winner).await
    }

    async fn clear_winner(&self, id: &str, winner_id: &str) -> Result<()> {
        if self.faults.fail_clear_winner.load(Ordering::SeqCst) {
            return Err(injected("clear winner"));
        }
        self.inner.clear_winner(id, winner_id).await
    }

    async fn delete_tournament(&self, id: &str) -> Result<()> {
        self.inner.delete_tournament(id).await
    }
}

#[async_trait]
impl GameStore for FaultyStore {
    fn atomicity(&self) -> Atomicity {
        Atomicity::Compensating
    }
}

/// Writes a command script with the standard header.
pub fn script(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "action, player, tournament, points").unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}
