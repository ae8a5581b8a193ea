use serde::{Deserialize, Serialize};

/// The kind of balance mutation an operation log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Fund,
    Take,
    Win,
}

/// One append-only record of a balance delta applied to a player.
///
/// `compensation` marks entries written to undo an earlier delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub player_id: String,
    pub kind: OperationKind,
    pub delta: i64,
    #[serde(default)]
    pub compensation: bool,
}

impl LedgerEntry {
    pub fn new(player_id: impl Into<String>, kind: OperationKind, delta: i64) -> Self {
        Self {
            player_id: player_id.into(),
            kind,
            delta,
            compensation: false,
        }
    }

    /// The entry that exactly cancels `self`.
    pub fn reversal(&self) -> Self {
        Self {
            player_id: self.player_id.clone(),
            kind: self.kind,
            delta: -self.delta,
            compensation: true,
        }
    }
}

/// Sum of all deltas, i.e. the balance the log alone would derive.
pub fn log_sum<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> i64 {
    entries
        .into_iter()
        .fold(0, |sum: i64, entry| sum.saturating_add(entry.delta))
}

/// Result of comparing a stored balance with its operation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub counter: i64,
    pub log_sum: i64,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.counter == self.log_sum
    }
}
