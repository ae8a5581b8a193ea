use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// The caller actions a command script can request.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Fund,
    Take,
    Balance,
    Announce,
    Join,
    Results,
    DeletePlayer,
    DeleteTournament,
}

/// One row of a command script.
///
/// Columns not used by an action are left empty; `points` doubles as the
/// deposit for `announce`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Command {
    pub action: Action,
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub tournament: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
}

impl Command {
    pub fn player_id(&self) -> &str {
        self.player.as_deref().unwrap_or_default()
    }

    pub fn tournament_id(&self) -> &str {
        self.tournament.as_deref().unwrap_or_default()
    }

    pub fn points(&self) -> Result<i64> {
        self.points.ok_or_else(|| {
            GameError::Validation(format!("{:?} requires a points value", self.action))
        })
    }
}

/// Reads commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Command>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes commands.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(GameError::from))
    }
}
