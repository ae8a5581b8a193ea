use serde::Serialize;
use thiserror::Error;

/// Every failure the engine, the stores or the interface layer can report.
///
/// The variants mirror the stable error kinds exposed to callers (see
/// [`ErrorKind`]). Store backends wrap their own failures in
/// [`GameError::Storage`].
#[derive(Error, Debug)]
pub enum GameError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicated id: {0}")]
    DuplicateId(String),
    #[error("duplicate participant: {0}")]
    DuplicateParticipant(String),
    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),
    #[error("closed tournament: {0}")]
    ClosedTournament(String),
    #[error("no participants: {0}")]
    NoParticipants(String),
    /// A speculative balance change was detected as illegal and undone.
    #[error("operation rolled back: {0}")]
    RolledBack(String),
    /// The undo step of a compensating sequence failed; data is unverified.
    #[error("compensation failed ({cause}) while recovering from: {original}")]
    CompensationFailed {
        original: Box<GameError>,
        cause: Box<GameError>,
    },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for GameError {
    fn from(err: rocksdb::Error) -> Self {
        GameError::Storage(err.into_string())
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::Storage(format!("serialization error: {}", err))
    }
}

/// Stable, caller-facing classification of a [`GameError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    DuplicateId,
    DuplicateParticipant,
    InsufficientBalance,
    ClosedTournament,
    NoParticipants,
    Rollback,
    Critical,
    Storage,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validationError",
            ErrorKind::NotFound => "notFoundError",
            ErrorKind::DuplicateId => "duplicatedIdError",
            ErrorKind::DuplicateParticipant => "duplicateParticipantError",
            ErrorKind::InsufficientBalance => "insufficientBalanceError",
            ErrorKind::ClosedTournament => "closedTournamentError",
            ErrorKind::NoParticipants => "noneParticipantsError",
            ErrorKind::Rollback => "rollbackError",
            ErrorKind::Critical => "criticalError",
            ErrorKind::Storage => "storageError",
        }
    }

    /// Client errors are the caller's fault and safe to retry after fixing input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::Validation
                | ErrorKind::NotFound
                | ErrorKind::DuplicateId
                | ErrorKind::DuplicateParticipant
                | ErrorKind::InsufficientBalance
                | ErrorKind::ClosedTournament
                | ErrorKind::NoParticipants
        )
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::DuplicateId
            | ErrorKind::DuplicateParticipant
            | ErrorKind::ClosedTournament
            | ErrorKind::NoParticipants => 409,
            ErrorKind::InsufficientBalance => 422,
            ErrorKind::Rollback | ErrorKind::Critical | ErrorKind::Storage => 500,
        }
    }
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::Validation(_) => ErrorKind::Validation,
            GameError::NotFound(_) => ErrorKind::NotFound,
            GameError::DuplicateId(_) => ErrorKind::DuplicateId,
            GameError::DuplicateParticipant(_) => ErrorKind::DuplicateParticipant,
            GameError::InsufficientBalance(_) => ErrorKind::InsufficientBalance,
            GameError::ClosedTournament(_) => ErrorKind::ClosedTournament,
            GameError::NoParticipants(_) => ErrorKind::NoParticipants,
            GameError::RolledBack(_) => ErrorKind::Rollback,
            GameError::CompensationFailed { .. } => ErrorKind::Critical,
            GameError::Storage(_) | GameError::Csv(_) | GameError::Io(_) => ErrorKind::Storage,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.kind().is_client_error()
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Wraps a failed undo step, keeping the error that triggered it.
    pub fn compensation_failed(original: GameError, cause: GameError) -> Self {
        GameError::CompensationFailed {
            original: Box::new(original),
            cause: Box::new(cause),
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.kind().code(),
            message: self.to_string(),
        }
    }
}

/// Serialized form of an error on the wire.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_4xx() {
        let errors = [
            GameError::Validation("empty id".into()),
            GameError::NotFound("p1".into()),
            GameError::DuplicateId("p1".into()),
            GameError::DuplicateParticipant("p1".into()),
            GameError::InsufficientBalance("p1".into()),
            GameError::ClosedTournament("t1".into()),
            GameError::NoParticipants("t1".into()),
        ];
        for err in errors {
            assert!(err.is_client_error(), "{err} should be a client error");
            assert!((400..500).contains(&err.status_code()));
        }
    }

    #[test]
    fn test_compensation_failure_is_critical() {
        let err = GameError::compensation_failed(
            GameError::InsufficientBalance("p1".into()),
            GameError::Storage("disk gone".into()),
        );
        assert_eq!(err.kind(), ErrorKind::Critical);
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_client_error());

        let message = err.to_string();
        assert!(message.contains("disk gone"));
        assert!(message.contains("insufficient balance"));
    }

    #[test]
    fn test_error_body_carries_stable_code() {
        let body = GameError::RolledBack("p1".into()).to_body();
        assert_eq!(body.code, "rollbackError");
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""code":"rollbackError""#));
    }
}
