use std::io;

use thiserror::Error;

use crate::session::record::{ScoreRecord, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode session document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session document is corrupt: {0}")]
    Corrupt(String),
    #[error("no active session to record scores against")]
    NoActiveSession,
}

/// Persistence contract the session controller depends on.
pub trait ScoreGateway {
    /// Begin a new run for `username`, discarding any stored scores.
    fn create_session(&mut self, username: &str) -> Result<User, StoreError>;

    fn submit_score(&mut self, record: &ScoreRecord) -> Result<(), StoreError>;

    fn fetch_all_scores(&mut self) -> Result<Vec<ScoreRecord>, StoreError>;
}

impl<G: ScoreGateway + ?Sized> ScoreGateway for Box<G> {
    fn create_session(&mut self, username: &str) -> Result<User, StoreError> {
        (**self).create_session(username)
    }

    fn submit_score(&mut self, record: &ScoreRecord) -> Result<(), StoreError> {
        (**self).submit_score(record)
    }

    fn fetch_all_scores(&mut self) -> Result<Vec<ScoreRecord>, StoreError> {
        (**self).fetch_all_scores()
    }
}
