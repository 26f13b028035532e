use crate::session::record::{ScoreRecord, User};
use crate::store::gateway::{ScoreGateway, StoreError};
use crate::store::schema::SessionDocument;

/// Process-local store used when nothing should touch the disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: SessionDocument,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &SessionDocument {
        &self.doc
    }
}

impl ScoreGateway for MemoryStore {
    fn create_session(&mut self, username: &str) -> Result<User, StoreError> {
        let user = User::new(username);
        self.doc = SessionDocument::for_user(user.clone());
        Ok(user)
    }

    fn submit_score(&mut self, record: &ScoreRecord) -> Result<(), StoreError> {
        if self.doc.user.is_none() {
            return Err(StoreError::NoActiveSession);
        }
        self.doc.scores.push(record.clone());
        Ok(())
    }

    fn fetch_all_scores(&mut self) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(self.doc.scores.clone())
    }
}
