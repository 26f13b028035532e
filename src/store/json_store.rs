use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::session::record::{ScoreRecord, User};
use crate::store::gateway::{ScoreGateway, StoreError};
use crate::store::schema::SessionDocument;

const SESSION_FILE: &str = "session.json";

/// Keeps the whole run in a single JSON document under the data directory.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new(base_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(base_dir)?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing file reads as the empty document; unparsable content is an error.
    pub fn load_document(&self) -> Result<SessionDocument, StoreError> {
        let path = self.file_path(SESSION_FILE);
        if !path.exists() {
            return Ok(SessionDocument::default());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn save_document(&self, doc: &SessionDocument) -> Result<(), StoreError> {
        let path = self.file_path(SESSION_FILE);
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(doc)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl ScoreGateway for JsonStore {
    fn create_session(&mut self, username: &str) -> Result<User, StoreError> {
        let user = User::new(username);
        // A corrupt previous document is simply replaced.
        self.save_document(&SessionDocument::for_user(user.clone()))?;
        debug!(dir = %self.base_dir.display(), "session document reset");
        Ok(user)
    }

    fn submit_score(&mut self, record: &ScoreRecord) -> Result<(), StoreError> {
        let mut doc = self.load_document()?;
        if doc.user.is_none() {
            return Err(StoreError::NoActiveSession);
        }
        doc.scores.push(record.clone());
        self.save_document(&doc)
    }

    fn fetch_all_scores(&mut self) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(self.load_document()?.scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path()).unwrap();
        (dir, store)
    }

    fn record(test_id: &str, score: f64) -> ScoreRecord {
        ScoreRecord {
            level_id: 2,
            level_name: "Reaction".to_string(),
            test_id: test_id.to_string(),
            test_name: "Pure Reaction".to_string(),
            score,
            display_score: format!("{score}"),
            unit: "ms (avg)".to_string(),
        }
    }

    #[test]
    fn missing_file_is_empty_document() {
        let (_dir, mut store) = make_test_store();
        assert!(store.fetch_all_scores().unwrap().is_empty());
        assert_eq!(store.load_document().unwrap(), SessionDocument::default());
    }

    #[test]
    fn scores_append_in_order() {
        let (_dir, mut store) = make_test_store();
        store.create_session("ace").unwrap();
        store.submit_score(&record("a", 1.0)).unwrap();
        store.submit_score(&record("b", 2.0)).unwrap();

        let scores = store.fetch_all_scores().unwrap();
        let ids: Vec<&str> = scores.iter().map(|r| r.test_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn document_matches_expected_schema() {
        let (_dir, mut store) = make_test_store();
        let user = store.create_session("ace").unwrap();
        store.submit_score(&record("simple_reaction", 240.0)).unwrap();

        let raw = fs::read_to_string(store.file_path(SESSION_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["user"]["username"], "ace");
        assert_eq!(
            json["user"]["startedAt"].as_i64().unwrap(),
            user.started_at.timestamp_millis()
        );
        assert_eq!(json["scores"][0]["testId"], "simple_reaction");
        assert_eq!(json["scores"][0]["displayScore"], "240");
        assert_eq!(json["scores"][0]["unit"], "ms (avg)");
    }

    #[test]
    fn create_session_discards_previous_run() {
        let (_dir, mut store) = make_test_store();
        store.create_session("first").unwrap();
        store.submit_score(&record("a", 1.0)).unwrap();
        store.create_session("second").unwrap();

        let doc = store.load_document().unwrap();
        assert_eq!(doc.user.unwrap().username, "second");
        assert!(doc.scores.is_empty());
    }

    #[test]
    fn submit_without_session_fails() {
        let (_dir, mut store) = make_test_store();
        let err = store.submit_score(&record("a", 1.0)).unwrap_err();
        assert!(matches!(err, StoreError::NoActiveSession));
    }

    #[test]
    fn corrupt_document_is_reported_then_replaced() {
        let (_dir, mut store) = make_test_store();
        fs::write(store.file_path(SESSION_FILE), "{not json").unwrap();

        assert!(matches!(
            store.fetch_all_scores(),
            Err(StoreError::Corrupt(_))
        ));
        store.create_session("fresh").unwrap();
        assert!(store.fetch_all_scores().unwrap().is_empty());
    }

    #[test]
    fn no_tmp_file_left_behind() {
        let (dir, mut store) = make_test_store();
        store.create_session("ace").unwrap();
        store.submit_score(&record("a", 1.0)).unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn unwritable_dir_surfaces_io_error() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::new(dir.path()).unwrap();
        store.base_dir = dir.path().join("gone");
        assert!(matches!(
            store.create_session("ace"),
            Err(StoreError::Io(_))
        ));
    }
}
