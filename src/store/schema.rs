use serde::{Deserialize, Serialize};

use crate::session::record::{ScoreRecord, User};

/// On-disk shape: `{ "user": {..} | null, "scores": [..] }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    pub user: Option<User>,
    #[serde(default)]
    pub scores: Vec<ScoreRecord>,
}

impl SessionDocument {
    pub fn for_user(user: User) -> Self {
        Self {
            user: Some(user),
            scores: Vec::new(),
        }
    }
}
