use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Level, TestSpec};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            started_at: Utc::now(),
        }
    }
}

/// The single value a mini-game reports when it finishes.
#[derive(Clone, Debug, PartialEq)]
pub struct TestOutcome {
    pub score: f64,
    pub display: String,
    pub unit: String,
}

impl TestOutcome {
    pub fn new(score: f64, display: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            score,
            display: display.into(),
            unit: unit.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub level_id: u32,
    pub level_name: String,
    pub test_id: String,
    pub test_name: String,
    pub score: f64,
    pub display_score: String,
    pub unit: String,
}

impl ScoreRecord {
    pub fn from_outcome(level: &Level, test: &TestSpec, outcome: TestOutcome) -> Self {
        Self {
            level_id: level.id,
            level_name: level.name.to_string(),
            test_id: test.id.to_string(),
            test_name: test.name.to_string(),
            score: outcome.score,
            display_score: outcome.display,
            unit: outcome.unit,
        }
    }
}
