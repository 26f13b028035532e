use std::mem;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Level, Position, TestSpec};
use crate::session::record::{ScoreRecord, TestOutcome, User};
use crate::session::state::{Screen, SessionEvent, SessionState, reduce};
use crate::store::gateway::{ScoreGateway, StoreError};

#[derive(Debug, Error)]
pub enum StartError {
    #[error("enter a name to begin")]
    EmptyUsername,
    #[error("a session is already in progress")]
    AlreadyStarted,
    #[error("could not create session: {0}")]
    Gateway(#[from] StoreError),
}

/// Result of comparing the stored archive with the in-memory records when
/// the run enters analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchiveCheck {
    Verified(usize),
    Mismatch { local: usize, stored: usize },
    Unavailable(String),
}

pub struct SessionController<G: ScoreGateway> {
    catalog: Catalog,
    gateway: G,
    state: SessionState,
    analysis_duration: Duration,
    analysis_started: Option<Instant>,
    archive_check: Option<ArchiveCheck>,
    failed_submissions: usize,
}

impl<G: ScoreGateway> SessionController<G> {
    pub fn new(catalog: Catalog, gateway: G, analysis_duration: Duration) -> Self {
        Self {
            catalog,
            gateway,
            state: SessionState::default(),
            analysis_duration,
            analysis_started: None,
            archive_check: None,
            failed_submissions: 0,
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        let state = mem::take(&mut self.state);
        self.state = reduce(&self.catalog, state, event);
    }

    pub fn start(&mut self, username: &str) -> Result<(), StartError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(StartError::EmptyUsername);
        }
        if self.state.screen != Screen::Welcome {
            return Err(StartError::AlreadyStarted);
        }
        let user = self.gateway.create_session(username).map_err(|e| {
            warn!(error = %e, "create_session failed");
            StartError::from(e)
        })?;
        info!(username = %user.username, tests = self.catalog.total_tests(), "session started");
        self.apply(SessionEvent::Start(user));
        self.analysis_started = None;
        self.archive_check = None;
        self.failed_submissions = 0;
        Ok(())
    }

    /// Record the outcome reported by the test at `at`. Returns false when the
    /// completion was ignored (stale position, wrong screen, bad score).
    pub fn complete(&mut self, at: Position, outcome: TestOutcome, now: Instant) -> bool {
        if !outcome.score.is_finite() {
            warn!(?at, score = outcome.score, "ignoring non-finite score");
            return false;
        }
        let before = self.state.records.len();
        self.apply(SessionEvent::Complete { at, outcome });
        if self.state.records.len() == before {
            debug!(?at, current = ?self.state.position, "ignoring stale completion");
            return false;
        }

        if let Some(record) = self.state.records.last() {
            info!(
                test = %record.test_id,
                score = record.score,
                display = %record.display_score,
                "test completed"
            );
            if let Err(e) = self.gateway.submit_score(record) {
                self.failed_submissions += 1;
                warn!(test = %record.test_id, error = %e, "score submission failed");
            }
        }

        if self.state.screen == Screen::Analyzing {
            self.analysis_started = Some(now);
            self.archive_check = Some(self.cross_check());
        }
        true
    }

    fn cross_check(&mut self) -> ArchiveCheck {
        let local = self.state.records.len();
        match self.gateway.fetch_all_scores() {
            Ok(stored) if stored == self.state.records => ArchiveCheck::Verified(local),
            Ok(stored) => {
                warn!(local, stored = stored.len(), "stored scores differ from session");
                ArchiveCheck::Mismatch {
                    local,
                    stored: stored.len(),
                }
            }
            Err(e) => {
                warn!(error = %e, "could not read back stored scores");
                ArchiveCheck::Unavailable(e.to_string())
            }
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if self.state.screen != Screen::Analyzing {
            return;
        }
        let started = *self.analysis_started.get_or_insert(now);
        if now.saturating_duration_since(started) >= self.analysis_duration {
            self.apply(SessionEvent::Finish);
            info!(records = self.state.records.len(), "analysis finished");
        }
    }

    pub fn restart(&mut self) {
        self.apply(SessionEvent::Restart);
        self.analysis_started = None;
        self.archive_check = None;
        self.failed_submissions = 0;
        info!("session restarted");
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.state.screen
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.state.records
    }

    pub fn position(&self) -> Position {
        self.state.position
    }

    pub fn current_level(&self) -> Option<&'static Level> {
        self.catalog.level(self.state.position.level)
    }

    pub fn current_test(&self) -> Option<&'static TestSpec> {
        self.catalog.test_at(self.state.position).map(|(_, t)| t)
    }

    pub fn progress(&self) -> f64 {
        self.state.progress(&self.catalog)
    }

    /// 0.0..=1.0 through the analysis delay; 1.0 once results are showing.
    pub fn analysis_progress(&self, now: Instant) -> f64 {
        match (self.state.screen, self.analysis_started) {
            (Screen::Results, _) => 1.0,
            (Screen::Analyzing, Some(started)) => {
                if self.analysis_duration.is_zero() {
                    return 1.0;
                }
                let elapsed = now.saturating_duration_since(started).as_secs_f64();
                (elapsed / self.analysis_duration.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Time spent on the analysis screen so far.
    pub fn analysis_elapsed(&self, now: Instant) -> Duration {
        match (self.state.screen, self.analysis_started) {
            (Screen::Analyzing, Some(started)) => now.saturating_duration_since(started),
            (Screen::Results, _) => self.analysis_duration,
            _ => Duration::ZERO,
        }
    }

    pub fn archive_check(&self) -> Option<&ArchiveCheck> {
        self.archive_check.as_ref()
    }

    pub fn failed_submissions(&self) -> usize {
        self.failed_submissions
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Level, TestSpec};
    use crate::store::memory::MemoryStore;

    const PAIR: &[Level] = &[Level {
        id: 1,
        name: "Only",
        tests: &[
            TestSpec { id: "x", name: "X", description: "" },
            TestSpec { id: "y", name: "Y", description: "" },
        ],
    }];

    fn controller() -> SessionController<MemoryStore> {
        SessionController::new(
            Catalog::new(PAIR),
            MemoryStore::new(),
            Duration::from_millis(100),
        )
    }

    fn outcome(score: f64) -> TestOutcome {
        TestOutcome::new(score, format!("{score}"), "pts")
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut ctl = controller();
        assert!(matches!(ctl.start("  "), Err(StartError::EmptyUsername)));
        assert_eq!(ctl.screen(), Screen::Welcome);
    }

    #[test]
    fn start_trims_and_persists_user() {
        let mut ctl = controller();
        ctl.start("  ace ").unwrap();
        assert_eq!(ctl.user().unwrap().username, "ace");
        assert_eq!(
            ctl.gateway().document().user.as_ref().unwrap().username,
            "ace"
        );
        assert!(matches!(ctl.start("again"), Err(StartError::AlreadyStarted)));
    }

    #[test]
    fn completions_are_submitted_and_verified() {
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.start("ace").unwrap();
        assert!(ctl.complete(Position::new(0, 0), outcome(1.0), t0));
        assert!(ctl.complete(Position::new(0, 1), outcome(2.0), t0));
        assert_eq!(ctl.screen(), Screen::Analyzing);
        assert_eq!(ctl.gateway().document().scores.len(), 2);
        assert_eq!(ctl.archive_check(), Some(&ArchiveCheck::Verified(2)));
    }

    #[test]
    fn duplicate_completion_is_ignored() {
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.start("ace").unwrap();
        assert!(ctl.complete(Position::START, outcome(1.0), t0));
        assert!(!ctl.complete(Position::START, outcome(1.0), t0));
        assert_eq!(ctl.records().len(), 1);
        assert_eq!(ctl.gateway().document().scores.len(), 1);
    }

    #[test]
    fn non_finite_score_is_ignored() {
        let mut ctl = controller();
        ctl.start("ace").unwrap();
        assert!(!ctl.complete(Position::START, outcome(f64::NAN), Instant::now()));
        assert!(ctl.records().is_empty());
        assert_eq!(ctl.position(), Position::START);
    }

    #[test]
    fn analysis_waits_for_configured_delay() {
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.start("ace").unwrap();
        ctl.complete(Position::new(0, 0), outcome(1.0), t0);
        ctl.complete(Position::new(0, 1), outcome(2.0), t0);

        ctl.tick(t0 + Duration::from_millis(50));
        assert_eq!(ctl.screen(), Screen::Analyzing);
        let half = ctl.analysis_progress(t0 + Duration::from_millis(50));
        assert!((half - 0.5).abs() < 1e-9);

        ctl.tick(t0 + Duration::from_millis(100));
        assert_eq!(ctl.screen(), Screen::Results);
        assert_eq!(ctl.records().len(), 2);
        assert_eq!(ctl.analysis_progress(t0), 1.0);
    }

    #[test]
    fn restart_returns_to_welcome() {
        let mut ctl = controller();
        ctl.start("ace").unwrap();
        ctl.complete(Position::START, outcome(1.0), Instant::now());
        ctl.restart();
        assert_eq!(ctl.screen(), Screen::Welcome);
        assert!(ctl.user().is_none());
        assert!(ctl.records().is_empty());
        assert!(ctl.archive_check().is_none());
        ctl.start("next").unwrap();
        assert_eq!(ctl.position(), Position::START);
    }

    #[test]
    fn current_test_follows_position() {
        let mut ctl = controller();
        assert_eq!(ctl.current_test().unwrap().id, "x");
        ctl.start("ace").unwrap();
        ctl.complete(Position::START, outcome(1.0), Instant::now());
        assert_eq!(ctl.current_test().unwrap().id, "y");
        assert_eq!(ctl.current_level().unwrap().name, "Only");
    }
}
