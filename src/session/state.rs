use crate::catalog::{Catalog, Position};
use crate::session::record::{ScoreRecord, TestOutcome, User};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Welcome,
    Running,
    Analyzing,
    Results,
}

/// Everything one run owns. Transitioned only through [`reduce`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub screen: Screen,
    pub user: Option<User>,
    pub position: Position,
    pub records: Vec<ScoreRecord>,
}

#[derive(Clone, Debug)]
pub enum SessionEvent {
    Start(User),
    /// `at` identifies the test instance that produced the outcome.
    Complete {
        at: Position,
        outcome: TestOutcome,
    },
    Finish,
    Restart,
}

impl SessionState {
    pub fn is_running(&self) -> bool {
        self.screen == Screen::Running
    }

    /// Share of the catalog finished, for display only.
    pub fn progress(&self, catalog: &Catalog) -> f64 {
        let total = catalog.total_tests();
        match self.screen {
            Screen::Welcome => 0.0,
            Screen::Analyzing | Screen::Results => 1.0,
            Screen::Running if total == 0 => 0.0,
            Screen::Running => catalog.flat_index(self.position) as f64 / total as f64,
        }
    }
}

pub fn reduce(catalog: &Catalog, state: SessionState, event: SessionEvent) -> SessionState {
    match (state.screen, event) {
        (Screen::Welcome, SessionEvent::Start(user)) => {
            let Some(first) = catalog.first_position() else {
                return state;
            };
            if user.username.trim().is_empty() {
                return state;
            }
            SessionState {
                screen: Screen::Running,
                user: Some(user),
                position: first,
                records: Vec::new(),
            }
        }
        (Screen::Running, SessionEvent::Complete { at, outcome }) => {
            if at != state.position {
                return state;
            }
            let Some((level, test)) = catalog.test_at(at) else {
                return state;
            };
            let mut next = state;
            next.records
                .push(ScoreRecord::from_outcome(level, test, outcome));
            match catalog.next_position(at) {
                Some(pos) => next.position = pos,
                None => next.screen = Screen::Analyzing,
            }
            next
        }
        (Screen::Analyzing, SessionEvent::Finish) => SessionState {
            screen: Screen::Results,
            ..state
        },
        (_, SessionEvent::Restart) => SessionState::default(),
        _ => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Level, TestSpec};

    const TWO_BY_TWO: &[Level] = &[
        Level {
            id: 1,
            name: "First",
            tests: &[
                TestSpec { id: "a", name: "A", description: "" },
                TestSpec { id: "b", name: "B", description: "" },
            ],
        },
        Level {
            id: 2,
            name: "Second",
            tests: &[
                TestSpec { id: "c", name: "C", description: "" },
                TestSpec { id: "d", name: "D", description: "" },
            ],
        },
    ];

    fn catalog() -> Catalog {
        Catalog::new(TWO_BY_TWO)
    }

    fn started() -> SessionState {
        reduce(
            &catalog(),
            SessionState::default(),
            SessionEvent::Start(User::new("tester")),
        )
    }

    fn complete(state: SessionState, score: f64) -> SessionState {
        let at = state.position;
        reduce(
            &catalog(),
            state,
            SessionEvent::Complete {
                at,
                outcome: TestOutcome::new(score, format!("{score}"), "pts"),
            },
        )
    }

    #[test]
    fn start_resets_position_and_records() {
        let state = started();
        assert_eq!(state.screen, Screen::Running);
        assert_eq!(state.position, Position::START);
        assert!(state.records.is_empty());
        assert_eq!(state.user.as_ref().unwrap().username, "tester");
    }

    #[test]
    fn start_with_blank_name_is_ignored() {
        let state = reduce(
            &catalog(),
            SessionState::default(),
            SessionEvent::Start(User::new("   ")),
        );
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn start_outside_welcome_is_ignored() {
        let state = complete(started(), 1.0);
        let again = reduce(&catalog(), state.clone(), SessionEvent::Start(User::new("other")));
        assert_eq!(again, state);
    }

    #[test]
    fn completions_walk_the_catalog_then_analyze() {
        let mut state = started();
        let mut seen = vec![state.position];
        for score in [1.0, 2.0, 3.0] {
            state = complete(state, score);
            seen.push(state.position);
        }
        assert_eq!(
            seen,
            vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(1, 0),
                Position::new(1, 1),
            ]
        );
        state = complete(state, 4.0);
        assert_eq!(state.screen, Screen::Analyzing);

        let ids: Vec<&str> = state.records.iter().map(|r| r.test_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        let scores: Vec<f64> = state.records.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(state.records[2].level_id, 2);
        assert_eq!(state.records[2].level_name, "Second");

        let done = reduce(&catalog(), state, SessionEvent::Finish);
        assert_eq!(done.screen, Screen::Results);
        assert_eq!(done.records.len(), 4);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let state = complete(started(), 10.0);
        assert_eq!(state.position, Position::new(0, 1));
        let replay = reduce(
            &catalog(),
            state.clone(),
            SessionEvent::Complete {
                at: Position::START,
                outcome: TestOutcome::new(99.0, "99", "pts"),
            },
        );
        assert_eq!(replay, state);
    }

    #[test]
    fn completion_outside_running_is_ignored() {
        let welcome = reduce(
            &catalog(),
            SessionState::default(),
            SessionEvent::Complete {
                at: Position::START,
                outcome: TestOutcome::new(1.0, "1", "pts"),
            },
        );
        assert_eq!(welcome, SessionState::default());
    }

    #[test]
    fn finish_only_applies_while_analyzing() {
        let state = started();
        let same = reduce(&catalog(), state.clone(), SessionEvent::Finish);
        assert_eq!(same, state);
    }

    #[test]
    fn restart_clears_everything_from_any_screen() {
        let mut state = started();
        for _ in 0..4 {
            state = complete(state, 5.0);
        }
        let results = reduce(&catalog(), state, SessionEvent::Finish);
        for s in [started(), complete(started(), 1.0), results] {
            let fresh = reduce(&catalog(), s, SessionEvent::Restart);
            assert_eq!(fresh, SessionState::default());
            assert!(fresh.user.is_none());
            assert!(fresh.records.is_empty());
        }
    }

    #[test]
    fn progress_tracks_flat_position() {
        let cat = catalog();
        let mut state = started();
        assert_eq!(state.progress(&cat), 0.0);
        state = complete(state, 1.0);
        assert!((state.progress(&cat) - 0.25).abs() < f64::EPSILON);
        state = complete(state, 1.0);
        assert!((state.progress(&cat) - 0.5).abs() < f64::EPSILON);
        state = complete(complete(state, 1.0), 1.0);
        assert_eq!(state.progress(&cat), 1.0);
    }
}
