use std::time::Instant;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::SmallRng;
use tracing::{error, info, warn};

use crate::catalog::{Catalog, Position};
use crate::config::Config;
use crate::games::{MiniGame, registry};
use crate::report;
use crate::session::controller::SessionController;
use crate::session::record::TestOutcome;
use crate::session::state::Screen;
use crate::store::gateway::ScoreGateway;
use crate::ui::Notice;
use crate::ui::line_input::{InputResult, LineInput};
use crate::ui::theme::Theme;

pub const MAX_NAME_CHARS: usize = 24;

/// The mini-game currently on screen, tagged with the catalog position it
/// reports for.
pub struct ActiveGame {
    pub at: Position,
    pub game: Box<dyn MiniGame>,
}

pub struct App {
    pub controller: SessionController<Box<dyn ScoreGateway>>,
    pub config: Config,
    pub theme: Theme,
    pub name_input: LineInput,
    pub notice: Option<Notice>,
    pub confirm_abandon: bool,
    pub results_scroll: usize,
    pub should_quit: bool,
    /// Write `last_username` back to the config file on start.
    pub persist_config: bool,
    active: Option<ActiveGame>,
    rng: SmallRng,
}

impl App {
    pub fn new(
        catalog: Catalog,
        config: Config,
        theme: Theme,
        gateway: Box<dyn ScoreGateway>,
        rng: SmallRng,
    ) -> Self {
        let name = config.last_username.clone().unwrap_or_default();
        let controller = SessionController::new(catalog, gateway, config.analysis_duration());
        Self {
            controller,
            config,
            theme,
            name_input: LineInput::new(&name, MAX_NAME_CHARS),
            notice: None,
            confirm_abandon: false,
            results_scroll: 0,
            should_quit: false,
            persist_config: false,
            active: None,
            rng,
        }
    }

    pub fn screen(&self) -> Screen {
        self.controller.screen()
    }

    pub fn active_game(&self) -> Option<&ActiveGame> {
        self.active.as_ref()
    }

    pub fn start(&mut self, now: Instant) {
        let name = self.name_input.value().trim().to_string();
        match self.controller.start(&name) {
            Ok(()) => {
                self.notice = None;
                self.results_scroll = 0;
                self.remember_name(&name);
                self.mount_current(now);
            }
            Err(e) => {
                warn!(error = %e, "could not start session");
                self.notice = Some(Notice::error(e.to_string()));
            }
        }
    }

    fn remember_name(&mut self, name: &str) {
        if self.config.last_username.as_deref() == Some(name) {
            return;
        }
        self.config.last_username = Some(name.to_string());
        if self.persist_config
            && let Err(e) = Config::remember_username(name)
        {
            warn!(error = %e, "could not save config");
        }
    }

    /// Makes sure the game for the current position is mounted.
    fn mount_current(&mut self, now: Instant) {
        if self.controller.screen() != Screen::Running {
            self.active = None;
            return;
        }
        let at = self.controller.position();
        if self.active.as_ref().is_some_and(|a| a.at == at) {
            return;
        }
        let Some(test) = self.controller.current_test() else {
            self.active = None;
            return;
        };
        match registry::create(test.id, &mut self.rng, now) {
            Some(game) => {
                info!(test = test.id, ?at, "test mounted");
                self.active = Some(ActiveGame { at, game });
            }
            None => {
                // Skip rather than stall the run on a test nothing can play.
                error!(test = test.id, "no mini-game registered");
                self.active = None;
                self.controller
                    .complete(at, TestOutcome::new(0.0, "n/a", "unavailable"), now);
                self.mount_current(now);
            }
        }
    }

    fn poll_active(&mut self, now: Instant) {
        let finished = self
            .active
            .as_mut()
            .and_then(|a| a.game.poll_outcome(now).map(|outcome| (a.at, outcome)));
        if let Some((at, outcome)) = finished {
            self.active = None;
            self.controller.complete(at, outcome, now);
            self.mount_current(now);
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        if self.controller.screen() == Screen::Running {
            self.mount_current(now);
            if let Some(active) = self.active.as_mut() {
                active.game.on_tick(now);
            }
            self.poll_active(now);
        } else {
            self.active = None;
        }
        self.controller.tick(now);
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        match self.controller.screen() {
            Screen::Welcome => self.handle_welcome_key(key, now),
            Screen::Running => self.handle_running_key(key, now),
            Screen::Analyzing => {}
            Screen::Results => self.handle_results_key(key),
        }
    }

    fn handle_welcome_key(&mut self, key: KeyEvent, now: Instant) {
        match self.name_input.handle(key) {
            InputResult::Submit => self.start(now),
            InputResult::Cancel => self.should_quit = true,
            InputResult::Continue => {
                if self.notice.as_ref().is_some_and(|n| n.is_error) {
                    self.notice = None;
                }
            }
        }
    }

    fn handle_running_key(&mut self, key: KeyEvent, now: Instant) {
        if self.confirm_abandon {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.restart(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_abandon = false;
                }
                _ => {}
            }
            return;
        }
        if key.code == KeyCode::Esc {
            self.confirm_abandon = true;
            return;
        }
        self.mount_current(now);
        if let Some(active) = self.active.as_mut() {
            active.game.on_key(key.code, now);
        }
        self.poll_active(now);
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('r') => self.restart(),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                let max = self.controller.records().len().saturating_sub(1);
                self.results_scroll = (self.results_scroll + 1).min(max);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.results_scroll = self.results_scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    pub fn export(&mut self) {
        let result = report::export(
            &self.config.data_path(),
            self.controller.user(),
            self.controller.records(),
            Utc::now(),
        );
        self.notice = Some(match result {
            Ok(path) => Notice::info(format!("Report saved to {}", path.display())),
            Err(e) => {
                warn!(error = %e, "report export failed");
                Notice::error(format!("Export failed: {e:#}"))
            }
        });
    }

    pub fn restart(&mut self) {
        self.controller.restart();
        self.active = None;
        self.confirm_abandon = false;
        self.notice = None;
        self.results_scroll = 0;
        let name = self.config.last_username.clone().unwrap_or_default();
        self.name_input = LineInput::new(&name, MAX_NAME_CHARS);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::KeyModifiers;
    use rand::SeedableRng;
    use tempfile::TempDir;

    use super::*;
    use crate::catalog::{Level, TestSpec};
    use crate::store::memory::MemoryStore;

    const QUIZ: &[Level] = &[Level {
        id: 1,
        name: "Fundamentals",
        tests: &[TestSpec {
            id: "psych",
            name: "Esports Mindset",
            description: "",
        }],
    }];

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(levels: &'static [Level], data_dir: &TempDir) -> App {
        let mut config = Config::default();
        config.analysis_ms = 0;
        config.data_dir = data_dir.path().to_string_lossy().to_string();
        App::new(
            Catalog::new(levels),
            config,
            Theme::default(),
            Box::new(MemoryStore::new()),
            SmallRng::seed_from_u64(1),
        )
    }

    fn type_name(app: &mut App, name: &str, now: Instant) {
        for ch in name.chars() {
            app.handle_key(key(KeyCode::Char(ch)), now);
        }
        app.handle_key(key(KeyCode::Enter), now);
    }

    #[test]
    fn blank_name_shows_error() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(QUIZ, &dir);
        app.handle_key(key(KeyCode::Enter), Instant::now());
        assert_eq!(app.screen(), Screen::Welcome);
        assert!(app.notice.as_ref().unwrap().is_error);
    }

    #[test]
    fn start_mounts_first_game_and_remembers_name() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(QUIZ, &dir);
        type_name(&mut app, "ace", Instant::now());
        assert_eq!(app.screen(), Screen::Running);
        assert_eq!(app.active_game().unwrap().at, Position::START);
        assert_eq!(app.config.last_username.as_deref(), Some("ace"));
    }

    #[test]
    fn finishing_the_only_test_reaches_results_and_exports() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(QUIZ, &dir);
        let now = Instant::now();
        type_name(&mut app, "ace", now);
        for ch in ['2', '2', '3'] {
            app.handle_key(key(KeyCode::Char(ch)), now);
        }
        assert_eq!(app.screen(), Screen::Analyzing);
        assert!(app.active_game().is_none());

        app.on_tick(now + Duration::from_millis(1));
        assert_eq!(app.screen(), Screen::Results);
        assert_eq!(app.controller.records()[0].display_score, "30/30");

        app.handle_key(key(KeyCode::Char('e')), now);
        let notice = app.notice.clone().unwrap();
        assert!(!notice.is_error, "{}", notice.text);
        assert!(dir.path().join("reports").is_dir());
    }

    #[test]
    fn escape_asks_before_abandoning() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(QUIZ, &dir);
        let now = Instant::now();
        type_name(&mut app, "ace", now);

        app.handle_key(key(KeyCode::Esc), now);
        assert!(app.confirm_abandon);
        app.handle_key(key(KeyCode::Char('n')), now);
        assert!(!app.confirm_abandon);
        assert_eq!(app.screen(), Screen::Running);

        app.handle_key(key(KeyCode::Esc), now);
        app.handle_key(key(KeyCode::Char('y')), now);
        assert_eq!(app.screen(), Screen::Welcome);
        assert!(app.active_game().is_none());
        assert_eq!(app.name_input.value(), "ace");
    }

    #[test]
    fn keys_while_confirming_do_not_reach_the_game() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(QUIZ, &dir);
        let now = Instant::now();
        type_name(&mut app, "ace", now);
        app.handle_key(key(KeyCode::Esc), now);
        for ch in ['2', '2', '3'] {
            app.handle_key(key(KeyCode::Char(ch)), now);
        }
        assert_eq!(app.screen(), Screen::Running);
        assert!(app.controller.records().is_empty());
    }

    #[test]
    fn unknown_test_is_skipped() {
        const UNKNOWN: &[Level] = &[Level {
            id: 1,
            name: "Odd",
            tests: &[
                TestSpec { id: "juggling", name: "Juggling", description: "" },
                TestSpec { id: "psych", name: "Esports Mindset", description: "" },
            ],
        }];
        let dir = TempDir::new().unwrap();
        let mut app = app_with(UNKNOWN, &dir);
        type_name(&mut app, "ace", Instant::now());
        assert_eq!(app.controller.records().len(), 1);
        assert_eq!(app.controller.records()[0].unit, "unavailable");
        assert_eq!(app.active_game().unwrap().at, Position::new(0, 1));
    }
}
