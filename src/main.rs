use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};
use tracing::{info, warn};

use proeval::app::{App, MAX_NAME_CHARS};
use proeval::catalog::Catalog;
use proeval::config::Config;
use proeval::event::{AppEvent, EventHandler};
use proeval::games::registry;
use proeval::logging;
use proeval::session::state::Screen;
use proeval::store::gateway::ScoreGateway;
use proeval::store::json_store::JsonStore;
use proeval::store::memory::MemoryStore;
use proeval::ui::components::analysis::AnalysisView;
use proeval::ui::components::progress_bar::ProgressBar;
use proeval::ui::components::results_panel::ResultsPanel;
use proeval::ui::components::welcome::WelcomeForm;
use proeval::ui::layout::{RunLayout, centered_rect, pack_hint_lines};
use proeval::ui::line_input::LineInput;
use proeval::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "proeval",
    version,
    about = "Terminal esports aptitude assessment: reaction, vision, memory and aim mini-games"
)]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Directory for the session file, reports and logs")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Keep scores in memory only")]
    no_save: bool,

    #[arg(long, help = "Length of the analysis screen in milliseconds")]
    analysis_ms: Option<u64>,

    #[arg(short, long, help = "Pre-fill the player name")]
    name: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: could not read config ({e:#}); using defaults");
        Config::default()
    });
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir.to_string_lossy().to_string();
    }
    if let Some(ms) = cli.analysis_ms {
        config.analysis_ms = ms;
    }
    config.validate();

    if let Err(e) = logging::init(&config.data_path(), &config.log_level) {
        eprintln!("Warning: logging disabled ({e:#})");
    }

    let catalog = Catalog::builtin();
    catalog.validate()?;
    let missing = registry::missing_games(&catalog);
    if !missing.is_empty() {
        bail!("no mini-game for tests: {}", missing.join(", "));
    }

    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        warn!(theme = %config.theme, "unknown theme, using default");
        Theme::default()
    });

    let gateway: Box<dyn ScoreGateway> = if cli.no_save {
        Box::new(MemoryStore::new())
    } else {
        match JsonStore::new(&config.data_path()) {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!(error = %e, "session file unavailable, keeping scores in memory");
                Box::new(MemoryStore::new())
            }
        }
    };

    let tick_rate = config.tick_rate();
    info!(
        data_dir = %config.data_dir,
        theme = %theme.name,
        save = !cli.no_save,
        "starting"
    );

    let mut app = App::new(catalog, config, theme, gateway, SmallRng::from_entropy());
    app.persist_config = true;
    if let Some(name) = cli.name {
        app.name_input = LineInput::new(&name, MAX_NAME_CHARS);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(tick_rate);
    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        eprintln!("Error: {err:?}");
    }
    info!("exiting");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        let now = Instant::now();
        terminal.draw(|frame| render(frame, app, now))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key, Instant::now()),
            AppEvent::Tick(at) => app.on_tick(at),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    app.handle_key(key, now);
}

fn render(frame: &mut ratatui::Frame, app: &App, now: Instant) {
    let area = frame.area();
    let colors = &app.theme.colors;
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg())), area);

    match app.screen() {
        Screen::Welcome => {
            let form_area = centered_rect(60, 80, 56, 22, area);
            let form = WelcomeForm::new(&app.name_input, app.controller.catalog(), &app.theme)
                .notice(app.notice.as_ref());
            frame.render_widget(form, form_area);
        }
        Screen::Running => render_running(frame, app, now),
        Screen::Analyzing => {
            let view = AnalysisView::new(
                app.controller.analysis_elapsed(now),
                app.controller.analysis_progress(now),
                &app.theme,
            );
            frame.render_widget(view, area);
        }
        Screen::Results => {
            let panel_area = centered_rect(80, 90, 72, 20, area);
            let panel = ResultsPanel::new(app.controller.user(), app.controller.records(), &app.theme)
                .archive(app.controller.archive_check())
                .failed_submissions(app.controller.failed_submissions())
                .notice(app.notice.as_ref())
                .scroll(app.results_scroll);
            frame.render_widget(panel, panel_area);
        }
    }
}

fn render_running(frame: &mut ratatui::Frame, app: &App, now: Instant) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let ctl = &app.controller;

    let game_hints = app.active_game().map(|a| a.game.hints()).unwrap_or("");
    let hints = pack_hint_lines(&[game_hints, "[Esc] Abandon"], area.width as usize);
    let layout = RunLayout::new(area, hints.len() as u16);

    let pos = ctl.position();
    let level_text = match ctl.current_level() {
        Some(level) => format!(
            " Level {}: {} ({}/{})",
            pos.level + 1,
            level.name,
            pos.test + 1,
            level.tests.len()
        ),
        None => String::new(),
    };
    let username = ctl.user().map(|u| u.username.as_str()).unwrap_or("");
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " PRO EVAL ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {username} |"),
            Style::default().fg(colors.accent()).bg(colors.header_bg()),
        ),
        Span::styled(level_text, Style::default().fg(colors.header_fg()).bg(colors.header_bg())),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    frame.render_widget(
        ProgressBar::new("Progress", ctl.progress(), &app.theme),
        layout.progress,
    );

    if let Some(test) = ctl.current_test() {
        let title = Paragraph::new(vec![
            Line::from(Span::styled(
                test.name,
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(test.description, Style::default().fg(colors.text_dim()))),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(title, layout.title);
    }

    if let Some(active) = app.active_game() {
        active
            .game
            .render(layout.game, frame.buffer_mut(), &app.theme, now);
    }

    let footer: Vec<Line> = hints
        .into_iter()
        .map(|h| Line::from(Span::styled(h, Style::default().fg(colors.text_dim()))))
        .collect();
    frame.render_widget(Paragraph::new(footer), layout.footer);

    if app.confirm_abandon {
        render_abandon_prompt(frame, app, layout.game);
    }
}

fn render_abandon_prompt(frame: &mut ratatui::Frame, app: &App, over: Rect) {
    let colors = &app.theme.colors;
    let popup = centered_rect(40, 30, 36, 5, over);
    frame.render_widget(Clear, popup);
    let block = Block::bordered()
        .title(" Abandon run? ")
        .border_style(Style::default().fg(colors.warning()))
        .style(Style::default().bg(colors.bg()));
    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            "All results so far will be discarded.",
            Style::default().fg(colors.fg()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[y] Abandon  [n] Keep going",
            Style::default().fg(colors.accent()),
        )),
    ])
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(text, popup);
}
