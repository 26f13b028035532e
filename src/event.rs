use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    /// Carries the instant the tick was produced so games see a monotonic clock.
    Tick(Instant),
    Resize,
}

/// Polls the terminal on a helper thread and forwards events to the main loop.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate.saturating_sub(last_tick.elapsed());
                if event::poll(timeout).unwrap_or(false) {
                    let forwarded = match event::read() {
                        // Release/Repeat would double-count presses in timed games
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            Some(AppEvent::Key(key))
                        }
                        Ok(Event::Resize(_, _)) => Some(AppEvent::Resize),
                        _ => None,
                    };
                    if let Some(ev) = forwarded
                        && tx.send(ev).is_err()
                    {
                        return;
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    last_tick = Instant::now();
                    if tx.send(AppEvent::Tick(last_tick)).is_err() {
                        return;
                    }
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
