//! App: terminal session, fixed-tick main loop, key handling and event sinks.

use crate::GameConfig;
use crate::game::{Game, GameEvent, TickInput};
use crate::input::{Action, InputState};
use crate::theme::Theme;
use crate::ui::{self, RemovalBurst, ViewOptions};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// ~60 FPS rendering.
const FRAME_DURATION: Duration = Duration::from_millis(16);
/// Ticks run per frame at most; after a stall the clock is resynced instead of fast-forwarding.
const MAX_CATCH_UP: u32 = 8;

pub struct App {
    game: Game,
    theme: Theme,
    view: ViewOptions,
    input: InputState,
    burst: RemovalBurst,
    tick_interval: Duration,
    last_tick: Instant,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Result<Self> {
        let mut game = Game::new(config.rules, config.seed);
        if config.skip_title {
            game.start();
        }
        Ok(Self {
            game,
            theme,
            view: ViewOptions {
                show_months: false,
                animation: config.animation,
            },
            input: InputState::new(),
            burst: RemovalBurst::default(),
            tick_interval: Duration::from_secs_f64(1.0 / f64::from(config.tick_rate.max(1))),
            last_tick: Instant::now(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::PopKeyboardEnhancementFlags,
            execute,
            terminal::{LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let result = self.session();

        // Restore even when the session failed.
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        let restored = execute!(std::io::stdout(), LeaveAlternateScreen)
            .and_then(|()| disable_raw_mode());
        result.and(restored.map_err(Into::into))
    }

    fn session(&mut self) -> Result<()> {
        use crossterm::{
            event::{KeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
            execute,
            terminal::EnterAlternateScreen,
        };

        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        // Release events keep fast drop levelled; without them the grace timeout applies.
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        self.run_loop(&mut terminal)
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.last_tick = Instant::now();
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                ui::draw(f, &self.game, &self.theme, self.view, &mut self.burst, now)
            })?;

            let timeout = FRAME_DURATION.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if self.handle_key(key, Instant::now()) {
                            return Ok(());
                        }
                    }
                }
            }

            let now = Instant::now();
            for _ in 0..self.due_ticks(now) {
                let input = self.input.take_tick(now);
                self.run_tick(input);
            }
        }
    }

    /// Returns true when the player asked to quit.
    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        match self.input.on_key(key, now) {
            Action::Quit => true,
            Action::ToggleMonths => {
                self.view.show_months = !self.view.show_months;
                false
            }
            _ => false,
        }
    }

    /// Number of fixed ticks owed since the last call.
    fn due_ticks(&mut self, now: Instant) -> u32 {
        let mut due = 0;
        while now.saturating_duration_since(self.last_tick) >= self.tick_interval {
            if due == MAX_CATCH_UP {
                self.last_tick = now;
                break;
            }
            self.last_tick += self.tick_interval;
            due += 1;
        }
        due
    }

    fn run_tick(&mut self, input: TickInput) {
        self.game.update(input);
        for event in self.game.take_events() {
            if let Some(cue) = event.cue() {
                trace!(?cue, "audio cue");
            }
            match event {
                GameEvent::Removed { x, y, card } => {
                    debug!(x, y, card = %card, "removed");
                    if self.view.animation {
                        self.burst.push((x, y));
                    }
                }
                GameEvent::Started | GameEvent::ReturnedToTitle => self.burst.clear(),
                _ => {}
            }
        }
    }
}
