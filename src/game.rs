//! Game state: phase machine, falling card, landing and the removal cascade.

use crate::card::Card;
use crate::grid::{Grid, Pos, WIDTH};
use crate::matcher;
use crate::scoring::{self, DropCurve};
use crate::yaku::{self, SpecialHand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Column where every card spawns.
pub const SPAWN_X: i32 = (WIDTH / 2) as i32;

/// Logic rate the default timers are expressed in.
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Timer lengths in ticks plus the fall-speed curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// Wait after a landing before the next card appears (0.5 s).
    pub spawn_delay: u32,
    /// Input/drop freeze after a landing that removed cards (1 s).
    pub pause: u32,
    /// Bonus window added per pass that fired a special hand (5 s).
    pub bonus_time: u32,
    pub drop: DropCurve,
}

impl Default for Rules {
    fn default() -> Self {
        Self::at_tick_rate(DEFAULT_TICK_RATE)
    }
}

impl Rules {
    pub fn at_tick_rate(hz: u32) -> Self {
        let hz = hz.max(1);
        Self {
            spawn_delay: (hz / 2).max(1),
            pause: hz,
            bonus_time: hz.saturating_mul(5),
            drop: DropCurve::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Title,
    Playing,
    GameOver,
}

/// The card under player control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallingPiece {
    pub card: Card,
    pub x: i32,
    pub y: i32,
}

/// Input sampled for one tick. Moves and confirm are edge-triggered; fast drop is held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub fast_drop: bool,
    pub confirm: bool,
}

/// Sound requests for whoever plays audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Land,
    Clear,
    GameOver,
}

/// Something that happened during `update`, for the audio/effect sinks and the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    Landed { card: Card, x: i32, y: i32 },
    /// One cascade pass removed `cells` cards and scored `points` for groups;
    /// `remaining` cards were left on the board.
    Cleared {
        pass: u32,
        cells: usize,
        points: u64,
        remaining: usize,
    },
    /// One removed card; the hook for particle effects.
    Removed { x: usize, y: usize, card: Card },
    SpecialHand { hand: SpecialHand, bonus: u64 },
    GameOver { score: u64, combo: u32 },
    ReturnedToTitle,
}

impl GameEvent {
    pub fn cue(&self) -> Option<Cue> {
        match self {
            Self::Landed { .. } => Some(Cue::Land),
            Self::Cleared { .. } => Some(Cue::Clear),
            Self::GameOver { .. } => Some(Cue::GameOver),
            _ => None,
        }
    }
}

/// Totals of one landing episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub passes: u32,
    pub removed: usize,
}

#[derive(Debug)]
pub struct Game {
    pub phase: Phase,
    pub grid: Grid,
    pub piece: Option<FallingPiece>,
    pub next: Card,
    pub score: u64,
    /// Consecutive landings that removed something.
    pub combo: u32,
    /// Ticks left of doubled scoring.
    pub bonus_window: u32,
    /// Ticks left of the post-clear freeze.
    pub pause_window: u32,
    /// Ticks until the next card appears.
    pub spawn_delay: u32,
    /// Ticks per automatic one-row step at the current score.
    pub drop_interval: u32,
    drop_timer: u32,
    rules: Rules,
    rng: StdRng,
    events: Vec<GameEvent>,
}

impl Game {
    /// New game on the title screen. `seed` makes the card sequence reproducible.
    pub fn new(rules: Rules, seed: Option<u64>) -> Self {
        let mut rng = seed
            .map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_os_rng);
        let next = Card::random(&mut rng);
        Self {
            phase: Phase::Title,
            grid: Grid::new(),
            piece: None,
            next,
            score: 0,
            combo: 0,
            bonus_window: 0,
            pause_window: 0,
            spawn_delay: 0,
            drop_interval: rules.drop.interval(0),
            drop_timer: 0,
            rules,
            rng,
            events: Vec::new(),
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    #[inline]
    pub fn bonus_active(&self) -> bool {
        self.bonus_window > 0
    }

    /// True while the "cleared!" banner should show.
    #[inline]
    pub fn pause_active(&self) -> bool {
        self.pause_window > 0
    }

    /// Hand out everything recorded since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance one fixed tick.
    pub fn update(&mut self, input: TickInput) {
        match self.phase {
            Phase::Title => {
                if input.confirm {
                    self.start();
                }
            }
            Phase::Playing => self.update_playing(input),
            Phase::GameOver => {
                if input.confirm {
                    self.return_to_title();
                }
            }
        }
    }

    /// Reset everything and put the first card in play.
    pub fn start(&mut self) {
        self.reset_run();
        self.phase = Phase::Playing;
        self.next = Card::random(&mut self.rng);
        self.events.push(GameEvent::Started);
        info!("episode started");
        self.spawn();
    }

    fn reset_run(&mut self) {
        self.grid = Grid::new();
        self.piece = None;
        self.score = 0;
        self.combo = 0;
        self.bonus_window = 0;
        self.pause_window = 0;
        self.spawn_delay = 0;
        self.drop_timer = 0;
        self.drop_interval = self.rules.drop.interval(0);
    }

    /// GameOver → Title. The final score and combo stay visible until the next start.
    fn return_to_title(&mut self) {
        self.phase = Phase::Title;
        self.piece = None;
        self.events.push(GameEvent::ReturnedToTitle);
        info!(score = self.score, "returned to title");
    }

    /// Confirm during play drops the run and goes back to the title.
    fn abandon(&mut self) {
        info!(score = self.score, "run abandoned");
        self.reset_run();
        self.phase = Phase::Title;
        self.events.push(GameEvent::ReturnedToTitle);
    }

    fn update_playing(&mut self, input: TickInput) {
        self.bonus_window = self.bonus_window.saturating_sub(1);
        self.pause_window = self.pause_window.saturating_sub(1);
        if self.spawn_delay > 0 {
            self.spawn_delay -= 1;
            if self.spawn_delay == 0 && self.piece.is_none() {
                self.spawn();
                if self.phase != Phase::Playing {
                    return;
                }
            }
        }

        if self.pause_window == 0 && self.spawn_delay == 0 {
            self.handle_input(input);
            if self.phase != Phase::Playing {
                return;
            }
            self.drop_timer += 1;
            if self.drop_timer >= self.drop_interval {
                self.step_down();
                self.drop_timer = 0;
            }
        }

        self.drop_interval = self.rules.drop.interval(self.score);
    }

    fn handle_input(&mut self, input: TickInput) {
        if input.move_left {
            self.shift(-1);
        }
        if input.move_right {
            self.shift(1);
        }
        if input.fast_drop {
            self.drop_timer = self.drop_interval;
        }
        if input.confirm {
            self.abandon();
        }
    }

    fn shift(&mut self, dx: i32) {
        if let Some(piece) = self.piece.as_mut() {
            if self.grid.can_occupy(piece.x + dx, piece.y) {
                piece.x += dx;
            }
        }
    }

    /// Promote the preview card to the falling piece, or end the game if the spawn cell is taken.
    fn spawn(&mut self) {
        let card = self.next;
        self.next = Card::random(&mut self.rng);
        self.drop_timer = 0;
        if self.grid.is_occupied(SPAWN_X, 0) {
            self.piece = None;
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver {
                score: self.score,
                combo: self.combo,
            });
            info!(
                score = self.score,
                combo = self.combo,
                cards = self.grid.occupied_count(),
                "game over"
            );
            return;
        }
        self.piece = Some(FallingPiece {
            card,
            x: SPAWN_X,
            y: 0,
        });
    }

    /// Move down one row, or land when the cell below is blocked.
    fn step_down(&mut self) {
        let Some(piece) = self.piece.as_mut() else {
            return;
        };
        if self.grid.can_occupy(piece.x, piece.y + 1) {
            piece.y += 1;
        } else {
            self.land();
        }
    }

    fn land(&mut self) {
        let Some(piece) = self.piece.take() else {
            return;
        };
        self.grid.set(piece.x, piece.y, piece.card);
        self.events.push(GameEvent::Landed {
            card: piece.card,
            x: piece.x,
            y: piece.y,
        });
        debug!(
            card = %piece.card,
            id = piece.card.id(),
            x = piece.x,
            y = piece.y,
            "landed"
        );

        let report = self.cascade();
        self.spawn_delay = self.rules.spawn_delay;
        if report.removed > 0 {
            self.combo += 1;
            self.pause_window = self.rules.pause;
        } else {
            self.combo = 0;
        }
    }

    /// Remove, score and compact until a pass finds nothing. Every pass that continues
    /// removes at least one card, so this ends within `WIDTH * HEIGHT` passes.
    fn cascade(&mut self) -> CascadeReport {
        let mut report = CascadeReport::default();
        let mut combo_multiplier: u64 = 1;

        loop {
            let groups = matcher::find_groups(&self.grid);
            let hands = yaku::evaluate(&self.grid);

            if !hands.is_empty() {
                self.score = self
                    .score
                    .saturating_add(scoring::special_score(hands.bonus(), self.bonus_window));
                self.bonus_window = self.bonus_window.saturating_add(self.rules.bonus_time);
                for &hand in &hands.hands {
                    debug!(hand = hand.name(), bonus = hand.bonus(), "special hand");
                    self.events.push(GameEvent::SpecialHand {
                        hand,
                        bonus: hand.bonus(),
                    });
                }
            }

            let mut doomed: Vec<Pos> = groups.iter().flatten().copied().collect();
            doomed.extend_from_slice(&hands.cells);
            doomed.sort_unstable_by_key(|&(x, y)| (y, x));
            doomed.dedup();
            if doomed.is_empty() {
                break;
            }

            let sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
            let points = scoring::pass_score(&sizes, combo_multiplier, self.bonus_window);
            self.score = self.score.saturating_add(points);

            for &(x, y) in &doomed {
                if let Some(card) = self.grid.clear(x as i32, y as i32) {
                    self.events.push(GameEvent::Removed { x, y, card });
                }
            }
            let remaining = self.grid.occupied_count();
            self.events.push(GameEvent::Cleared {
                pass: report.passes,
                cells: doomed.len(),
                points,
                remaining,
            });
            debug!(
                pass = report.passes,
                cells = doomed.len(),
                points,
                remaining,
                multiplier = combo_multiplier,
                "cascade pass"
            );

            self.grid.apply_gravity();
            report.passes += 1;
            report.removed += doomed.len();
            combo_multiplier = combo_multiplier.saturating_mul(2);
        }
        report
    }
}
