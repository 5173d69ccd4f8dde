//! Layout and drawing: title, board, sidebar, cleared banner, game over.

use crate::card::Card;
use crate::game::{Game, Phase};
use crate::grid::{HEIGHT, Pos, WIDTH};
use crate::scoring;
use crate::theme::Theme;
use crate::yaku::SpecialHand;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// One card on screen: a boxed 4x2 face.
const CARD_W: u16 = 6;
const CARD_H: u16 = 4;
/// Board in terminal cells, border included.
const BOARD_W: u16 = WIDTH as u16 * CARD_W + 2;
const BOARD_H: u16 = HEIGHT as u16 * CARD_H + 2;
const SIDEBAR_WIDTH: u16 = 22;

/// Duration of the removal burst (TachyonFX fade from highlight back to the board).
const BURST_MS: u32 = 350;

/// Short flower names shown on card faces, by month.
const FLOWERS: [&str; 12] = [
    "Pine", "Plum", "Sakr", "Wist", "Iris", "Peon", "Clov", "Susk", "Chry", "Mapl", "Wilw",
    "Paul",
];

/// Render switches owned by the shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewOptions {
    /// Month numbers instead of flower names.
    pub show_months: bool,
    pub animation: bool,
}

/// Flash over cells that were just removed. Cells are queued from game events and the
/// effect is built on the next draw, once the board rect is known.
#[derive(Default)]
pub struct RemovalBurst {
    pending: Vec<Pos>,
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl RemovalBurst {
    pub fn push(&mut self, pos: Pos) {
        self.pending.push(pos);
    }

    pub fn is_running(&self) -> bool {
        self.effect.is_some() || !self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.effect = None;
        self.last_process = None;
    }

    fn render(&mut self, frame: &mut Frame, board: Rect, theme: &Theme, now: Instant) {
        if !self.pending.is_empty() {
            let cells = card_buffer_positions(board, &self.pending);
            self.pending.clear();
            let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
                cells.contains(&(pos.x, pos.y))
            }));
            let effect = fx::fade_from(theme.title, theme.title, (BURST_MS, Interpolation::Linear))
                .with_filter(filter)
                .with_area(board);
            self.effect = Some(effect);
            self.last_process = Some(now);
        }

        let Some(effect) = self.effect.as_mut() else {
            return;
        };
        let delta = self
            .last_process
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default();
        self.last_process = Some(now);
        let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
        frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
        if effect.done() {
            self.effect = None;
            self.last_process = None;
        }
    }
}

/// Draw the screen for the current phase.
pub fn draw(
    frame: &mut Frame,
    game: &Game,
    theme: &Theme,
    view: ViewOptions,
    burst: &mut RemovalBurst,
    now: Instant,
) {
    let area = frame.area();
    match game.phase {
        Phase::Title => draw_title(frame, game, theme, area),
        Phase::Playing => {
            let (board, sidebar) = game_layout(area);
            draw_board(frame, game, theme, view, board);
            draw_sidebar(frame, game, theme, view, sidebar);
            if game.pause_active() {
                draw_cleared_banner(frame, theme, board);
            }
            if !view.animation {
                burst.clear();
            } else if burst.is_running() {
                burst.render(frame, board_inner(board), theme, now);
            }
        }
        Phase::GameOver => {
            let (board, sidebar) = game_layout(area);
            draw_board(frame, game, theme, view, board);
            draw_sidebar(frame, game, theme, view, sidebar);
            draw_game_over(frame, game, theme, area);
        }
    }
}

/// Board (with border) and sidebar, centred in `area`.
fn game_layout(area: Rect) -> (Rect, Rect) {
    let total_w = BOARD_W + SIDEBAR_WIDTH;
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(BOARD_H),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(BOARD_W),
            Constraint::Length(SIDEBAR_WIDTH),
        ])
        .split(vert[1]);
    (inner[0], inner[1])
}

fn board_inner(board: Rect) -> Rect {
    Rect {
        x: board.x + 1,
        y: board.y + 1,
        width: board.width.saturating_sub(2),
        height: board.height.saturating_sub(2),
    }
}

/// Screen rect of grid cell (x, y) inside the board's inner rect, clipped to it.
fn card_rect(inner: Rect, x: usize, y: usize) -> Rect {
    let rx = inner.x + x as u16 * CARD_W;
    let ry = inner.y + y as u16 * CARD_H;
    let rect = Rect {
        x: rx,
        y: ry,
        width: CARD_W,
        height: CARD_H,
    };
    rect.intersection(inner)
}

fn card_buffer_positions(inner: Rect, cells: &[Pos]) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for &(x, y) in cells {
        let r = card_rect(inner, x, y);
        for bx in r.x..r.x + r.width {
            for by in r.y..r.y + r.height {
                set.insert((bx, by));
            }
        }
    }
    set
}

fn draw_board(frame: &mut Frame, game: &Game, theme: &Theme, view: ViewOptions, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .style(Style::default().bg(theme.bg))
        .title(Span::styled(" Hanafuda Drop ", Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let rect = card_rect(inner, x, y);
            match game.grid.get(x as i32, y as i32) {
                Some(card) => draw_card(buf, rect, card, theme, view, BorderType::Rounded),
                None => draw_empty(buf, rect, theme),
            }
        }
    }
    if let Some(piece) = game.piece {
        if piece.y >= 0 && piece.x >= 0 {
            let rect = card_rect(inner, piece.x as usize, piece.y as usize);
            draw_card(buf, rect, piece.card, theme, view, BorderType::Double);
        }
    }
}

fn draw_empty(buf: &mut Buffer, rect: Rect, theme: &Theme) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let cx = rect.x + rect.width / 2;
    let cy = rect.y + rect.height / 2;
    buf.set_string(cx, cy, "·", Style::default().fg(theme.div_line).bg(theme.bg));
}

/// Boxed card: season-coloured frame, category glyph, flower name or month number.
fn draw_card(
    buf: &mut Buffer,
    rect: Rect,
    card: Card,
    theme: &Theme,
    view: ViewOptions,
    border: BorderType,
) {
    let frame_style = Style::default()
        .fg(theme.season_color(card.season()))
        .bg(theme.bg);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border)
        .border_style(frame_style)
        .style(Style::default().bg(theme.bg));
    let inner = block.inner(rect);
    block.render(rect, buf);

    let month_text = if view.show_months {
        card.month().to_string()
    } else {
        FLOWERS[usize::from(card.month() - 1)].to_string()
    };
    let lines = vec![
        Line::from(Span::styled(
            card.category().glyph().to_string(),
            Style::default().fg(theme.glyph_color(card)).bold(),
        )),
        Line::from(Span::styled(month_text, Style::default().fg(theme.main_fg))),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(inner, buf);
}

fn sidebar_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
}

fn draw_sidebar(frame: &mut Frame, game: &Game, theme: &Theme, view: ViewOptions, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Next (border + title + card)
            Constraint::Length(1),
            Constraint::Length(5), // Score, combo, speed
            Constraint::Length(1),
            Constraint::Length(4), // Bonus label + timer bar
        ])
        .split(area);

    // --- Next ---
    let next_block = sidebar_block(theme);
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    let next_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(CARD_H)])
        .split(next_inner);
    Paragraph::new(Line::from(Span::styled("Next", title_style)))
        .render(next_rows[0], frame.buffer_mut());
    let next_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(CARD_W), Constraint::Fill(1)])
        .split(next_rows[1]);
    draw_card(
        frame.buffer_mut(),
        next_cols[0],
        game.next,
        theme,
        view,
        BorderType::Rounded,
    );
    let mut month_info = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" Month {}", game.next.month()), fg_style)),
    ];
    if view.show_months {
        let r = game.next.sprite_region();
        let dim = Style::default().fg(theme.inactive_fg);
        month_info.push(Line::from(Span::styled(format!(" sheet {},{}", r.x, r.y), dim)));
        month_info.push(Line::from(Span::styled(
            format!(" {}x{} bank {}", r.width, r.height, r.bank),
            dim,
        )));
    }
    let month_info = Text::from(month_info);
    Paragraph::new(month_info).render(next_cols[1], frame.buffer_mut());

    // --- Stats ---
    let stats_block = sidebar_block(theme);
    let stats_inner = stats_block.inner(chunks[2]);
    stats_block.render(chunks[2], frame.buffer_mut());
    let stats = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(game.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Combo: ", title_style),
            Span::styled(game.combo.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Speed: ", title_style),
            Span::styled(format!("{} ticks", game.drop_interval), fg_style),
        ]),
    ];
    Paragraph::new(Text::from(stats)).render(stats_inner, frame.buffer_mut());

    // --- Bonus ---
    let bonus_block = sidebar_block(theme);
    let bonus_inner = bonus_block.inner(chunks[4]);
    bonus_block.render(chunks[4], frame.buffer_mut());
    let bonus_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(bonus_inner);
    let label = if game.bonus_active() && bonus_blink_on(game) {
        Span::styled(
            "BONUS x2",
            Style::default().fg(Color::Black).bg(theme.title).bold(),
        )
    } else {
        Span::styled("Bonus", Style::default().fg(theme.inactive_fg))
    };
    Paragraph::new(Line::from(label)).render(bonus_rows[0], frame.buffer_mut());
    let bonus_time = game.rules().bonus_time.max(1);
    let ratio = (f64::from(game.bonus_window) / f64::from(bonus_time)).min(1.0);
    Gauge::default()
        .ratio(ratio)
        .label("")
        .gauge_style(Style::default().fg(theme.title))
        .render(bonus_rows[1], frame.buffer_mut());
}

/// Ten blinks per bonus window length.
fn bonus_blink_on(game: &Game) -> bool {
    let period = (game.rules().bonus_time / 10).max(1);
    (game.bonus_window / period) % 2 == 0
}

fn draw_cleared_banner(frame: &mut Frame, theme: &Theme, board: Rect) {
    let text = " cleared! ";
    let w = text.len() as u16;
    let x = board.x + board.width.saturating_sub(w) / 2;
    let y = board.y + board.height / 2;
    frame.buffer_mut().set_string(
        x,
        y,
        text,
        Style::default().fg(Color::Black).bg(theme.title).bold(),
    );
}

fn popup_rect(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_title(frame: &mut Frame, game: &Game, theme: &Theme, area: Rect) {
    let fg = Style::default().fg(theme.main_fg);
    let dim = Style::default().fg(theme.inactive_fg);
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" Hanafuda ", Style::default().fg(theme.seasons[0]).bold()),
            Span::styled(" Drop ", Style::default().fg(theme.main_fg).bold()),
        ]),
        Line::from(""),
        Line::from(Span::styled("Connect 3+ cards of the same month", fg)),
        Line::from(Span::styled("or complete a yaku anywhere on the board.", fg)),
        Line::from(""),
        Line::from(Span::styled("Yaku", Style::default().fg(theme.title))),
    ];
    for hand in SpecialHand::ALL {
        lines.push(Line::from(Span::styled(
            format!("{:<14}{:<22}{:>5}", hand.name(), hand.label(), hand.bonus()),
            fg,
        )));
    }
    lines.extend([
        Line::from(Span::styled("A yaku doubles all points for 5 s.", dim)),
        Line::from(""),
        Line::from(Span::styled("Left/Right h/l  move    Down/j  fast drop", fg)),
        Line::from(Span::styled("d  months    Enter  start / give up", fg)),
        Line::from(""),
    ]);
    if game.score > 0 {
        lines.push(Line::from(Span::styled(
            format!("Last score: {}", game.score),
            Style::default().fg(theme.title),
        )));
    }
    lines.push(Line::from(Span::styled("Enter: start    Q: quit", fg)));

    let popup = popup_rect(area, 50, lines.len() as u16 + 2);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, game: &Game, theme: &Theme, area: Rect) {
    let fg = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", game.score), fg)),
        Line::from(Span::styled(format!(" Combo: {} ", game.combo), fg)),
    ];
    for praise in scoring::rating(game.score, game.combo) {
        lines.push(Line::from(Span::styled(
            praise,
            Style::default().fg(theme.title).bold(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Enter: title    Q: quit ", fg)));
    lines.push(Line::from(""));

    let popup = popup_rect(area, 30, lines.len() as u16 + 2);
    for y in popup.y..popup.y + popup.height {
        for x in popup.x..popup.x + popup.width {
            frame.buffer_mut()[(x, y)].set_style(Style::default().bg(theme.bg));
            frame.buffer_mut()[(x, y)].set_symbol(" ");
        }
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Rules;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(game: &Game, view: ViewOptions, burst: &mut RemovalBurst) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|f| draw(f, game, &theme, view, burst, Instant::now()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn playing() -> Game {
        let mut game = Game::new(Rules::default(), Some(3));
        game.start();
        game
    }

    #[test]
    fn test_title_lists_yaku_and_controls() {
        let game = Game::new(Rules::default(), Some(1));
        let text = render(&game, ViewOptions::default(), &mut RemovalBurst::default());
        assert!(text.contains("Hanafuda"));
        assert!(text.contains("Goko"));
        assert!(text.contains("3000"));
        assert!(text.contains("Akatan"));
        assert!(text.contains("Enter: start"));
        assert!(!text.contains("Last score"));
    }

    #[test]
    fn test_title_shows_last_score_after_a_run() {
        let mut game = Game::new(Rules::default(), Some(1));
        game.score = 4200;
        let text = render(&game, ViewOptions::default(), &mut RemovalBurst::default());
        assert!(text.contains("Last score: 4200"));
    }

    #[test]
    fn test_board_shows_cards_and_sidebar() {
        let mut game = playing();
        game.grid.set(0, 5, Card::of(2, 4).unwrap());
        game.score = 1234;
        let text = render(&game, ViewOptions::default(), &mut RemovalBurst::default());
        assert!(text.contains("Plum"));
        assert!(text.contains("Next"));
        assert!(text.contains(&format!("Month {}", game.next.month())));
        assert!(text.contains("Score: 1234"));
        assert!(text.contains("Combo: 0"));
    }

    #[test]
    fn test_month_overlay_replaces_flower_names() {
        let mut game = playing();
        game.grid.set(0, 5, Card::of(2, 4).unwrap());
        let view = ViewOptions {
            show_months: true,
            animation: false,
        };
        let text = render(&game, view, &mut RemovalBurst::default());
        assert!(!text.contains("Plum"));
        assert!(FLOWERS.iter().all(|name| !text.contains(name)));
    }

    #[test]
    fn test_month_overlay_shows_next_card_sheet_slot() {
        let game = playing();
        let r = game.next.sprite_region();
        let slot = format!("sheet {},{}", r.x, r.y);
        let text = render(&game, ViewOptions::default(), &mut RemovalBurst::default());
        assert!(!text.contains(&slot));

        let view = ViewOptions {
            show_months: true,
            animation: false,
        };
        let text = render(&game, view, &mut RemovalBurst::default());
        assert!(text.contains(&slot));
        assert!(text.contains("20x32 bank 0"));
    }

    #[test]
    fn test_cleared_banner_during_pause() {
        let mut game = playing();
        let text = render(&game, ViewOptions::default(), &mut RemovalBurst::default());
        assert!(!text.contains("cleared!"));
        game.pause_window = 10;
        let text = render(&game, ViewOptions::default(), &mut RemovalBurst::default());
        assert!(text.contains("cleared!"));
    }

    #[test]
    fn test_bonus_indicator_blinks() {
        let mut game = playing();
        let text = render(&game, ViewOptions::default(), &mut RemovalBurst::default());
        assert!(!text.contains("BONUS x2"));

        let period = game.rules().bonus_time / 10;
        game.bonus_window = game.rules().bonus_time;
        let text = render(&game, ViewOptions::default(), &mut RemovalBurst::default());
        assert!(text.contains("BONUS x2"));
        game.bonus_window = game.rules().bonus_time - period;
        let text = render(&game, ViewOptions::default(), &mut RemovalBurst::default());
        assert!(!text.contains("BONUS x2"));
    }

    #[test]
    fn test_game_over_shows_score_and_rating() {
        let mut game = playing();
        game.phase = Phase::GameOver;
        game.score = 5200;
        game.combo = 11;
        let text = render(&game, ViewOptions::default(), &mut RemovalBurst::default());
        assert!(text.contains("Game Over"));
        assert!(text.contains("Score: 5200"));
        assert!(text.contains("Excellent!"));
        assert!(text.contains("Combo Master!"));
    }

    #[test]
    fn test_removal_burst_starts_on_draw() {
        let game = playing();
        let mut burst = RemovalBurst::default();
        burst.push((0, 5));
        burst.push((1, 5));
        let view = ViewOptions {
            show_months: false,
            animation: true,
        };
        render(&game, view, &mut burst);
        assert!(burst.pending.is_empty());
        assert!(burst.is_running());
    }

    #[test]
    fn test_burst_dropped_without_animation() {
        let game = playing();
        let mut burst = RemovalBurst::default();
        burst.push((0, 5));
        render(&game, ViewOptions::default(), &mut burst);
        assert!(!burst.is_running());
    }

    #[test]
    fn test_card_rects_tile_the_board() {
        let inner = board_inner(Rect::new(0, 0, BOARD_W, BOARD_H));
        assert_eq!(card_rect(inner, 0, 0), Rect::new(1, 1, CARD_W, CARD_H));
        let last = card_rect(inner, WIDTH - 1, HEIGHT - 1);
        assert_eq!(last.x + last.width, BOARD_W - 1);
        assert_eq!(last.y + last.height, BOARD_H - 1);
        assert_eq!(card_buffer_positions(inner, &[(2, 3)]).len(), 24);
    }
}
