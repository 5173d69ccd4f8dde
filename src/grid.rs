//! Playfield grid and column gravity.

use crate::card::Card;

/// Board width in cards.
pub const WIDTH: usize = 8;
/// Board height in cards.
pub const HEIGHT: usize = 6;

/// Board coordinate `(x, y)`, y = 0 is the top row.
pub type Pos = (usize, usize);

/// Fixed 8×6 matrix of optional cards. rows[y][x]; rows[0] is top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: [[Option<Card>; WIDTH]; HEIGHT],
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_inside(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < WIDTH && (y as usize) < HEIGHT
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Card> {
        if !self.is_inside(x, y) {
            return None;
        }
        self.rows[y as usize][x as usize]
    }

    #[inline]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some()
    }

    /// Write a card; outside the board this is a no-op.
    pub fn set(&mut self, x: i32, y: i32, card: Card) {
        if self.is_inside(x, y) {
            self.rows[y as usize][x as usize] = Some(card);
        }
    }

    /// Empty a cell and return what was there.
    pub fn clear(&mut self, x: i32, y: i32) -> Option<Card> {
        if !self.is_inside(x, y) {
            return None;
        }
        self.rows[y as usize][x as usize].take()
    }

    /// True if a falling card may sit at (x, y). Rows above the board are always free.
    pub fn can_occupy(&self, x: i32, y: i32) -> bool {
        if x < 0 || x as usize >= WIDTH || y >= HEIGHT as i32 {
            return false;
        }
        if y < 0 {
            return true;
        }
        !self.is_occupied(x, y)
    }

    /// Occupied cells in row-major order.
    pub fn cards(&self) -> impl Iterator<Item = (Pos, Card)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(x, cell)| cell.map(|card| ((x, y), card)))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.cards().count()
    }

    /// Pack every column downward, keeping the relative order of its cards.
    /// Returns true if any card moved.
    pub fn apply_gravity(&mut self) -> bool {
        let mut moved = false;
        for x in 0..WIDTH {
            let mut write_y = HEIGHT;
            for read_y in (0..HEIGHT).rev() {
                if let Some(card) = self.rows[read_y][x] {
                    write_y -= 1;
                    if write_y != read_y {
                        self.rows[write_y][x] = Some(card);
                        self.rows[read_y][x] = None;
                        moved = true;
                    }
                }
            }
        }
        moved
    }

    /// Build a grid from rows of card ids (0 = empty); short rows and extra rows are ignored.
    #[cfg(test)]
    pub fn from_ids(rows: &[[u8; WIDTH]]) -> Self {
        let mut grid = Self::new();
        for (y, row) in rows.iter().enumerate().take(HEIGHT) {
            for (x, &id) in row.iter().enumerate() {
                if let Some(card) = Card::new(id) {
                    grid.set(x as i32, y as i32, card);
                }
            }
        }
        grid
    }
}
