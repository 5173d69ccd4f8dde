//! Special hands (yaku) evaluated over the whole board each cascade pass.
//!
//! Each month's first card stands in for that month's Light. The light hands form an
//! ordered table where only the first satisfied rule fires; the viewing hands and the
//! ribbon hands are independent and may all fire together with it.

use crate::card::{Card, Category, LIGHT_MONTHS, RibbonColor};
use crate::grid::{Grid, Pos};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialHand {
    FiveLights,
    RainyFourLights,
    FourLights,
    ThreeLights,
    BoarDeerButterfly,
    FlowerViewing,
    MoonViewing,
    BlueRibbons,
    RedRibbons,
}

impl SpecialHand {
    /// Every hand, in evaluation order.
    pub const ALL: [SpecialHand; 9] = [
        Self::FiveLights,
        Self::RainyFourLights,
        Self::FourLights,
        Self::ThreeLights,
        Self::BoarDeerButterfly,
        Self::FlowerViewing,
        Self::MoonViewing,
        Self::BlueRibbons,
        Self::RedRibbons,
    ];

    pub fn bonus(self) -> u64 {
        match self {
            Self::FiveLights => 3000,
            Self::RainyFourLights => 1500,
            Self::FourLights => 1200,
            Self::ThreeLights => 800,
            Self::BoarDeerButterfly => 1000,
            Self::FlowerViewing | Self::MoonViewing => 400,
            Self::BlueRibbons | Self::RedRibbons => 500,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::FiveLights => "Goko",
            Self::RainyFourLights => "Ame-Shiko",
            Self::FourLights => "Shiko",
            Self::ThreeLights => "Sanko",
            Self::BoarDeerButterfly => "Ino-Shika-Cho",
            Self::FlowerViewing => "Hanami-zake",
            Self::MoonViewing => "Tsukimi-zake",
            Self::BlueRibbons => "Aotan",
            Self::RedRibbons => "Akatan",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FiveLights => "five lights",
            Self::RainyFourLights => "rainy four lights",
            Self::FourLights => "four lights",
            Self::ThreeLights => "three lights",
            Self::BoarDeerButterfly => "boar, deer, butterfly",
            Self::FlowerViewing => "flower viewing",
            Self::MoonViewing => "moon viewing",
            Self::BlueRibbons => "blue ribbons",
            Self::RedRibbons => "red ribbons",
        }
    }
}

/// Positions of every month's first card on the board, indexed by month - 1.
#[derive(Debug, Default)]
struct FirstCards {
    by_month: [Vec<Pos>; 12],
}

impl FirstCards {
    fn scan(grid: &Grid) -> Self {
        let mut first = Self::default();
        for (pos, card) in grid.cards() {
            if card.position_in_month() == 1 {
                first.by_month[usize::from(card.month() - 1)].push(pos);
            }
        }
        first
    }

    fn present(&self, month: u8) -> bool {
        !self.by_month[usize::from(month - 1)].is_empty()
    }

    fn all_present(&self, months: &[u8]) -> bool {
        months.iter().all(|&m| self.present(m))
    }

    /// Number of cards across `months` (duplicates count).
    fn count(&self, months: &[u8]) -> usize {
        months
            .iter()
            .map(|&m| self.by_month[usize::from(m - 1)].len())
            .sum()
    }

    fn positions<'a>(&'a self, months: &'a [u8]) -> impl Iterator<Item = Pos> + 'a {
        months
            .iter()
            .flat_map(|&m| self.by_month[usize::from(m - 1)].iter().copied())
    }
}

const RAIN_MONTH: u8 = 11;

/// Light hands in priority order.
const LIGHT_RULES: [(SpecialHand, fn(&FirstCards) -> bool); 4] = [
    (SpecialHand::FiveLights, |f| f.all_present(&LIGHT_MONTHS)),
    (SpecialHand::RainyFourLights, |f| {
        f.present(RAIN_MONTH) && f.count(&LIGHT_MONTHS) >= 4
    }),
    (SpecialHand::FourLights, |f| f.count(&LIGHT_MONTHS) >= 4),
    (SpecialHand::ThreeLights, |f| f.count(&LIGHT_MONTHS) >= 3),
];

/// Hands that need one first card from each listed month.
const MONTH_SET_RULES: [(SpecialHand, &[u8]); 3] = [
    (SpecialHand::BoarDeerButterfly, &[6, 7, 10]),
    (SpecialHand::FlowerViewing, &[3, 9]),
    (SpecialHand::MoonViewing, &[8, 9]),
];

const RIBBON_RULES: [(SpecialHand, RibbonColor); 2] = [
    (SpecialHand::BlueRibbons, RibbonColor::Blue),
    (SpecialHand::RedRibbons, RibbonColor::Red),
];

/// Ribbons of one colour needed for a ribbon hand.
const RIBBON_SET: usize = 3;

/// Result of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandsFound {
    /// Fired hands: at most one light hand first, then the independent ones.
    pub hands: Vec<SpecialHand>,
    /// Union of every fired hand's cards, row-major, no duplicates.
    pub cells: Vec<Pos>,
}

impl HandsFound {
    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }

    pub fn bonus(&self) -> u64 {
        self.hands.iter().map(|h| h.bonus()).sum()
    }

    fn fire(&mut self, hand: SpecialHand, cells: impl IntoIterator<Item = Pos>) {
        self.hands.push(hand);
        self.cells.extend(cells);
    }
}

/// Evaluate every special hand against the current board.
pub fn evaluate(grid: &Grid) -> HandsFound {
    let first = FirstCards::scan(grid);
    let mut found = HandsFound::default();

    if let Some((hand, _)) = LIGHT_RULES.iter().find(|(_, test)| test(&first)) {
        found.fire(*hand, first.positions(&LIGHT_MONTHS));
    }

    for (hand, months) in MONTH_SET_RULES {
        if first.all_present(months) {
            found.fire(hand, first.positions(months));
        }
    }

    for (hand, color) in RIBBON_RULES {
        let ribbons: Vec<Pos> = grid
            .cards()
            .filter(|(_, card)| is_ribbon_of(*card, color))
            .map(|(pos, _)| pos)
            .collect();
        if ribbons.len() >= RIBBON_SET {
            found.fire(hand, ribbons);
        }
    }

    found.cells.sort_unstable_by_key(|&(x, y)| (y, x));
    found.cells.dedup();
    found
}

fn is_ribbon_of(card: Card, color: RibbonColor) -> bool {
    card.category() == Category::Ribbon && card.ribbon_color() == color
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light(month: u8) -> Card {
        Card::of(month, 1).unwrap()
    }

    /// Place cards on the bottom row, left to right.
    fn bottom_row(cards: &[Card]) -> Grid {
        let mut grid = Grid::new();
        for (x, card) in cards.iter().enumerate() {
            grid.set(x as i32, 5, *card);
        }
        grid
    }

    #[test]
    fn test_nothing_on_empty_board() {
        let found = evaluate(&Grid::new());
        assert!(found.is_empty());
        assert_eq!(found.bonus(), 0);
    }

    #[test]
    fn test_five_lights_outranks_lesser_light_hands() {
        let grid = bottom_row(&[light(1), light(3), light(8), light(11), light(12)]);
        let found = evaluate(&grid);
        assert_eq!(found.hands, vec![SpecialHand::FiveLights]);
        assert_eq!(found.bonus(), 3000);
        assert_eq!(found.cells, vec![(0, 5), (1, 5), (2, 5), (3, 5), (4, 5)]);
    }

    #[test]
    fn test_rainy_four_needs_the_rain_man() {
        let grid = bottom_row(&[light(1), light(3), light(11), light(12)]);
        assert_eq!(evaluate(&grid).hands, vec![SpecialHand::RainyFourLights]);

        let grid = bottom_row(&[light(1), light(3), light(8), light(12)]);
        assert_eq!(evaluate(&grid).hands, vec![SpecialHand::FourLights]);
    }

    #[test]
    fn test_rain_without_four_falls_through_to_three_lights() {
        let grid = bottom_row(&[light(1), light(8), light(12)]);
        assert_eq!(evaluate(&grid).hands, vec![SpecialHand::ThreeLights]);
        let grid = bottom_row(&[light(1), light(11), light(12)]);
        assert_eq!(evaluate(&grid).hands, vec![SpecialHand::ThreeLights]);
    }

    #[test]
    fn test_duplicate_lights_count_toward_totals() {
        let grid = bottom_row(&[light(1), light(1), light(1), light(8)]);
        let found = evaluate(&grid);
        assert_eq!(found.hands, vec![SpecialHand::FourLights]);
        assert_eq!(found.cells.len(), 4);
    }

    #[test]
    fn test_secondary_hands_stack_with_primary() {
        // Five lights + sake cup (9-1): flower viewing and moon viewing both fire too.
        let grid = bottom_row(&[
            light(1),
            light(3),
            light(8),
            light(11),
            light(12),
            light(9),
        ]);
        let found = evaluate(&grid);
        assert_eq!(
            found.hands,
            vec![
                SpecialHand::FiveLights,
                SpecialHand::FlowerViewing,
                SpecialHand::MoonViewing
            ]
        );
        assert_eq!(found.bonus(), 3800);
        // 3-1 and 8-1 are shared, cells still listed once.
        assert_eq!(found.cells.len(), 6);
    }

    #[test]
    fn test_boar_deer_butterfly() {
        let grid = bottom_row(&[light(6), light(7), light(10)]);
        let found = evaluate(&grid);
        assert_eq!(found.hands, vec![SpecialHand::BoarDeerButterfly]);
        assert_eq!(found.bonus(), 1000);

        let grid = bottom_row(&[light(6), light(7)]);
        assert!(evaluate(&grid).is_empty());
    }

    #[test]
    fn test_ribbon_hands() {
        let ribbon = |m| Card::of(m, 2).unwrap();
        let grid = bottom_row(&[ribbon(6), ribbon(9), ribbon(10), ribbon(1), ribbon(2)]);
        let found = evaluate(&grid);
        assert_eq!(found.hands, vec![SpecialHand::BlueRibbons]);
        assert_eq!(found.cells, vec![(0, 5), (1, 5), (2, 5)]);

        let grid = bottom_row(&[ribbon(1), ribbon(2), ribbon(3), ribbon(4)]);
        let found = evaluate(&grid);
        assert_eq!(found.hands, vec![SpecialHand::RedRibbons]);
        assert_eq!(found.bonus(), 500);
    }

    #[test]
    fn test_hands_found_anywhere_on_board() {
        let mut grid = Grid::new();
        grid.set(0, 0, light(3));
        grid.set(7, 5, light(9));
        let found = evaluate(&grid);
        assert_eq!(found.hands, vec![SpecialHand::FlowerViewing]);
        assert_eq!(found.cells, vec![(0, 0), (7, 5)]);
    }
}
