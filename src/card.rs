//! Card catalog: the 48-card hanafuda deck, 12 months of 4 cards each.
//!
//! A card is identified by `1..=48`; every attribute (month, category, ribbon colour)
//! is derived from the identifier, so the catalog carries no state.

use rand::Rng;
use std::fmt;

/// Number of cards in the deck.
pub const DECK_SIZE: u8 = 48;
/// Cards per month.
pub const CARDS_PER_MONTH: u8 = 4;

/// Sprite cell size on the card sheet (pixels).
pub const SPRITE_WIDTH: u16 = 20;
pub const SPRITE_HEIGHT: u16 = 32;

/// Months whose first card is a Light.
pub const LIGHT_MONTHS: [u8; 5] = [1, 3, 8, 11, 12];
/// Months whose ribbon is a red poetry ribbon.
const RED_RIBBON_MONTHS: [u8; 3] = [1, 2, 3];
/// Months whose ribbon is blue.
const BLUE_RIBBON_MONTHS: [u8; 3] = [6, 9, 10];

/// Card category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Light,
    Ribbon,
    Seed,
    Chaff,
}

impl Category {
    /// One-letter glyph used by the board renderer.
    pub fn glyph(self) -> char {
        match self {
            Self::Light => 'L',
            Self::Ribbon => 'R',
            Self::Seed => 'S',
            Self::Chaff => 'c',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RibbonColor {
    Red,
    Blue,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

/// Region of the card sprite sheet: (bank, x, y, width, height).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRegion {
    pub bank: u8,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// A card identifier in `1..=48`. Construction is checked, so a `Card` is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card(u8);

impl Card {
    #[cfg(test)]
    pub fn new(id: u8) -> Option<Self> {
        (1..=DECK_SIZE).contains(&id).then_some(Self(id))
    }

    /// Card at `position` (1..=4) of `month` (1..=12).
    #[cfg(test)]
    pub fn of(month: u8, position: u8) -> Option<Self> {
        if !(1..=12).contains(&month) || !(1..=CARDS_PER_MONTH).contains(&position) {
            return None;
        }
        Self::new((month - 1) * CARDS_PER_MONTH + position)
    }

    /// Uniformly random card from the whole deck.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.random_range(1..=DECK_SIZE))
    }

    #[inline]
    pub fn id(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn month(self) -> u8 {
        (self.0 - 1) / CARDS_PER_MONTH + 1
    }

    #[inline]
    pub fn position_in_month(self) -> u8 {
        (self.0 - 1) % CARDS_PER_MONTH + 1
    }

    pub fn category(self) -> Category {
        match self.position_in_month() {
            1 if LIGHT_MONTHS.contains(&self.month()) => Category::Light,
            2 => Category::Ribbon,
            3 => Category::Seed,
            _ => Category::Chaff,
        }
    }

    pub fn ribbon_color(self) -> RibbonColor {
        if self.category() != Category::Ribbon {
            return RibbonColor::None;
        }
        let month = self.month();
        if RED_RIBBON_MONTHS.contains(&month) {
            RibbonColor::Red
        } else if BLUE_RIBBON_MONTHS.contains(&month) {
            RibbonColor::Blue
        } else {
            RibbonColor::None
        }
    }

    pub fn season(self) -> Season {
        match self.month() {
            1..=3 => Season::Spring,
            4..=6 => Season::Summer,
            7..=9 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    /// Where this card's image sits on the sheet. Two months per sheet row, four cards each.
    /// Pixel renderers blit from it; the sidebar prints it for the next card under the
    /// month overlay.
    pub fn sprite_region(self) -> SpriteRegion {
        let month = u16::from(self.month());
        let position = u16::from(self.position_in_month());
        let column_block = ((month - 1) % 2) * 4;
        let row = (month - 1) / 2;
        SpriteRegion {
            bank: 0,
            x: (column_block + position - 1) * SPRITE_WIDTH,
            y: row * SPRITE_HEIGHT,
            width: SPRITE_WIDTH,
            height: SPRITE_HEIGHT,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.month(), self.position_in_month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: u8) -> Card {
        Card::new(id).unwrap()
    }

    #[test]
    fn test_rejects_out_of_range_ids() {
        assert!(Card::new(0).is_none());
        assert!(Card::new(49).is_none());
        assert!(Card::new(1).is_some());
        assert!(Card::new(48).is_some());
    }

    #[test]
    fn test_month_and_position() {
        assert_eq!(card(1).month(), 1);
        assert_eq!(card(4).month(), 1);
        assert_eq!(card(5).month(), 2);
        assert_eq!(card(48).month(), 12);
        assert_eq!(card(48).position_in_month(), 4);
        assert_eq!(card(33).position_in_month(), 1);
        assert_eq!(Card::of(9, 1), Some(card(33)));
        assert_eq!(Card::of(13, 1), None);
    }

    #[test]
    fn test_lights_are_first_cards_of_light_months_only() {
        let lights: Vec<u8> = (1..=DECK_SIZE)
            .filter(|&id| card(id).category() == Category::Light)
            .map(|id| card(id).month())
            .collect();
        assert_eq!(lights, LIGHT_MONTHS.to_vec());
        // First card of a non-light month is chaff.
        assert_eq!(Card::of(6, 1).unwrap().category(), Category::Chaff);
        assert_eq!(Card::of(6, 2).unwrap().category(), Category::Ribbon);
        assert_eq!(Card::of(6, 3).unwrap().category(), Category::Seed);
        assert_eq!(Card::of(6, 4).unwrap().category(), Category::Chaff);
    }

    #[test]
    fn test_ribbon_colors() {
        for month in 1..=12 {
            let ribbon = Card::of(month, 2).unwrap();
            let expected = match month {
                1..=3 => RibbonColor::Red,
                6 | 9 | 10 => RibbonColor::Blue,
                _ => RibbonColor::None,
            };
            assert_eq!(ribbon.ribbon_color(), expected, "month {month}");
            assert_eq!(Card::of(month, 3).unwrap().ribbon_color(), RibbonColor::None);
        }
    }

    #[test]
    fn test_sprite_region_layout() {
        let r = card(1).sprite_region();
        assert_eq!((r.bank, r.x, r.y, r.width, r.height), (0, 0, 0, 20, 32));
        // 2nd month, 1st card: right half of the first sheet row.
        assert_eq!(card(5).sprite_region().x, 80);
        assert_eq!(card(5).sprite_region().y, 0);
        // 3rd month, 2nd card.
        let r = Card::of(3, 2).unwrap().sprite_region();
        assert_eq!((r.x, r.y), (20, 32));
        // 12th month, 4th card.
        let r = card(48).sprite_region();
        assert_eq!((r.x, r.y), (140, 160));
    }

    #[test]
    fn test_random_cards_stay_in_deck() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let c = Card::random(&mut rng);
            assert!((1..=DECK_SIZE).contains(&c.id()));
        }
    }

    #[test]
    fn test_seasons() {
        assert_eq!(Card::of(3, 1).unwrap().season(), Season::Spring);
        assert_eq!(Card::of(4, 1).unwrap().season(), Season::Summer);
        assert_eq!(Card::of(9, 4).unwrap().season(), Season::Autumn);
        assert_eq!(Card::of(12, 1).unwrap().season(), Season::Winter);
    }
}
