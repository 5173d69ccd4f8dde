//! Points for removed groups, multipliers, fall speed and end-of-game rating.

/// Points for one same-month group of `size` cards.
pub fn group_points(size: usize) -> u64 {
    match size {
        0..=2 => 0,
        3 => 100,
        4 => 200,
        _ => 300,
    }
}

/// 2× while the bonus window is running.
#[inline]
pub fn bonus_multiplier(bonus_window: u32) -> u64 {
    if bonus_window > 0 { 2 } else { 1 }
}

/// Score for one cascade pass: group points × combo multiplier × bonus multiplier.
pub fn pass_score(group_sizes: &[usize], combo_multiplier: u64, bonus_window: u32) -> u64 {
    let points: u64 = group_sizes.iter().map(|&n| group_points(n)).sum();
    points
        .saturating_mul(combo_multiplier)
        .saturating_mul(bonus_multiplier(bonus_window))
}

/// Special-hand bonus only sees the bonus multiplier, never the combo multiplier.
pub fn special_score(bonus: u64, bonus_window: u32) -> u64 {
    bonus.saturating_mul(bonus_multiplier(bonus_window))
}

/// Automatic fall speed: ticks per one-row step, `max(min, base - score / divisor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropCurve {
    pub base: u32,
    pub min: u32,
    pub divisor: u64,
}

impl Default for DropCurve {
    fn default() -> Self {
        Self {
            base: 60,
            min: 10,
            divisor: 1000,
        }
    }
}

impl DropCurve {
    pub fn interval(&self, score: u64) -> u32 {
        let speedup = score / self.divisor.max(1);
        let interval = u64::from(self.base).saturating_sub(speedup);
        interval.max(u64::from(self.min)) as u32
    }
}

/// Praise lines for the game-over screen.
pub fn rating(score: u64, combo: u32) -> Vec<&'static str> {
    let mut lines = Vec::new();
    if score >= 10_000 {
        lines.push("Fantastic!");
    } else if score >= 5_000 {
        lines.push("Excellent!");
    } else if score >= 1_000 {
        lines.push("Good!");
    }
    if combo >= 10 {
        lines.push("Combo Master!");
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_points_table() {
        assert_eq!(group_points(1), 0);
        assert_eq!(group_points(2), 0);
        assert_eq!(group_points(3), 100);
        assert_eq!(group_points(4), 200);
        assert_eq!(group_points(5), 300);
        assert_eq!(group_points(48), 300);
    }

    #[test]
    fn test_pass_score_applies_both_multipliers() {
        assert_eq!(pass_score(&[3], 1, 0), 100);
        assert_eq!(pass_score(&[3, 4], 2, 0), 600);
        assert_eq!(pass_score(&[5], 4, 120), 2400);
        assert_eq!(pass_score(&[], 8, 10), 0);
    }

    #[test]
    fn test_special_score_ignores_combo() {
        assert_eq!(special_score(3000, 0), 3000);
        assert_eq!(special_score(3000, 1), 6000);
    }

    #[test]
    fn test_drop_interval_curve() {
        let curve = DropCurve::default();
        assert_eq!(curve.interval(0), 60);
        assert_eq!(curve.interval(999), 60);
        assert_eq!(curve.interval(1000), 59);
        assert_eq!(curve.interval(25_500), 35);
        let floor_score = u64::from(curve.base - curve.min) * curve.divisor;
        assert_eq!(curve.interval(floor_score), 10);
        assert_eq!(curve.interval(floor_score * 10), 10);
        assert_eq!(curve.interval(u64::MAX), 10);
    }

    #[test]
    fn test_drop_interval_never_increases_with_score() {
        let curve = DropCurve::default();
        let mut last = curve.interval(0);
        for score in (0..80_000).step_by(250) {
            let now = curve.interval(score);
            assert!(now <= last);
            last = now;
        }
    }

    #[test]
    fn test_rating() {
        assert!(rating(999, 0).is_empty());
        assert_eq!(rating(1000, 0), vec!["Good!"]);
        assert_eq!(rating(5000, 3), vec!["Excellent!"]);
        assert_eq!(rating(12_000, 10), vec!["Fantastic!", "Combo Master!"]);
    }
}
