use std::time::Duration;

/// Filled stars shown for a score; the rest of the score is bonus stars.
pub const MAX_FILLED_STARS: u32 = 6;
pub const MAX_SCORE: u32 = 10;

/// Counts behind a practice round's speed and accuracy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundResult {
    pub correct_count: usize,
    pub touch_count: usize,
    pub duration: Duration,
}

impl RoundResult {
    pub fn new(correct_count: usize, touch_count: usize, duration: Duration) -> Self {
        Self {
            correct_count,
            touch_count,
            duration,
        }
    }

    pub fn error_count(&self) -> usize {
        self.touch_count.saturating_sub(self.correct_count)
    }

    /// Corrected characters per minute.
    pub fn cpm(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.correct_count.min(self.touch_count) as f64 * 60.0 / secs
    }

    /// Corrected words per minute, five keystrokes to a word.
    pub fn wpm(&self) -> u32 {
        (self.cpm() / 5.0) as u32
    }

    pub fn accuracy(&self) -> f64 {
        if self.touch_count == 0 {
            return 0.0;
        }
        (1.0 - self.error_count() as f64 / self.touch_count as f64).max(0.0)
    }

    /// Score from 0 to 10: wpm weighted by accuracy (with `min_accuracy`
    /// added as a baseline) per `min_wpm_per_star`.
    pub fn score(&self, min_accuracy: f64, min_wpm_per_star: u32) -> u32 {
        let weight = (min_accuracy + self.accuracy()).min(1.0);
        let per_star = min_wpm_per_star.max(1) as f64;
        let score = (self.wpm() as f64 * weight / per_star) as u32;
        score.min(MAX_SCORE)
    }
}

/// Splits a score into (filled, bonus) stars.
pub fn stars(score: u32) -> (u32, u32) {
    let score = score.min(MAX_SCORE);
    let filled = score.min(MAX_FILLED_STARS);
    (filled, score - filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_from_corrected_count() {
        let result = RoundResult::new(100, 110, Duration::from_secs(60));
        assert_eq!(result.error_count(), 10);
        assert!((result.cpm() - 100.0).abs() < 1e-9);
        assert_eq!(result.wpm(), 20);
        assert!((result.accuracy() - (1.0 - 10.0 / 110.0)).abs() < 1e-9);
    }

    #[test]
    fn test_correct_count_capped_by_touches() {
        // typed through an input method that committed more than was pressed
        let result = RoundResult::new(100, 50, Duration::from_secs(60));
        assert_eq!(result.error_count(), 0);
        assert_eq!(result.wpm(), 10);
        assert_eq!(result.accuracy(), 1.0);
    }

    #[test]
    fn test_zero_duration_and_touches() {
        let result = RoundResult::new(6, 0, Duration::ZERO);
        assert_eq!(result.cpm(), 0.0);
        assert_eq!(result.wpm(), 0);
        assert_eq!(result.accuracy(), 0.0);
        assert_eq!(result.score(0.85, 5), 0);
    }

    #[test]
    fn test_score_weights_accuracy() {
        // 30 wpm, perfect accuracy
        let fast = RoundResult::new(150, 150, Duration::from_secs(60));
        assert_eq!(fast.score(0.85, 5), 6);
        // 50% accuracy still gets full weight once the baseline is added
        let sloppy = RoundResult::new(150, 300, Duration::from_secs(60));
        assert_eq!(sloppy.wpm(), 30);
        assert_eq!(sloppy.score(0.85, 5), 6);
        // 30 wpm at 10% accuracy: weight 0.95
        let awful = RoundResult::new(150, 1500, Duration::from_secs(60));
        assert_eq!(awful.score(0.85, 5), 5);
    }

    #[test]
    fn test_score_caps_at_ten() {
        let result = RoundResult::new(1000, 1000, Duration::from_secs(60));
        assert_eq!(result.wpm(), 200);
        assert_eq!(result.score(0.85, 5), MAX_SCORE);
    }

    #[test]
    fn test_stars_split() {
        assert_eq!(stars(0), (0, 0));
        assert_eq!(stars(4), (4, 0));
        assert_eq!(stars(6), (6, 0));
        assert_eq!(stars(9), (6, 3));
        assert_eq!(stars(12), (6, 4));
    }
}
