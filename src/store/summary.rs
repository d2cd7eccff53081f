use std::time::Duration;

use chrono::NaiveDate;

use crate::store::record::StatsRecord;

/// Practice totals for one calendar day.
#[derive(Clone, Debug, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub duration: Duration,
    pub correct_count: usize,
    pub touch_count: usize,
    pub wpm: u32,
    pub accuracy: f64,
}

impl DaySummary {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            duration: Duration::ZERO,
            correct_count: 0,
            touch_count: 0,
            wpm: 0,
            accuracy: 0.0,
        }
    }

    /// Adds a record's counts. Touch counts below the correct count come
    /// from old logs and are raised to it.
    pub fn add(&mut self, record: &StatsRecord) {
        self.duration += record.duration;
        self.correct_count += record.correct_count;
        self.touch_count += record.touch_count.max(record.correct_count);
        self.recompute();
    }

    fn recompute(&mut self) {
        let secs = self.duration.as_secs_f64();
        self.wpm = if secs > 0.0 {
            (self.correct_count as f64 * 60.0 / secs / 5.0) as u32
        } else {
            0
        };
        self.accuracy = if self.touch_count > 0 {
            (self.correct_count as f64 / self.touch_count as f64 * 100.0).round() / 100.0
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(secs: u64, correct: usize, touch: usize) -> StatsRecord {
        let t = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        StatsRecord::new(t, "x", Duration::from_secs(secs), correct, touch)
    }

    #[test]
    fn test_fold_same_day() {
        let mut day = DaySummary::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        day.add(&record(30, 50, 60));
        day.add(&record(90, 150, 160));
        assert_eq!(day.duration, Duration::from_secs(120));
        assert_eq!(day.correct_count, 200);
        assert_eq!(day.touch_count, 220);
        // 200 * 60 / 120 / 5
        assert_eq!(day.wpm, 20);
        assert_eq!(day.accuracy, 0.91);
    }

    #[test]
    fn test_touch_floored_at_correct() {
        let mut day = DaySummary::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        day.add(&record(60, 100, 40));
        assert_eq!(day.touch_count, 100);
        assert_eq!(day.accuracy, 1.0);
    }

    #[test]
    fn test_empty_day() {
        let mut day = DaySummary::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        day.add(&record(0, 0, 0));
        assert_eq!(day.wpm, 0);
        assert_eq!(day.accuracy, 0.0);
    }
}
