use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};

use crate::error::EngineError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One finished practice round as written to the stats log:
/// `2024-05-01 21:04:13,"lesson.txt",01:02.5,120,131`
#[derive(Clone, Debug, PartialEq)]
pub struct StatsRecord {
    pub timestamp: NaiveDateTime,
    pub lesson: String,
    pub duration: Duration,
    pub correct_count: usize,
    pub touch_count: usize,
}

impl StatsRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        lesson: &str,
        duration: Duration,
        correct_count: usize,
        touch_count: usize,
    ) -> Self {
        Self {
            // the log keeps whole seconds
            timestamp: timestamp.with_nanosecond(0).unwrap_or(timestamp),
            lesson: sanitize_lesson(lesson),
            duration,
            correct_count,
            touch_count,
        }
    }
}

/// Keeps a lesson name on one line of the log and inside its quotes.
fn sanitize_lesson(lesson: &str) -> String {
    lesson
        .chars()
        .map(|c| match c {
            '"' => '\'',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}

impl fmt::Display for StatsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.duration.as_secs_f64();
        write!(
            f,
            "{},\"{}\",{:02}:{:04.1},{},{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.lesson,
            (secs / 60.0) as u64,
            secs % 60.0,
            self.correct_count,
            self.touch_count
        )
    }
}

fn malformed(line: &str) -> EngineError {
    EngineError::MalformedRecord(line.to_string())
}

fn parse_duration(field: &str) -> Option<Duration> {
    let (minutes, seconds) = field.split_once(':')?;
    if seconds.contains(':') {
        return None;
    }
    let minutes: u64 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(Duration::from_secs(minutes * 60) + Duration::from_secs_f64(seconds))
}

impl FromStr for StatsRecord {
    type Err = EngineError;

    /// The lesson field is everything between the first comma and the last
    /// three fields, so lesson names may contain commas.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (timestamp, rest) = line.split_once(',').ok_or_else(|| malformed(line))?;
        let timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .map_err(|_| malformed(line))?;

        let mut fields = rest.rsplitn(4, ',');
        let touch = fields.next().ok_or_else(|| malformed(line))?;
        let correct = fields.next().ok_or_else(|| malformed(line))?;
        let duration = fields.next().ok_or_else(|| malformed(line))?;
        let lesson = fields.next().ok_or_else(|| malformed(line))?;

        let duration = parse_duration(duration).ok_or_else(|| malformed(line))?;
        let correct_count = correct.trim().parse().map_err(|_| malformed(line))?;
        let touch_count = touch.trim().parse().map_err(|_| malformed(line))?;
        let lesson = lesson.trim();
        let lesson = lesson
            .strip_prefix('"')
            .and_then(|l| l.strip_suffix('"'))
            .unwrap_or(lesson);

        Ok(Self {
            timestamp,
            lesson: lesson.to_string(),
            duration,
            correct_count,
            touch_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_format_line() {
        let record = StatsRecord::new(at(21, 4, 13), "lesson.txt", Duration::from_millis(62_500), 120, 131);
        assert_eq!(record.to_string(), r#"2024-05-01 21:04:13,"lesson.txt",01:02.5,120,131"#);

        let short = StatsRecord::new(at(9, 0, 0), "a", Duration::from_millis(7_300), 6, 6);
        assert_eq!(short.to_string(), r#"2024-05-01 09:00:00,"a",00:07.3,6,6"#);
    }

    #[test]
    fn test_parse_line() {
        let record: StatsRecord = r#"2024-05-01 21:04:13,"lesson.txt",01:02.5,120,131"#
            .parse()
            .unwrap();
        assert_eq!(record.timestamp, at(21, 4, 13));
        assert_eq!(record.lesson, "lesson.txt");
        assert_eq!(record.duration, Duration::from_millis(62_500));
        assert_eq!(record.correct_count, 120);
        assert_eq!(record.touch_count, 131);
    }

    #[test]
    fn test_parse_lesson_with_comma() {
        let record: StatsRecord = "2024-05-01 21:04:13,\"a,b.txt\",00:10.0,5,6\n".parse().unwrap();
        assert_eq!(record.lesson, "a,b.txt");
        assert_eq!(record.touch_count, 6);
    }

    #[test]
    fn test_lesson_name_stays_on_one_line() {
        let record = StatsRecord::new(at(9, 0, 0), "say \"hi\"\nnow.txt", Duration::from_secs(5), 3, 4);
        assert_eq!(record.lesson, "say 'hi' now.txt");
        let line = record.to_string();
        assert_eq!(line.lines().count(), 1);
        let parsed: StatsRecord = line.parse().unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_rejects_malformed_lines() {
        for line in [
            "",
            "garbage",
            "2024-13-01 00:00:00,\"x\",00:10.0,5,6",
            "2024-05-01 21:04:13,\"x\",10.0,5,6",
            "2024-05-01 21:04:13,\"x\",1:2:3,5,6",
            "2024-05-01 21:04:13,\"x\",00:10.0,five,6",
            "2024-05-01 21:04:13,00:10.0,5,6",
        ] {
            assert!(
                matches!(line.parse::<StatsRecord>(), Err(EngineError::MalformedRecord(_))),
                "{line:?}"
            );
        }
    }
}
