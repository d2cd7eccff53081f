use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::{debug, error, info, warn};

use crate::error::{EngineError, Result};
use crate::session::RoundResult;
use crate::store::record::StatsRecord;
use crate::store::summary::DaySummary;

/// Records older than this many days are left out of the summary.
pub const MAX_STATS_DAYS: i64 = 183;

/// Append-only practice log plus the per-day summary folded from it.
///
/// The log stays open for appending while the store lives. If it cannot be
/// opened the store keeps working in memory only.
pub struct StatsStore {
    path: PathBuf,
    file: Option<File>,
    days: Vec<DaySummary>,
    max_wpm: u32,
    max_duration: Duration,
    last_timestamp: Option<NaiveDateTime>,
}

impl StatsStore {
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanatype")
            .join("stats.txt")
    }

    pub fn open(path: &Path) -> Self {
        Self::open_at(path, Local::now().naive_local())
    }

    /// Opens the log at `path`, folding the records from the
    /// `MAX_STATS_DAYS` before `now`.
    pub fn open_at(path: &Path, now: NaiveDateTime) -> Self {
        let mut store = Self {
            path: path.to_path_buf(),
            file: None,
            days: Vec::new(),
            max_wpm: 0,
            max_duration: Duration::ZERO,
            last_timestamp: None,
        };
        match load_records(path, now) {
            Ok(records) => store.fold(&records),
            Err(err) => error!("could not read stats log: {err}"),
        }
        store.file = match open_log(path, false) {
            Ok(file) => Some(file),
            Err(err) => {
                error!("stats will not be saved: {err}");
                None
            }
        };
        store
    }

    fn fold(&mut self, records: &[StatsRecord]) {
        let mut by_day: BTreeMap<NaiveDate, DaySummary> = BTreeMap::new();
        for record in records {
            let date = record.timestamp.date();
            by_day
                .entry(date)
                .or_insert_with(|| DaySummary::new(date))
                .add(record);
        }
        self.last_timestamp = records.iter().map(|r| r.timestamp).max();
        for day in by_day.into_values() {
            self.track_maxima(&day);
            self.days.push(day);
        }
        info!(days = self.days.len(), records = records.len(), "stats loaded");
    }

    fn track_maxima(&mut self, day: &DaySummary) {
        self.max_wpm = self.max_wpm.max(day.wpm);
        self.max_duration = self.max_duration.max(day.duration);
    }

    pub fn append(&mut self, lesson: &str, result: &RoundResult) -> StatsRecord {
        self.append_at(lesson, result, Local::now().naive_local())
    }

    /// Writes a record for a finished round and merges it into the day's
    /// summary. Timestamps never go backwards in the log.
    pub fn append_at(&mut self, lesson: &str, result: &RoundResult, now: NaiveDateTime) -> StatsRecord {
        let timestamp = match self.last_timestamp {
            Some(last) if now < last => last,
            _ => now,
        };
        let record = StatsRecord::new(
            timestamp,
            lesson,
            result.duration,
            result.correct_count,
            result.touch_count,
        );
        self.last_timestamp = Some(record.timestamp);

        if let Some(file) = self.file.as_mut() {
            if let Err(err) = writeln!(file, "{record}").and_then(|_| file.flush()) {
                error!("could not write stats record: {err}");
            }
        }

        let date = record.timestamp.date();
        let mut day = match self.days.pop() {
            Some(last) if last.date == date => last,
            Some(last) => {
                self.days.push(last);
                DaySummary::new(date)
            }
            None => DaySummary::new(date),
        };
        day.add(&record);
        self.track_maxima(&day);
        self.days.push(day);
        debug!(%record, "stats appended");
        record
    }

    /// Drops all history and truncates the log.
    pub fn reset(&mut self) {
        self.days.clear();
        self.max_wpm = 0;
        self.max_duration = Duration::ZERO;
        self.last_timestamp = None;
        self.file = match open_log(&self.path, true) {
            Ok(file) => Some(file),
            Err(err) => {
                error!("could not truncate stats log: {err}");
                None
            }
        };
        info!(path = %self.path.display(), "stats reset");
    }

    pub fn close(&mut self) {
        if self.file.take().is_some() {
            info!("stats closed");
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Per-day series, oldest first, one entry per day.
    pub fn days(&self) -> &[DaySummary] {
        &self.days
    }

    pub fn today(&self) -> Option<&DaySummary> {
        let today = Local::now().date_naive();
        self.days.last().filter(|day| day.date == today)
    }

    pub fn max_wpm(&self) -> u32 {
        self.max_wpm
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }
}

/// Reads the log, skipping malformed and expired lines. A missing log is
/// an empty history.
pub fn load_records(path: &Path, now: NaiveDateTime) -> Result<Vec<StatsRecord>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    let mut records = Vec::new();
    for bytes in BufReader::new(file).split(b'\n') {
        let line = match String::from_utf8(bytes?) {
            Ok(line) => line,
            Err(err) => {
                let line = String::from_utf8_lossy(err.as_bytes()).into_owned();
                warn!(%line, "skipping stats record that is not UTF-8");
                continue;
            }
        };
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<StatsRecord>() {
            Ok(record) if (now - record.timestamp).num_days() >= MAX_STATS_DAYS => {}
            Ok(record) => records.push(record),
            Err(EngineError::MalformedRecord(line)) => {
                warn!(%line, "skipping malformed stats record");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(records)
}

fn open_log(path: &Path, truncate: bool) -> Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            restrict_dir(dir)?;
        }
    }
    let mut options = OpenOptions::new();
    if truncate {
        options.write(true).create(true).truncate(true);
    } else {
        options.append(true).create(true);
    }
    Ok(options.open(path)?)
}

#[cfg(unix)]
fn restrict_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
