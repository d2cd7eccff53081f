use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, error, info, warn};

use crate::error::{EngineError, Result};
use crate::event::{ALWAYS_IGNORED, Key, KeyPress};
use crate::kana::to_zenkaku;
use crate::keyboard::{KeyHintMapper, KeyboardLayout};
use crate::lesson::directive::{Directive, MARKER};
use crate::lesson::navigation::{Navigation, QUIT_TARGET, STATS_TARGET, UP_TARGET};
use crate::lesson::pool::RandomPool;
use crate::session::{Preedit, PracticeSession, PracticeText, RoundResult};
use crate::store::StatsStore;

/// Lessons opened in a row by one scan before it is considered a loop.
const MAX_CHAINED_OPENS: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineMode {
    /// Scanning directives.
    Run,
    Menu,
    /// Collecting practice text.
    Text,
    /// Collecting hint text.
    Hint,
    Practice,
    Score,
    Stats,
    Exit,
}

/// Walks a lesson script and drives the practice state machine.
///
/// Commands never fail: problems are logged and leave the previous state in
/// place. Methods taking `now` evaluate the practice clock at that instant.
pub struct LessonInterpreter {
    mode: EngineMode,
    lines: Vec<String>,
    lineno: usize,
    lesson: String,
    lesson_dir: PathBuf,
    title: String,
    text: String,
    hint: String,
    ime_mode: String,
    show_keyboard: bool,
    zenkaku: bool,
    practice: PracticeText,
    session: PracticeSession,
    last_result: Option<RoundResult>,
    pool: RandomPool,
    navigation: Navigation,
    finish_delay: Duration,
    scan_visits: usize,
    scan_opens: usize,
    rng: SmallRng,
}

impl LessonInterpreter {
    /// `lesson_dir` resolves lesson names without a directory until a
    /// lesson is opened by a path that has one.
    pub fn new(lesson_dir: PathBuf, finish_delay: Duration) -> Self {
        Self {
            mode: EngineMode::Run,
            lines: Vec::new(),
            lineno: 0,
            lesson: String::new(),
            lesson_dir,
            title: String::new(),
            text: String::new(),
            hint: String::new(),
            ime_mode: "A".to_string(),
            show_keyboard: false,
            zenkaku: false,
            practice: PracticeText::default(),
            session: PracticeSession::new(),
            last_result: None,
            pool: RandomPool::default(),
            navigation: Navigation::default(),
            finish_delay,
            scan_visits: 0,
            scan_opens: 0,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_rng(mut self, rng: SmallRng) -> Self {
        self.rng = rng;
        self
    }

    fn resolve(&mut self, name: &str) -> PathBuf {
        let path = Path::new(name);
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                self.lesson_dir = dir.to_path_buf();
                path.to_path_buf()
            }
            _ => self.lesson_dir.join(name),
        }
    }

    fn read_lesson(path: &Path) -> Result<Vec<String>> {
        let content = fs::read_to_string(path).map_err(|source| EngineError::LessonNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(content.split_inclusive('\n').map(String::from).collect())
    }

    /// Replaces the current lesson. On failure nothing changes.
    pub fn open(&mut self, name: &str) -> bool {
        let previous_dir = self.lesson_dir.clone();
        let path = self.resolve(name);
        match Self::read_lesson(&path) {
            Ok(lines) => {
                info!(lesson = name, lines = lines.len(), "lesson opened");
                self.lines = lines;
                self.lineno = 0;
                self.show_keyboard = false;
                self.text.clear();
                self.hint.clear();
                self.zenkaku = false;
                self.session.reset();
                self.pool = RandomPool::default();
                self.mode = EngineMode::Run;
                self.lesson = name.to_string();
                self.scan_visits = 0;
                self.scan_opens += 1;
                true
            }
            Err(err) => {
                self.lesson_dir = previous_dir;
                error!("{err}");
                false
            }
        }
    }

    pub fn up(&mut self) {
        if let Some(target) = self.navigation.up_target(&self.lesson) {
            info!(lesson = %target, "up");
            self.open(&target);
        }
    }

    fn next(&mut self, target: Option<String>) {
        if let Some(target) = target {
            self.open(&target);
            return;
        }
        match self.navigation.next_after(&self.lesson).map(String::from) {
            Some(target) => {
                self.open(&target);
            }
            None => self.up(),
        }
    }

    fn set_text(&mut self, text: String, mapper: &KeyHintMapper) {
        self.practice = PracticeText::new(&text, mapper);
        self.text = text;
    }

    fn start_round(&mut self, text: String, mapper: &KeyHintMapper) {
        self.set_text(text, mapper);
        self.session.reset();
        self.mode = EngineMode::Practice;
        debug!(plain = %self.practice.plain, keys = self.practice.correct_count, "practice started");
    }

    /// Advances the lesson: finishes or times out the running round, then
    /// scans directives until the script waits for the learner. Returns
    /// true when a practice round has just started.
    pub fn run_at(&mut self, mapper: &KeyHintMapper, stats: &mut StatsStore, now: Instant) -> bool {
        if self.lines.is_empty() {
            return false;
        }
        if self.mode == EngineMode::Practice {
            if self.session.is_timed_out_at(&self.practice.plain, now) {
                warn!(lesson = %self.lesson, "practice timed out, round discarded");
                self.session.reset();
                return false;
            }
            if !self
                .session
                .is_finished_at(&self.practice.plain, self.finish_delay, now)
            {
                return false;
            }
            if !self.finish_round(mapper, stats, now) {
                return false;
            }
        }
        self.scan(mapper)
    }

    /// Records the finished round. Returns true when no round follows.
    fn finish_round(&mut self, mapper: &KeyHintMapper, stats: &mut StatsStore, now: Instant) -> bool {
        let result = self.live_result(now);
        let record = stats.append(&self.lesson, &result);
        info!(%record, wpm = result.wpm(), "round finished");
        self.last_result = Some(result);
        match self.pool.next_round(&mut self.rng) {
            Some(text) => {
                self.start_round(text, mapper);
                false
            }
            None => {
                self.mode = EngineMode::Run;
                true
            }
        }
    }

    fn scan(&mut self, mapper: &KeyHintMapper) -> bool {
        let mut buffer = String::new();
        self.scan_visits = 0;
        self.scan_opens = 0;
        while matches!(
            self.mode,
            EngineMode::Run | EngineMode::Text | EngineMode::Hint
        ) {
            if self.lines.is_empty()
                || self.scan_visits > 2 * self.lines.len()
                || self.scan_opens > MAX_CHAINED_OPENS
            {
                warn!(lesson = %self.lesson, "lesson script never waits for input, stopping");
                self.mode = EngineMode::Run;
                return false;
            }
            self.scan_visits += 1;
            if self.lineno >= self.lines.len() {
                self.lineno = 0;
            }
            let raw = &self.lines[self.lineno];
            let line = if raw.starts_with(MARKER) {
                raw.trim_end().to_string()
            } else {
                raw.clone()
            };
            self.lineno += 1;
            let directive = Directive::parse(&line);

            if matches!(self.mode, EngineMode::Text | EngineMode::Hint) {
                if directive.is_none() {
                    buffer.push_str(&line);
                    continue;
                }
                let collected = buffer.trim_end().to_string();
                buffer.clear();
                if self.mode == EngineMode::Text {
                    self.set_text(collected, mapper);
                } else {
                    self.hint = collected;
                }
                self.mode = EngineMode::Run;
            }

            let Some(directive) = directive else {
                continue;
            };
            if self.apply(directive, mapper) {
                return true;
            }
        }
        false
    }

    /// Applies one directive. Returns true when practice starts.
    fn apply(&mut self, directive: Directive, mapper: &KeyHintMapper) -> bool {
        match directive {
            Directive::Title(title) => self.title = title,
            Directive::Text => {
                self.mode = EngineMode::Text;
                self.text.clear();
            }
            Directive::Hint => {
                self.mode = EngineMode::Hint;
                self.hint.clear();
            }
            Directive::ImeMode(mode) => {
                debug!(%mode, "ime mode");
                self.ime_mode = mode;
            }
            Directive::Keyboard => self.show_keyboard = true,
            Directive::Random { lines, rounds } => {
                self.pool = RandomPool::new(&self.text, lines, rounds);
                match self.pool.next_round(&mut self.rng) {
                    Some(text) => {
                        self.start_round(text, mapper);
                        return true;
                    }
                    None => warn!(lesson = %self.lesson, "random: no text to pick from"),
                }
            }
            Directive::Start => {
                self.pool = RandomPool::default();
                let text = self.text.clone();
                self.start_round(text, mapper);
                return true;
            }
            Directive::ShowScore => self.mode = EngineMode::Score,
            Directive::Up => self.up(),
            Directive::Next(target) => self.next(target),
            Directive::Menu(targets) => {
                self.navigation.enter_menu(&self.lesson, targets);
                self.mode = EngineMode::Menu;
            }
            Directive::Zenkaku => self.zenkaku = true,
            Directive::Unknown(line) => debug!(%line, "unknown directive ignored"),
        }
        false
    }

    /// Chooses menu entry `index`. Returns false outside a menu or past its
    /// end.
    pub fn select(&mut self, index: usize) -> bool {
        if self.mode != EngineMode::Menu {
            return false;
        }
        let Some(target) = self.navigation.menu_target(index).map(String::from) else {
            return false;
        };
        match target.as_str() {
            STATS_TARGET => self.show_stats(),
            UP_TARGET => self.up(),
            QUIT_TARGET => self.quit(),
            _ => {
                self.open(&target);
            }
        }
        true
    }

    /// Menu entry for a number key: `1`..`9` then `0`.
    pub fn select_key(&mut self, key: char) -> bool {
        match key {
            '1'..='9' => self.select(key as usize - '1' as usize),
            '0' => self.select(9),
            _ => false,
        }
    }

    pub fn show_stats(&mut self) {
        if self.mode == EngineMode::Menu {
            self.mode = EngineMode::Stats;
            self.title.clear();
        }
    }

    pub fn quit(&mut self) {
        self.mode = EngineMode::Exit;
    }

    pub fn escape(&mut self) {
        if self.mode == EngineMode::Stats {
            self.mode = EngineMode::Run;
        } else {
            self.up();
        }
    }

    pub fn backspace(&mut self) {
        if self.mode == EngineMode::Practice {
            self.session.backspace();
        }
    }

    /// Leaves the score and stats screens; in practice, finishes a matched
    /// round at once or types a newline.
    pub fn enter_at(&mut self, mapper: &KeyHintMapper, stats: &mut StatsStore, now: Instant) {
        match self.mode {
            EngineMode::Score | EngineMode::Stats => self.mode = EngineMode::Run,
            EngineMode::Practice => {
                if self
                    .session
                    .is_finished_at(&self.practice.plain, Duration::ZERO, now)
                {
                    self.finish_round(mapper, stats, now);
                } else {
                    self.session.append_at("\n", now);
                }
            }
            _ => {}
        }
    }

    pub fn append_at(&mut self, text: &str, now: Instant) {
        if self.mode != EngineMode::Practice {
            return;
        }
        if self.zenkaku {
            self.session.append_at(&to_zenkaku(text), now);
        } else {
            self.session.append_at(text, now);
        }
    }

    pub fn delete(&mut self, offset: isize, count: usize) -> bool {
        self.session.delete(offset, count)
    }

    pub fn set_preedit_at(&mut self, preedit: Preedit, now: Instant) {
        if self.mode == EngineMode::Practice {
            self.session.set_preedit_at(preedit, now);
        }
    }

    /// Counts a physical keystroke during practice.
    pub fn key_press(&mut self, event: &KeyPress, layout: &KeyboardLayout) {
        if event.synthetic || self.mode != EngineMode::Practice {
            return;
        }
        if let Key::Named(key) = event.key {
            if ALWAYS_IGNORED.contains(&key) || layout.is_ignored(key) {
                return;
            }
        }
        self.session.count_touch();
    }

    fn live_result(&mut self, now: Instant) -> RoundResult {
        let duration = self.session.duration_at(&self.practice.plain, now);
        RoundResult::new(
            self.practice.correct_count,
            self.session.touch_count,
            duration,
        )
    }

    /// Speed and accuracy of the running round, or of the last finished
    /// one once practice is over.
    pub fn result_at(&mut self, now: Instant) -> RoundResult {
        match self.last_result {
            Some(result) if self.mode != EngineMode::Practice => result,
            _ => self.live_result(now),
        }
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    pub fn lesson(&self) -> &str {
        &self.lesson
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn ime_mode(&self) -> &str {
        &self.ime_mode
    }

    pub fn show_keyboard(&self) -> bool {
        self.show_keyboard
    }

    pub fn is_zenkaku(&self) -> bool {
        self.zenkaku
    }

    pub fn practice(&self) -> &PracticeText {
        &self.practice
    }

    pub fn session(&self) -> &PracticeSession {
        &self.session
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// Plain text not yet matched by the typed text.
    pub fn remaining(&self) -> &str {
        self.practice.remaining(&self.session.typed)
    }
}
