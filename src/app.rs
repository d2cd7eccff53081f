use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use tracing::info;

use crate::config::Config;
use crate::event::KeyPress;
use crate::kana::Romanizer;
use crate::keyboard::{KeyHint, KeyHintMapper, KeyboardLayout};
use crate::lesson::{EngineMode, LessonInterpreter};
use crate::session::result::stars;
use crate::session::{Preedit, RoundResult};
use crate::store::{DaySummary, StatsStore};

/// The engine as a rendering layer sees it: commands in, plain data out.
pub struct App {
    pub config: Config,
    interpreter: LessonInterpreter,
    mapper: KeyHintMapper,
    stats: StatsStore,
}

impl App {
    pub fn new() -> Self {
        let config = Config::load_or_default();
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        let layout = KeyboardLayout::load_or_default(&config.keyboard_layout);
        let mapper = KeyHintMapper::new(Romanizer::new(config.nn_as_jis_x_4063), layout);
        let stats = StatsStore::open(Path::new(&config.stats_file));
        let interpreter =
            LessonInterpreter::new(PathBuf::from(&config.lesson_dir), config.finish_delay());
        Self {
            config,
            interpreter,
            mapper,
            stats,
        }
    }

    pub fn with_rng(mut self, rng: SmallRng) -> Self {
        self.interpreter = self.interpreter.with_rng(rng);
        self
    }

    // Commands

    pub fn open(&mut self, lesson: &str) -> bool {
        self.interpreter.open(lesson)
    }

    /// Advances the lesson script. Call on every redraw tick.
    pub fn run(&mut self) -> bool {
        self.run_at(Instant::now())
    }

    pub fn run_at(&mut self, now: Instant) -> bool {
        let started = self.interpreter.run_at(&self.mapper, &mut self.stats, now);
        self.close_if_exited();
        started
    }

    pub fn select(&mut self, index: usize) -> bool {
        let selected = self.interpreter.select(index);
        self.close_if_exited();
        selected
    }

    pub fn select_key(&mut self, key: char) -> bool {
        let selected = self.interpreter.select_key(key);
        self.close_if_exited();
        selected
    }

    pub fn up(&mut self) {
        self.interpreter.up();
    }

    pub fn escape(&mut self) {
        self.interpreter.escape();
    }

    pub fn backspace(&mut self) {
        self.interpreter.backspace();
    }

    pub fn enter(&mut self) {
        self.enter_at(Instant::now());
    }

    pub fn enter_at(&mut self, now: Instant) {
        self.interpreter.enter_at(&self.mapper, &mut self.stats, now);
    }

    /// Text committed by the input method.
    pub fn append(&mut self, text: &str) {
        self.append_at(text, Instant::now());
    }

    pub fn append_at(&mut self, text: &str, now: Instant) {
        self.interpreter.append_at(text, now);
    }

    pub fn delete(&mut self, offset: isize, count: usize) -> bool {
        self.interpreter.delete(offset, count)
    }

    pub fn set_preedit(&mut self, preedit: Preedit) {
        self.set_preedit_at(preedit, Instant::now());
    }

    pub fn set_preedit_at(&mut self, preedit: Preedit, now: Instant) {
        self.interpreter.set_preedit_at(preedit, now);
    }

    pub fn key_press(&mut self, event: &KeyPress) {
        self.interpreter.key_press(event, self.mapper.layout());
    }

    pub fn show_stats(&mut self) {
        self.interpreter.show_stats();
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    pub fn quit(&mut self) {
        self.interpreter.quit();
        self.close_if_exited();
    }

    fn close_if_exited(&mut self) {
        if self.interpreter.mode() == EngineMode::Exit {
            self.stats.close();
        }
    }

    /// Switches the keyboard layout. Text already selected keeps its key
    /// count until the next selection.
    pub fn set_layout(&mut self, path: &str) {
        self.mapper.set_layout(KeyboardLayout::load_or_default(path));
        self.config.keyboard_layout = path.to_string();
        info!(layout = path, "keyboard layout changed");
    }

    pub fn set_x4063(&mut self, value: bool) {
        self.mapper.set_x4063(value);
        self.config.nn_as_jis_x_4063 = value;
    }

    // Queries

    pub fn mode(&self) -> EngineMode {
        self.interpreter.mode()
    }

    pub fn lesson(&self) -> &str {
        self.interpreter.lesson()
    }

    pub fn title(&self) -> &str {
        self.interpreter.title()
    }

    pub fn text(&self) -> &str {
        self.interpreter.text()
    }

    pub fn hint(&self) -> &str {
        self.interpreter.hint()
    }

    pub fn ime_mode(&self) -> &str {
        self.interpreter.ime_mode()
    }

    pub fn show_keyboard(&self) -> bool {
        self.interpreter.show_keyboard()
    }

    pub fn plain(&self) -> &str {
        &self.interpreter.practice().plain
    }

    pub fn reading(&self) -> &str {
        &self.interpreter.practice().reading
    }

    pub fn typed(&self) -> &str {
        &self.interpreter.session().typed
    }

    pub fn preedit(&self) -> &Preedit {
        &self.interpreter.session().preedit
    }

    pub fn touch_count(&self) -> usize {
        self.interpreter.session().touch_count
    }

    pub fn correct_count(&self) -> usize {
        self.interpreter.practice().correct_count
    }

    pub fn error_count(&self) -> usize {
        self.touch_count().saturating_sub(self.correct_count())
    }

    pub fn menu(&self) -> &[String] {
        self.interpreter.navigation().menu()
    }

    pub fn layout(&self) -> &KeyboardLayout {
        self.mapper.layout()
    }

    /// Keys for the next part of the text still to type.
    pub fn next_hint(&self) -> KeyHint {
        self.mapper.next_hint(self.interpreter.remaining())
    }

    pub fn result(&mut self) -> RoundResult {
        self.result_at(Instant::now())
    }

    pub fn result_at(&mut self, now: Instant) -> RoundResult {
        self.interpreter.result_at(now)
    }

    pub fn duration(&mut self) -> Duration {
        self.result().duration
    }

    pub fn wpm(&mut self) -> u32 {
        self.result().wpm()
    }

    pub fn cpm(&mut self) -> f64 {
        self.result().cpm()
    }

    pub fn accuracy(&mut self) -> f64 {
        self.result().accuracy()
    }

    pub fn score_at(&mut self, now: Instant) -> u32 {
        let result = self.result_at(now);
        result.score(self.config.min_accuracy, self.config.min_wpm_per_star)
    }

    pub fn score(&mut self) -> u32 {
        self.score_at(Instant::now())
    }

    /// (filled, bonus) stars for the current score.
    pub fn stars(&mut self) -> (u32, u32) {
        stars(self.score())
    }

    pub fn stats(&self) -> &[DaySummary] {
        self.stats.days()
    }

    pub fn max_wpm(&self) -> u32 {
        self.stats.max_wpm()
    }

    pub fn max_duration(&self) -> Duration {
        self.stats.max_duration()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
