use std::time::{Duration, Instant};

/// Practice rounds longer than this are treated as abandoned.
pub const TIME_OVER: Duration = Duration::from_secs(59 * 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreeditStyle {
    Underline,
    Reverse,
}

/// Formatting run over a preedit string, in chars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreeditAttr {
    pub start: usize,
    pub end: usize,
    pub style: PreeditStyle,
}

/// Uncommitted input method composition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Preedit {
    pub text: String,
    pub attrs: Vec<PreeditAttr>,
    pub cursor: usize,
}

impl Preedit {
    pub fn new(text: &str, cursor: usize) -> Self {
        Self {
            text: text.to_string(),
            attrs: Vec::new(),
            cursor,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.text.is_empty()
    }
}

/// One attempt at a practice text. The clock starts on the first input and
/// the whole session resets when the input becomes empty again.
#[derive(Clone, Debug, Default)]
pub struct PracticeSession {
    pub typed: String,
    pub preedit: Preedit,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub touch_count: usize,
}

impl PracticeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.typed.is_empty() && !self.preedit.is_pending()
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    fn start_at(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.finished_at = None;
    }

    /// Applies an edit, starting the clock if it made the session non-empty
    /// and resetting everything if it emptied it.
    fn edit_at(&mut self, now: Instant, edit: impl FnOnce(&mut Self)) {
        let was_empty = self.is_empty();
        edit(self);
        if self.is_empty() {
            if !was_empty {
                self.reset();
            }
        } else if was_empty {
            self.start_at(now);
        }
    }

    pub fn append_at(&mut self, text: &str, now: Instant) {
        self.edit_at(now, |s| s.typed.push_str(text));
    }

    pub fn backspace(&mut self) {
        if self.typed.pop().is_some() && self.is_empty() {
            self.reset();
        }
    }

    /// Removes `count` chars starting `offset` chars from the end of the
    /// typed text (`offset` is zero or negative), as an input method
    /// deleting surrounding text. The clock keeps running even if nothing
    /// is left. Out-of-range requests change nothing and return false.
    pub fn delete(&mut self, offset: isize, count: usize) -> bool {
        let len = self.typed.chars().count();
        let Some(begin) = len.checked_add_signed(offset) else {
            return false;
        };
        let Some(end) = begin.checked_add(count) else {
            return false;
        };
        if end > len {
            return false;
        }
        self.typed = self
            .typed
            .chars()
            .enumerate()
            .filter(|(i, _)| *i < begin || *i >= end)
            .map(|(_, c)| c)
            .collect();
        true
    }

    pub fn set_preedit_at(&mut self, preedit: Preedit, now: Instant) {
        self.edit_at(now, |s| s.preedit = preedit);
    }

    pub fn count_touch(&mut self) {
        self.touch_count += 1;
    }

    /// Elapsed practice time. The clock stops as soon as the typed text
    /// matches `plain` with nothing left in the preedit, and runs again if
    /// the match is broken.
    pub fn duration_at(&mut self, plain: &str, now: Instant) -> Duration {
        let Some(start) = self.started_at else {
            return Duration::ZERO;
        };
        if self.typed == plain && !self.preedit.is_pending() {
            let finish = *self.finished_at.get_or_insert(now);
            finish.saturating_duration_since(start)
        } else {
            self.finished_at = None;
            now.saturating_duration_since(start)
        }
    }

    /// True once the text has matched for at least `grace`.
    pub fn is_finished_at(&mut self, plain: &str, grace: Duration, now: Instant) -> bool {
        self.duration_at(plain, now);
        match self.finished_at {
            Some(finish) => now.saturating_duration_since(finish) >= grace,
            None => false,
        }
    }

    pub fn is_timed_out_at(&mut self, plain: &str, now: Instant) -> bool {
        self.duration_at(plain, now) >= TIME_OVER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRACE: Duration = Duration::from_secs(1);

    #[test]
    fn test_clock_starts_on_first_input() {
        let t0 = Instant::now();
        let mut session = PracticeSession::new();
        assert!(session.is_empty());
        assert_eq!(session.duration_at("たべる", t0), Duration::ZERO);

        session.append_at("た", t0);
        assert_eq!(session.started_at, Some(t0));
        session.append_at("べ", t0 + Duration::from_secs(1));
        assert_eq!(session.started_at, Some(t0));
        assert_eq!(
            session.duration_at("たべる", t0 + Duration::from_secs(3)),
            Duration::from_secs(3)
        );
    }

    #[test]
    fn test_emptying_resets_session() {
        let t0 = Instant::now();
        let mut session = PracticeSession::new();
        session.append_at("た", t0);
        session.count_touch();
        session.backspace();
        assert!(session.is_empty());
        assert!(!session.is_started());
        assert_eq!(session.touch_count, 0);
    }

    #[test]
    fn test_preedit_alone_starts_clock() {
        let t0 = Instant::now();
        let mut session = PracticeSession::new();
        session.set_preedit_at(Preedit::new("t", 1), t0);
        assert!(session.is_started());
        session.set_preedit_at(Preedit::default(), t0);
        assert!(!session.is_started());
    }

    #[test]
    fn test_delete_relative_to_end() {
        let t0 = Instant::now();
        let mut session = PracticeSession::new();
        session.append_at("たべる", t0);
        assert!(!session.delete(-4, 1));
        assert!(!session.delete(-1, 2));
        assert!(!session.delete(0, usize::MAX));
        assert!(!session.delete(-3, usize::MAX));
        assert_eq!(session.typed, "たべる");
        assert!(session.delete(-2, 1));
        assert_eq!(session.typed, "たる");
        assert!(session.delete(-2, 2));
        assert!(session.typed.is_empty());
        assert!(session.is_started());
    }

    #[test]
    fn test_finish_waits_for_grace_and_preedit() {
        let t0 = Instant::now();
        let mut session = PracticeSession::new();
        session.append_at("たべる", t0);
        session.set_preedit_at(Preedit::new("る", 1), t0);

        let t1 = t0 + Duration::from_secs(5);
        assert!(!session.is_finished_at("たべる", GRACE, t1));
        session.set_preedit_at(Preedit::default(), t1);
        assert!(!session.is_finished_at("たべる", GRACE, t1));
        assert!(session.is_finished_at("たべる", Duration::ZERO, t1));

        let t2 = t1 + GRACE;
        assert!(session.is_finished_at("たべる", GRACE, t2));
        // the clock stopped when the text matched
        assert_eq!(session.duration_at("たべる", t2), Duration::from_secs(5));
    }

    #[test]
    fn test_breaking_the_match_restarts_the_clock() {
        let t0 = Instant::now();
        let mut session = PracticeSession::new();
        session.append_at("あ", t0);
        assert_eq!(session.duration_at("あ", t0 + Duration::from_secs(2)), Duration::from_secs(2));
        session.append_at("い", t0 + Duration::from_secs(3));
        assert!(session.finished_at.is_some());
        assert_eq!(session.duration_at("あ", t0 + Duration::from_secs(4)), Duration::from_secs(4));
        assert!(session.finished_at.is_none());
    }

    #[test]
    fn test_time_over() {
        let t0 = Instant::now();
        let mut session = PracticeSession::new();
        session.append_at("あ", t0);
        assert!(!session.is_timed_out_at("たべる", t0 + Duration::from_secs(60)));
        assert!(session.is_timed_out_at("たべる", t0 + TIME_OVER));
    }
}
