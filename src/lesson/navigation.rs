use tracing::debug;

/// Menu pseudo-targets that do not name a lesson.
pub const STATS_TARGET: &str = "stats";
pub const UP_TARGET: &str = "up";
pub const QUIT_TARGET: &str = "quit";

/// Lessons visited through menus, and the targets of the last menu.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Navigation {
    up_list: Vec<String>,
    menu: Vec<String>,
}

impl Navigation {
    pub fn up_list(&self) -> &[String] {
        &self.up_list
    }

    pub fn menu(&self) -> &[String] {
        &self.menu
    }

    pub fn menu_target(&self, index: usize) -> Option<&str> {
        self.menu.get(index).map(String::as_str)
    }

    /// Remembers `current` as the lesson to return to and installs a new
    /// target list.
    pub fn enter_menu(&mut self, current: &str, targets: Vec<String>) {
        self.up_list.push(current.to_string());
        self.menu = targets;
        debug!(up_list = ?self.up_list, "menu entered");
    }

    /// Lesson to return to from `current`. The top entry is skipped when it
    /// is `current` itself, unless it is the only one left.
    pub fn up_target(&mut self, current: &str) -> Option<String> {
        let top = self.up_list.last()?;
        if top != current {
            self.up_list.pop()
        } else if self.up_list.len() > 1 {
            self.up_list.pop();
            self.up_list.pop()
        } else {
            Some(current.to_string())
        }
    }

    /// Menu entry following `current`, if `current` is in the menu and is
    /// not its last entry.
    pub fn next_after(&self, current: &str) -> Option<&str> {
        let index = self.menu.iter().position(|t| t == current)?;
        self.menu_target(index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_up_returns_to_menu_lesson() {
        let mut nav = Navigation::default();
        nav.enter_menu("index.txt", targets(&["a.txt", "b.txt"]));
        assert_eq!(nav.up_target("a.txt").as_deref(), Some("index.txt"));
        assert!(nav.up_list().is_empty());
        assert_eq!(nav.up_target("index.txt"), None);
    }

    #[test]
    fn test_up_from_menu_lesson_skips_itself() {
        let mut nav = Navigation::default();
        nav.enter_menu("index.txt", targets(&["part1.txt"]));
        nav.enter_menu("part1.txt", targets(&["a.txt"]));
        // reopening a menu pushes it again; going up leaves it
        assert_eq!(nav.up_target("part1.txt").as_deref(), Some("index.txt"));
        assert!(nav.up_list().is_empty());
    }

    #[test]
    fn test_up_from_top_menu_stays() {
        let mut nav = Navigation::default();
        nav.enter_menu("index.txt", targets(&["a.txt"]));
        assert_eq!(nav.up_target("index.txt").as_deref(), Some("index.txt"));
        assert_eq!(nav.up_list().len(), 1);
    }

    #[test]
    fn test_next_after() {
        let mut nav = Navigation::default();
        nav.enter_menu("index.txt", targets(&["a.txt", "b.txt", "stats"]));
        assert_eq!(nav.next_after("a.txt"), Some("b.txt"));
        assert_eq!(nav.next_after("stats"), None);
        assert_eq!(nav.next_after("z.txt"), None);
        assert_eq!(nav.menu_target(2), Some("stats"));
        assert_eq!(nav.menu_target(3), None);
    }
}
