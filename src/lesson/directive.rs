use tracing::warn;

/// First character of every directive line.
pub const MARKER: char = ':';

/// A lesson script command line. Keywords are prefix-matched, so
/// `:textbook` reads as `:text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    Title(String),
    Text,
    Hint,
    ImeMode(String),
    Keyboard,
    /// Lines per round (all when absent) and number of rounds.
    Random { lines: Option<usize>, rounds: usize },
    Start,
    ShowScore,
    Up,
    Next(Option<String>),
    Menu(Vec<String>),
    Zenkaku,
    Unknown(String),
}

impl Directive {
    /// Parses a line with its trailing whitespace removed. Returns `None`
    /// for content lines.
    pub fn parse(line: &str) -> Option<Self> {
        let body = line.strip_prefix(MARKER)?;
        let arg = |keyword: &str| body[keyword.len()..].trim().to_string();

        let directive = if let Some(title) = body.strip_prefix("title ") {
            Directive::Title(title.trim().to_string())
        } else if body.starts_with("text") {
            Directive::Text
        } else if body.starts_with("hint") {
            Directive::Hint
        } else if body.starts_with("ime_mode") {
            Directive::ImeMode(arg("ime_mode"))
        } else if body.starts_with("keyboard") {
            Directive::Keyboard
        } else if body.starts_with("random") {
            parse_random(&arg("random"))
        } else if body.starts_with("start") {
            Directive::Start
        } else if body.starts_with("show_score") {
            Directive::ShowScore
        } else if body.starts_with("up") {
            Directive::Up
        } else if body.starts_with("next") {
            let target = arg("next");
            Directive::Next((!target.is_empty()).then_some(target))
        } else if body.starts_with("menu") {
            Directive::Menu(body["menu".len()..].split_whitespace().map(String::from).collect())
        } else if body.starts_with("zenkaku") {
            Directive::Zenkaku
        } else {
            Directive::Unknown(body.to_string())
        };
        Some(directive)
    }
}

fn parse_random(args: &str) -> Directive {
    let mut parts = args.split_whitespace();
    let lines = parts.next().and_then(|n| match n.parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(arg = n, "random: line count is not a number, using all lines");
            None
        }
    });
    let rounds = parts
        .next()
        .and_then(|n| match n.parse::<usize>() {
            Ok(n) => Some(n.max(1)),
            Err(_) => {
                warn!(arg = n, "random: round count is not a number, using one");
                None
            }
        })
        .unwrap_or(1);
    Directive::Random { lines, rounds }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_lines_are_not_directives() {
        assert_eq!(Directive::parse("たべる"), None);
        assert_eq!(Directive::parse(" :text"), None);
        assert_eq!(Directive::parse(""), None);
    }

    #[test]
    fn test_title_needs_a_space() {
        assert_eq!(
            Directive::parse(":title  練習 1 "),
            Some(Directive::Title("練習 1".to_string()))
        );
        assert_eq!(
            Directive::parse(":title"),
            Some(Directive::Unknown("title".to_string()))
        );
    }

    #[test]
    fn test_prefix_matching() {
        assert_eq!(Directive::parse(":textbook"), Some(Directive::Text));
        assert_eq!(Directive::parse(":show_score"), Some(Directive::ShowScore));
        assert_eq!(Directive::parse(":update"), Some(Directive::Up));
        assert_eq!(
            Directive::parse(":ime_mode あ"),
            Some(Directive::ImeMode("あ".to_string()))
        );
    }

    #[test]
    fn test_navigation_arguments() {
        assert_eq!(Directive::parse(":next"), Some(Directive::Next(None)));
        assert_eq!(
            Directive::parse(":next  b.txt"),
            Some(Directive::Next(Some("b.txt".to_string())))
        );
        assert_eq!(
            Directive::parse(":menu a.txt  b.txt stats quit"),
            Some(Directive::Menu(vec![
                "a.txt".to_string(),
                "b.txt".to_string(),
                "stats".to_string(),
                "quit".to_string(),
            ]))
        );
    }

    #[test]
    fn test_random_arguments() {
        assert_eq!(
            Directive::parse(":random"),
            Some(Directive::Random { lines: None, rounds: 1 })
        );
        assert_eq!(
            Directive::parse(":random 3 2"),
            Some(Directive::Random { lines: Some(3), rounds: 2 })
        );
        assert_eq!(
            Directive::parse(":random many"),
            Some(Directive::Random { lines: None, rounds: 1 })
        );
        assert_eq!(
            Directive::parse(":random 2 0"),
            Some(Directive::Random { lines: Some(2), rounds: 1 })
        );
    }
}
