use rand::Rng;

/// Candidate lines for `:random` rounds, drawn without replacement.
#[derive(Clone, Debug, Default)]
pub struct RandomPool {
    lines: Vec<String>,
    per_round: usize,
    rounds_left: usize,
}

impl RandomPool {
    /// Pool over the lines of `text`. `per_round` is clamped to
    /// `1..=line count`; `None` means every line in one round.
    pub fn new(text: &str, per_round: Option<usize>, rounds: usize) -> Self {
        let lines: Vec<String> = text.lines().map(String::from).collect();
        let per_round = per_round.unwrap_or(lines.len()).max(1).min(lines.len());
        Self {
            lines,
            per_round,
            rounds_left: rounds,
        }
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }

    pub fn per_round(&self) -> usize {
        self.per_round
    }

    pub fn has_next_round(&self) -> bool {
        self.rounds_left > 0 && !self.lines.is_empty() && self.per_round > 0
    }

    /// Removes `n` random lines (fewer if the pool runs out), joined by
    /// spaces.
    pub fn pick<R: Rng>(&mut self, n: usize, rng: &mut R) -> String {
        let mut picked = Vec::with_capacity(n);
        for _ in 0..n.min(self.lines.len()) {
            let index = rng.gen_range(0..self.lines.len());
            picked.push(self.lines.swap_remove(index));
        }
        picked.join(" ").trim().to_string()
    }

    /// Draws the text for the next round, if any round is left.
    pub fn next_round<R: Rng>(&mut self, rng: &mut R) -> Option<String> {
        if !self.has_next_round() {
            return None;
        }
        self.rounds_left -= 1;
        Some(self.pick(self.per_round, rng))
    }
}
