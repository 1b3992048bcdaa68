//! The single persisted best score
//!
//! One integer, stored as its bare decimal string with no envelope around
//! it. Anything missing or malformed loads as zero; the game must come up
//! either way.

use crate::persistence;

/// Storage slot: a file name on native, a localStorage key suffix on web
const SLOT: &str = "highscore.txt";

/// Decode a stored value; anything unparsable is a zero
fn parse_score(raw: &str) -> i32 {
    raw.trim().parse().unwrap_or(0)
}

/// Best survival time in whole seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    pub best: i32,
}

impl HighScore {
    /// Does this run beat the record?
    pub fn qualifies(&self, score: i32) -> bool {
        score > self.best
    }

    /// Record a run. Updates and persists only on a new record; returns
    /// whether the record fell.
    pub fn record(&mut self, score: i32) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.best = score;
        self.save();
        true
    }

    /// Read the stored score, once, at startup
    pub fn load() -> Self {
        let best = persistence::read(SLOT)
            .map(|raw| parse_score(&raw))
            .unwrap_or(0);
        if best > 0 {
            log::info!("Loaded high score: {best}");
        }
        Self { best }
    }

    /// Persist the whole value, best effort
    pub fn save(&self) {
        persistence::write(SLOT, &self.best.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_integer() {
        assert_eq!(parse_score("123"), 123);
        assert_eq!(parse_score("0"), 0);
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        assert_eq!(parse_score(" 45\n"), 45);
        assert_eq!(parse_score("7\r\n"), 7);
    }

    #[test]
    fn test_garbage_parses_to_zero() {
        assert_eq!(parse_score(""), 0);
        assert_eq!(parse_score("not a score"), 0);
        assert_eq!(parse_score("12.5"), 0);
        assert_eq!(parse_score("9999999999999999999"), 0);
    }

    #[test]
    fn test_qualifies_is_strict() {
        let hs = HighScore { best: 10 };
        assert!(!hs.qualifies(9));
        assert!(!hs.qualifies(10));
        assert!(hs.qualifies(11));
    }
}
