use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type Score = i64;

/// Line number within the input (0-based unless stated otherwise)
pub type LineNumber = usize;

/// A record = key + score
///
/// Records are ordered (and compared for equality) on the score only: two
/// records with the same score but different keys are equal for `Ord`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Record {
    pub score: Score,
    pub key: String,
}

impl Record {
    pub fn new(score: Score, key: impl Into<String>) -> Self {
        Self {
            score,
            key: key.into(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.score, self.key)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for Record {}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.cmp(&other.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison() {
        let r1 = Record::new(10, "http://example.com");
        let r2 = Record::new(20, "http://example.org");
        assert!(r1 < r2);
        assert!(r1 <= r2);
        assert!(r2 > r1);
        assert!(r2 >= r1);
        assert!(r1 != r2);
    }

    #[test]
    fn test_key_ignored() {
        let r1 = Record::new(10, "http://example.com");
        let r2 = Record::new(10, "http://example.org");
        assert_eq!(r1, r2);
        assert_eq!(r1.cmp(&r2), Ordering::Equal);
        assert_ne!(r1.key, r2.key);
    }

    #[test]
    fn test_display() {
        assert_eq!(Record::new(-3, "a b").to_string(), "(-3,a b)");
    }
}
