use std::fmt::Write;
use std::path::PathBuf;

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use temp_dir::TempDir;

use top_records::{Record, Score};

/// An input file living in a temporary directory
pub struct TestFile {
    pub dir: TempDir,
    pub path: PathBuf,
    /// The records written in the file (empty if the content was given)
    pub records: Vec<Record>,
}

impl TestFile {
    pub fn new(content: &str) -> Self {
        let dir = TempDir::new().expect("Could not create temporary directory");
        let path = dir.child("input.txt");
        std::fs::write(&path, content).expect("Could not write the input file");
        Self {
            dir,
            path,
            records: Vec::new(),
        }
    }

    /// Writes `record_count` random records. Scores are drawn in
    /// `[-max_score, max_score]` so that ties are frequent when `max_score`
    /// is small; keys may contain spaces.
    pub fn random(record_count: usize, max_score: Score, seed: Option<u64>) -> Self {
        let mut rng = if let Some(seed) = seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };

        let mut content = String::new();
        let mut records = Vec::with_capacity(record_count);
        for ix in 0..record_count {
            let score = rng.gen_range(-max_score..=max_score);
            let key = if rng.gen_bool(0.1) {
                format!("http://example.com/page {}", ix)
            } else {
                format!("http://example.com/{}", ix)
            };
            writeln!(content, "{} {}", key, score).expect("Could not format");
            records.push(Record::new(score, key));
        }
        debug!("Generated {} records", record_count);

        let mut file = Self::new(&content);
        file.records = records;
        file
    }

    /// Scores of the top `k` generated records, in descending order
    pub fn expected_scores(&self, k: usize) -> Vec<Score> {
        let mut scores: Vec<Score> = self.records.iter().map(|r| r.score).collect();
        scores.sort_unstable_by(|a, b| b.cmp(a));
        scores.truncate(k);
        scores
    }
}

/// Checks that `records` is a valid top-`k` of `all`: sorted by
/// decreasing score, with the expected scores, and made of ingested
/// (key, score) pairs
pub fn check_top_records(records: &[Record], all: &[Record], expected_scores: &[Score]) {
    let observed: Vec<Score> = records.iter().map(|r| r.score).collect();
    assert_eq!(observed, expected_scores, "Scores differ");
    for record in records {
        assert!(
            all.iter()
                .any(|r| r.score == record.score && r.key == record.key),
            "Record {} was not in the input",
            record
        );
    }
}
