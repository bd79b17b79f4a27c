use helpers::files::{check_top_records, TestFile};
use log::info;
use ntest::timeout;
use rstest::rstest;

use top_records::{Record, Score, ScanError, ScanOptions, SkipStrategy, TopRecordsScanner};

/// Initialize the logger
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scan(file: &TestFile, top: usize, chunk_size: usize, skip: SkipStrategy) -> Result<Vec<Record>, ScanError> {
    let options = ScanOptions {
        top,
        chunk_size,
        skip,
        ..Default::default()
    };
    TopRecordsScanner::new(&file.path, options).process_file_blocking()
}

/// Compares scores; keys are only compared when the score is not tied
fn check_expected(observed: &[Record], expected: &[(Score, &str)]) {
    assert!(
        observed.len() == expected.len(),
        "Size differ {} vs {}",
        observed.len(),
        expected.len()
    );
    for (i, (record, (score, key))) in observed.iter().zip(expected.iter()).enumerate() {
        assert!(
            record.score == *score,
            "{}th element differ: {} vs ({},{})",
            i,
            record,
            score,
            key
        );
        let tied = expected.iter().filter(|(s, _)| s == score).count() > 1;
        if !tied {
            assert_eq!(record.key, *key, "{}th element key differ", i);
        }
    }
}

/// (chunk size, skip strategy) pairs; chunk size 0 is the sequential scan
const MODES: [(usize, SkipStrategy); 7] = [
    (0, SkipStrategy::Linear),
    (1, SkipStrategy::Linear),
    (2, SkipStrategy::Linear),
    (6, SkipStrategy::Linear),
    (1, SkipStrategy::ByteOffset),
    (2, SkipStrategy::ByteOffset),
    (6, SkipStrategy::ByteOffset),
];

const TIES: &str = "http://example.com 10\nhttp://example.org 10\nhttp://example.net 20\nhttp://example.info 20\nhttp://example.edu 30\nhttp://example.gov 30\n";

#[rstest]
// Empty file
#[case("", 2, vec![])]
// Single record
#[case("http://example.com 10\n", 2, vec![(10, "http://example.com")])]
// Exactly top records
#[case("http://example.com 10\nhttp://example.org 20\n", 2, vec![(20, "http://example.org"), (10, "http://example.com")])]
// Negative values
#[case("http://example.com -10\nhttp://example.org -20\n", 2, vec![(-10, "http://example.com"), (-20, "http://example.org")])]
// Large values
#[case("http://example.com 1000000000\nhttp://example.org 2000000000\n", 2, vec![(2000000000, "http://example.org"), (1000000000, "http://example.com")])]
// Three records
#[case("http://example.com 10\nhttp://example.org 20\nhttp://example.net 30\n", 3, vec![(30, "http://example.net"), (20, "http://example.org"), (10, "http://example.com")])]
// Four records
#[case("http://example.com 10\nhttp://example.org 20\nhttp://example.net 30\nhttp://example.info 40\n", 3, vec![(40, "http://example.info"), (30, "http://example.net"), (20, "http://example.org")])]
// No trailing newline, key with spaces
#[case("first key 5\nsecond key 7", 1, vec![(7, "second key")])]
// Same values
#[case("http://example.com 10\nhttp://example.org 10\nhttp://example.net 10\nhttp://example.info 10\nhttp://example.edu 10\n", 3, vec![(10, "?"), (10, "?"), (10, "?")])]
// Mixed values
#[case(TIES, 4, vec![(30, "?"), (30, "?"), (20, "?"), (20, "?")])]
// Nothing to keep
#[case("http://example.com 10\n", 0, vec![])]
fn test_process_file(#[case] content: &str, #[case] top: usize, #[case] expected: Vec<(Score, &str)>) {
    init_logger();
    let file = TestFile::new(content);
    for (chunk_size, skip) in MODES {
        let records = scan(&file, top, chunk_size, skip).expect("Error while scanning");
        check_expected(&records, &expected);
    }
}

#[rstest]
#[case("http://example.com 10\nhttp://example.org twenty\n", 2)]
#[case("http://example.com\nhttp://example.org 20\n", 1)]
#[case("a 1\n\nb 2\n", 2)]
#[case("a 1\nb 2\nc 3\nd 4\ne 5\nf 6\ng 7\nh 8.5\n", 8)]
fn test_malformed(#[case] content: &str, #[case] bad_line: usize) {
    init_logger();
    let file = TestFile::new(content);
    for (chunk_size, skip) in MODES {
        match scan(&file, 2, chunk_size, skip) {
            Err(ScanError::MalformedLine { line_number, .. }) => assert_eq!(line_number, bad_line),
            other => panic!("Expected a read failure, got {:?}", other),
        }
    }
}

#[test]
fn test_missing_file() {
    let file = TestFile::new("");
    let path = file.dir.child("missing.txt");
    for chunk_size in [0, 2] {
        let options = ScanOptions {
            chunk_size,
            ..Default::default()
        };
        let r = TopRecordsScanner::new(&path, options).process_file_blocking();
        assert!(matches!(r, Err(ScanError::SourceUnavailable { .. })));
    }
}

#[test]
fn test_repeated_records() {
    init_logger();
    let file = TestFile::new(&"http://example.com 10\nhttp://example.org 20\n".repeat(1000));
    for chunk_size in [0, 6, 1000] {
        let records = scan(&file, 2, chunk_size, SkipStrategy::Linear).unwrap();
        check_expected(&records, &[(20, "http://example.org"), (20, "http://example.org")]);
        assert!(records.iter().all(|r| r.key == "http://example.org"));
    }
}

#[rstest]
#[case(1_000, 5, 10, 1)]
#[case(5_000, 1_000_000, 100, 1)]
#[case(5_000, 20, 50, 2)]
#[case(2_000, 1_000, 3_000, 3)]
fn test_modes_agree(
    #[case] record_count: usize,
    #[case] max_score: Score,
    #[case] top: usize,
    #[case] seed: u64,
) {
    init_logger();
    let file = TestFile::random(record_count, max_score, Some(seed));
    let expected = file.expected_scores(top);

    let sequential = scan(&file, top, 0, SkipStrategy::Linear).unwrap();
    check_top_records(&sequential, &file.records, &expected);

    // Re-running gives the same (score, key) pairs
    let again = scan(&file, top, 0, SkipStrategy::Linear).unwrap();
    let pairs = |records: &[Record]| -> Vec<(Score, String)> {
        records.iter().map(|r| (r.score, r.key.clone())).collect()
    };
    assert_eq!(pairs(&sequential), pairs(&again));

    for chunk_size in [1, 7, 100, record_count] {
        for skip in [SkipStrategy::Linear, SkipStrategy::ByteOffset] {
            info!("Chunked scan ({} lines, {:?})", chunk_size, skip);
            let chunked = scan(&file, top, chunk_size, skip).unwrap();
            check_top_records(&chunked, &file.records, &expected);
        }
    }
}

#[test]
#[timeout(60000)]
fn test_many_chunks() {
    init_logger();
    let file = TestFile::random(20_000, 1_000_000, Some(4));
    let expected = file.expected_scores(10);
    let records = scan(&file, 10, 10, SkipStrategy::ByteOffset).unwrap();
    check_top_records(&records, &file.records, &expected);
}

#[test]
fn test_huge_top() {
    init_logger();
    let file = TestFile::new(TIES);
    for (chunk_size, skip) in MODES {
        let records = scan(&file, 1 << 40, chunk_size, skip).unwrap();
        check_expected(
            &records,
            &[(30, "?"), (30, "?"), (20, "?"), (20, "?"), (10, "?"), (10, "?")],
        );
    }
}
