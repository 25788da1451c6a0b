//! FILENAME: tests/test_logging.rs
//! The unified log file receives selector activity in seq|level|category|message form.

mod common;

use common::TestHarness;
use range_selector::logging::{close_log_file, init_log_file, log_path};

#[test]
fn test_log_file_lines() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("logs").join("selector.log");

    let opened = init_log_file(&path).expect("log file opens");
    assert_eq!(opened, path);
    assert_eq!(log_path(), Some(path.clone()));

    let mut harness = TestHarness::focused();
    harness.type_text("A1:B2");
    harness.engine.dispose();
    close_log_file();
    assert_eq!(log_path(), None);

    let contents = std::fs::read_to_string(&path).expect("log file readable");
    let lines: Vec<&str> = contents.lines().collect();
    assert!(!lines.is_empty());

    let mut last_seq = 0u64;
    for line in &lines {
        let fields: Vec<&str> = line.splitn(4, '|').collect();
        assert_eq!(fields.len(), 4, "malformed line {:?}", line);
        let seq: u64 = fields[0].parse().expect("numeric sequence");
        assert!(seq > last_seq);
        last_seq = seq;
        assert!(["D", "I", "W", "E"].contains(&fields[1]));
    }

    assert!(lines.iter().any(|l| l.contains("|I|SYNC|created")));
    assert!(lines.iter().any(|l| l.contains("|D|STATE|")));
    assert!(lines.iter().any(|l| l.contains("|D|SCHED|")));
    assert!(lines.iter().any(|l| l.contains("|I|SYNC|disposed")));
}
