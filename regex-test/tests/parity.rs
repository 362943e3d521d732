use regex_emit::runtime;
use regex_test::{matcher, suite, TestRunner};

#[test]
fn parity() -> anyhow::Result<()> {
    let tests = suite()?;
    TestRunner::new()?.test_all(tests.iter()).assert();
    Ok(())
}

#[test]
fn named_groups() {
    let m = matcher("captures/named-date").unwrap();
    let found = runtime::find(m, "2024-05").unwrap();
    assert_eq!((0, 7), (found.start(), found.end()));
    assert_eq!("2024", found.name("year").unwrap().as_str());
    assert_eq!("05", found.name("month").unwrap().as_str());
    assert_eq!(Some(2), found.name("month").map(|g| g.number()));
}

#[test]
fn backreference() {
    let m = matcher("captures/backref").unwrap();
    let found = runtime::find(m, "aa").unwrap();
    assert_eq!("aa", found.as_str());
    assert_eq!("a", found.group(1).unwrap().as_str());
    assert!(runtime::find(m, "ab").is_none());
}

#[test]
fn anchored_at_both_ends() {
    let m = matcher("anchors/both-ends").unwrap();
    assert!(runtime::is_match(m, "aaab"));
    assert!(!runtime::is_match(m, "xaab"));
    assert!(!runtime::is_match(m, "b"));
}

#[test]
fn capture_history() {
    let m = matcher("captures/last-iteration").unwrap();
    let found = runtime::find(m, "ababab").unwrap();
    let group = found.group(1).unwrap();
    assert_eq!(3, group.captures().len());
    assert_eq!(4, group.get().unwrap().index());
}

#[test]
fn right_to_left_finds_the_last_match() {
    let m = matcher("rtl/literal").unwrap();
    assert!(m.right_to_left());
    let all: Vec<usize> =
        runtime::find_iter(m, "ab ab ab").map(|found| found.start()).collect();
    assert_eq!(vec![6, 3, 0], all);
    assert_eq!(6, runtime::find(m, "ab ab ab").unwrap().start());
}
