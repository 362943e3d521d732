use std::collections::HashSet;

use quickcheck::{quickcheck, TestResult};
use regex_emit::{syntax, Builder, Options};

/// Pattern pieces that stay valid in any order.
const PIECES: &[&str] = &[
    "a", "b", "xyz", "[a-c]", "[^q]", ".", r"\d", r"\w+", "a*", "b+?",
    "c{2,4}", "(a|bc)", "(?:ab)*", "(?<n>x)", "(?=a)", "(?!b)", "(?<=c)",
    "(?>d+)", "^", "$", r"\b", "(e|)", "(?i:Q)",
];

fn pattern(picks: &[u8]) -> String {
    picks.iter().map(|&i| PIECES[i as usize % PIECES.len()]).collect()
}

fn options(bits: u8) -> Options {
    let mut options = Options::NONE;
    if bits & 1 != 0 {
        options |= Options::IGNORE_CASE;
    }
    if bits & 2 != 0 {
        options |= Options::MULTILINE;
    }
    if bits & 4 != 0 {
        options |= Options::RIGHT_TO_LEFT;
    }
    if bits & 8 != 0 {
        options |= Options::SINGLELINE;
    }
    options
}

quickcheck! {
    fn prop_emit_is_deterministic(picks: Vec<u8>, bits: u8) -> TestResult {
        let pattern = pattern(&picks);
        let config = syntax::Config::new().options(options(bits));
        let first = match Builder::new().syntax(config).build(&pattern) {
            Ok(emitted) => emitted.into_source(),
            Err(err) => return TestResult::error(err.to_string()),
        };
        let second = Builder::new()
            .syntax(config)
            .build(&pattern)
            .unwrap()
            .into_source();
        TestResult::from_bool(first == second)
    }

    fn prop_backtrack_tags_are_unique(picks: Vec<u8>, bits: u8) -> bool {
        let pattern = pattern(&picks);
        let config = syntax::Config::new().options(options(bits));
        let emitted = Builder::new().syntax(config).build(&pattern).unwrap();
        let mut seen = HashSet::new();
        emitted
            .backtracks()
            .iter()
            .all(|op| seen.insert((op.op_id(), op.is_secondary())))
            && emitted
                .backtracks()
                .iter()
                .enumerate()
                .all(|(i, op)| op.tag() == i)
    }

    fn prop_jump_targets_are_labeled(picks: Vec<u8>) -> bool {
        let emitted = Builder::new().build(&pattern(&picks)).unwrap();
        let labels = emitted.compiled().labels();
        labels.contains(&0)
            && emitted
                .program()
                .operations()
                .iter()
                .filter_map(|op| op.op().target())
                .all(|t| labels.contains(&t))
    }
}
