/*!
A parity suite for emitted matchers.

Tests are described in TOML files under `data/`. The build script emits a
matcher for every test's pattern, and [`TestRunner`] searches each test's
input with its matcher, comparing what was found with what the test
expects.
*/

use std::path::Path;

use anyhow::Result;
use regex_emit::runtime::{self, Matcher};

pub use crate::suite::{RegexTest, RegexTests, Span};

mod suite;

/// The emitted matchers, one module per test.
pub mod matchers {
    include!(concat!(env!("OUT_DIR"), "/matchers.rs"));
}

const ENV_REGEX_TEST: &str = "REGEX_TEST";

/// Load every test the matchers were emitted for.
pub fn suite() -> Result<RegexTests> {
    let mut tests = RegexTests::new();
    tests.load_dir(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))?;
    Ok(tests)
}

/// Return the matcher emitted for the test with the given full name.
pub fn matcher(full_name: &str) -> Option<&'static dyn Matcher> {
    matchers::MATCHERS
        .iter()
        .find(|&&(name, _)| name == full_name)
        .map(|&(_, m)| m)
}

/// Everything a search of one test input found.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Found {
    pub matches: Vec<(usize, usize)>,
    pub captures: Vec<Vec<Span>>,
    pub names: Vec<String>,
}

/// Search the whole input with `matcher`, collecting every match.
pub fn search(matcher: &dyn Matcher, input: &str) -> Found {
    let mut found = Found {
        matches: vec![],
        captures: vec![],
        names: matcher.group_names().iter().map(|s| s.to_string()).collect(),
    };
    for m in runtime::find_iter(matcher, input) {
        found.matches.push((m.start(), m.end()));
        found.captures.push(
            m.groups()
                .iter()
                .map(|g| g.get().map(|c| (c.index(), c.end())))
                .collect(),
        );
    }
    found
}

/// A runner for executing regex tests.
///
/// If the `REGEX_TEST` environment variable is set, then it may contain a
/// comma separated list of substrings. Each substring corresponds to a
/// whitelisted item, unless it starts with a `-`, in which case it
/// corresponds to a blacklisted item. The last substring that a test name
/// matches takes precedence.
#[derive(Debug)]
pub struct TestRunner {
    include: Vec<IncludePattern>,
    passed: usize,
    skipped: usize,
    failures: Vec<String>,
}

#[derive(Debug)]
struct IncludePattern {
    blacklist: bool,
    substring: String,
}

impl TestRunner {
    pub fn new() -> Result<TestRunner> {
        let mut runner = TestRunner {
            include: vec![],
            passed: 0,
            skipped: 0,
            failures: vec![],
        };
        let filter = std::env::var(ENV_REGEX_TEST).unwrap_or_default();
        for substring in filter.split(',').map(str::trim) {
            if substring.is_empty() {
                continue;
            }
            if let Some(rest) = substring.strip_prefix('-') {
                runner.blacklist(rest);
            } else {
                runner.whitelist(substring);
            }
        }
        Ok(runner)
    }

    pub fn whitelist(&mut self, substring: &str) -> &mut TestRunner {
        self.include.push(IncludePattern {
            blacklist: false,
            substring: substring.to_string(),
        });
        self
    }

    pub fn blacklist(&mut self, substring: &str) -> &mut TestRunner {
        self.include.push(IncludePattern {
            blacklist: true,
            substring: substring.to_string(),
        });
        self
    }

    /// Run all of the given tests against their emitted matchers.
    pub fn test_all<'t, I>(&mut self, tests: I) -> &mut TestRunner
    where
        I: IntoIterator<Item = &'t RegexTest>,
    {
        for test in tests {
            if self.should_skip(test) {
                self.skipped += 1;
                continue;
            }
            self.test(test);
        }
        self
    }

    /// Run a single test, recording a failure if it does not behave as
    /// expected.
    pub fn test(&mut self, test: &RegexTest) -> &mut TestRunner {
        let matcher = match matcher(test.full_name()) {
            Some(matcher) => matcher,
            None => {
                self.fail(test, "no matcher was emitted".to_string());
                return self;
            }
        };
        let found = match safe(|| search(matcher, test.input())) {
            Ok(found) => found,
            Err(msg) => {
                self.fail(test, format!("search panicked: {}", msg));
                return self;
            }
        };
        if test.is_match() == found.matches.is_empty() {
            self.fail(test, format!("expected match: {}", test.is_match()));
        } else if let Some(expected) = test.captures() {
            if expected != found.captures {
                self.fail(test, format!("got captures {:?}", found.captures));
            } else {
                self.passed += 1;
            }
        } else if let Some(expected) = test.matches() {
            if expected != found.matches {
                self.fail(test, format!("got matches {:?}", found.matches));
            } else {
                self.passed += 1;
            }
        } else {
            self.passed += 1;
        }
        if let Some(names) = test.names() {
            if names != found.names.as_slice() {
                self.fail(test, format!("got group names {:?}", found.names));
            }
        }
        self
    }

    /// Assert that every test run has passed. If any failed, this panics
    /// with a report of all failures.
    pub fn assert(&mut self) {
        if std::env::var("REGEX_TEST_VERBOSE").map_or(false, |s| s == "1") {
            println!(
                "passed: {}, skipped: {}, failed: {}",
                self.passed,
                self.skipped,
                self.failures.len()
            );
        }
        if self.failures.is_empty() {
            return;
        }
        panic!(
            "found {} failures:\n{}\n{}\n{}\n\n\
             Set the REGEX_TEST environment variable to filter tests, \n\
             e.g., REGEX_TEST=foo,-foo2 runs every test whose name contains \n\
             foo but not foo2\n\n",
            self.failures.len(),
            "~".repeat(79),
            self.failures.join("\n\n"),
            "~".repeat(79),
        )
    }

    fn fail(&mut self, test: &RegexTest, why: String) {
        self.failures.push(format!(
            "{}: /{}/ on {:?}\n    {}",
            test.full_name(),
            test.regex(),
            test.input(),
            why
        ));
    }

    fn should_skip(&self, test: &RegexTest) -> bool {
        if self.include.is_empty() {
            return false;
        }
        let mut skip = self.include.iter().any(|pat| !pat.blacklist);
        for pat in &self.include {
            if test.full_name().contains(&pat.substring) {
                skip = pat.blacklist;
            }
        }
        skip
    }
}

fn safe<T, F>(fun: F) -> Result<T, String>
where
    F: FnOnce() -> T,
{
    use std::panic;

    panic::catch_unwind(panic::AssertUnwindSafe(fun)).map_err(|any_err| {
        if let Some(&s) = any_err.downcast_ref::<&str>() {
            s.to_owned()
        } else if let Some(s) = any_err.downcast_ref::<String>() {
            s.to_owned()
        } else {
            "UNABLE TO SHOW RESULT OF PANIC.".to_owned()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_validates() {
        let mut tests = RegexTests::new();
        tests
            .load_str(
                "unit",
                r#"
[[tests]]
regex = 'a(b)?'
input = "a ab"
captures = [[[0, 1], []], [[2, 4], [3, 4]]]

[[tests]]
name = "flags"
regex = "x"
input = "X"
options = "ir"
match = true
"#,
            )
            .unwrap();
        let all: Vec<&RegexTest> = tests.iter().collect();
        assert_eq!("unit/1", all[0].full_name());
        assert_eq!(Some(vec![(0, 1), (2, 4)]), all[0].matches());
        assert_eq!(
            Some(vec![vec![Some((0, 1)), None], vec![Some((2, 4)), Some((3, 4))]]),
            all[0].captures()
        );
        assert_eq!("unit/flags", all[1].full_name());
        assert_eq!(
            regex_emit::Options::IGNORE_CASE | regex_emit::Options::RIGHT_TO_LEFT,
            all[1].options().unwrap()
        );
    }

    #[test]
    fn rejects_ambiguous_expectations() {
        let mut tests = RegexTests::new();
        let err = tests.load_str(
            "unit",
            "[[tests]]\nregex = 'a'\ninput = 'a'\nmatch = true\nmatches = [[0, 1]]\n",
        );
        assert!(err.is_err());
        let err = tests.load_str("unit", "[[tests]]\nregex = 'a'\ninput = 'a'\noptions = 'q'\nmatch = true\n");
        assert!(err.is_err());
    }

    #[test]
    fn every_test_has_a_matcher() {
        let tests = suite().unwrap();
        assert_eq!(tests.len(), matchers::MATCHERS.len());
        for test in tests.iter() {
            assert!(matcher(test.full_name()).is_some(), "{}", test.full_name());
        }
    }
}
