// This module is shared by the build script, which emits a matcher for every
// test, and the library, which runs them. Each side uses part of it.
#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use regex_emit::{Culture, Options};
use serde::Deserialize;

/// A collection of regex tests.
#[derive(Clone, Debug, Deserialize)]
pub struct RegexTests {
    tests: Vec<RegexTest>,
    #[serde(skip)]
    seen: HashSet<String>,
}

/// A regex test describes a pattern, an input and the expected outcome of
/// searching the input for every non-overlapping match.
///
/// Offsets are counted in chars.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegexTest {
    #[serde(skip)]
    group: String,
    #[serde(default)]
    name: String,
    #[serde(skip)]
    full_name: String,
    regex: String,
    input: String,
    /// Starting options as inline flag letters, plus `r` for right-to-left,
    /// `e` for ECMAScript and `c` for culture-invariant.
    #[serde(default)]
    options: String,
    #[serde(default)]
    culture: CultureName,
    #[serde(rename = "match")]
    is_match: Option<bool>,
    matches: Option<Vec<[usize; 2]>>,
    /// For each match, the span of every group ordered by number. An empty
    /// array marks a group that did not participate.
    captures: Option<Vec<Vec<Vec<usize>>>>,
    /// The expected display name of every group ordered by number.
    names: Option<Vec<String>>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum CultureName {
    Invariant,
    Turkic,
}

impl Default for CultureName {
    fn default() -> CultureName {
        CultureName::Invariant
    }
}

/// A group span, or `None` when the group did not participate.
pub type Span = Option<(usize, usize)>;

impl RegexTests {
    pub fn new() -> RegexTests {
        RegexTests { tests: vec![], seen: HashSet::new() }
    }

    /// Load every `.toml` file in `dir`, in file name order.
    pub fn load_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        let mut paths = vec![];
        for entry in fs::read_dir(dir)
            .with_context(|| format!("failed to read {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();
        for path in paths {
            self.load(&path)?;
        }
        Ok(())
    }

    /// Loads all of the tests in the given TOML file. The group name assigned
    /// to each test is the stem of the file name.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let group_name = path
            .file_stem()
            .with_context(|| {
                format!("failed to get file name of {}", path.display())
            })?
            .to_str()
            .with_context(|| {
                format!("invalid UTF-8 found in {}", path.display())
            })?;
        self.load_str(group_name, &data)
            .with_context(|| format!("error loading {}", path.display()))?;
        Ok(())
    }

    /// Load all of the TOML encoded tests in `data` into this collection.
    /// The given group name is assigned to all loaded tests.
    pub fn load_str(&mut self, group_name: &str, data: &str) -> Result<()> {
        let mut index = 1;
        let mut tests: RegexTests =
            toml::from_str(data).context("error decoding TOML")?;
        for t in &mut tests.tests {
            t.group = group_name.to_string();
            if t.name.is_empty() {
                t.name = format!("{}", index);
                index += 1;
            }
            t.full_name = format!("{}/{}", t.group, t.name);
            t.validate().with_context(|| {
                format!("error loading test '{}'", t.full_name())
            })?;
            if self.seen.contains(t.full_name()) {
                bail!("found duplicate tests for name '{}'", t.full_name());
            }
            self.seen.insert(t.full_name().to_string());
        }
        self.tests.extend(tests.tests);
        Ok(())
    }

    /// Iterate over all tests in the order they were loaded.
    pub fn iter(&self) -> std::slice::Iter<'_, RegexTest> {
        self.tests.iter()
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl RegexTest {
    fn validate(&self) -> Result<()> {
        let count = [
            self.is_match.is_some(),
            self.matches.is_some(),
            self.captures.is_some(),
        ]
        .iter()
        .filter(|&&set| set)
        .count();
        if count != 1 {
            bail!("exactly one of 'match', 'matches' or 'captures' must be present");
        }
        if let Some(ref captures) = self.captures {
            for span in captures.iter().flatten() {
                if span.len() != 0 && span.len() != 2 {
                    bail!("a capture span must be [] or [start, end]");
                }
            }
        }
        self.options().map(|_| ())
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The group name joined with the test name via a `/`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn regex(&self) -> &str {
        &self.regex
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// The starting options of the pattern.
    pub fn options(&self) -> Result<Options> {
        let mut options = Options::empty();
        for ch in self.options.chars() {
            options |= match ch {
                'r' => Options::RIGHT_TO_LEFT,
                'e' => Options::ECMASCRIPT,
                'c' => Options::CULTURE_INVARIANT,
                ch => match Options::from_inline_flag(ch) {
                    Some(option) => option,
                    None => bail!("unknown option flag '{}'", ch),
                },
            };
        }
        Ok(options)
    }

    pub fn culture(&self) -> Culture {
        match self.culture {
            CultureName::Invariant => Culture::Invariant,
            CultureName::Turkic => Culture::Turkic,
        }
    }

    /// Returns true if the test expects at least one match.
    pub fn is_match(&self) -> bool {
        if let Some(yes) = self.is_match {
            yes
        } else if let Some(ref matches) = self.matches {
            !matches.is_empty()
        } else {
            self.captures.as_ref().map_or(false, |c| !c.is_empty())
        }
    }

    /// The spans of every expected match, if the test gives them.
    pub fn matches(&self) -> Option<Vec<(usize, usize)>> {
        if let Some(ref matches) = self.matches {
            return Some(matches.iter().map(|m| (m[0], m[1])).collect());
        }
        self.captures().map(|all| {
            all.iter().filter_map(|groups| groups.get(0).copied().flatten()).collect()
        })
    }

    /// The group spans of every expected match, if the test gives them.
    pub fn captures(&self) -> Option<Vec<Vec<Span>>> {
        self.captures.as_ref().map(|all| {
            all.iter()
                .map(|groups| {
                    groups
                        .iter()
                        .map(|span| match span.as_slice() {
                            [start, end] => Some((*start, *end)),
                            _ => None,
                        })
                        .collect()
                })
                .collect()
        })
    }

    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }
}
