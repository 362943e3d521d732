/*!
The automaton compiler: turns a [`Program`] into the Rust source of a
matcher specialized to it.

The emitted source defines a unit struct implementing
[`runtime::Matcher`](crate::runtime::Matcher). Its match routine is a
goto-machine: a `loop` over a `match` on the current state, with one arm
per labeled instruction and one `BACKTRACK` arm that pops a tag off the
track stack and runs the resumption code registered for it. Labeled
instructions are the entry point, jump targets and the instructions that
backtracking resumes at. All other instructions share the arm of the
nearest label before them, so straight-line code stays straight.

Compilation is infallible: [`Program::new`] already rejected anything that
violates the instruction stream's contract. It is also deterministic, so
compiling the same program twice produces identical source.

# Example

```
use regex_emit::{compiler::Compiler, ir::Program, syntax, Options};

let ast = syntax::parse(r"(\d+)-(\d+)", Options::empty())?;
let program = Program::from_ast(&ast);
let compiled = Compiler::new().compile(&program);
assert!(compiled.source().contains("impl Matcher for Pattern"));
assert!(!compiled.backtracks().is_empty());
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use std::collections::BTreeSet;

use crate::{
    codegen::SourceWriter,
    ir::{Op, Program},
    util::{anchors::AnchorSet, escape},
};

pub use self::backtrack::BacktrackOperation;

mod backtrack;
mod forward;
mod start;

/// The configuration of the generated source.
#[derive(Clone, Debug, Default)]
pub struct Config {
    module: Option<Option<String>>,
    struct_name: Option<String>,
    runtime_path: Option<String>,
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    /// Wrap the generated items in `pub mod name { .. }`. By default the
    /// items are emitted at the top level of the output.
    pub fn module(mut self, name: Option<&str>) -> Config {
        self.module = Some(name.map(|s| s.to_string()));
        self
    }

    /// The name of the generated matcher type. Defaults to `Pattern`.
    pub fn struct_name(mut self, name: &str) -> Config {
        self.struct_name = Some(name.to_string());
        self
    }

    /// The path of the runtime module that generated code imports from.
    /// Defaults to `regex_emit::runtime`. Crates that re-export the runtime
    /// can point this at their re-export.
    pub fn runtime_path(mut self, path: &str) -> Config {
        self.runtime_path = Some(path.to_string());
        self
    }

    pub fn get_module(&self) -> Option<&str> {
        self.module.as_ref().and_then(|m| m.as_deref())
    }

    pub fn get_struct_name(&self) -> &str {
        self.struct_name.as_deref().unwrap_or("Pattern")
    }

    pub fn get_runtime_path(&self) -> &str {
        self.runtime_path.as_deref().unwrap_or("regex_emit::runtime")
    }

    /// Overwrite the default configuration such that the options in `o` are
    /// always used. If an option in `o` is not set, then the corresponding
    /// option in `self` is used.
    pub(crate) fn overwrite(self, o: Config) -> Config {
        Config {
            module: o.module.or(self.module),
            struct_name: o.struct_name.or(self.struct_name),
            runtime_path: o.runtime_path.or(self.runtime_path),
        }
    }
}

/// How the start-position search was specialized.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StartStrategy {
    /// Positional anchors clamp or reject the starting position.
    Anchors(AnchorSet),
    /// A literal prefix is searched for with a skip table.
    Skip,
    /// Scan for the only possible first char.
    FirstChar(char),
    /// Scan for a char in the first-char class.
    FirstClass,
    /// Every position is a candidate.
    Anywhere,
}

/// The output of a compilation.
#[derive(Clone, Debug)]
pub struct Compiled {
    source: String,
    backtracks: Vec<BacktrackOperation>,
    labels: Vec<usize>,
    start: StartStrategy,
}

impl Compiled {
    /// The generated source.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn into_source(self) -> String {
        self.source
    }

    /// Every backtrack operation, ordered by tag.
    pub fn backtracks(&self) -> &[BacktrackOperation] {
        &self.backtracks
    }

    /// The ids of the instructions that begin a state of the match routine.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn start_strategy(&self) -> StartStrategy {
        self.start
    }
}

/// Which optional items the generated code refers to.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Needs {
    pub(crate) culture: bool,
    pub(crate) char_in_class: bool,
    pub(crate) skip: bool,
}

/// A compiler for programs.
#[derive(Clone, Debug, Default)]
pub struct Compiler {
    config: Config,
}

impl Compiler {
    pub fn new() -> Compiler {
        Compiler::default()
    }

    pub fn configure(&mut self, config: Config) -> &mut Compiler {
        self.config = self.config.clone().overwrite(config);
        self
    }

    /// Compile a program into matcher source.
    pub fn compile(&self, program: &Program) -> Compiled {
        let labels = labels(program);
        let mut needs = Needs::default();

        let mut start_w = SourceWriter::new();
        let start = start::emit(program, &mut start_w, &mut needs);

        let mut go_w = SourceWriter::new();
        let backtracks = forward::emit(program, &labels, &mut go_w, &mut needs);

        let name = self.config.get_struct_name();
        let mut w = SourceWriter::new();
        self.emit_header(program, &needs, &mut w);
        w.line(format!("pub struct {};", name));
        w.blank();
        w.open(format!("impl Matcher for {}", name));
        w.line("#[allow(unused_variables)]");
        w.open("fn find_first_char(&self, r: &mut Runner) -> bool");
        w.append(start_w);
        w.close();
        w.blank();
        w.line(
            "#[allow(unused_variables, unused_mut, unused_assignments, \
             unreachable_code, unused_labels, clippy::all)]",
        );
        w.open("fn go(&self, r: &mut Runner)");
        w.append(go_w);
        w.close();
        w.blank();
        w.open("fn track_count(&self) -> usize");
        w.line(program.track_count().to_string());
        w.close();
        w.blank();
        w.open("fn capture_numbers(&self) -> &'static [u32]");
        w.line("CAPTURE_NUMBERS");
        w.close();
        w.blank();
        w.open("fn group_names(&self) -> &'static [&'static str]");
        w.line("GROUP_NAMES");
        w.close();
        w.blank();
        w.open("fn right_to_left(&self) -> bool");
        w.line(program.is_right_to_left().to_string());
        w.close();
        w.close();
        if let Some(module) = self.config.get_module() {
            w.wrap_module(module, &["#[allow(dead_code)]"]);
        }

        debug!(
            "compiled {} operations into {} states with {} backtrack tags, \
             start search: {:?}",
            program.operations().len(),
            labels.len(),
            backtracks.len(),
            start,
        );
        Compiled {
            source: w.finish(),
            backtracks,
            labels: labels.into_iter().collect(),
            start,
        }
    }

    fn emit_header(&self, program: &Program, needs: &Needs, w: &mut SourceWriter) {
        let rt = self.config.get_runtime_path();
        let mut imports = vec!["Matcher", "Runner"];
        if needs.culture {
            imports.push("Culture");
        }
        if needs.char_in_class {
            imports.push("char_in_class");
        }
        if needs.skip {
            imports.push("SkipTable");
        }
        imports.sort();
        w.line(format!("use {}::{{{}}};", rt, imports.join(", ")));
        w.blank();
        if needs.culture {
            w.line(format!(
                "const CULTURE: Culture = {};",
                program.culture().rust_path()
            ));
        }
        for (i, cls) in program.classes().iter().enumerate() {
            w.line(format!(
                "const CLASS_{}: &[(char, char)] = {};",
                i,
                ranges_literal(cls.ranges())
            ));
        }
        if let Some(first) = program.first_chars() {
            if first.single_char().is_none() {
                w.line(format!(
                    "const FIRST_CHARS: &[(char, char)] = {};",
                    ranges_literal(first.class().ranges())
                ));
            }
        }
        if needs.skip {
            if let Some(skip) = program.skip() {
                let literal: Vec<String> =
                    skip.literal().iter().map(|&c| escape::char_literal(c)).collect();
                let shifts: Vec<String> = skip
                    .shifts()
                    .iter()
                    .map(|&(c, n)| format!("({}, {})", escape::char_literal(c), n))
                    .collect();
                w.line(format!(
                    "static SKIP: SkipTable = SkipTable::new(&[{}], &[{}], {}, {}, CULTURE);",
                    literal.join(", "),
                    shifts.join(", "),
                    skip.is_ignore_case(),
                    skip.is_right_to_left(),
                ));
            }
        }
        let numbers: Vec<String> =
            program.capture_numbers().iter().map(|n| n.to_string()).collect();
        w.line(format!("const CAPTURE_NUMBERS: &[u32] = &[{}];", numbers.join(", ")));
        let names: Vec<String> =
            program.group_names().iter().map(|n| escape::str_literal(n)).collect();
        w.line(format!("const GROUP_NAMES: &[&str] = &[{}];", names.join(", ")));
        w.line(format!(
            "const BACKTRACK: usize = {};",
            program.operations().len()
        ));
        w.blank();
    }
}

/// Compute the labeled instructions: the entry point, every jump target,
/// and every instruction that a backtrack resumption continues at.
fn labels(program: &Program) -> BTreeSet<usize> {
    let count = program.operations().len();
    let mut labels = BTreeSet::new();
    labels.insert(0);
    for op in program.operations() {
        if let Some(target) = op.op().target() {
            labels.insert(target);
        }
        if resumes_at_next(op.op()) && op.id() + 1 < count {
            labels.insert(op.id() + 1);
        }
    }
    labels
}

/// Returns true for instructions whose backtrack resumption continues with
/// the following instruction.
fn resumes_at_next(op: &Op) -> bool {
    matches!(
        *op,
        Op::Branchmark(_)
            | Op::Branchcount { .. }
            | Op::Oneloop { .. }
            | Op::Notoneloop { .. }
            | Op::Setloop { .. }
            | Op::Onelazy { .. }
            | Op::Notonelazy { .. }
            | Op::Setlazy { .. }
    )
}

fn ranges_literal(ranges: &[(char, char)]) -> String {
    let parts: Vec<String> = ranges
        .iter()
        .map(|&(s, e)| {
            format!("({}, {})", escape::char_literal(s), escape::char_literal(e))
        })
        .collect();
    format!("&[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{options::Options, syntax};

    fn compile(pattern: &str, options: Options) -> Compiled {
        let ast = syntax::parse(pattern, options).unwrap();
        Compiler::new().compile(&Program::from_ast(&ast))
    }

    #[test]
    fn deterministic() {
        let a = compile(r"(?<y>\d{4})-(?<m>\d\d)|x*?y", Options::empty());
        let b = compile(r"(?<y>\d{4})-(?<m>\d\d)|x*?y", Options::empty());
        assert_eq!(a.source(), b.source());
    }

    #[test]
    fn tags_match_dispatcher_cases() {
        let c = compile(r"(a|b)*?c+(?>d)(?!e)\1", Options::empty());
        let at = c.source().find("BACKTRACK => match").unwrap();
        let dispatcher = &c.source()[at..];
        for bt in c.backtracks() {
            let case = format!(" {} => {{", bt.tag());
            assert_eq!(1, dispatcher.matches(&case).count(), "tag {}", bt.tag());
        }
        let mut pairs: Vec<(usize, bool)> =
            c.backtracks().iter().map(|b| (b.op_id(), b.is_secondary())).collect();
        pairs.sort();
        pairs.dedup();
        assert_eq!(c.backtracks().len(), pairs.len());
    }

    #[test]
    fn labels_cover_targets() {
        let ast = syntax::parse("a|b", Options::empty()).unwrap();
        let program = Program::from_ast(&ast);
        let c = Compiler::new().compile(&program);
        for op in program.operations() {
            if let Some(t) = op.op().target() {
                assert!(c.labels().contains(&t));
            }
        }
        assert_eq!(0, c.labels()[0]);
    }

    #[test]
    fn config() {
        let ast = syntax::parse("a", Options::empty()).unwrap();
        let mut compiler = Compiler::new();
        compiler.configure(
            Config::new()
                .module(Some("m"))
                .struct_name("Letter")
                .runtime_path("crate::rt"),
        );
        let src = compiler.compile(&Program::from_ast(&ast)).into_source();
        assert!(src.contains("pub mod m {"));
        assert!(src.contains("pub struct Letter;"));
        assert!(src.contains("use crate::rt::{"));
    }

    #[test]
    fn start_strategies() {
        let anchored = compile("^a+b$", Options::empty()).start_strategy();
        assert!(matches!(anchored, StartStrategy::Anchors(_)));
        assert_eq!(
            StartStrategy::FirstChar('f'),
            compile("foo|foobar", Options::empty()).start_strategy()
        );
        assert_eq!(StartStrategy::Skip, compile("foo\\d", Options::empty()).start_strategy());
        assert_eq!(
            StartStrategy::FirstChar('x'),
            compile("x\\d", Options::empty()).start_strategy()
        );
        assert_eq!(
            StartStrategy::FirstClass,
            compile("[xy]z", Options::empty()).start_strategy()
        );
        assert_eq!(StartStrategy::Anywhere, compile("a*", Options::empty()).start_strategy());
    }

    #[test]
    fn unscanned_start_allows_unused_runner() {
        let c = compile("a*", Options::empty());
        let lines: Vec<&str> = c.source().lines().map(str::trim).collect();
        let at = lines
            .iter()
            .position(|&l| l == "fn find_first_char(&self, r: &mut Runner) -> bool {")
            .unwrap();
        assert_eq!("#[allow(unused_variables)]", lines[at - 1]);
        assert_eq!("true", lines[at + 1]);
    }
}
