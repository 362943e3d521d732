/*!
This crate compiles regular expressions into specialized backtracking
matchers, emitted as Rust source.

The pipeline has three stages, each exposed as its own module:

* [`syntax`] parses a pattern into a syntax tree, recording its capture
  groups and reporting precise errors for malformed patterns.
* [`ir`] lowers the tree into a flat instruction stream and analyzes it
  for anchors and literal prefixes.
* [`compiler`] turns the instruction stream into the source of a matcher:
  a type implementing [`runtime::Matcher`] whose match routine is
  straight-line code specialized to the pattern.

Emitted matchers are compiled into the crate that uses them (typically from
a build script) and run on top of the small [`runtime`] module.

# Example

```
use regex_emit::{compiler, Builder, Options};

let emitted = Builder::new()
    .syntax(regex_emit::syntax::Config::new().options(Options::IGNORE_CASE))
    .compiler(compiler::Config::new().module(Some("date")).struct_name("Date"))
    .build(r"(?<year>\d{4})-(?<month>\d{2})")?;
assert!(emitted.source().contains("pub mod date {"));
assert_eq!(vec!["0", "year", "month"], emitted.program().group_names());
# Ok::<(), regex_emit::Error>(())
```

# Crate features

* **logging** - Logs what the parser and the compiler decide, via the `log`
  crate. Disabled by default.
*/

pub use crate::{
    error::{Error, ErrorKind},
    options::{Options, OptionsError},
    util::culture::Culture,
};

use crate::{
    compiler::{BacktrackOperation, Compiled, Compiler},
    ir::Program,
    util::{anchors::AnchorSet, escape},
};

#[macro_use]
mod macros;

pub mod codegen;
pub mod compiler;
mod error;
pub mod ir;
mod options;
pub mod runtime;
pub mod syntax;
pub mod util;

/// Parse, lower and compile a pattern in one step, returning the emitted
/// source of a matcher named `Pattern`.
pub fn emit(pattern: &str, options: Options) -> Result<String, Error> {
    Builder::new()
        .syntax(syntax::Config::new().options(options))
        .build(pattern)
        .map(Emitted::into_source)
}

/// A builder for emitting a matcher from a pattern.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    syntax: syntax::Config,
    compiler: compiler::Config,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Set the parser configuration.
    pub fn syntax(&mut self, config: syntax::Config) -> &mut Builder {
        self.syntax = self.syntax.overwrite(config);
        self
    }

    /// Set the configuration of the emitted source.
    pub fn compiler(&mut self, config: compiler::Config) -> &mut Builder {
        self.compiler = self.compiler.clone().overwrite(config);
        self
    }

    /// Build a matcher for `pattern`.
    ///
    /// The options are checked before the pattern is parsed, so an invalid
    /// option combination is reported even for a malformed pattern.
    pub fn build(&self, pattern: &str) -> Result<Emitted, Error> {
        self.syntax.get_options().validate()?;
        let ast = self.syntax.parse(pattern)?;
        let program = Program::from_ast(&ast);
        let mut compiler = Compiler::new();
        compiler.configure(self.compiler.clone());
        let compiled = compiler.compile(&program);
        Ok(Emitted { pattern: pattern.to_string(), program, compiled })
    }
}

/// The result of building a matcher: its source, along with the program it
/// was compiled from.
#[derive(Clone, Debug)]
pub struct Emitted {
    pattern: String,
    program: Program,
    compiled: Compiled,
}

impl Emitted {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The emitted matcher source, without a header.
    pub fn source(&self) -> &str {
        self.compiled.source()
    }

    /// The emitted source, preceded by a comment naming the pattern.
    pub fn into_source(self) -> String {
        let mut out = format!(
            "// Generated by regex-emit. Do not edit.\n// pattern: {}\n\n",
            escape::comment(&self.pattern)
        );
        out.push_str(self.compiled.source());
        out
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The anchors found at either end of the pattern.
    pub fn anchors(&self) -> AnchorSet {
        self.program.anchors()
    }

    pub fn backtracks(&self) -> &[BacktrackOperation] {
        self.compiled.backtracks()
    }

    pub fn compiled(&self) -> &Compiled {
        &self.compiled
    }
}
