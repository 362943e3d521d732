// Emits a matcher for every test in data/ into $OUT_DIR/matchers.rs. Each
// matcher lives in its own module, and MATCHERS maps test names to them.

use std::env;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex_emit::{compiler, syntax, Builder};

#[path = "src/suite.rs"]
mod suite;

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=data");
    println!("cargo:rerun-if-changed=src/suite.rs");

    let manifest = env::var("CARGO_MANIFEST_DIR")?;
    let mut tests = suite::RegexTests::new();
    tests.load_dir(Path::new(&manifest).join("data"))?;

    let mut out = String::new();
    let mut table = String::new();
    for (i, test) in tests.iter().enumerate() {
        let module = format!("m{}", i);
        let options = test.options()?;
        let emitted = Builder::new()
            .syntax(
                syntax::Config::new().options(options).culture(test.culture()),
            )
            .compiler(compiler::Config::new().module(Some(&module)))
            .build(test.regex())
            .with_context(|| {
                format!("failed to emit a matcher for '{}'", test.full_name())
            })?;
        out.push_str(&emitted.into_source());
        out.push('\n');
        writeln!(table, "    ({:?}, &{}::Pattern),", test.full_name(), module)?;
    }
    writeln!(
        out,
        "pub const MATCHERS: &[(&str, &dyn regex_emit::runtime::Matcher)] = &[\n{}];",
        table
    )?;

    let dest = Path::new(&env::var("OUT_DIR")?).join("matchers.rs");
    fs::write(&dest, out)
        .with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(())
}
