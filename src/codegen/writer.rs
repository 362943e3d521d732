/// A line-oriented buffer for generated Rust source.
///
/// The writer tracks the current scope depth, so callers only ever say
/// "open a scope" or "close a scope" and never write braces or indentation
/// themselves. Scopes must be balanced by the time [`SourceWriter::finish`]
/// is called.
#[derive(Clone, Debug, Default)]
pub struct SourceWriter {
    lines: Vec<String>,
    depth: usize,
}

const INDENT: &str = "    ";

impl SourceWriter {
    pub fn new() -> SourceWriter {
        SourceWriter::default()
    }

    /// The current scope depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Write a line at the current depth.
    pub fn line<T: AsRef<str>>(&mut self, line: T) {
        let line = line.as_ref();
        if line.is_empty() {
            self.lines.push(String::new());
            return;
        }
        let mut out = String::with_capacity(self.depth * 4 + line.len());
        for _ in 0..self.depth {
            out.push_str(INDENT);
        }
        out.push_str(line);
        self.lines.push(out);
    }

    /// Write a statement, terminating it with `;`.
    pub fn stmt<T: AsRef<str>>(&mut self, stmt: T) {
        self.line(format!("{};", stmt.as_ref()));
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn comment<T: AsRef<str>>(&mut self, text: T) {
        self.line(format!("// {}", text.as_ref()));
    }

    /// Declare an immutable local.
    pub fn declare<T: AsRef<str>>(&mut self, name: &str, value: T) {
        self.line(format!("let {} = {};", name, value.as_ref()));
    }

    /// Declare a mutable local.
    pub fn declare_mut<T: AsRef<str>>(&mut self, name: &str, value: T) {
        self.line(format!("let mut {} = {};", name, value.as_ref()));
    }

    /// Open a scope: writes `header {` and indents what follows.
    pub fn open<T: AsRef<str>>(&mut self, header: T) {
        let header = header.as_ref();
        if header.is_empty() {
            self.line("{");
        } else {
            self.line(format!("{} {{", header));
        }
        self.depth += 1;
    }

    pub fn open_if<T: AsRef<str>>(&mut self, cond: T) {
        self.open(format!("if {}", cond.as_ref()));
    }

    pub fn open_while<T: AsRef<str>>(&mut self, cond: T) {
        self.open(format!("while {}", cond.as_ref()));
    }

    /// Close the innermost `if` scope and open its `else` branch.
    pub fn open_else(&mut self) {
        self.dedent();
        self.line("} else {");
        self.depth += 1;
    }

    /// Close the innermost scope.
    pub fn close(&mut self) {
        self.dedent();
        self.line("}");
    }

    /// Close the innermost scope, following the brace with `suffix`, as in
    /// `};` or `},`.
    pub fn close_with(&mut self, suffix: &str) {
        self.dedent();
        self.line(format!("}}{}", suffix));
    }

    fn dedent(&mut self) {
        assert!(self.depth > 0, "closed more scopes than were opened");
        self.depth -= 1;
    }

    /// Run `f` inside a scope opened with `header`.
    pub fn scope<T, F>(&mut self, header: &str, f: F) -> T
    where
        F: FnOnce(&mut SourceWriter) -> T,
    {
        self.open(header);
        let ret = f(self);
        self.close();
        ret
    }

    /// Append the lines of `other`, re-indented to the current depth.
    pub fn append(&mut self, other: SourceWriter) {
        assert_eq!(0, other.depth, "appended source has open scopes");
        for line in other.lines {
            self.line(line);
        }
    }

    /// Wrap everything written so far in `pub mod name { .. }`.
    pub fn wrap_module(&mut self, name: &str, attributes: &[&str]) {
        assert_eq!(0, self.depth, "cannot wrap a module with open scopes");
        let mut lines = Vec::with_capacity(self.lines.len() + 2);
        for attr in attributes {
            lines.push(attr.to_string());
        }
        lines.push(format!("pub mod {} {{", name));
        for line in self.lines.drain(..) {
            if line.is_empty() {
                lines.push(line);
            } else {
                lines.push(format!("{}{}", INDENT, line));
            }
        }
        lines.push("}".to_string());
        self.lines = lines;
    }

    /// Return the assembled source, ending with a newline.
    pub fn finish(self) -> String {
        assert_eq!(0, self.depth, "unclosed scope in generated source");
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_indent() {
        let mut w = SourceWriter::new();
        w.open("fn f(x: u32) -> bool");
        w.declare_mut("y", "x");
        w.open_if("y > 3");
        w.stmt("y -= 1");
        w.open_else();
        w.line("return false;");
        w.close();
        w.line("y == 3");
        w.close();
        let got = w.finish();
        let want = "\
fn f(x: u32) -> bool {
    let mut y = x;
    if y > 3 {
        y -= 1;
    } else {
        return false;
    }
    y == 3
}
";
        assert_eq!(want, got);
    }

    #[test]
    fn module_wrapping() {
        let mut w = SourceWriter::new();
        w.scope("impl A", |w| w.comment("empty"));
        w.blank();
        w.wrap_module("m", &["#[allow(dead_code)]"]);
        let want = "\
#[allow(dead_code)]
pub mod m {
    impl A {
        // empty
    }

}
";
        assert_eq!(want, w.finish());
    }

    #[test]
    fn appending() {
        let mut inner = SourceWriter::new();
        inner.open_if("x");
        inner.stmt("y()");
        inner.close();
        let mut w = SourceWriter::new();
        w.scope("loop", |w| w.append(inner));
        assert_eq!("loop {\n    if x {\n        y();\n    }\n}\n", w.finish());
    }

    #[test]
    #[should_panic]
    fn unbalanced_close() {
        let mut w = SourceWriter::new();
        w.close();
    }
}
