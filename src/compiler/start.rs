use crate::{
    codegen::SourceWriter,
    compiler::{Needs, StartStrategy},
    ir::Program,
    util::{
        anchors::{Anchor, AnchorSet},
        escape,
    },
};

/// Emit the body of `find_first_char`.
///
/// Positional anchors take precedence: they pin where a match can start,
/// so there is nothing to scan for. Otherwise a literal prefix is searched
/// with the skip table, and failing that the first-char set is scanned for.
pub(crate) fn emit(
    program: &Program,
    w: &mut SourceWriter,
    needs: &mut Needs,
) -> StartStrategy {
    let rtl = program.is_right_to_left();
    let leading = program.leading_anchors();
    let positional = leading.positional();
    if !positional.is_empty() {
        if rtl {
            anchors_backward(positional, w);
        } else {
            anchors_forward(positional, w);
        }
        return StartStrategy::Anchors(positional);
    }
    if !rtl && leading.contains(Anchor::Bol) {
        line_start(w);
    }
    if program.skip().is_some() {
        needs.skip = true;
        needs.culture = true;
        let stop = if rtl { "r.text_beg" } else { "r.text_end" };
        w.open("match SKIP.find(&r.text, r.text_beg, r.text_pos, r.text_end)");
        w.open("Some(p) =>");
        w.stmt("r.text_pos = p");
        w.line("true");
        w.close();
        w.open("None =>");
        w.stmt(format!("r.text_pos = {}", stop));
        w.line("false");
        w.close();
        w.close();
        return StartStrategy::Skip;
    }
    let first = match program.first_chars() {
        None => {
            w.line("true");
            return StartStrategy::Anywhere;
        }
        Some(first) => first,
    };
    let read = if rtl { "r.text[i - 1]" } else { "r.text[i]" };
    let read = if first.is_ignore_case() {
        needs.culture = true;
        format!("CULTURE.to_lower({})", read)
    } else {
        read.to_string()
    };
    let (test, strategy) = match first.single_char() {
        Some(ch) => {
            (format!("ch == {}", escape::char_literal(ch)), StartStrategy::FirstChar(ch))
        }
        None => {
            needs.char_in_class = true;
            ("char_in_class(ch, FIRST_CHARS)".to_string(), StartStrategy::FirstClass)
        }
    };
    w.declare_mut("i", "r.text_pos");
    if rtl {
        w.open_while("i > r.text_beg");
    } else {
        w.open_while("i < r.text_end");
    }
    w.declare("ch", read);
    w.open_if(test);
    w.stmt("r.text_pos = i");
    w.line("return true;");
    w.close();
    w.stmt(if rtl { "i -= 1" } else { "i += 1" });
    w.close();
    w.stmt(if rtl { "r.text_pos = r.text_beg" } else { "r.text_pos = r.text_end" });
    w.line("false");
    strategy
}

/// Left-to-right: end anchors clamp the position forward, and the
/// beginning anchors reject any position past where they can hold.
fn anchors_forward(set: AnchorSet, w: &mut SourceWriter) {
    if set.contains(Anchor::End) {
        w.open_if("r.text_pos < r.text_end");
        w.stmt("r.text_pos = r.text_end");
        w.close();
    } else if set.contains(Anchor::EndZ) {
        w.open_if("r.text_pos + 1 < r.text_end");
        w.stmt("r.text_pos = r.text_end - 1");
        w.close();
    }
    if set.contains(Anchor::Beginning) {
        reject("r.text_pos > r.text_beg", "r.text_end", w);
    }
    if set.contains(Anchor::Start) {
        reject("r.text_pos > r.text_start", "r.text_end", w);
    }
    w.line("true");
}

/// Right-to-left: the beginning anchor clamps the position backward, and
/// the end anchors reject any position before where they can hold.
fn anchors_backward(set: AnchorSet, w: &mut SourceWriter) {
    if set.contains(Anchor::Beginning) {
        w.open_if("r.text_pos > r.text_beg");
        w.stmt("r.text_pos = r.text_beg");
        w.close();
    }
    if set.contains(Anchor::End) {
        reject("r.text_pos < r.text_end", "r.text_beg", w);
    }
    if set.contains(Anchor::EndZ) {
        reject(
            "r.text_pos + 1 < r.text_end \
             || (r.text_pos + 1 == r.text_end && r.text[r.text_pos] != '\\n')",
            "r.text_beg",
            w,
        );
    }
    if set.contains(Anchor::Start) {
        reject("r.text_pos < r.text_start", "r.text_beg", w);
    }
    w.line("true");
}

fn reject(cond: &str, stop: &str, w: &mut SourceWriter) {
    w.open_if(cond);
    w.stmt(format!("r.text_pos = {}", stop));
    w.line("return false;");
    w.close();
}

/// Advance to the start of the next line unless already at one.
fn line_start(w: &mut SourceWriter) {
    w.open_if("r.text_pos > r.text_beg && r.text[r.text_pos - 1] != '\\n'");
    w.open("match r.text[r.text_pos..r.text_end].iter().position(|&c| c == '\\n')");
    w.line("Some(i) => r.text_pos += i + 1,");
    w.open("None =>");
    w.stmt("r.text_pos = r.text_end");
    w.line("return false;");
    w.close();
    w.close();
    w.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{options::Options, syntax};

    fn start(pattern: &str, options: Options) -> (String, StartStrategy, Needs) {
        let ast = syntax::parse(pattern, options).unwrap();
        let program = Program::from_ast(&ast);
        let mut w = SourceWriter::new();
        let mut needs = Needs::default();
        let strategy = emit(&program, &mut w, &mut needs);
        (w.finish(), strategy, needs)
    }

    #[test]
    fn forward_anchors() {
        let (src, strategy, _) = start(r"^a+b$", Options::empty());
        assert_eq!(
            StartStrategy::Anchors(AnchorSet::empty().insert(Anchor::Beginning)),
            strategy
        );
        assert!(src.contains("if r.text_pos > r.text_beg {"));
        assert!(!src.contains("r.text_end - 1"));

        let (src, _, _) = start(r"\Z", Options::empty());
        assert!(src.contains("r.text_pos = r.text_end - 1;"));
    }

    #[test]
    fn backward_anchors() {
        let (src, strategy, _) = start(r"a\z", Options::RIGHT_TO_LEFT);
        assert_eq!(
            StartStrategy::Anchors(AnchorSet::empty().insert(Anchor::End)),
            strategy
        );
        assert!(src.contains("if r.text_pos < r.text_end {"));
        assert!(src.contains("r.text_pos = r.text_beg;"));
    }

    #[test]
    fn scans() {
        let (src, _, needs) = start("hello", Options::IGNORE_CASE);
        assert!(src.contains("SKIP.find"));
        assert!(needs.skip && needs.culture);

        let (src, _, needs) = start("[ab]c", Options::empty());
        assert!(src.contains("char_in_class(ch, FIRST_CHARS)"));
        assert!(needs.char_in_class && !needs.culture);

        let (src, _, _) = start("b", Options::RIGHT_TO_LEFT);
        assert!(src.contains("while i > r.text_beg {"));
        assert!(src.contains("let ch = r.text[i - 1];"));
    }

    #[test]
    fn line_starts() {
        let (src, _, _) = start("(?m)^x", Options::empty());
        assert!(src.contains("position(|&c| c == '\\n')"));
    }
}
