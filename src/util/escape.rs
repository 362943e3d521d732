/*!
Helpers for writing characters and strings into emitted Rust source.
*/

/// Return a Rust character literal, quotes included, for `ch`.
///
/// Printable characters are written as is. Quotes, backslashes, control
/// characters and anything that isn't printable on its own are escaped.
pub fn char_literal(ch: char) -> String {
    let mut lit = String::with_capacity(8);
    lit.push('\'');
    escape_char(ch, '\'', &mut lit);
    lit.push('\'');
    lit
}

/// Return a Rust string literal, quotes included, for `s`.
pub fn str_literal(s: &str) -> String {
    let mut lit = String::with_capacity(s.len() + 2);
    lit.push('"');
    for ch in s.chars() {
        escape_char(ch, '"', &mut lit);
    }
    lit.push('"');
    lit
}

/// Escape a string so that it can be placed in a single-line comment.
pub fn comment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\n' => out.push_str(r"\n"),
            '\r' => out.push_str(r"\r"),
            '\t' => out.push_str(r"\t"),
            ch if ch.is_control() => {
                out.push_str(&format!(r"\u{{{:X}}}", ch as u32));
            }
            ch => out.push(ch),
        }
    }
    out
}

fn escape_char(ch: char, quote: char, into: &mut String) {
    match ch {
        '\\' => into.push_str(r"\\"),
        '\n' => into.push_str(r"\n"),
        '\r' => into.push_str(r"\r"),
        '\t' => into.push_str(r"\t"),
        '\0' => into.push_str(r"\0"),
        ch if ch == quote => {
            into.push('\\');
            into.push(ch);
        }
        ' '..='~' => into.push(ch),
        ch if ch.is_alphanumeric() => into.push(ch),
        ch => into.push_str(&format!(r"\u{{{:x}}}", ch as u32)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chars() {
        assert_eq!("'a'", char_literal('a'));
        assert_eq!(r"'\''", char_literal('\''));
        assert_eq!(r"'\\'", char_literal('\\'));
        assert_eq!(r"'\n'", char_literal('\n'));
        assert_eq!("'\"'", char_literal('"'));
        assert_eq!(r"'\u{7f}'", char_literal('\u{7F}'));
        assert_eq!("'é'", char_literal('é'));
        assert_eq!(r"'\u{200d}'", char_literal('\u{200D}'));
    }

    #[test]
    fn strings() {
        assert_eq!(r#""a\"b\\c""#, str_literal("a\"b\\c"));
        assert_eq!(r#""it's""#, str_literal("it's"));
    }

    #[test]
    fn comments() {
        assert_eq!(r"a\nb\u{1B}", comment("a\nb\u{1B}"));
    }
}
