/// Canonical single-line form of a record's text.
///
/// Curly quotes and primes become ASCII quotes, line endings become `\n`,
/// control and zero-width characters become spaces, then whitespace runs
/// collapse to one space and the ends are trimmed.
pub fn normalize_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n");
    let mapped: String = unified
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{00AB}' | '\u{00BB}'
            | '\u{2033}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => '\'',
            '\r' => '\n',
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => ' ',
            c if c.is_control() && c != '\n' => ' ',
            c => c,
        })
        .collect();

    collapse_whitespace(&mapped)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_and_trims() {
        assert_eq!(normalize_text("  hello \t  world \n"), "hello world");
    }

    #[test]
    fn test_quotes() {
        assert_eq!(
            normalize_text("\u{201C}it\u{2019}s fine\u{201D}"),
            "\"it's fine\""
        );
    }

    #[test]
    fn test_line_endings_and_controls() {
        assert_eq!(normalize_text("one\r\ntwo\rthree\x01four"), "one two three four");
    }

    #[test]
    fn test_zero_width_only_is_empty() {
        assert_eq!(normalize_text("\u{200B}\u{FEFF} \u{200B}"), "");
    }
}
