//! Workarounds for one legacy spreadsheet export.
//!
//! That export wrote Latin-1 text and prefixed some code cells with a
//! non-breaking space (byte `0xA0`, `-96` as a signed byte). Nothing here is
//! applied unless a reader opts in.

const NBSP: char = '\u{a0}';

///
/// Decode one line as UTF-8, falling back to Latin-1 when it is not valid UTF-8.
///
pub fn decode_line(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}

///
/// Drop leading non-breaking spaces from a code cell.
///
pub fn strip_nbsp(cell: &str) -> &str {
    cell.trim_start_matches(NBSP)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_latin1_fallback_keeps_the_nbsp_byte() {
        let line = decode_line(vec![0xa0, b'K', b'\t', b'x']);
        assert_eq!(line, "\u{a0}K\tx");
        assert_eq!(strip_nbsp(line.split('\t').next().unwrap()), "K");
    }

    #[rstest]
    fn test_utf8_lines_are_untouched() {
        assert_eq!(decode_line("caf\u{e9}".as_bytes().to_vec()), "caf\u{e9}");
        assert_eq!(strip_nbsp("\u{a0}\u{a0}2"), "2");
        assert_eq!(strip_nbsp("2"), "2");
    }
}
