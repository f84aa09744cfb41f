//! Helpers for emitting Graphviz DOT text.

/// Escapes `s` for use inside a quoted DOT label.
///
/// Quotes, backslashes and record-significant angle brackets are escaped;
/// newlines become the DOT `\n` escape and carriage returns are dropped.
///
/// # Examples
///
/// ```rust,ignore
/// use tacflow::utils::escape_dot;
///
/// assert_eq!(escape_dot("_T1 = \"str\""), "_T1 = \\\"str\\\"");
/// ```
#[must_use]
pub fn escape_dot(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            '<' => out.push_str("\\<"),
            '>' => out.push_str("\\>"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_dot_plain() {
        assert_eq!(escape_dot("_T0 = (_T1 + _T2)"), "_T0 = (_T1 + _T2)");
    }

    #[test]
    fn test_escape_dot_string_constant() {
        assert_eq!(escape_dot("_T3 = \"a\\b\""), "_T3 = \\\"a\\\\b\\\"");
    }

    #[test]
    fn test_escape_dot_vtable() {
        assert_eq!(escape_dot("VTBL <Main>\r\n"), "VTBL \\<Main\\>\\n");
    }
}
