//! Rule-line tokenizer.
//!
//! Splits a rule line into words and quoted strings, reporting which
//! delimiter ended each token. Whitespace, `/` and `"` delimit words; a
//! `"` opens a string that runs to the next `"` or the end of the line.

/// What ended a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Whitespace (or the opening quote of a following string).
    Whitespace,
    /// `/`: the next token is an up/down/hold suffix.
    Slash,
    /// The token is the contents of a quoted string.
    Quote,
    /// End of input.
    End,
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c == '/' || c == '"'
}

/// Return the next token, its delimiter and the remaining input.
///
/// Leading whitespace and stray `/` are skipped. Returns `None` once only
/// delimiters remain.
pub fn tokenize_next(input: &str) -> Option<(&str, Delimiter, &str)> {
    let input = input.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
    if input.is_empty() {
        return None;
    }

    if let Some(body) = input.strip_prefix('"') {
        return Some(match body.find(['"', '\n']) {
            Some(end) => (&body[..end], Delimiter::Quote, &body[end + 1..]),
            None => (body, Delimiter::Quote, ""),
        });
    }

    Some(match input.find(is_delimiter) {
        None => (input, Delimiter::End, ""),
        Some(end) => {
            let token = &input[..end];
            let delim = input[end..].chars().next().unwrap_or(' ');
            match delim {
                '/' => (token, Delimiter::Slash, &input[end + 1..]),
                // Leave the quote in place so it opens the next token.
                '"' => (token, Delimiter::Whitespace, &input[end..]),
                ws => (token, Delimiter::Whitespace, &input[end + ws.len_utf8()..]),
            }
        }
    })
}

/// Iterate over all tokens of a line.
pub fn tokens(line: &str) -> impl Iterator<Item = (&str, Delimiter)> {
    let mut rest = line;
    std::iter::from_fn(move || {
        let (token, delim, next) = tokenize_next(rest)?;
        rest = next;
        Some((token, delim))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(line: &str) -> Vec<(&str, Delimiter)> {
        tokens(line).collect()
    }

    #[test]
    fn test_words() {
        assert_eq!(
            collect("K2 XK_Right\tXK_Left\n"),
            vec![
                ("K2", Delimiter::Whitespace),
                ("XK_Right", Delimiter::End),
                ("XK_Left", Delimiter::Whitespace),
            ]
        );
    }

    #[test]
    fn test_word_at_end_of_input() {
        assert_eq!(tokenize_next("JR"), Some(("JR", Delimiter::End, "")));
    }

    #[test]
    fn test_slash_suffix() {
        assert_eq!(
            collect("XK_Alt_L/D XK_Right"),
            vec![
                ("XK_Alt_L", Delimiter::Slash),
                ("D", Delimiter::Whitespace),
                ("XK_Right", Delimiter::End),
            ]
        );
    }

    #[test]
    fn test_quoted_string_keeps_spaces_and_specials() {
        assert_eq!(
            collect("K1 \"a b/#c\" XK_x"),
            vec![
                ("K1", Delimiter::Whitespace),
                ("a b/#c", Delimiter::Quote),
                ("XK_x", Delimiter::End),
            ]
        );
    }

    #[test]
    fn test_unterminated_string_runs_to_end_of_line() {
        assert_eq!(
            tokenize_next("\"abc\nrest"),
            Some(("abc", Delimiter::Quote, "rest"))
        );
        assert_eq!(tokenize_next("\"abc"), Some(("abc", Delimiter::Quote, "")));
    }

    #[test]
    fn test_word_followed_directly_by_string() {
        assert_eq!(
            collect("K1\"qw\""),
            vec![("K1", Delimiter::Whitespace), ("qw", Delimiter::Quote)]
        );
    }

    #[test]
    fn test_only_delimiters() {
        assert_eq!(tokenize_next(""), None);
        assert_eq!(tokenize_next("  \t/ \n"), None);
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(tokenize_next("\"\" x"), Some(("", Delimiter::Quote, " x")));
    }

    #[test]
    fn test_is_pure() {
        let line = "S1 XK_a/U \"z\"";
        assert_eq!(tokenize_next(line), tokenize_next(line));
    }
}
