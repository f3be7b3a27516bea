/// Splits one record of delimited text into fields.
///
/// Fields may be wrapped in double quotes, in which case the delimiter and
/// line breaks are taken literally and `""` stands for a single quote
/// character.
pub fn split_fields(record: &str, delimiter: char) -> Vec<String> {
    scan(record, delimiter).0
}

/// Whether `text` stops inside a quoted field, meaning the record carries on
/// past the next line break.
pub fn ends_inside_quotes(text: &str, delimiter: char) -> bool {
    scan(text, delimiter).1
}

fn scan(text: &str, delimiter: char) -> (Vec<String>, bool) {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    (fields, in_quotes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields() {
        assert_eq!(split_fields("a,b,,c", ','), vec!["a", "b", "", "c"]);
        assert_eq!(split_fields("a\tb,c", '\t'), vec!["a", "b,c"]);
    }

    #[test]
    fn test_quoted_fields() {
        assert_eq!(
            split_fields(r#""https://x/?a=1,2",3"#, ','),
            vec!["https://x/?a=1,2", "3"]
        );
        assert_eq!(split_fields(r#""say ""hi""",x"#, ','), vec![r#"say "hi""#, "x"]);
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        assert_eq!(split_fields(r#"5" screen,x"#, ','), vec![r#"5" screen"#, "x"]);
    }

    #[test]
    fn test_quoted_line_break() {
        assert!(ends_inside_quotes(r#"https://x/,"two"#, ','));
        assert!(!ends_inside_quotes("https://x/,\"two\nlines\",5", ','));
        assert!(!ends_inside_quotes(r#"5" screen,x"#, ','));
        assert_eq!(
            split_fields("https://x/,\"two\nlines\",5", ','),
            vec!["https://x/", "two\nlines", "5"]
        );
    }
}
