use tracing::trace;

use super::patterns::DIGIT_RUN_REGEX;

/// Percent-decodes `text`, keeping malformed escapes literally and replacing
/// invalid UTF-8 with U+FFFD, so the result is always usable.
pub fn percent_decode(text: &str) -> String {
    let bytes = urlencoding::decode_binary(text.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Decodes an entity name taken from a URL segment: percent-decoding,
/// underscores to spaces, and a leftover `%2C` turned into a comma.
pub fn decode_entity_name(text: &str) -> String {
    percent_decode(text).replace('_', " ").replace("%2C", ",")
}

/// Best-effort integer extraction from a raw URL token.
///
/// Returns `None` for empty input, for template placeholders such as `{Page}`
/// (also when percent-encoded as `%7BPage%7D`), when no digit run exists, and
/// when the first digit run does not fit in a `u64`.
pub fn decode_int(token: Option<&str>) -> Option<u64> {
    let token = token.filter(|t| !t.is_empty())?;
    let decoded = percent_decode(token);

    if decoded.contains('{') || decoded.contains('}') {
        trace!("Rejecting template placeholder: {}", decoded);
        return None;
    }

    let digits = DIGIT_RUN_REGEX.find(&decoded)?;
    match digits.as_str().parse::<u64>() {
        Ok(value) => Some(value),
        Err(e) => {
            trace!("Digit run {} is not a valid integer: {}", digits.as_str(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_int_plain_and_embedded() {
        assert_eq!(decode_int(Some("3")), Some(3));
        assert_eq!(decode_int(Some("12abc")), Some(12));
        assert_eq!(decode_int(Some("abc42def7")), Some(42));
    }

    #[test]
    fn test_decode_int_rejects_placeholders() {
        assert_eq!(decode_int(Some("{Page}")), None);
        assert_eq!(decode_int(Some("%7BPage%7D")), None);
        assert_eq!(decode_int(Some("%7B1%7D")), None);
    }

    #[test]
    fn test_decode_int_absent_and_garbage() {
        assert_eq!(decode_int(None), None);
        assert_eq!(decode_int(Some("")), None);
        assert_eq!(decode_int(Some("abc")), None);
        assert_eq!(decode_int(Some("99999999999999999999999")), None);
    }

    #[test]
    fn test_decode_int_percent_encoded_digits() {
        assert_eq!(decode_int(Some("%32%30")), Some(20));
    }

    #[test]
    fn test_percent_decode_is_total() {
        assert_eq!(percent_decode("San%20Jose"), "San Jose");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("%FF"), "\u{FFFD}");
    }

    #[test]
    fn test_decode_entity_name() {
        assert_eq!(decode_entity_name("Software_Engineer"), "Software Engineer");
        assert_eq!(decode_entity_name("Acme%2C_Inc."), "Acme, Inc.");
        assert_eq!(decode_entity_name("Acme%252C_Inc."), "Acme, Inc.");
    }
}
