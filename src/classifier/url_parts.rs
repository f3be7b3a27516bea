use anyhow::{bail, Result};
use tracing::trace;
use url::Url;

use super::patterns::SCHEME_REGEX;

/// Host and path of a URL as seen by the section grammars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    pub domain: Option<String>,
    pub path: String,
}

/// Splits raw URL text into its host and path.
///
/// The path is the literal text between the authority and the first `?` or
/// `#`; nothing is re-encoded or normalized. The domain is the `url` crate's
/// host when the text parses, and otherwise the authority with userinfo and
/// port removed. Text without a scheme is a bare path and has no domain.
pub fn decompose_url(raw: &str) -> Result<UrlParts> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("URL cannot be empty");
    }

    let after_slashes = if let Some(rest) = trimmed.strip_prefix("//") {
        Some(rest)
    } else if let Some(found) = SCHEME_REGEX.find(trimmed) {
        Some(&trimmed[found.end()..])
    } else {
        None
    };

    let Some(rest) = after_slashes else {
        trace!("No scheme in {}, treating it as a bare path", trimmed);
        return Ok(UrlParts {
            domain: None,
            path: strip_query_and_fragment(trimmed).to_string(),
        });
    };

    let authority_end = rest.find(|c: char| matches!(c, '/' | '?' | '#')).unwrap_or(rest.len());
    let (authority, remainder) = rest.split_at(authority_end);
    if authority.contains('[') != authority.contains(']') {
        bail!("Invalid IPv6 authority in {}", trimmed);
    }

    Ok(UrlParts {
        domain: host_of(trimmed, authority),
        path: strip_query_and_fragment(remainder).to_string(),
    })
}

fn strip_query_and_fragment(text: &str) -> &str {
    text.find(|c: char| matches!(c, '?' | '#')).map_or(text, |end| &text[..end])
}

fn host_of(absolute: &str, authority: &str) -> Option<String> {
    let candidate = if absolute.starts_with("//") {
        format!("http:{}", absolute)
    } else {
        absolute.to_string()
    };

    if let Ok(parsed) = Url::parse(&candidate) {
        if let Some(host) = parsed.host_str().filter(|host| !host.is_empty()) {
            return Some(host.to_string());
        }
    }

    trace!("Falling back to the literal authority {:?}", authority);
    let host = authority.rsplit('@').next().unwrap_or_default();
    let host = if host.starts_with('[') {
        host.find(']').map_or(host, |end| &host[..=end])
    } else {
        match host.rsplit_once(':') {
            Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
            _ => host,
        }
    };

    let host = host.trim();
    (!host.is_empty()).then(|| host.to_string())
}
