//! Symbolic version coordinates ("refs") accepted by time-travel queries.
//!
//! Syntax validation only — resolving a `Ref` to an actual snapshot is
//! delegated to the store.

use crate::error::CxError;
use std::fmt;

/// A syntactically valid ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ref {
    Head,
    HeadRelative(u32),
    Hex(String),
    Tag(String),
    Date(String),
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ref::Head => write!(f, "HEAD"),
            Ref::HeadRelative(n) => write!(f, "HEAD~{n}"),
            Ref::Hex(h) => write!(f, "{h}"),
            Ref::Tag(t) => write!(f, "{t}"),
            Ref::Date(d) => write!(f, "{d}"),
        }
    }
}

impl Ref {
    /// Parse and syntactically validate a ref string. Fails fast with an
    /// `Input` error (surfaced to callers as `InvalidRef`) before any store
    /// is touched.
    pub fn parse(raw: &str) -> Result<Self, CxError> {
        if raw == "HEAD" {
            return Ok(Ref::Head);
        }
        if let Some(n) = raw.strip_prefix("HEAD~") {
            if !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) {
                let n: u32 = n
                    .parse()
                    .map_err(|_| CxError::input(format!("invalid ref: {raw}")))?;
                if n > 0 {
                    return Ok(Ref::HeadRelative(n));
                }
            }
            return Err(CxError::input(format!("invalid ref: {raw}")));
        }
        if is_iso_date(raw) {
            return Ok(Ref::Date(raw.to_string()));
        }
        if raw.len() >= 4 && raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Ref::Hex(raw.to_string()));
        }
        if is_tag_name(raw) {
            return Ok(Ref::Tag(raw.to_string()));
        }
        Err(CxError::input(format!("invalid ref: {raw}")))
    }
}

fn is_iso_date(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.len() != 10 {
        return false;
    }
    let digits_at = |i: usize| bytes[i].is_ascii_digit();
    (0..4).all(digits_at)
        && bytes[4] == b'-'
        && (5..7).all(digits_at)
        && bytes[7] == b'-'
        && (8..10).all(digits_at)
}

fn is_tag_name(raw: &str) -> bool {
    let mut chars = raw.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_head() {
        assert_eq!(Ref::parse("HEAD").unwrap(), Ref::Head);
    }

    #[test]
    fn parses_head_relative() {
        assert_eq!(Ref::parse("HEAD~3").unwrap(), Ref::HeadRelative(3));
    }

    #[test]
    fn rejects_head_tilde_zero_and_non_numeric() {
        assert!(Ref::parse("HEAD~0").is_err());
        assert!(Ref::parse("HEAD~abc").is_err());
    }

    #[test]
    fn parses_hex_token() {
        assert_eq!(
            Ref::parse("abc123").unwrap(),
            Ref::Hex("abc123".to_string())
        );
    }

    #[test]
    fn rejects_short_hex_as_tag_not_hex() {
        // "abc" is < 4 chars so it is NOT treated as hex; it is still a
        // syntactically valid tag name.
        assert_eq!(Ref::parse("abc").unwrap(), Ref::Tag("abc".to_string()));
    }

    #[test]
    fn parses_tag_name() {
        assert_eq!(
            Ref::parse("release-1.2.3").unwrap(),
            Ref::Tag("release-1.2.3".to_string())
        );
    }

    #[test]
    fn parses_iso_date() {
        assert_eq!(
            Ref::parse("2026-07-31").unwrap(),
            Ref::Date("2026-07-31".to_string())
        );
    }

    #[test]
    fn rejects_malformed_refs() {
        assert!(Ref::parse("").is_err());
        assert!(Ref::parse("2026/07/31").is_err());
        assert!(Ref::parse("-leading-dash").is_err());
        assert!(Ref::parse("has space").is_err());
    }
}
