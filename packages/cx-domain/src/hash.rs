//! Stable content hashing for entity ids, signatures, and bodies.
//!
//! Uses SHA-256 for content-addressed
//! chunk ids) truncated to 12 hex characters for ids; the full hex digest
//! is retained wherever collision risk matters (sig_hash/body_hash).

use sha2::{Digest, Sha256};

/// Full 64-character hex digest of `data`.
pub fn stable_hash(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// First 12 hex characters of `stable_hash(data)`, used inside entity ids.
pub fn short_hash(data: &str) -> String {
    stable_hash(data)[..12].to_string()
}

/// Collapse whitespace runs to a single space and strip trailing commas,
/// while preserving parameter order and return-type text. Used so that
/// `sig_hash` is stable under cosmetic edits to the signature text.
pub fn normalize_signature(signature: &str) -> String {
    let collapsed = signature.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ',' {
            // drop a trailing comma directly preceding a closer
            match chars.peek() {
                Some(')') | Some('>') | None => continue,
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Strip `//` / `#` / `/* */` style comments from body text, then collapse
/// whitespace. `body_hash` is computed over the result, so edits confined to
/// comments never change it.
pub fn strip_comments(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    let mut in_block_comment = false;
    while let Some(c) = chars.next() {
        if in_block_comment {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block_comment = false;
            }
            continue;
        }
        match c {
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&n) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                in_block_comment = true;
            }
            '#' => {
                while let Some(&n) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `sig_hash` for an entity signature: stable hash of the normalized text.
pub fn sig_hash(signature: &str) -> String {
    stable_hash(&normalize_signature(signature))
}

/// `body_hash` for an entity body: stable hash of the comment-stripped text.
/// Empty body yields an empty hash string (not applicable, per spec).
pub fn body_hash(body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }
    stable_hash(&strip_comments(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_hash_is_deterministic() {
        assert_eq!(stable_hash("abc"), stable_hash("abc"));
        assert_ne!(stable_hash("abc"), stable_hash("abd"));
    }

    #[test]
    fn short_hash_is_12_chars() {
        assert_eq!(short_hash("anything").len(), 12);
    }

    #[test]
    fn normalize_signature_collapses_whitespace() {
        assert_eq!(
            normalize_signature("fn   Foo(x   int,\ny  int,) int"),
            "fn Foo(x int, y int) int"
        );
    }

    #[test]
    fn sig_hash_insensitive_to_whitespace() {
        let a = sig_hash("fn Foo(x int) int");
        let b = sig_hash("fn   Foo(x   int) int");
        assert_eq!(a, b);
    }

    #[test]
    fn sig_hash_sensitive_to_params() {
        let a = sig_hash("fn Foo(x int) int");
        let b = sig_hash("fn Foo(x, y int) int");
        assert_ne!(a, b);
    }

    #[test]
    fn body_hash_ignores_comments() {
        let a = body_hash("return x + 1 // explain\n");
        let b = body_hash("return x + 1 # explain\n");
        assert_eq!(a, b);
    }

    #[test]
    fn body_hash_sensitive_to_logic() {
        let a = body_hash("return x + 1");
        let b = body_hash("return x + 2");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_body_hash_is_empty() {
        assert_eq!(body_hash(""), "");
    }
}
