use sha2::{Digest, Sha256};

/// Filesystem-safe, deterministic file name for a storage key:
/// `{sanitized_key}--{short_hash(key)}.json`.
///
/// The hash keeps keys apart that sanitize to the same text.
pub fn key_filename(key: &str) -> String {
    format!("{}--{}.json", sanitize_key(key), short_hash(key))
}

fn sanitize_key(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '-' {
            c
        } else {
            '_'
        };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }
    let mut cleaned = compacted.trim_matches('_').to_string();
    if cleaned.is_empty() {
        cleaned = "key".to_string();
    }
    cleaned.truncate(48);
    cleaned
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsafe_characters_collapse() {
        assert_eq!(sanitize_key("a/b\\c::d"), "a_b_c_d");
        assert_eq!(sanitize_key("///"), "key");
    }

    #[test]
    fn hash_separates_colliding_keys() {
        assert_ne!(key_filename("a/b"), key_filename("a:b"));
        assert_eq!(key_filename("tabs"), key_filename("tabs"));
        assert!(key_filename("activeTabId").starts_with("activeTabId--"));
    }
}
