use regex::Regex;
use std::sync::LazyLock;

static HASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-f0-9]{64}$").unwrap());

/// A content address is exactly 64 lowercase hex characters.
pub fn is_valid_hash(hash: &str) -> bool {
    HASH_RE.is_match(hash)
}
