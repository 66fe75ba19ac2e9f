//! Email matching: a permissive first pass over raw text, then stricter
//! structural checks on each candidate.

use std::sync::LazyLock;

use regex::Regex;

const LOCAL_CHARS: &str = r"[a-zA-Z0-9._%+-]";
const DOMAIN_CHARS: &str = r"[a-zA-Z0-9.-]";

const MAX_LOCAL_LEN: usize = 64;
const MAX_LABEL_LEN: usize = 63;

static CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{LOCAL_CHARS}+@{DOMAIN_CHARS}+\.[a-zA-Z]{{2,}}"))
        .expect("candidate pattern is valid")
});

static ANCHORED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{LOCAL_CHARS}+@{DOMAIN_CHARS}+\.[a-zA-Z]{{2,}}$"))
        .expect("anchored pattern is valid")
});

/// Every email-shaped substring of `text`, left to right.
pub fn candidates(text: &str) -> impl Iterator<Item = &str> {
    CANDIDATE.find_iter(text).map(|found| found.as_str())
}

/// Whether `byte` can appear anywhere inside a candidate match.
///
/// Splitting text just before a byte for which this is false never cuts a
/// candidate in two.
pub fn is_email_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'%' | b'+' | b'-' | b'@')
}

/// Apply the structural rules the permissive pattern cannot express.
pub fn is_valid_email(candidate: &str) -> bool {
    if !ANCHORED.is_match(candidate) {
        return false;
    }

    let Some((local, domain)) = candidate.rsplit_once('@') else {
        return false;
    };

    if local.len() > MAX_LOCAL_LEN {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    if domain.contains("..") {
        return false;
    }

    domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}
