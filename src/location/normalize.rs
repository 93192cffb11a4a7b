//! Key normalization shared by indexing and matching.
//!
//! Every name is reduced to three keys of increasing looseness:
//!
//! | key      | "São Paulo (SP)" |
//! |----------|------------------|
//! | strict   | `sao paulo (sp)` |
//! | loose    | `sao paulo sp`   |
//! | simple   | `saopaulosp`     |

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Decompose, drop combining marks, lowercase, trim.
pub fn strict_key(s: &str) -> String {
    let folded: String = s
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    folded.trim().to_string()
}

/// Strict key with every run of non `[a-z0-9]` characters collapsed to one space.
pub fn loose_key(s: &str) -> String {
    let strict = strict_key(s);
    let mut out = String::with_capacity(strict.len());
    let mut pending_space = false;

    for c in strict.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Strict key with only `[a-z0-9]` kept.
pub fn simple_key(s: &str) -> String {
    strict_key(s)
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}
