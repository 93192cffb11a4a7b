//! Implicit aliases derived from a canonical name.
//!
//! Reference names often pack several spellings into one string:
//! `"Colombo (Port)"`, `"Kolkata / Calcutta"`, `"Port of Shanghai"`. Each
//! fragment becomes an alias pointing at the same entry.

use regex::Regex;
use std::sync::LazyLock;

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").expect("valid regex"));

static PORT_OF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)port of\s+(.+)").expect("valid regex"));

static PORT_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bport\b").expect("valid regex"));

/// Fragments shorter than this many characters are too ambiguous to index.
const MIN_FRAGMENT_CHARS: usize = 3;

/// Derive alternate spellings from `name`, in discovery order, without
/// duplicates. `name` itself is never returned.
pub fn implicit_aliases(name: &str) -> Vec<String> {
    let mut aliases: Vec<String> = Vec::new();
    let mut push = |candidate: &str, allow_name: bool| {
        let trimmed = candidate.trim();
        if trimmed.chars().count() < MIN_FRAGMENT_CHARS {
            return;
        }
        if !allow_name && trimmed == name {
            return;
        }
        if !aliases.iter().any(|a| a == trimmed) {
            aliases.push(trimmed.to_string());
        }
    };

    // "Colombo (Port)" -> "Port", and "Colombo" via the comma pass below
    for caps in PARENTHETICAL.captures_iter(name) {
        push(&caps[1], true);
    }
    let without_parens = PARENTHETICAL.replace_all(name, " ");

    for part in without_parens.split(',') {
        push(part, false);
    }

    for part in name.split(['/', '-', '|']) {
        push(part, false);
    }

    if let Some(caps) = PORT_OF.captures(name) {
        push(&caps[1], true);
    }

    let without_port = PORT_WORD.replace_all(name, "");
    push(&without_port, false);

    aliases.retain(|a| a != name);
    aliases
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parenthetical() {
        let aliases = implicit_aliases("Colombo (Port)");
        assert!(aliases.contains(&"Port".to_string()));
        assert!(aliases.contains(&"Colombo".to_string()));
    }

    #[test]
    fn test_separator_segments() {
        let aliases = implicit_aliases("Kolkata / Calcutta");
        assert_eq!(aliases, vec!["Kolkata".to_string(), "Calcutta".to_string()]);

        let aliases = implicit_aliases("Ho Chi Minh|Saigon");
        assert!(aliases.contains(&"Saigon".to_string()));
    }

    #[test]
    fn test_short_segments_dropped() {
        let aliases = implicit_aliases("Île-de-France");
        assert!(aliases.contains(&"Île".to_string()));
        assert!(aliases.contains(&"France".to_string()));
        assert!(!aliases.contains(&"de".to_string()));
    }

    #[test]
    fn test_port_of_pattern() {
        let aliases = implicit_aliases("Port of Rotterdam");
        assert_eq!(aliases[0], "Rotterdam");
        assert!(aliases.contains(&"of Rotterdam".to_string()));
    }

    #[test]
    fn test_port_word_removed() {
        let aliases = implicit_aliases("Felixstowe Port");
        assert_eq!(aliases, vec!["Felixstowe".to_string()]);

        // "Airport" is not the word "port"
        assert!(implicit_aliases("Heathrow Airport").is_empty());
    }

    #[test]
    fn test_plain_name_has_no_aliases() {
        assert!(implicit_aliases("Singapore").is_empty());
        assert!(implicit_aliases("").is_empty());
    }
}
