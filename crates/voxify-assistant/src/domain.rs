//! Domain-name extraction from spoken commands.
//!
//! Two pure string transforms, selected by the caller:
//!
//! - **Typed form** ([`extract_typed`]): the user said the name as one word,
//!   e.g. "search example.com". When the command contains the word "search",
//!   the candidate is everything after its first occurrence (with the spoken
//!   word "dot" turned into `.` and whitespace dropped). Otherwise a
//!   fallback heuristic scans tokens in reverse for the first one that
//!   contains a `.` or is purely alphabetic. A missing dot gets the default
//!   `.com` suffix.
//! - **Spelled form** ([`extract_spelled`]): the user spelled the name out
//!   letter by letter, e.g. "spell e x a m p l e dot com". The word "spell"
//!   is removed, "dot" becomes `.`, and the remaining tokens are
//!   concatenated. No default suffix; the dot is expected to come from a
//!   spoken "dot".

/// A normalized domain candidate extracted from a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain(String);

impl Domain {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

const DEFAULT_SUFFIX: &str = ".com";

/// Extract a typed-form domain from a command.
pub fn extract_typed(command: &str) -> Domain {
    let cmd = command.trim().to_lowercase();
    let compact = compact_tokens(&cmd);

    let candidate = match compact.find("search") {
        Some(idx) => {
            let tail = &compact[idx + "search".len()..];
            if tail.is_empty() {
                fallback_token(&cmd)
            } else {
                tail.to_string()
            }
        }
        None => fallback_token(&cmd),
    };

    let mut domain = candidate;
    if !domain.contains('.') {
        domain.push_str(DEFAULT_SUFFIX);
    }
    Domain(domain)
}

/// Extract a spelled-form domain from a command.
pub fn extract_spelled(command: &str) -> Domain {
    let domain: String = command
        .trim()
        .to_lowercase()
        .split_whitespace()
        .filter(|t| *t != "spell")
        .map(|t| if t == "dot" { "." } else { t })
        .collect();
    Domain(domain)
}

/// Map the spoken word "dot" to `.` and join all tokens without whitespace.
fn compact_tokens(cmd: &str) -> String {
    cmd.split_whitespace()
        .map(|t| if t == "dot" { "." } else { t })
        .collect()
}

/// Fallback heuristic: scan tokens in reverse and pick the first that looks
/// wordish (contains a `.` or is purely alphabetic); default to the last
/// token when nothing qualifies.
fn fallback_token(cmd: &str) -> String {
    let tokens: Vec<&str> = cmd.split_whitespace().collect();
    tokens
        .iter()
        .rev()
        .find(|t| t.contains('.') || t.chars().all(|c| c.is_alphabetic()))
        .or_else(|| tokens.last())
        .map(|t| t.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_idempotent_on_normalized_domain() {
        assert_eq!(extract_typed("search example.com").as_str(), "example.com");
    }

    #[test]
    fn test_typed_appends_default_suffix() {
        assert_eq!(extract_typed("search example").as_str(), "example.com");
    }

    #[test]
    fn test_typed_spoken_dot() {
        assert_eq!(extract_typed("search rosik dot com").as_str(), "rosik.com");
    }

    #[test]
    fn test_typed_fallback_single_token() {
        // Single-token commands classify as search without the keyword.
        assert_eq!(extract_typed("example").as_str(), "example.com");
        assert_eq!(extract_typed("rosik.org").as_str(), "rosik.org");
    }

    #[test]
    fn test_typed_fallback_reverse_scan() {
        assert_eq!(extract_typed("can you check rosik.com").as_str(), "rosik.com");
        // No dot anywhere: the last alphabetic token wins.
        assert_eq!(extract_typed("find me rosik42 now").as_str(), "now.com");
    }

    #[test]
    fn test_typed_split_after_first_search() {
        // The portion after the first "search" is the candidate, whitespace
        // dropped. This mirrors the original behavior, ambiguity included.
        assert_eq!(
            extract_typed("please search for rosik dot com please").as_str(),
            "forrosik.complease"
        );
    }

    #[test]
    fn test_typed_bare_search_keyword() {
        // "search" with nothing after it falls back to the token scan.
        assert_eq!(extract_typed("search").as_str(), "search.com");
    }

    #[test]
    fn test_spelled_basic() {
        assert_eq!(
            extract_spelled("spell e x a m p l e dot com").as_str(),
            "example.com"
        );
    }

    #[test]
    fn test_spelled_no_default_suffix() {
        // No spoken "dot" means no dot; spelled mode never appends one.
        assert_eq!(extract_spelled("spell a b c").as_str(), "abc");
    }

    #[test]
    fn test_spelled_case_folded() {
        assert_eq!(
            extract_spelled("Spell E X A M P L E dot COM").as_str(),
            "example.com"
        );
    }
}
