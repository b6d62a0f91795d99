//! Rule-based intent classification.
//!
//! Maps a raw command to one of a fixed set of intents using ordered keyword
//! rules; the first matching rule wins and the precedence below is part of
//! the contract:
//!
//! 1. `Search`: the command contains a `.`, is a single token, or contains
//!    one of `search`, `find`, `lookup`.
//! 2. `Navigate`: contains one of `web hosting`, `hosting`, `domain`,
//!    `navigate`, `open`.
//! 3. `Greet`: contains `hello`.
//! 4. `Exit`: contains one of `exit`, `quit`, `bye`, `goodbye`.
//! 5. `Unknown` otherwise.
//!
//! Note that rule 1 claims every single-token command, so a bare "exit" or
//! "hello" is classified as a search; the later rules only fire on
//! multi-word commands.

/// The recognized intent of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Look up a domain name.
    Search,
    /// Move to a fixed site section.
    Navigate,
    /// Respond to a greeting.
    Greet,
    /// Stop the command loop.
    Exit,
    /// Nothing matched.
    Unknown,
}

const SEARCH_KEYWORDS: &[&str] = &["search", "find", "lookup"];
const NAVIGATE_KEYWORDS: &[&str] = &["web hosting", "hosting", "domain", "navigate", "open"];
const EXIT_KEYWORDS: &[&str] = &["exit", "quit", "bye", "goodbye"];

/// Classify a command. Total: every input maps to exactly one intent.
pub fn classify(command: &str) -> Intent {
    let cmd = command.trim().to_lowercase();

    if cmd.contains('.')
        || cmd.split_whitespace().count() == 1
        || SEARCH_KEYWORDS.iter().any(|w| cmd.contains(w))
    {
        return Intent::Search;
    }

    if NAVIGATE_KEYWORDS.iter().any(|w| cmd.contains(w)) {
        return Intent::Navigate;
    }

    if cmd.contains("hello") {
        return Intent::Greet;
    }

    if EXIT_KEYWORDS.iter().any(|w| cmd.contains(w)) {
        return Intent::Exit;
    }

    Intent::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_means_search() {
        assert_eq!(classify("is example.com taken"), Intent::Search);
        assert_eq!(classify("rosik.com"), Intent::Search);
    }

    #[test]
    fn test_single_token_means_search_regardless_of_content() {
        assert_eq!(classify("example"), Intent::Search);
        assert_eq!(classify("hello"), Intent::Search);
        assert_eq!(classify("exit"), Intent::Search);
        assert_eq!(classify("xyz"), Intent::Search);
    }

    #[test]
    fn test_search_keywords() {
        assert_eq!(classify("please find me a name"), Intent::Search);
        assert_eq!(classify("lookup that name"), Intent::Search);
    }

    #[test]
    fn test_navigate() {
        assert_eq!(classify("go to hosting"), Intent::Navigate);
        assert_eq!(classify("show me web hosting"), Intent::Navigate);
        assert_eq!(classify("navigate over there"), Intent::Navigate);
    }

    #[test]
    fn test_greet_and_exit_need_multiple_words() {
        assert_eq!(classify("hello there"), Intent::Greet);
        assert_eq!(classify("exit now"), Intent::Exit);
        assert_eq!(classify("bye bye"), Intent::Exit);
        assert_eq!(classify("goodbye assistant"), Intent::Exit);
    }

    #[test]
    fn test_navigate_beats_greet() {
        // "hello" and "hosting" both present: Navigate is checked first.
        assert_eq!(classify("hello take me to hosting"), Intent::Navigate);
    }

    #[test]
    fn test_search_beats_everything() {
        assert_eq!(classify("search the hosting page"), Intent::Search);
        assert_eq!(classify("find hello.com and exit"), Intent::Search);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify("sing me a song"), Intent::Unknown);
        assert_eq!(classify(""), Intent::Unknown);
        assert_eq!(classify("   "), Intent::Unknown);
    }

    #[test]
    fn test_normalization() {
        assert_eq!(classify("  GO TO Hosting  "), Intent::Navigate);
        assert_eq!(classify("HELLO there"), Intent::Greet);
    }
}
