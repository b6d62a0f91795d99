//! Outcome types for session operations.
//!
//! `SearchOutcome` and `NavigationOutcome` replace the original's
//! exception-as-control-flow: failure paths are values the dispatcher turns
//! into user-visible text, never errors that escape the session boundary.

/// Result of a domain search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The domain is available; carries the page's result text.
    Available(String),
    /// The domain is taken; carries the page's result text.
    Unavailable(String),
    /// Neither result marker was visible.
    NotFound,
    /// Something failed while searching or inspecting results.
    Error(String),
}

impl SearchOutcome {
    /// User-visible response text for this outcome.
    pub fn message(&self) -> String {
        match self {
            SearchOutcome::Available(text) | SearchOutcome::Unavailable(text) => text.clone(),
            SearchOutcome::NotFound => "Domain result not clearly found".to_string(),
            SearchOutcome::Error(detail) => {
                format!("Error checking domain availability: {detail}")
            }
        }
    }
}

/// One entry of the priority-ordered result inspection table: the XPath to
/// probe and the outcome constructor for its text. Probes are evaluated in
/// order and the first visible one wins.
pub struct ResultProbe<'a> {
    pub xpath: &'a str,
    pub build: fn(String) -> SearchOutcome,
}

/// A fixed site section the assistant can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Hosting,
    Domains,
}

impl Section {
    /// Derive the section from a navigate-intent command: any mention of
    /// "hosting" wins, everything else goes to domains.
    pub fn from_command(command: &str) -> Section {
        if command.to_lowercase().contains("hosting") {
            Section::Hosting
        } else {
            Section::Domains
        }
    }

    /// Parse a raw section name. `None` when the name mentions neither
    /// hosting nor domains.
    pub fn from_keyword(name: &str) -> Option<Section> {
        let name = name.to_lowercase();
        if name.contains("hosting") {
            Some(Section::Hosting)
        } else if name.contains("domain") {
            Some(Section::Domains)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Hosting => write!(f, "Web Hosting"),
            Section::Domains => write!(f, "Domains"),
        }
    }
}

/// Result of a section navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Navigation succeeded; hosting navigations carry the plan note.
    Navigated {
        section: Section,
        note: Option<String>,
    },
    /// The requested section is not one the assistant knows.
    Unrecognized,
}

impl NavigationOutcome {
    /// User-visible response text for this outcome.
    pub fn message(&self) -> String {
        match self {
            NavigationOutcome::Navigated { section, note } => match note {
                Some(note) => format!("Navigated to {section}\n{note}"),
                None => format!("Navigated to {section}"),
            },
            NavigationOutcome::Unrecognized => "Section not recognized".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_from_command() {
        assert_eq!(Section::from_command("go to hosting"), Section::Hosting);
        assert_eq!(Section::from_command("open WEB HOSTING please"), Section::Hosting);
        assert_eq!(Section::from_command("open the domains page"), Section::Domains);
        assert_eq!(Section::from_command("navigate somewhere"), Section::Domains);
    }

    #[test]
    fn test_section_from_keyword() {
        assert_eq!(Section::from_keyword("web hosting"), Some(Section::Hosting));
        assert_eq!(Section::from_keyword("domains"), Some(Section::Domains));
        assert_eq!(Section::from_keyword("checkout"), None);
    }

    #[test]
    fn test_search_outcome_messages() {
        assert_eq!(
            SearchOutcome::Available("CONGRATS, YOUR DOMAIN IS AVAILABLE!".into()).message(),
            "CONGRATS, YOUR DOMAIN IS AVAILABLE!"
        );
        assert_eq!(
            SearchOutcome::NotFound.message(),
            "Domain result not clearly found"
        );
        assert_eq!(
            SearchOutcome::Error("input not found".into()).message(),
            "Error checking domain availability: input not found"
        );
    }

    #[test]
    fn test_navigation_messages() {
        let hosting = NavigationOutcome::Navigated {
            section: Section::Hosting,
            note: Some("plans".into()),
        };
        assert_eq!(hosting.message(), "Navigated to Web Hosting\nplans");

        let domains = NavigationOutcome::Navigated {
            section: Section::Domains,
            note: None,
        };
        assert_eq!(domains.message(), "Navigated to Domains");

        assert_eq!(NavigationOutcome::Unrecognized.message(), "Section not recognized");
    }
}
