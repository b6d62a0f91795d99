//! Command dispatch: intent to session operation to response.
//!
//! [`dispatch`] is the single entry point the presentation shell calls per
//! captured utterance. It classifies the intent, extracts parameters,
//! invokes the session, and converts every outcome (including session
//! errors) into a response string — nothing propagates past it.

use crate::domain::{extract_spelled, extract_typed, Domain};
use crate::intent::{classify, Intent};
use crate::outcome::Section;
use crate::session::TurbifySession;

/// Fixed response to a greeting.
pub const GREETING: &str = "Hello there! How can I assist you?";
/// Fixed response to an exit command.
pub const FAREWELL: &str = "Goodbye!";
/// Fixed response when nothing matched.
pub const APOLOGY: &str = "Sorry, I didn't understand that.";

/// What the shell does with a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Spoken before the session operation's result, when there is one
    /// (e.g. "Searching example.com").
    pub announce: Option<String>,
    /// The response to print and speak.
    pub reply: String,
    /// Whether the command loop should keep running.
    pub continue_loop: bool,
}

impl DispatchOutcome {
    fn reply_only(reply: impl Into<String>, continue_loop: bool) -> Self {
        Self {
            announce: None,
            reply: reply.into(),
            continue_loop,
        }
    }
}

/// Handle one command against the shared session.
///
/// A command starting with "spell" is always a spelled-out domain search,
/// regardless of how the intent rules would classify it; the intent rules
/// alone would route most spelled commands to `Unknown`. A bare "spell"
/// with no letters extracts an empty domain, which must never reach the
/// session, so it gets the apology instead.
pub async fn dispatch(command: &str, session: &mut TurbifySession) -> DispatchOutcome {
    let normalized = command.trim().to_lowercase();
    let intent = classify(command);
    tracing::info!(command = %command.trim(), intent = ?intent, "dispatching");

    if normalized.starts_with("spell") {
        let domain = extract_spelled(command);
        if domain.as_str().is_empty() {
            return DispatchOutcome::reply_only(APOLOGY, true);
        }
        let announce = format!("You spelled: {domain}. Searching now.");
        return run_search(session, &domain, announce).await;
    }

    match intent {
        Intent::Search => {
            let domain = extract_typed(command);
            let announce = format!("Searching {domain}");
            run_search(session, &domain, announce).await
        }
        Intent::Navigate => {
            let section = Section::from_command(&normalized);
            let reply = match session.navigate_to(section).await {
                Ok(outcome) => outcome.message(),
                Err(e) => format!("Something went wrong: {e}"),
            };
            DispatchOutcome {
                announce: Some(format!("Navigating to {section}")),
                reply,
                continue_loop: true,
            }
        }
        Intent::Greet => DispatchOutcome::reply_only(GREETING, true),
        Intent::Exit => DispatchOutcome::reply_only(FAREWELL, false),
        Intent::Unknown => DispatchOutcome::reply_only(APOLOGY, true),
    }
}

async fn run_search(session: &mut TurbifySession, domain: &Domain, announce: String) -> DispatchOutcome {
    let reply = match session.search_domain(domain).await {
        Ok(outcome) => outcome.message(),
        Err(e) => format!("Something went wrong: {e}"),
    };
    DispatchOutcome {
        announce: Some(announce),
        reply,
        continue_loop: true,
    }
}
