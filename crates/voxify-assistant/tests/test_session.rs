//! Session and dispatcher tests over a scripted mock page.
//!
//! The mock implements `SitePage` with canned visibility/text per XPath and
//! records every page call, so the tests can assert both outcomes and the
//! exact probe order without a browser.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use voxify_assistant::config::SiteConfig;
use voxify_assistant::dispatch::{dispatch, APOLOGY, FAREWELL};
use voxify_assistant::domain::extract_typed;
use voxify_assistant::outcome::{NavigationOutcome, SearchOutcome, Section};
use voxify_assistant::page::{PageError, SitePage};
use voxify_assistant::session::{SessionState, TurbifySession, HOSTING_PLANS_MESSAGE};

type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
struct MockPage {
    /// XPaths that report as visible.
    visible: HashSet<String>,
    /// Inner text per XPath.
    texts: HashMap<String, String>,
    /// Fail every navigation when set.
    fail_goto: bool,
    /// Fail navigations after this many successful ones.
    fail_goto_after: Option<usize>,
    goto_count: usize,
    log: CallLog,
}

impl MockPage {
    fn new() -> Self {
        Self::default()
    }

    fn with_visible(mut self, xpath: &str, text: &str) -> Self {
        self.visible.insert(xpath.to_string());
        self.texts.insert(xpath.to_string(), text.to_string());
        self
    }

    fn failing_navigation(mut self) -> Self {
        self.fail_goto = true;
        self
    }

    /// Let the opening navigation succeed, then fail the rest.
    fn failing_after_open(mut self) -> Self {
        self.fail_goto_after = Some(1);
        self
    }

    fn log_handle(&self) -> CallLog {
        Arc::clone(&self.log)
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl SitePage for MockPage {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<(), PageError> {
        self.record(format!("goto {url}"));
        let limit_reached = self
            .fail_goto_after
            .is_some_and(|limit| self.goto_count >= limit);
        if self.fail_goto || limit_reached {
            return Err(PageError::Navigation("connection refused".to_string()));
        }
        self.goto_count += 1;
        Ok(())
    }

    async fn wait_visible(&mut self, xpath: &str, _timeout: Duration) -> Result<bool, PageError> {
        self.record(format!("wait_visible {xpath}"));
        Ok(self.visible.contains(xpath))
    }

    async fn fill(&mut self, xpath: &str, text: &str) -> Result<(), PageError> {
        self.record(format!("fill {xpath} = {text}"));
        Ok(())
    }

    async fn click(&mut self, xpath: &str) -> Result<(), PageError> {
        self.record(format!("click {xpath}"));
        Ok(())
    }

    async fn wait_network_idle(&mut self, _timeout: Duration) -> Result<bool, PageError> {
        self.record("wait_network_idle".to_string());
        Ok(true)
    }

    async fn is_visible(&mut self, xpath: &str) -> Result<bool, PageError> {
        self.record(format!("is_visible {xpath}"));
        Ok(self.visible.contains(xpath))
    }

    async fn inner_text(&mut self, xpath: &str) -> Result<Option<String>, PageError> {
        self.record(format!("inner_text {xpath}"));
        Ok(self.texts.get(xpath).cloned())
    }

    async fn close(&mut self) {
        self.record("close".to_string());
    }
}

/// Build an opened session over the given mock, returning the call log.
async fn opened_session(mock: MockPage) -> (TurbifySession, CallLog) {
    let log = mock.log_handle();
    let mut session = TurbifySession::new(Box::new(mock), SiteConfig::default());
    session.open().await.expect("open should succeed");
    (session, log)
}

fn searchable_mock() -> MockPage {
    let config = SiteConfig::default();
    MockPage::new().with_visible(&config.search_input_xpath, "")
}

// ---------------------------------------------------------------------------
// Search outcomes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_search_available_never_inspects_unavailable() {
    let config = SiteConfig::default();
    let mock = searchable_mock().with_visible(
        &config.available_result_xpath,
        "  CONGRATS, YOUR DOMAIN IS AVAILABLE!  ",
    );
    let (mut session, log) = opened_session(mock).await;

    let outcome = session
        .search_domain(&extract_typed("search example.com"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        SearchOutcome::Available("CONGRATS, YOUR DOMAIN IS AVAILABLE!".to_string())
    );

    let log = log.lock().unwrap();
    assert!(
        !log.iter().any(|e| e.contains("unavailableText")),
        "unavailable marker must not be inspected: {log:?}"
    );
}

#[tokio::test]
async fn test_search_unavailable() {
    let config = SiteConfig::default();
    let mock = searchable_mock().with_visible(
        &config.unavailable_result_xpath,
        "Sorry, the domain rosik.com is already registered.",
    );
    let (mut session, _log) = opened_session(mock).await;

    let outcome = session
        .search_domain(&extract_typed("search rosik.com"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        SearchOutcome::Unavailable("Sorry, the domain rosik.com is already registered.".to_string())
    );
}

#[tokio::test]
async fn test_search_neither_marker_is_not_found() {
    let (mut session, _log) = opened_session(searchable_mock()).await;
    let outcome = session
        .search_domain(&extract_typed("search example.com"))
        .await
        .unwrap();
    assert_eq!(outcome, SearchOutcome::NotFound);
}

#[tokio::test]
async fn test_search_input_never_visible_is_error_outcome() {
    // Nothing visible at all: the input wait misses its bound.
    let (mut session, _log) = opened_session(MockPage::new()).await;
    let outcome = session
        .search_domain(&extract_typed("search example.com"))
        .await
        .unwrap();
    assert_eq!(outcome, SearchOutcome::Error("input not found".to_string()));
}

#[tokio::test]
async fn test_search_navigation_failure_is_error_outcome() {
    let (mut session, _log) = opened_session(MockPage::new().failing_after_open()).await;
    let outcome = session
        .search_domain(&extract_typed("search example.com"))
        .await
        .unwrap();
    match outcome {
        SearchOutcome::Error(msg) => assert!(msg.contains("navigation failed")),
        other => panic!("expected error outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_search_fills_the_extracted_domain() {
    let (mut session, log) = opened_session(searchable_mock()).await;
    session
        .search_domain(&extract_typed("search example"))
        .await
        .unwrap();
    let log = log.lock().unwrap();
    assert!(log.iter().any(|e| e.contains("fill") && e.ends_with("= example.com")));
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_navigate_hosting_attaches_plan_note() {
    let config = SiteConfig::default();
    let mock = MockPage::new().with_visible(&config.plan_button_xpath, "Choose Plan");
    let (mut session, log) = opened_session(mock).await;

    let outcome = session.navigate_to(Section::Hosting).await.unwrap();
    assert_eq!(
        outcome,
        NavigationOutcome::Navigated {
            section: Section::Hosting,
            note: Some(HOSTING_PLANS_MESSAGE.to_string()),
        }
    );

    let log = log.lock().unwrap();
    assert!(log.iter().any(|e| e == "goto https://www.turbify.com/hosting"));
    assert!(log.iter().any(|e| e.starts_with("click") && e.contains("Premiercontainer")));
}

#[tokio::test]
async fn test_navigate_hosting_plan_timeout_is_error_note() {
    let (mut session, _log) = opened_session(MockPage::new()).await;
    let outcome = session.navigate_to(Section::Hosting).await.unwrap();
    match outcome {
        NavigationOutcome::Navigated { note: Some(note), .. } => {
            assert!(note.starts_with("Could not perform action"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_navigate_domains_has_no_note() {
    let (mut session, log) = opened_session(MockPage::new()).await;
    let outcome = session.navigate_to(Section::Domains).await.unwrap();
    assert_eq!(
        outcome,
        NavigationOutcome::Navigated {
            section: Section::Domains,
            note: None,
        }
    );
    let log = log.lock().unwrap();
    assert!(log.iter().any(|e| e == "goto https://www.turbify.com/domains"));
}

#[tokio::test]
async fn test_navigate_named_unrecognized() {
    let (mut session, _log) = opened_session(MockPage::new()).await;
    let outcome = session.navigate_to_named("checkout").await.unwrap();
    assert_eq!(outcome, NavigationOutcome::Unrecognized);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_open_failure_leaves_session_uninitialized() {
    let mock = MockPage::new().failing_navigation();
    let mut session = TurbifySession::new(Box::new(mock), SiteConfig::default());
    assert!(session.open().await.is_err());
    assert_eq!(session.state(), SessionState::Uninitialized);
}

#[tokio::test]
async fn test_operation_before_open_is_rejected() {
    let mut session = TurbifySession::new(Box::new(MockPage::new()), SiteConfig::default());
    let err = session
        .search_domain(&extract_typed("search example.com"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not been opened"));
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (mut session, log) = opened_session(MockPage::new()).await;
    session.close().await;
    session.close().await;
    assert_eq!(session.state(), SessionState::Closed);
    let closes = log.lock().unwrap().iter().filter(|e| *e == "close").count();
    assert_eq!(closes, 1, "page must be released exactly once");
}

#[tokio::test]
async fn test_operation_after_close_is_rejected() {
    let (mut session, _log) = opened_session(MockPage::new()).await;
    session.close().await;
    let err = session
        .search_domain(&extract_typed("search example.com"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("closed"));
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_dispatch_exit_skips_the_session() {
    let (mut session, log) = opened_session(MockPage::new()).await;
    let calls_before = log.lock().unwrap().len();

    let outcome = dispatch("bye bye", &mut session).await;
    assert!(!outcome.continue_loop);
    assert_eq!(outcome.reply, FAREWELL);
    assert_eq!(
        log.lock().unwrap().len(),
        calls_before,
        "exit must not touch the page"
    );
}

#[tokio::test]
async fn test_dispatch_search_announces_and_replies() {
    let config = SiteConfig::default();
    let mock = searchable_mock().with_visible(&config.available_result_xpath, "CONGRATS!");
    let (mut session, _log) = opened_session(mock).await;

    let outcome = dispatch("search example.com", &mut session).await;
    assert_eq!(outcome.announce.as_deref(), Some("Searching example.com"));
    assert_eq!(outcome.reply, "CONGRATS!");
    assert!(outcome.continue_loop);
}

#[tokio::test]
async fn test_dispatch_spell_prefix_overrides_intent() {
    let config = SiteConfig::default();
    let mock = searchable_mock().with_visible(&config.available_result_xpath, "CONGRATS!");
    let (mut session, log) = opened_session(mock).await;

    let outcome = dispatch("spell e x a m p l e dot com", &mut session).await;
    assert_eq!(
        outcome.announce.as_deref(),
        Some("You spelled: example.com. Searching now.")
    );
    let log = log.lock().unwrap();
    assert!(log.iter().any(|e| e.contains("= example.com")));
}

#[tokio::test]
async fn test_dispatch_bare_spell_skips_the_session() {
    // "spell" with no letters extracts an empty domain; an empty domain
    // must never be announced or filled into the site's search input.
    let (mut session, log) = opened_session(searchable_mock()).await;
    let calls_before = log.lock().unwrap().len();

    let outcome = dispatch("spell", &mut session).await;
    assert!(outcome.announce.is_none());
    assert_eq!(outcome.reply, APOLOGY);
    assert!(outcome.continue_loop);
    assert_eq!(
        log.lock().unwrap().len(),
        calls_before,
        "an empty spelled domain must not touch the page"
    );
}

#[tokio::test]
async fn test_dispatch_navigate_error_becomes_reply() {
    // Open succeeds, then the hosting navigation fails; the error must come
    // back as a reply, never propagate out of dispatch.
    let (mut session, _log) = opened_session(MockPage::new().failing_after_open()).await;
    let outcome = dispatch("go to hosting", &mut session).await;
    assert!(outcome.reply.starts_with("Something went wrong"));
    assert!(outcome.continue_loop);
}

#[tokio::test]
async fn test_dispatch_greet_and_unknown() {
    let (mut session, _log) = opened_session(MockPage::new()).await;

    let greet = dispatch("hello there", &mut session).await;
    assert_eq!(greet.reply, "Hello there! How can I assist you?");
    assert!(greet.continue_loop);

    let unknown = dispatch("sing me a song", &mut session).await;
    assert_eq!(unknown.reply, "Sorry, I didn't understand that.");
    assert!(unknown.continue_loop);
}
