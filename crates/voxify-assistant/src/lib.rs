//! Command interpretation and site automation core.
//!
//! Takes one spoken command at a time and drives a scripted browser session
//! against the target site: classify the intent, extract a domain name when
//! one is being searched, sequence the page actions, and classify the
//! result into a response the shell prints and speaks.
//!
//! # Data flow
//!
//! ```text
//! command -> intent::classify -> domain::extract_* (search only)
//!         -> session::TurbifySession operation -> outcome value
//!         -> dispatch::DispatchOutcome (response text + continue flag)
//! ```
//!
//! The session is created once, shared by exclusive reference across all
//! commands, and closed exactly once at shutdown. All page waits are
//! bounded; per-operation page failures become outcome values at the
//! session boundary and never escape [`dispatch::dispatch`].

pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod intent;
pub mod outcome;
pub mod page;
pub mod session;

pub use config::SiteConfig;
pub use dispatch::{dispatch, DispatchOutcome};
pub use domain::{extract_spelled, extract_typed, Domain};
pub use error::SessionError;
pub use intent::{classify, Intent};
pub use outcome::{NavigationOutcome, SearchOutcome, Section};
pub use page::{CdpPage, PageError, SitePage};
pub use session::{SessionState, TurbifySession};
