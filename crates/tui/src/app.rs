//! Application state shared by every screen.
//!
//! The runtime owns one [`App`] and one screen component. Components report
//! side effects as [`Effect`]s; [`crate::cmd`] turns them into background
//! tasks whose results come back as [`Msg`]s.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use conform_api::ConsoleApi;
use conform_engine::{ConnectorFormOptions, ConnectorSubmission, SessionState};
use conform_types::{ConnectionConfiguration, ImpersonateRequest, StarterMessage, UserGroup};

use crate::ui::theme::Theme;

const THROBBER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Screen the TUI opens on.
#[derive(Debug, Clone)]
pub enum Screen {
    /// Dynamic connector form built from a connection configuration.
    ConnectorForm {
        config: ConnectionConfiguration,
        options: ConnectorFormOptions,
    },
    /// Starter message editor backed by a JSON file.
    Starters { path: PathBuf, messages: Vec<StarterMessage> },
    /// Tenant impersonation page.
    Impersonate,
}

/// How a screen was left.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenOutcome {
    Cancelled,
    Connector(ConnectorSubmission),
    Starters(Vec<StarterMessage>),
    /// The access guard sent the viewer elsewhere.
    Redirect(&'static str),
    Impersonated,
}

/// Results delivered back to the active screen.
#[derive(Debug, Clone)]
pub enum Msg {
    Tick,
    SessionLoaded(SessionState),
    /// `None` when the groups could not be fetched.
    GroupsLoaded(Option<Vec<UserGroup>>),
    /// `None` when the starter file could not be read.
    StartersLoaded(Option<Vec<StarterMessage>>),
    ImpersonationFinished,
}

/// Side effects requested by components.
#[derive(Debug, Clone)]
pub enum Effect {
    LoadSession,
    LoadGroups,
    Impersonate(ImpersonateRequest),
    ReloadStarters(PathBuf),
    /// Leaves the screen; the first outcome wins.
    Finish(ScreenOutcome),
}

pub struct App {
    pub api: Arc<dyn ConsoleApi>,
    pub session: SessionState,
    pub theme: Box<dyn Theme>,
    pub throbber_idx: usize,
    /// Background tasks still running.
    pub executing: bool,
    pub(crate) outcome: Option<ScreenOutcome>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("session", &self.session)
            .field("theme", &self.theme)
            .field("executing", &self.executing)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl App {
    pub fn new(api: Arc<dyn ConsoleApi>, theme: Box<dyn Theme>) -> Self {
        Self {
            api,
            session: SessionState::Loading,
            theme,
            throbber_idx: 0,
            executing: false,
            outcome: None,
        }
    }

    /// Applies application-wide bookkeeping for a message.
    pub fn update(&mut self, msg: &Msg) {
        match msg {
            Msg::Tick => {
                if self.executing {
                    self.throbber_idx = (self.throbber_idx + 1) % THROBBER_FRAMES.len();
                }
            }
            Msg::SessionLoaded(session) => self.session = session.clone(),
            Msg::GroupsLoaded(_) | Msg::StartersLoaded(_) | Msg::ImpersonationFinished => {}
        }
    }

    pub fn throbber(&self) -> &'static str {
        THROBBER_FRAMES[self.throbber_idx % THROBBER_FRAMES.len()]
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Records the screen outcome unless one is already set.
    pub fn finish(&mut self, outcome: ScreenOutcome) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
    }

    pub fn take_outcome(&mut self) -> Option<ScreenOutcome> {
        self.outcome.take()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_outcome_wins() {
        let mut app = test_support::app();
        app.finish(ScreenOutcome::Impersonated);
        app.finish(ScreenOutcome::Cancelled);
        assert_eq!(app.take_outcome(), Some(ScreenOutcome::Impersonated));
        assert!(!app.is_finished());
    }

    #[test]
    fn throbber_only_advances_while_executing() {
        let mut app = test_support::app();
        app.update(&Msg::Tick);
        assert_eq!(app.throbber_idx, 0);
        app.executing = true;
        app.update(&Msg::Tick);
        assert_eq!(app.throbber(), "⠙");
    }
}
