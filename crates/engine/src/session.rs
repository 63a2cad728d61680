//! Signed-in user state and route guards.
//!
//! The session is threaded explicitly into whatever needs identity or role.
//! Fetch failures and "no user" are the same state: [`SessionState::Anonymous`].

use conform_types::User;

/// Route unauthenticated users are sent to.
pub const LOGIN_ROUTE: &str = "/auth/login";
/// Route signed-in users without access are sent to.
pub const DEFAULT_ROUTE: &str = "/search";

/// Current user as far as the console knows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Loading,
    Anonymous,
    SignedIn(User),
}

impl SessionState {
    /// Session resolved from a user fetch; `None` covers both failures and
    /// missing users.
    pub fn resolved(user: Option<User>) -> Self {
        match user {
            Some(user) => SessionState::SignedIn(user),
            None => SessionState::Anonymous,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::SignedIn(user) => Some(user),
            SessionState::Loading | SessionState::Anonymous => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(User::is_admin)
    }
}

/// Outcome of a route guard for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session still loading; render nothing.
    Pending,
    Redirect(&'static str),
    Render,
}

/// Guard for the impersonation screen: cloud superusers only.
pub fn impersonation_access(session: &SessionState) -> RouteDecision {
    match session {
        SessionState::Loading => RouteDecision::Pending,
        SessionState::Anonymous => RouteDecision::Redirect(LOGIN_ROUTE),
        SessionState::SignedIn(user) if user.is_cloud_superuser => RouteDecision::Render,
        SessionState::SignedIn(_) => RouteDecision::Redirect(DEFAULT_ROUTE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_types::UserRole;

    #[test]
    fn loading_session_renders_nothing() {
        assert_eq!(impersonation_access(&SessionState::Loading), RouteDecision::Pending);
    }

    #[test]
    fn missing_user_goes_to_login() {
        let session = SessionState::resolved(None);
        assert_eq!(impersonation_access(&session), RouteDecision::Redirect(LOGIN_ROUTE));
    }

    #[test]
    fn admin_without_superuser_goes_to_default_route() {
        let session = SessionState::resolved(Some(User::new("a@example.com", UserRole::Admin)));
        assert!(session.is_admin());
        assert_eq!(impersonation_access(&session), RouteDecision::Redirect(DEFAULT_ROUTE));
    }

    #[test]
    fn superuser_renders() {
        let session = SessionState::resolved(Some(User::new("a@example.com", UserRole::Basic).cloud_superuser()));
        assert!(!session.is_admin());
        assert_eq!(impersonation_access(&session), RouteDecision::Render);
    }
}
