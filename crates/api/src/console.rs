//! Console operations used by the front ends.
//!
//! Every helper here absorbs failures: errors are logged and the caller sees
//! "no user", "no groups", or nothing at all. Nothing is retried.

use async_trait::async_trait;
use conform_types::{ImpersonateRequest, User, UserGroup};
use tracing::{error, info, warn};

use crate::error::ApiError;

/// Backend calls the console needs.
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// The signed-in user; `Ok(None)` when the backend reports no session.
    async fn current_user(&self) -> Result<Option<User>, ApiError>;

    /// Groups the signed-in user may assign connectors to.
    async fn user_groups(&self) -> Result<Vec<UserGroup>, ApiError>;

    /// Starts a tenant impersonation and returns the HTTP status.
    async fn impersonate(&self, request: &ImpersonateRequest) -> Result<u16, ApiError>;
}

/// Fetches the current user; failures are logged and read as "no user".
pub async fn fetch_current_user(api: &dyn ConsoleApi) -> Option<User> {
    match api.current_user().await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            warn!("Failed to fetch current user");
            None
        }
        Err(err) => {
            error!(error = %err, "Error fetching current user");
            None
        }
    }
}

/// Fetches the user's groups; failures are logged and read as "not loaded".
pub async fn fetch_user_groups(api: &dyn ConsoleApi) -> Option<Vec<UserGroup>> {
    match api.user_groups().await {
        Ok(groups) => Some(groups),
        Err(err) => {
            error!(error = %err, "Error fetching user groups");
            None
        }
    }
}

/// Sends an impersonation request. The outcome is only logged; success and
/// failure look the same to the caller.
pub async fn send_impersonation(api: &dyn ConsoleApi, request: ImpersonateRequest) {
    match api.impersonate(&request).await {
        Ok(status) => info!(status, email = %request.email, "impersonation response"),
        Err(err) => warn!(error = %err, email = %request.email, "impersonation request failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_types::UserRole;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeConsole {
        user: Option<User>,
        groups: Option<Vec<UserGroup>>,
        impersonations: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ConsoleApi for FakeConsole {
        async fn current_user(&self) -> Result<Option<User>, ApiError> {
            Ok(self.user.clone())
        }

        async fn user_groups(&self) -> Result<Vec<UserGroup>, ApiError> {
            self.groups.clone().ok_or(ApiError::Status {
                status: 500,
                body: "boom".into(),
            })
        }

        async fn impersonate(&self, request: &ImpersonateRequest) -> Result<u16, ApiError> {
            self.impersonations.lock().unwrap().push(request.email.clone());
            Err(ApiError::Status {
                status: 403,
                body: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn missing_user_reads_as_none() {
        let api = FakeConsole::default();
        assert!(fetch_current_user(&api).await.is_none());
    }

    #[tokio::test]
    async fn user_is_passed_through() {
        let api = FakeConsole {
            user: Some(User::new("admin@example.com", UserRole::Admin)),
            ..FakeConsole::default()
        };
        let user = fetch_current_user(&api).await.expect("user");
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn group_failure_reads_as_not_loaded() {
        let api = FakeConsole::default();
        assert!(fetch_user_groups(&api).await.is_none());
        let api = FakeConsole {
            groups: Some(vec![UserGroup::new(1, "eng")]),
            ..FakeConsole::default()
        };
        assert_eq!(fetch_user_groups(&api).await.map(|groups| groups.len()), Some(1));
    }

    #[tokio::test]
    async fn impersonation_failure_is_absorbed() {
        let api = FakeConsole::default();
        send_impersonation(
            &api,
            ImpersonateRequest {
                email: "user@example.com".into(),
                api_key: "key".into(),
            },
        )
        .await;
        assert_eq!(*api.impersonations.lock().unwrap(), vec!["user@example.com".to_string()]);
    }
}
