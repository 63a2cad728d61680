//! # Command Execution Layer
//!
//! Translates component [`Effect`]s into background work. Network calls run
//! on Tokio tasks, file reads on the blocking pool; every task resolves to a
//! [`Msg`] that the runtime feeds back into the active screen.
//!
//! Failures never surface as errors here. The console helpers already log
//! and absorb them, and file reads resolve to `Msg::StartersLoaded(None)`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use conform_api::{fetch_current_user, fetch_user_groups, send_impersonation};
use conform_engine::SessionState;
use conform_types::StarterMessage;
use tokio::task::{JoinHandle, spawn, spawn_blocking};
use tracing::{debug, warn};

use crate::app::{App, Effect, Msg};

/// Tasks started for a batch of effects.
#[derive(Debug, Default)]
pub struct CommandBatch {
    pub pending: Vec<JoinHandle<Msg>>,
}

/// Starts the work behind each effect.
///
/// `Finish` is applied to the app immediately; everything else becomes a
/// pending task.
pub fn run_from_effects(app: &mut App, effects: Vec<Effect>) -> CommandBatch {
    let mut batch = CommandBatch::default();
    for effect in effects {
        match effect {
            Effect::Finish(outcome) => {
                debug!(?outcome, "screen finished");
                app.finish(outcome);
            }
            Effect::LoadSession => {
                let api = app.api.clone();
                batch.pending.push(spawn(async move {
                    let user = fetch_current_user(api.as_ref()).await;
                    Msg::SessionLoaded(SessionState::resolved(user))
                }));
            }
            Effect::LoadGroups => {
                let api = app.api.clone();
                batch
                    .pending
                    .push(spawn(async move { Msg::GroupsLoaded(fetch_user_groups(api.as_ref()).await) }));
            }
            Effect::Impersonate(request) => {
                let api = app.api.clone();
                batch.pending.push(spawn(async move {
                    send_impersonation(api.as_ref(), request).await;
                    Msg::ImpersonationFinished
                }));
            }
            Effect::ReloadStarters(path) => {
                batch.pending.push(spawn_blocking(move || match read_starter_file(&path) {
                    Ok(messages) => Msg::StartersLoaded(Some(messages)),
                    Err(error) => {
                        warn!(path = %path.display(), error = %format!("{error:#}"), "failed to reload starter messages");
                        Msg::StartersLoaded(None)
                    }
                }));
            }
        }
    }
    batch
}

/// Reads a JSON array of starter messages.
pub fn read_starter_file(path: &Path) -> Result<Vec<StarterMessage>> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing starter messages in {}", path.display()))
}

/// Writes starter messages as a pretty JSON array.
pub fn write_starter_file(path: &Path, messages: &[StarterMessage]) -> Result<()> {
    let data = serde_json::to_string_pretty(messages).context("serializing starter messages")?;
    fs::write(path, data).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ScreenOutcome, test_support};

    #[tokio::test]
    async fn finish_is_applied_without_a_task() {
        let mut app = test_support::app();
        let batch = run_from_effects(&mut app, vec![Effect::Finish(ScreenOutcome::Cancelled)]);
        assert!(batch.pending.is_empty());
        assert_eq!(app.take_outcome(), Some(ScreenOutcome::Cancelled));
    }

    #[tokio::test]
    async fn session_load_resolves_to_anonymous_without_a_user() {
        let mut app = test_support::app();
        let mut batch = run_from_effects(&mut app, vec![Effect::LoadSession]);
        let msg = batch.pending.remove(0).await.unwrap();
        assert!(matches!(msg, Msg::SessionLoaded(SessionState::Anonymous)));
    }

    #[tokio::test]
    async fn reload_reports_missing_files_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_support::app();
        let mut batch = run_from_effects(&mut app, vec![Effect::ReloadStarters(dir.path().join("missing.json"))]);
        let msg = batch.pending.remove(0).await.unwrap();
        assert!(matches!(msg, Msg::StartersLoaded(None)));
    }

    #[test]
    fn starter_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("starters.json");
        let messages = vec![StarterMessage::new("Hi", "Greets", "Hello")];
        write_starter_file(&path, &messages).unwrap();
        assert_eq!(read_starter_file(&path).unwrap(), messages);
    }
}
