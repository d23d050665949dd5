use crate::core::intake::{HitlStatus, WorkflowState};
use crate::error::SessionError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;

/// Short listing entry for a persisted session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub status: HitlStatus,
    pub iteration_count: u32,
    pub max_iterations: u32,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionSummary {
    fn from_state(state: &WorkflowState) -> Self {
        Self {
            session_id: state.session_id.clone(),
            status: state.status,
            iteration_count: state.iteration_count,
            max_iterations: state.max_iterations,
            updated_at: state.ledger.latest().map(|entry| entry.timestamp),
        }
    }
}

/// Async persistence contract for workflow state between turns.
pub trait SessionStore: Send + Sync {
    fn save<'a>(
        &'a self,
        state: &'a WorkflowState,
    ) -> Pin<Box<dyn Future<Output = Result<(), SessionError>> + Send + 'a>>;

    fn load<'a>(
        &'a self,
        session_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<WorkflowState, SessionError>> + Send + 'a>>;

    /// Original brief text, readable even when the state file is corrupt.
    fn load_brief<'a>(
        &'a self,
        session_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SessionError>> + Send + 'a>>;

    fn list(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SessionSummary>, SessionError>> + Send + '_>>;

    fn delete<'a>(
        &'a self,
        session_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, SessionError>> + Send + 'a>>;
}

/// Stores each session as `<id>.json` plus `<id>.brief.txt` in one directory.
pub struct JsonFileSessionStore {
    dir: PathBuf,
}

const STATE_SUFFIX: &str = ".json";
const BRIEF_SUFFIX: &str = ".brief.txt";

fn store_error(action: &str, path: &Path, err: &std::io::Error) -> SessionError {
    SessionError::Store(format!("{action} {}: {err}", path.display()))
}

fn validate_id(session_id: &str) -> Result<(), SessionError> {
    let valid = !session_id.is_empty()
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SessionError::Store(format!("invalid session id: {session_id:?}")))
    }
}

impl JsonFileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn state_path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}{STATE_SUFFIX}"))
    }

    fn brief_path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}{BRIEF_SUFFIX}"))
    }

    async fn save_state(&self, state: &WorkflowState) -> Result<(), SessionError> {
        validate_id(&state.session_id)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| store_error("create", &self.dir, &err))?;

        let brief_path = self.brief_path(&state.session_id);
        if tokio::fs::try_exists(&brief_path).await.unwrap_or(false) {
            tracing::trace!(session_id = %state.session_id, "Brief already stored");
        } else {
            tokio::fs::write(&brief_path, &state.original_brief)
                .await
                .map_err(|err| store_error("write", &brief_path, &err))?;
        }

        let raw = state
            .to_json()
            .map_err(|err| SessionError::Store(format!("serialize session: {err}")))?;
        let state_path = self.state_path(&state.session_id);
        let tmp_path = state_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, raw)
            .await
            .map_err(|err| store_error("write", &tmp_path, &err))?;
        tokio::fs::rename(&tmp_path, &state_path)
            .await
            .map_err(|err| store_error("rename", &tmp_path, &err))?;

        tracing::debug!(
            session_id = %state.session_id,
            status = %state.status,
            iteration_count = state.iteration_count,
            "Session saved"
        );
        Ok(())
    }

    async fn load_state(&self, session_id: &str) -> Result<WorkflowState, SessionError> {
        validate_id(session_id)?;
        let path = self.state_path(session_id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(SessionError::NotFound(session_id.to_string()));
            }
            Err(err) => return Err(store_error("read", &path, &err)),
        };

        let state = WorkflowState::from_json(session_id, &raw)?;
        if state.session_id != session_id {
            return Err(SessionError::Mismatch {
                expected: session_id.to_string(),
                actual: state.session_id,
            });
        }
        Ok(state)
    }

    async fn read_brief(&self, session_id: &str) -> Result<String, SessionError> {
        validate_id(session_id)?;
        let path = self.brief_path(session_id);
        match tokio::fs::read_to_string(&path).await {
            Ok(brief) => Ok(brief),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(SessionError::NotFound(session_id.to_string()))
            }
            Err(err) => Err(store_error("read", &path, &err)),
        }
    }

    async fn list_states(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(store_error("list", &self.dir, &err)),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| store_error("list", &self.dir, &err))?
        {
            let file_name = entry.file_name();
            let Some(session_id) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(STATE_SUFFIX))
            else {
                continue;
            };
            match self.load_state(session_id).await {
                Ok(state) => summaries.push(SessionSummary::from_state(&state)),
                Err(err) => {
                    tracing::warn!(session_id, error = %err, "Skipping unreadable session");
                }
            }
        }

        summaries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        Ok(summaries)
    }

    async fn remove(&self, session_id: &str) -> Result<bool, SessionError> {
        validate_id(session_id)?;
        let mut removed = false;
        for path in [self.state_path(session_id), self.brief_path(session_id)] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed = true,
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(store_error("remove", &path, &err)),
            }
        }
        Ok(removed)
    }
}

impl SessionStore for JsonFileSessionStore {
    fn save<'a>(
        &'a self,
        state: &'a WorkflowState,
    ) -> Pin<Box<dyn Future<Output = Result<(), SessionError>> + Send + 'a>> {
        Box::pin(self.save_state(state))
    }

    fn load<'a>(
        &'a self,
        session_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<WorkflowState, SessionError>> + Send + 'a>> {
        Box::pin(self.load_state(session_id))
    }

    fn load_brief<'a>(
        &'a self,
        session_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SessionError>> + Send + 'a>> {
        Box::pin(self.read_brief(session_id))
    }

    fn list(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SessionSummary>, SessionError>> + Send + '_>> {
        Box::pin(self.list_states())
    }

    fn delete<'a>(
        &'a self,
        session_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, SessionError>> + Send + 'a>> {
        Box::pin(self.remove(session_id))
    }
}
