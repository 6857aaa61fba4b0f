//! Application state: in-memory authoring sessions, capacity limits, and
//! the optional submission client.
//!
//! This module owns:
//!   - the session store (session id -> lesson context + form)
//!   - session lifecycle (open, lookup, close)
//!   - the submit flow (lock, validate, hand off, report, unlock)
//!
//! Each edit takes the store's write lock for one synchronous controller
//! call; there is no cross-session coordination.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::load_authoring_config_from_env;
use crate::domain::ContentType;
use crate::form::{AuthoringForm, Limits};
use crate::submit::{SubmissionClient, SubmissionPayload};

/// One authoring session: the read-only lesson context plus the form.
#[derive(Clone, Debug)]
pub struct AuthoringSession {
    pub lesson_id: String,
    pub content_type: ContentType,
    pub form: AuthoringForm,
}

/// Outcome of a submission attempt, surfaced to the user as-is.
#[derive(Clone, Debug)]
pub struct SubmitOutcome {
    pub accepted: bool,
    pub message: String,
}

#[derive(Clone)]
pub struct AppState {
    sessions: Arc<RwLock<HashMap<String, AuthoringSession>>>,
    pub limits: Limits,
    pub submission: Option<SubmissionClient>,
}

impl AppState {
    /// Build state from env: load config limits, init the submission client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let limits = load_authoring_config_from_env()
            .map(|c| c.limits())
            .unwrap_or_default();
        info!(
            target: "bigkas_backend",
            max_groups = limits.max_groups,
            max_questions = limits.max_questions,
            "Authoring limits"
        );

        let submission = SubmissionClient::from_env();
        if let Some(s) = &submission {
            info!(target: "bigkas_backend", endpoint = %s.endpoint, "Submission client enabled.");
        } else {
            info!(target: "bigkas_backend", "Submission client disabled (no SUBMISSION_URL). Snapshots validated locally only.");
        }

        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            limits,
            submission,
        }
    }

    /// Open a fresh session for one lesson and content type. The form is
    /// born with one group holding one default question.
    #[instrument(level = "info", skip(self), fields(%lesson_id, ?content_type))]
    pub async fn open_session(&self, lesson_id: String, content_type: ContentType) -> String {
        let id = Uuid::new_v4().to_string();
        let session = AuthoringSession {
            lesson_id,
            content_type,
            form: AuthoringForm::new(self.limits),
        };
        self.sessions.write().await.insert(id.clone(), session);
        info!(target: "authoring", session = %id, "Session opened");
        id
    }

    /// Read-only clone of a session by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_session(&self, id: &str) -> Option<AuthoringSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Run a closure against one session's form under the write lock.
    /// Returns None for an unknown session id.
    pub async fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut AuthoringSession) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(id).map(f)
    }

    /// Drop a session. Committed submissions are unaffected; this is the
    /// UI-level "close the modal" cancellation.
    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn close_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!(target: "authoring", session = %id, "Session closed");
        }
        removed
    }

    /// Submit flow: lock the form, validate eligibility, hand the snapshot
    /// to the collaborator, report one pass/fail outcome, unlock.
    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn submit_session(&self, id: &str) -> Option<SubmitOutcome> {
        // Phase 1: under the lock, validate and capture the snapshot.
        let prepared = self
            .with_session(id, |s| {
                if !s.form.is_submittable() {
                    return Err("every quiz/seatwork needs at least one completed question".to_string());
                }
                s.form.set_locked(true);
                Ok(SubmissionPayload {
                    lesson_id: s.lesson_id.clone(),
                    content_type: s.content_type,
                    groups: s.form.snapshot(),
                })
            })
            .await?;

        let payload = match prepared {
            Ok(p) => p,
            Err(message) => {
                warn!(target: "authoring", session = %id, %message, "Submission refused");
                return Some(SubmitOutcome { accepted: false, message });
            }
        };

        // Phase 2: call the collaborator without holding the store lock.
        let outcome = match &self.submission {
            Some(client) => match client.submit(&payload).await {
                Ok(()) => SubmitOutcome {
                    accepted: true,
                    message: "submitted".into(),
                },
                Err(e) => SubmitOutcome {
                    accepted: false,
                    message: e,
                },
            },
            None => {
                warn!(target: "authoring", session = %id, "No submission endpoint configured; snapshot validated only");
                SubmitOutcome {
                    accepted: true,
                    message: "validated (no submission endpoint configured)".into(),
                }
            }
        };

        // Phase 3: editing resumes either way; a failed submission is
        // merely displayed, never retried here.
        self.with_session(id, |s| s.form.set_locked(false)).await;
        info!(target: "authoring", session = %id, accepted = outcome.accepted, "Submission outcome");
        Some(outcome)
    }
}
