//! Client for the external submission collaborator.
//!
//! The core's responsibility ends at producing a valid snapshot of all
//! question groups; this client posts it once and reports a single
//! pass/fail outcome. No retry, no queueing, no reconciliation.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::domain::{ContentType, QuestionGroup};
use crate::util::trunc_for_log;

/// Payload handed to the submission collaborator: one lesson, one content
/// type, every group with its validated questions.
#[derive(Debug, Serialize)]
pub struct SubmissionPayload {
  pub lesson_id: String,
  pub content_type: ContentType,
  pub groups: Vec<QuestionGroup>,
}

#[derive(Clone)]
pub struct SubmissionClient {
  client: reqwest::Client,
  pub endpoint: String,
}

impl SubmissionClient {
  /// Construct the client if SUBMISSION_URL is set; otherwise return None
  /// and submissions are validated locally only.
  pub fn from_env() -> Option<Self> {
    let endpoint = std::env::var("SUBMISSION_URL").ok()?;
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;
    Some(Self { client, endpoint })
  }

  /// Post the snapshot. Returns the collaborator's verdict as Ok(()) or a
  /// single failure message; the caller surfaces it and moves on.
  #[instrument(level = "info", skip(self, payload), fields(lesson = %payload.lesson_id, groups = payload.groups.len()))]
  pub async fn submit(&self, payload: &SubmissionPayload) -> Result<(), String> {
    let res = self
      .client
      .post(&self.endpoint)
      .header(USER_AGENT, "bigkas-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(payload)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      error!(target: "authoring", %status, body = %trunc_for_log(&body, 200), "Submission rejected by collaborator");
      return Err(format!("submission endpoint returned HTTP {}", status));
    }

    info!(target: "authoring", endpoint = %self.endpoint, "Submission accepted");
    Ok(())
  }
}
