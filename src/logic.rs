//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Dispatching one edit intent to the form controller
//!   - Assembling session snapshots with derived statistics
//!   - The submit flow and the standalone syllabify helper

use tracing::{info, instrument, warn};

use crate::protocol::{session_out, EditData, EditOp, SessionOut};
use crate::state::{AppState, SubmitOutcome};
use crate::syllable::{auto_syllabify, parts_rebuild_target};

/// Result of applying one edit intent.
#[derive(Debug)]
pub enum EditReply {
  /// Edit committed; carries op-specific data plus the fresh snapshot.
  Applied { data: EditData, session: SessionOut },
  /// Edit rejected by an invariant; state unchanged.
  Rejected { code: &'static str, message: String },
  UnknownSession,
}

/// Apply one edit intent to a session's form. All validation lives in the
/// controller; this layer only routes and reports.
#[instrument(level = "info", skip(state, op), fields(%session_id))]
pub async fn apply_edit(state: &AppState, session_id: &str, op: EditOp) -> EditReply {
  let applied = state
    .with_session(session_id, |s| {
      let form = &mut s.form;
      let result = match op {
        EditOp::AddGroup => form.add_group().map(|id| EditData::Created { id }),
        EditOp::RemoveGroup { group_id } => form.remove_group(&group_id).map(|_| EditData::Ok),
        EditOp::SelectGroup { group_id } => form.select_group(&group_id).map(|_| EditData::Ok),
        EditOp::SelectKind { kind } => {
          form.select_new_question_kind(kind);
          Ok(EditData::Ok)
        }
        EditOp::AddQuestion { group_id } => {
          form.add_question(&group_id).map(|id| EditData::Created { id })
        }
        EditOp::RemoveQuestion { group_id, question_id } => {
          form.remove_question(&group_id, &question_id).map(|_| EditData::Ok)
        }
        EditOp::SetPrompt { group_id, question_id, text } => {
          form.set_prompt(&group_id, &question_id, text).map(|_| EditData::Ok)
        }
        EditOp::AttachImage { group_id, question_id, url, file_name } => form
          .attach_image(&group_id, &question_id, url, file_name)
          .map(|_| EditData::Ok),
        EditOp::ClearImage { group_id, question_id } => {
          form.clear_image(&group_id, &question_id).map(|_| EditData::Ok)
        }
        EditOp::SetOptionText { group_id, question_id, index, text } => form
          .set_option_text(&group_id, &question_id, index, text)
          .map(|_| EditData::Ok),
        EditOp::AddOption { group_id, question_id } => {
          form.add_option(&group_id, &question_id).map(|_| EditData::Ok)
        }
        EditOp::RemoveOption { group_id, question_id, index } => {
          form.remove_option(&group_id, &question_id, index).map(|_| EditData::Ok)
        }
        EditOp::SetCorrectOption { group_id, question_id, index } => form
          .set_correct_option(&group_id, &question_id, index)
          .map(|_| EditData::Ok),
        EditOp::SetAnswer { group_id, question_id, text } => {
          form.set_answer(&group_id, &question_id, &text).map(|_| EditData::Ok)
        }
        EditOp::GenerateLetterBank { group_id, question_id } => form
          .generate_letter_bank(&group_id, &question_id)
          .map(|letters| EditData::LetterBank { letters }),
        EditOp::AddCategory { group_id, question_id, label } => {
          form.add_category(&group_id, &question_id, &label).map(|_| EditData::Ok)
        }
        EditOp::RenameCategory { group_id, question_id, from, to } => form
          .rename_category(&group_id, &question_id, &from, &to)
          .map(|_| EditData::Ok),
        EditOp::RemoveCategory { group_id, question_id, label } => {
          form.remove_category(&group_id, &question_id, &label).map(|_| EditData::Ok)
        }
        EditOp::AddBankItem { group_id, question_id, item } => {
          form.add_bank_item(&group_id, &question_id, &item).map(|_| EditData::Ok)
        }
        EditOp::RemoveBankItem { group_id, question_id, item } => {
          form.remove_bank_item(&group_id, &question_id, &item).map(|_| EditData::Ok)
        }
        EditOp::MoveItemToCategory { group_id, question_id, item, label } => form
          .move_item_to_category(&group_id, &question_id, &item, &label)
          .map(|_| EditData::Ok),
        EditOp::ReturnItemToBank { group_id, question_id, label, item } => form
          .return_item_to_bank(&group_id, &question_id, &label, &item)
          .map(|_| EditData::Ok),
        EditOp::SetLeftText { group_id, question_id, index, text } => form
          .set_left_text(&group_id, &question_id, index, text)
          .map(|_| EditData::Ok),
        EditOp::SetRightText { group_id, question_id, index, text } => form
          .set_right_text(&group_id, &question_id, index, text)
          .map(|_| EditData::Ok),
        EditOp::SetMatch { group_id, question_id, index, target } => form
          .set_match(&group_id, &question_id, index, target)
          .map(|_| EditData::Ok),
        EditOp::AddPair { group_id, question_id } => {
          form.add_pair(&group_id, &question_id).map(|_| EditData::Ok)
        }
        EditOp::RemovePair { group_id, question_id, index } => {
          form.remove_pair(&group_id, &question_id, index).map(|_| EditData::Ok)
        }
        EditOp::SetTargetWord { group_id, question_id, word } => {
          form.set_target_word(&group_id, &question_id, &word).map(|_| EditData::Ok)
        }
        EditOp::SetSyllablePart { group_id, question_id, index, text } => form
          .set_syllable_part(&group_id, &question_id, index, text)
          .map(|_| EditData::Ok),
        EditOp::AddSyllablePart { group_id, question_id } => {
          form.add_syllable_part(&group_id, &question_id).map(|_| EditData::Ok)
        }
        EditOp::RemoveSyllablePart { group_id, question_id, index } => form
          .remove_syllable_part(&group_id, &question_id, index)
          .map(|_| EditData::Ok),
        EditOp::AutoSyllabify { group_id, question_id } => form
          .auto_generate_syllables(&group_id, &question_id)
          .map(|parts| EditData::Syllables { parts }),
        EditOp::Shuffle { group_id, question_id, target } => form
          .shuffle(&group_id, &question_id, target)
          .map(|order| EditData::DisplayOrder { order }),
      };
      result.map(|data| (data, session_out(session_id, s)))
    })
    .await;

  match applied {
    None => EditReply::UnknownSession,
    Some(Ok((data, session))) => EditReply::Applied { data, session },
    Some(Err(e)) => {
      warn!(target: "authoring", session = %session_id, code = e.code(), error = %e, "Edit rejected");
      EditReply::Rejected { code: e.code(), message: e.to_string() }
    }
  }
}

/// Full snapshot of one session, or None if the id is unknown.
#[instrument(level = "debug", skip(state), fields(%session_id))]
pub async fn get_overview(state: &AppState, session_id: &str) -> Option<SessionOut> {
  state
    .get_session(session_id)
    .await
    .map(|s| session_out(session_id, &s))
}

/// Run the submit flow and log the outcome.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn do_submit(state: &AppState, session_id: &str) -> Option<SubmitOutcome> {
  let outcome = state.submit_session(session_id).await?;
  info!(target: "authoring", session = %session_id, accepted = outcome.accepted, message = %outcome.message, "Submit finished");
  Some(outcome)
}

/// Standalone syllabification, exposed for the authoring preview.
#[instrument(level = "debug", skip_all, fields(word_len = word.len()))]
pub fn do_syllabify(word: &str) -> (Vec<String>, bool) {
  let parts = auto_syllabify(word);
  let rebuilds = parts_rebuild_target(&parts, word);
  (parts, rebuilds)
}
