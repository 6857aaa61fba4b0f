//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ContentType, Question, QuestionGroup, QuestionKind};
use crate::form::{AuthoringForm, ShuffleTarget};
use crate::state::AuthoringSession;

/// One edit intent against a session's form. Editors emit these; the
/// controller is the only mutator. Shared verbatim between the HTTP edit
/// endpoint and the WebSocket loop.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    AddGroup,
    RemoveGroup {
        #[serde(rename = "groupId")]
        group_id: String,
    },
    SelectGroup {
        #[serde(rename = "groupId")]
        group_id: String,
    },
    SelectKind {
        kind: QuestionKind,
    },
    AddQuestion {
        #[serde(rename = "groupId")]
        group_id: String,
    },
    RemoveQuestion {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
    },
    SetPrompt {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        text: String,
    },
    AttachImage {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        url: String,
        #[serde(rename = "fileName", default)]
        file_name: String,
    },
    ClearImage {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
    },
    // multiple choice
    SetOptionText {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        index: usize,
        text: String,
    },
    AddOption {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
    },
    RemoveOption {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        index: usize,
    },
    SetCorrectOption {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        index: usize,
    },
    // identification
    SetAnswer {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        text: String,
    },
    GenerateLetterBank {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
    },
    // enumeration
    AddCategory {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        label: String,
    },
    RenameCategory {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        from: String,
        to: String,
    },
    RemoveCategory {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        label: String,
    },
    AddBankItem {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        item: String,
    },
    RemoveBankItem {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        item: String,
    },
    MoveItemToCategory {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        item: String,
        label: String,
    },
    ReturnItemToBank {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        label: String,
        item: String,
    },
    // matching
    SetLeftText {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        index: usize,
        text: String,
    },
    SetRightText {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        index: usize,
        text: String,
    },
    SetMatch {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        index: usize,
        target: usize,
    },
    AddPair {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
    },
    RemovePair {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        index: usize,
    },
    // syllable
    SetTargetWord {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        word: String,
    },
    SetSyllablePart {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        index: usize,
        text: String,
    },
    AddSyllablePart {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
    },
    RemoveSyllablePart {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        index: usize,
    },
    AutoSyllabify {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
    },
    // display order
    Shuffle {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        target: ShuffleTarget,
    },
}

/// Extra data an accepted edit carries back to the editor.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EditData {
    Ok,
    Created { id: String },
    LetterBank { letters: Vec<char> },
    Syllables { parts: Vec<String> },
    DisplayOrder { order: Vec<usize> },
}

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    OpenSession {
        #[serde(rename = "lessonId")]
        lesson_id: String,
        #[serde(rename = "contentType")]
        content_type: ContentType,
    },
    Overview {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Edit {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(flatten)]
        op: EditOp,
    },
    Submit {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    CloseSession {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Syllabify {
        word: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        session: SessionOut,
    },
    Edited {
        data: EditData,
        session: SessionOut,
    },
    Rejected {
        code: &'static str,
        message: String,
    },
    SubmitResult {
        accepted: bool,
        message: String,
    },
    SessionClosed {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Syllables {
        word: String,
        parts: Vec<String>,
    },
    Error {
        message: String,
    },
}

/// One group with its derived statistics, as shown on the overview and
/// progress chrome.
#[derive(Debug, Serialize)]
pub struct GroupOut {
    pub id: String,
    pub number: usize,
    /// Display label, e.g. "Quiz 2" or "Seatwork 1".
    pub label: String,
    pub question_count: usize,
    pub non_empty_count: usize,
    pub filled_items: usize,
    pub fillable_items: usize,
    pub progress_percent: u8,
    pub questions: Vec<Question>,
}

/// Full snapshot of one authoring session.
#[derive(Debug, Serialize)]
pub struct SessionOut {
    pub session_id: String,
    pub lesson_id: String,
    pub content_type: ContentType,
    pub selected_group: String,
    pub selected_kind: QuestionKind,
    pub locked: bool,
    pub submittable: bool,
    pub groups: Vec<GroupOut>,
}

fn group_out(form: &AuthoringForm, group: &QuestionGroup, label_prefix: &str) -> GroupOut {
    let non_empty = form.non_empty_count(&group.id).unwrap_or(0);
    let (filled, fillable) = form.item_stats(&group.id).unwrap_or((0, 0));
    GroupOut {
        id: group.id.clone(),
        number: group.number,
        label: format!("{} {}", label_prefix, group.number),
        question_count: group.questions.len(),
        non_empty_count: non_empty,
        filled_items: filled,
        fillable_items: fillable,
        progress_percent: form.progress_percent(&group.id).unwrap_or(0),
        questions: group.questions.clone(),
    }
}

/// Convert a full session (internal) to the public DTO.
pub fn session_out(session_id: &str, session: &AuthoringSession) -> SessionOut {
    let form = &session.form;
    SessionOut {
        session_id: session_id.to_string(),
        lesson_id: session.lesson_id.clone(),
        content_type: session.content_type,
        selected_group: form.selected_group().to_string(),
        selected_kind: form.selected_kind(),
        locked: form.is_locked(),
        submittable: form.is_submittable(),
        groups: form
            .groups()
            .iter()
            .map(|g| group_out(form, g, session.content_type.label()))
            .collect(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct OpenSessionIn {
    #[serde(rename = "lessonId")]
    pub lesson_id: String,
    #[serde(rename = "contentType")]
    pub content_type: ContentType,
}

#[derive(Serialize)]
pub struct RejectionOut {
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
pub struct SubmitOut {
    pub accepted: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SyllabifyQuery {
    pub word: String,
}

#[derive(Serialize)]
pub struct SyllabifyOut {
    pub word: String,
    pub parts: Vec<String>,
    /// True if the parts rebuild the word (hyphens stripped).
    pub rebuilds: bool,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
