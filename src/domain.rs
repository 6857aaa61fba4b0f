//! Domain models for the authoring core: question kinds, per-kind payloads,
//! question groups, and kind-appropriate defaults.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of question is being authored?
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
  /// Pick one option out of an ordered list (answer = index).
  MultipleChoice,
  /// Type the exact answer; learners see a scrambled letter bank.
  Identification,
  /// Sort bank items into labelled categories.
  Enumeration,
  /// Pair up left items with right items.
  Matching,
  /// Rebuild a word from its syllable parts.
  Syllable,
}
impl Default for QuestionKind {
  fn default() -> Self { QuestionKind::MultipleChoice }
}

/// Is this authoring session building a quiz or a seatwork?
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
  Quiz,
  Seatwork,
}

impl ContentType {
  pub fn label(&self) -> &'static str {
    match self {
      ContentType::Quiz => "Quiz",
      ContentType::Seatwork => "Seatwork",
    }
  }
}

/// Handle/URL pair for an attached illustration. The core stores it verbatim;
/// upload and byte handling belong to the image collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageAttachment {
  pub url: String,
  pub file_name: String,
}

/// One enumeration category: a label plus the items assigned to it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
  pub label: String,
  pub items: Vec<String>,
}

/// Kind-specific answer data. Exactly one variant per question; switching
/// kind means constructing a new `Question`, never mutating this in place.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionPayload {
  MultipleChoice {
    options: Vec<String>,
    /// Index of the correct option.
    correct: usize,
    /// Visual shuffle of option indices; never affects `correct`.
    #[serde(default)]
    display_order: Option<Vec<usize>>,
  },
  Identification {
    /// Canonical answer, kept uppercase.
    answer: String,
    /// Scrambled tiles derived from `answer`; empty until generated,
    /// cleared whenever the answer changes.
    #[serde(default)]
    letter_bank: Vec<char>,
  },
  Enumeration {
    categories: Vec<Category>,
    /// Items not yet assigned to a category. An item is here XOR in
    /// exactly one category.
    bank: Vec<String>,
  },
  Matching {
    left: Vec<String>,
    right: Vec<String>,
    /// `matches[i]` = index into `right` that pairs with `left[i]`.
    /// All three lists always have equal length.
    matches: Vec<usize>,
    /// Visual shuffle of right-item indices; never affects `matches`.
    #[serde(default)]
    display_order: Option<Vec<usize>>,
  },
  Syllable {
    /// Word to rebuild. Letters and hyphens only, enforced on write.
    target: String,
    /// Ordered syllable parts expected to concatenate to `target`
    /// (hyphens stripped).
    parts: Vec<String>,
  },
}

impl QuestionPayload {
  pub fn kind(&self) -> QuestionKind {
    match self {
      QuestionPayload::MultipleChoice { .. } => QuestionKind::MultipleChoice,
      QuestionPayload::Identification { .. } => QuestionKind::Identification,
      QuestionPayload::Enumeration { .. } => QuestionKind::Enumeration,
      QuestionPayload::Matching { .. } => QuestionKind::Matching,
      QuestionPayload::Syllable { .. } => QuestionKind::Syllable,
    }
  }
}

/// One assessment item under authoring.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  #[serde(default)]
  pub prompt: String,
  #[serde(default)]
  pub image: Option<ImageAttachment>,
  pub payload: QuestionPayload,
}

impl Question {
  /// Construct a question with kind-appropriate defaults. Every default
  /// satisfies the payload invariants immediately.
  pub fn with_defaults(kind: QuestionKind) -> Self {
    let payload = match kind {
      QuestionKind::MultipleChoice => QuestionPayload::MultipleChoice {
        options: vec![String::new(); 4],
        correct: 0,
        display_order: None,
      },
      QuestionKind::Identification => QuestionPayload::Identification {
        answer: String::new(),
        letter_bank: Vec::new(),
      },
      QuestionKind::Enumeration => QuestionPayload::Enumeration {
        categories: Vec::new(),
        bank: Vec::new(),
      },
      QuestionKind::Matching => QuestionPayload::Matching {
        left: vec![String::new(); 2],
        right: vec![String::new(); 2],
        matches: vec![0, 1],
        display_order: None,
      },
      QuestionKind::Syllable => QuestionPayload::Syllable {
        target: String::new(),
        parts: Vec::new(),
      },
    };
    Question {
      id: Uuid::new_v4().to_string(),
      prompt: String::new(),
      image: None,
      payload,
    }
  }

  pub fn kind(&self) -> QuestionKind {
    self.payload.kind()
  }
}

/// One quiz or seatwork instance: an ordered, non-empty list of questions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuestionGroup {
  pub id: String,
  /// 1-based display number ("Quiz 2", "Seatwork 1").
  pub number: usize,
  pub questions: Vec<Question>,
}

impl QuestionGroup {
  /// A group is born with one default question so the "never empty"
  /// invariant holds from creation.
  pub fn new(number: usize, first_kind: QuestionKind) -> Self {
    QuestionGroup {
      id: Uuid::new_v4().to_string(),
      number,
      questions: vec![Question::with_defaults(first_kind)],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn multiple_choice_default_has_four_options_and_valid_correct_index() {
    let q = Question::with_defaults(QuestionKind::MultipleChoice);
    match &q.payload {
      QuestionPayload::MultipleChoice { options, correct, display_order } => {
        assert_eq!(options.len(), 4);
        assert!(*correct < options.len());
        assert!(display_order.is_none());
      }
      other => panic!("wrong payload: {other:?}"),
    }
  }

  #[test]
  fn matching_default_keeps_parallel_lengths() {
    let q = Question::with_defaults(QuestionKind::Matching);
    match &q.payload {
      QuestionPayload::Matching { left, right, matches, .. } => {
        assert_eq!(left.len(), right.len());
        assert_eq!(left.len(), matches.len());
        for m in matches {
          assert!(*m < right.len());
        }
      }
      other => panic!("wrong payload: {other:?}"),
    }
  }

  #[test]
  fn defaults_match_their_kind() {
    for kind in [
      QuestionKind::MultipleChoice,
      QuestionKind::Identification,
      QuestionKind::Enumeration,
      QuestionKind::Matching,
      QuestionKind::Syllable,
    ] {
      let q = Question::with_defaults(kind);
      assert_eq!(q.kind(), kind);
      assert!(!q.id.is_empty());
    }
  }

  #[test]
  fn new_group_starts_with_one_question() {
    let g = QuestionGroup::new(1, QuestionKind::Syllable);
    assert_eq!(g.questions.len(), 1);
    assert_eq!(g.questions[0].kind(), QuestionKind::Syllable);
  }
}
