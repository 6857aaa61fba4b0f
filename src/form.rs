//! Form state controller: the single source of truth for all question
//! groups inside one authoring session.
//!
//! Flow:
//! 1) Editors (HTTP/WS clients) emit edit intents; they never hold state.
//! 2) Every mutation validates its kind-specific invariant before
//!    committing; a rejected edit leaves the form untouched and reports
//!    a stable reason code.
//! 3) Derived statistics (completeness, fillable-item counts, progress)
//!    are recomputed on read, never cached.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
  Category, ImageAttachment, Question, QuestionGroup, QuestionKind, QuestionPayload,
};
use crate::syllable::{auto_syllabify, is_valid_target_word, scramble_letters};
use crate::util::is_blank;

/// Capacity limits for one authoring session. Loaded from TOML config;
/// defaults mirror the product rules (3 quizzes/seatworks per lesson).
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Limits {
  #[serde(default = "Limits::default_max_groups")]
  pub max_groups: usize,
  #[serde(default = "Limits::default_max_questions")]
  pub max_questions: usize,
}

impl Limits {
  fn default_max_groups() -> usize { 3 }
  fn default_max_questions() -> usize { 10 }
}

impl Default for Limits {
  fn default() -> Self {
    Limits { max_groups: 3, max_questions: 10 }
  }
}

/// Why an edit was rejected. Every variant maps to a stable wire code;
/// none of them is fatal and the form is unchanged after any of them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormError {
  #[error("invariant violated: {reason}")]
  InvariantViolation { reason: &'static str },
  #[error("capacity exceeded: {what}")]
  CapacityExceeded { what: &'static str },
  #[error("illegal removal: {what}")]
  IllegalRemoval { what: &'static str },
  #[error("unknown group")]
  UnknownGroup,
  #[error("unknown question")]
  UnknownQuestion,
  #[error("operation does not apply to this question kind")]
  KindMismatch,
  #[error("form is locked for submission")]
  Locked,
}

impl FormError {
  /// Stable machine-readable code surfaced over the wire.
  pub fn code(&self) -> &'static str {
    match self {
      FormError::InvariantViolation { .. } => "invariant_violation",
      FormError::CapacityExceeded { .. } => "capacity_exceeded",
      FormError::IllegalRemoval { .. } => "illegal_removal",
      FormError::UnknownGroup => "unknown_group",
      FormError::UnknownQuestion => "unknown_question",
      FormError::KindMismatch => "kind_mismatch",
      FormError::Locked => "locked",
    }
  }
}

fn violation(reason: &'static str) -> FormError {
  FormError::InvariantViolation { reason }
}

/// Which display order a shuffle regenerates. Visual only: the correct
/// option index / match mapping is never touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleTarget {
  Options,
  RightItems,
}

/// All question groups of one authoring session plus the selection state
/// (current group, kind used for the next new question) and the lock flag
/// raised while a submission is in flight.
#[derive(Clone, Debug)]
pub struct AuthoringForm {
  groups: Vec<QuestionGroup>,
  selected_group: String,
  selected_kind: QuestionKind,
  limits: Limits,
  locked: bool,
}

impl AuthoringForm {
  /// A form starts with one group holding one default question, so the
  /// at-least-one-group and at-least-one-question invariants hold from
  /// the first frame.
  pub fn new(limits: Limits) -> Self {
    let first = QuestionGroup::new(1, QuestionKind::default());
    let selected = first.id.clone();
    AuthoringForm {
      groups: vec![first],
      selected_group: selected,
      selected_kind: QuestionKind::default(),
      limits,
      locked: false,
    }
  }

  pub fn groups(&self) -> &[QuestionGroup] {
    &self.groups
  }

  pub fn selected_group(&self) -> &str {
    &self.selected_group
  }

  pub fn selected_kind(&self) -> QuestionKind {
    self.selected_kind
  }

  pub fn limits(&self) -> Limits {
    self.limits
  }

  pub fn is_locked(&self) -> bool {
    self.locked
  }

  /// Raised by the session layer while a submission is in flight; every
  /// mutation is rejected until it drops.
  pub fn set_locked(&mut self, locked: bool) {
    self.locked = locked;
  }

  fn ensure_unlocked(&self) -> Result<(), FormError> {
    if self.locked { Err(FormError::Locked) } else { Ok(()) }
  }

  fn group_mut(&mut self, gid: &str) -> Result<&mut QuestionGroup, FormError> {
    self.groups.iter_mut().find(|g| g.id == gid).ok_or(FormError::UnknownGroup)
  }

  fn group(&self, gid: &str) -> Result<&QuestionGroup, FormError> {
    self.groups.iter().find(|g| g.id == gid).ok_or(FormError::UnknownGroup)
  }

  fn question_mut(&mut self, gid: &str, qid: &str) -> Result<&mut Question, FormError> {
    self
      .group_mut(gid)?
      .questions
      .iter_mut()
      .find(|q| q.id == qid)
      .ok_or(FormError::UnknownQuestion)
  }

  // ---- group operations ----

  /// Append a new group (up to the configured maximum) seeded with one
  /// default question of the currently selected kind. The new group
  /// becomes the selection.
  pub fn add_group(&mut self) -> Result<String, FormError> {
    self.ensure_unlocked()?;
    if self.groups.len() >= self.limits.max_groups {
      return Err(FormError::CapacityExceeded { what: "groups" });
    }
    let number = self.groups.iter().map(|g| g.number).max().unwrap_or(0) + 1;
    let group = QuestionGroup::new(number, self.selected_kind);
    let id = group.id.clone();
    self.groups.push(group);
    self.selected_group = id.clone();
    Ok(id)
  }

  /// Remove a group. The last remaining group can never be removed.
  pub fn remove_group(&mut self, gid: &str) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    if !self.groups.iter().any(|g| g.id == gid) {
      return Err(FormError::UnknownGroup);
    }
    if self.groups.len() == 1 {
      return Err(FormError::IllegalRemoval { what: "last group" });
    }
    self.groups.retain(|g| g.id != gid);
    if self.selected_group == gid {
      self.selected_group = self.groups[0].id.clone();
    }
    Ok(())
  }

  pub fn select_group(&mut self, gid: &str) -> Result<(), FormError> {
    let id = self.group(gid)?.id.clone();
    self.selected_group = id;
    Ok(())
  }

  pub fn select_new_question_kind(&mut self, kind: QuestionKind) {
    self.selected_kind = kind;
  }

  // ---- question lifecycle ----

  /// Append a default question of the selected kind to `gid`.
  pub fn add_question(&mut self, gid: &str) -> Result<String, FormError> {
    self.ensure_unlocked()?;
    let max = self.limits.max_questions;
    let kind = self.selected_kind;
    let group = self.group_mut(gid)?;
    if group.questions.len() >= max {
      return Err(FormError::CapacityExceeded { what: "questions" });
    }
    let q = Question::with_defaults(kind);
    let id = q.id.clone();
    group.questions.push(q);
    Ok(id)
  }

  /// Remove a question. The last question of a group can never be removed.
  pub fn remove_question(&mut self, gid: &str, qid: &str) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    let group = self.group_mut(gid)?;
    if !group.questions.iter().any(|q| q.id == qid) {
      return Err(FormError::UnknownQuestion);
    }
    if group.questions.len() == 1 {
      return Err(FormError::IllegalRemoval { what: "last question in group" });
    }
    group.questions.retain(|q| q.id != qid);
    Ok(())
  }

  // ---- fields shared by all kinds ----

  pub fn set_prompt(&mut self, gid: &str, qid: &str, text: String) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    self.question_mut(gid, qid)?.prompt = text;
    Ok(())
  }

  pub fn attach_image(
    &mut self,
    gid: &str,
    qid: &str,
    url: String,
    file_name: String,
  ) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    if is_blank(&url) {
      return Err(violation("blank_image_url"));
    }
    self.question_mut(gid, qid)?.image = Some(ImageAttachment { url, file_name });
    Ok(())
  }

  pub fn clear_image(&mut self, gid: &str, qid: &str) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    self.question_mut(gid, qid)?.image = None;
    Ok(())
  }

  // ---- multiple choice ----

  pub fn set_option_text(
    &mut self,
    gid: &str,
    qid: &str,
    index: usize,
    text: String,
  ) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::MultipleChoice { options, .. } => {
        let slot = options.get_mut(index).ok_or(violation("option_out_of_range"))?;
        *slot = text;
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  pub fn add_option(&mut self, gid: &str, qid: &str) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::MultipleChoice { options, display_order, .. } => {
        options.push(String::new());
        *display_order = None;
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  /// Remove an option; at least two must remain. The correct index is
  /// renumbered around the removal, falling back to 0 if it pointed at
  /// the removed option.
  pub fn remove_option(&mut self, gid: &str, qid: &str, index: usize) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::MultipleChoice { options, correct, display_order } => {
        if index >= options.len() {
          return Err(violation("option_out_of_range"));
        }
        if options.len() <= 2 {
          return Err(FormError::IllegalRemoval { what: "option below minimum of two" });
        }
        options.remove(index);
        if *correct == index {
          *correct = 0;
        } else if *correct > index {
          *correct -= 1;
        }
        *display_order = None;
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  pub fn set_correct_option(&mut self, gid: &str, qid: &str, index: usize) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::MultipleChoice { options, correct, .. } => {
        if index >= options.len() {
          return Err(violation("correct_option_out_of_range"));
        }
        *correct = index;
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  // ---- identification ----

  /// Set the canonical answer. Answers are case-normalized to uppercase
  /// and any previously generated letter bank becomes stale and is
  /// dropped.
  pub fn set_answer(&mut self, gid: &str, qid: &str, text: &str) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Identification { answer, letter_bank } => {
        *answer = text.to_uppercase();
        letter_bank.clear();
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  /// Regenerate the scrambled letter bank from the current answer.
  pub fn generate_letter_bank(&mut self, gid: &str, qid: &str) -> Result<Vec<char>, FormError> {
    self.generate_letter_bank_with(gid, qid, &mut rand::thread_rng())
  }

  /// Seedable variant; production goes through [`generate_letter_bank`].
  pub fn generate_letter_bank_with<R: Rng + ?Sized>(
    &mut self,
    gid: &str,
    qid: &str,
    rng: &mut R,
  ) -> Result<Vec<char>, FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Identification { answer, letter_bank } => {
        *letter_bank = scramble_letters(answer, rng);
        Ok(letter_bank.clone())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  // ---- enumeration ----

  pub fn add_category(&mut self, gid: &str, qid: &str, label: &str) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Enumeration { categories, .. } => {
        if is_blank(label) {
          return Err(violation("blank_category_label"));
        }
        if categories.iter().any(|c| c.label == label) {
          return Err(violation("duplicate_category"));
        }
        categories.push(Category { label: label.to_string(), items: Vec::new() });
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  pub fn rename_category(
    &mut self,
    gid: &str,
    qid: &str,
    old: &str,
    new: &str,
  ) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Enumeration { categories, .. } => {
        if is_blank(new) {
          return Err(violation("blank_category_label"));
        }
        if old != new && categories.iter().any(|c| c.label == new) {
          return Err(violation("duplicate_category"));
        }
        let cat = categories
          .iter_mut()
          .find(|c| c.label == old)
          .ok_or(violation("unknown_category"))?;
        cat.label = new.to_string();
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  /// Remove a category; its items drain back into the bank so nothing is
  /// lost and the bank-XOR-category rule keeps holding.
  pub fn remove_category(&mut self, gid: &str, qid: &str, label: &str) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Enumeration { categories, bank } => {
        let pos = categories
          .iter()
          .position(|c| c.label == label)
          .ok_or(violation("unknown_category"))?;
        let removed = categories.remove(pos);
        bank.extend(removed.items);
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  /// Add a new item to the bank. An item string is unique across the
  /// whole question (bank and every category).
  pub fn add_bank_item(&mut self, gid: &str, qid: &str, item: &str) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Enumeration { categories, bank } => {
        if is_blank(item) {
          return Err(violation("blank_item"));
        }
        let dup = bank.iter().any(|i| i == item)
          || categories.iter().any(|c| c.items.iter().any(|i| i == item));
        if dup {
          return Err(violation("duplicate_item"));
        }
        bank.push(item.to_string());
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  pub fn remove_bank_item(&mut self, gid: &str, qid: &str, item: &str) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Enumeration { bank, .. } => {
        let pos = bank.iter().position(|i| i == item).ok_or(violation("item_not_in_bank"))?;
        bank.remove(pos);
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  /// Drag-and-drop intent: bank → category. The item leaves the bank and
  /// lands in exactly one category.
  pub fn move_item_to_category(
    &mut self,
    gid: &str,
    qid: &str,
    item: &str,
    label: &str,
  ) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Enumeration { categories, bank } => {
        let cat_pos = categories
          .iter()
          .position(|c| c.label == label)
          .ok_or(violation("unknown_category"))?;
        let pos = bank.iter().position(|i| i == item).ok_or(violation("item_not_in_bank"))?;
        let moved = bank.remove(pos);
        categories[cat_pos].items.push(moved);
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  /// Drag-and-drop intent: category → bank (round-trips with
  /// [`move_item_to_category`]).
  pub fn return_item_to_bank(
    &mut self,
    gid: &str,
    qid: &str,
    label: &str,
    item: &str,
  ) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Enumeration { categories, bank } => {
        let cat = categories
          .iter_mut()
          .find(|c| c.label == label)
          .ok_or(violation("unknown_category"))?;
        let pos = cat
          .items
          .iter()
          .position(|i| i == item)
          .ok_or(violation("item_not_in_category"))?;
        let moved = cat.items.remove(pos);
        bank.push(moved);
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  // ---- matching ----

  pub fn set_left_text(
    &mut self,
    gid: &str,
    qid: &str,
    index: usize,
    text: String,
  ) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Matching { left, .. } => {
        let slot = left.get_mut(index).ok_or(violation("pair_out_of_range"))?;
        *slot = text;
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  pub fn set_right_text(
    &mut self,
    gid: &str,
    qid: &str,
    index: usize,
    text: String,
  ) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Matching { right, .. } => {
        let slot = right.get_mut(index).ok_or(violation("pair_out_of_range"))?;
        *slot = text;
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  /// Assign `left[index] → right[target]`. The target must be a live
  /// right-item index.
  pub fn set_match(
    &mut self,
    gid: &str,
    qid: &str,
    index: usize,
    target: usize,
  ) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Matching { right, matches, .. } => {
        if target >= right.len() {
          return Err(violation("match_index_out_of_range"));
        }
        let slot = matches.get_mut(index).ok_or(violation("pair_out_of_range"))?;
        *slot = target;
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  /// Append one empty pair to all three parallel lists; the new left item
  /// starts matched to its own right item.
  pub fn add_pair(&mut self, gid: &str, qid: &str) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Matching { left, right, matches, display_order } => {
        left.push(String::new());
        right.push(String::new());
        matches.push(right.len() - 1);
        *display_order = None;
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  /// Remove pair `index` from all three lists. Remaining matches are
  /// renumbered; any match that pointed at the removed right item is
  /// re-pointed at its own pair so the index invariant keeps holding.
  pub fn remove_pair(&mut self, gid: &str, qid: &str, index: usize) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Matching { left, right, matches, display_order } => {
        if index >= left.len() {
          return Err(violation("pair_out_of_range"));
        }
        left.remove(index);
        right.remove(index);
        matches.remove(index);
        for (j, m) in matches.iter_mut().enumerate() {
          if *m == index {
            *m = j;
          } else if *m > index {
            *m -= 1;
          }
        }
        *display_order = None;
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  // ---- syllable ----

  /// Set the target word. Letters and hyphens only; an empty string
  /// clears the field. Parts are dropped on change since they describe
  /// the previous word.
  pub fn set_target_word(&mut self, gid: &str, qid: &str, word: &str) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    if !word.is_empty() && !is_valid_target_word(word) {
      return Err(violation("invalid_target_word"));
    }
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Syllable { target, parts } => {
        if *target != word {
          parts.clear();
        }
        *target = word.to_string();
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  pub fn set_syllable_part(
    &mut self,
    gid: &str,
    qid: &str,
    index: usize,
    text: String,
  ) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Syllable { parts, .. } => {
        let slot = parts.get_mut(index).ok_or(violation("part_out_of_range"))?;
        *slot = text;
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  pub fn add_syllable_part(&mut self, gid: &str, qid: &str) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Syllable { parts, .. } => {
        parts.push(String::new());
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  pub fn remove_syllable_part(&mut self, gid: &str, qid: &str, index: usize) -> Result<(), FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Syllable { parts, .. } => {
        if index >= parts.len() {
          return Err(violation("part_out_of_range"));
        }
        parts.remove(index);
        Ok(())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  /// Replace the parts with the heuristic split of the current target
  /// word. Best effort: the author can still edit every part afterwards.
  pub fn auto_generate_syllables(&mut self, gid: &str, qid: &str) -> Result<Vec<String>, FormError> {
    self.ensure_unlocked()?;
    match &mut self.question_mut(gid, qid)?.payload {
      QuestionPayload::Syllable { target, parts } => {
        if !is_valid_target_word(target) {
          return Err(violation("invalid_target_word"));
        }
        *parts = auto_syllabify(target);
        Ok(parts.clone())
      }
      _ => Err(FormError::KindMismatch),
    }
  }

  // ---- shuffles ----

  /// Regenerate the display order for multiple-choice options or matching
  /// right items. Visual only; `correct`/`matches` stay untouched.
  pub fn shuffle(
    &mut self,
    gid: &str,
    qid: &str,
    target: ShuffleTarget,
  ) -> Result<Vec<usize>, FormError> {
    self.shuffle_with(gid, qid, target, &mut rand::thread_rng())
  }

  /// Seedable variant; production goes through [`shuffle`].
  pub fn shuffle_with<R: Rng + ?Sized>(
    &mut self,
    gid: &str,
    qid: &str,
    target: ShuffleTarget,
    rng: &mut R,
  ) -> Result<Vec<usize>, FormError> {
    self.ensure_unlocked()?;
    let payload = &mut self.question_mut(gid, qid)?.payload;
    let (len, display_order) = match (target, payload) {
      (ShuffleTarget::Options, QuestionPayload::MultipleChoice { options, display_order, .. }) => {
        (options.len(), display_order)
      }
      (ShuffleTarget::RightItems, QuestionPayload::Matching { right, display_order, .. }) => {
        (right.len(), display_order)
      }
      _ => return Err(FormError::KindMismatch),
    };
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    *display_order = Some(order.clone());
    Ok(order)
  }

  // ---- derived statistics ----

  /// Count of questions in `gid` satisfying the per-kind completeness
  /// predicate.
  pub fn non_empty_count(&self, gid: &str) -> Result<usize, FormError> {
    Ok(self.group(gid)?.questions.iter().filter(|q| is_complete(q)).count())
  }

  /// (filled, fillable) item slots across all questions of `gid`; feeds
  /// the progress bar.
  pub fn item_stats(&self, gid: &str) -> Result<(usize, usize), FormError> {
    let mut filled = 0;
    let mut fillable = 0;
    for q in &self.group(gid)?.questions {
      let (f, t) = question_item_stats(q);
      filled += f;
      fillable += t;
    }
    Ok((filled, fillable))
  }

  /// Completion ratio for `gid`, 0..=100. An all-empty group reports 0.
  pub fn progress_percent(&self, gid: &str) -> Result<u8, FormError> {
    let (filled, fillable) = self.item_stats(gid)?;
    if fillable == 0 {
      return Ok(0);
    }
    Ok(((filled * 100) / fillable) as u8)
  }

  /// True once every group holds at least one complete question.
  pub fn is_submittable(&self) -> bool {
    self
      .groups
      .iter()
      .all(|g| g.questions.iter().any(|q| is_complete(q)))
  }

  /// Clone of all groups, handed to the submission collaborator.
  pub fn snapshot(&self) -> Vec<QuestionGroup> {
    self.groups.clone()
  }
}

/// Per-kind completeness predicate: does this question count as "filled
/// in" for submit-eligibility and overview badges?
pub fn is_complete(q: &Question) -> bool {
  match &q.payload {
    QuestionPayload::MultipleChoice { options, correct, .. } => {
      let non_blank = options.iter().filter(|o| !is_blank(o)).count();
      !is_blank(&q.prompt)
        && non_blank >= 2
        && options.get(*correct).map(|o| !is_blank(o)).unwrap_or(false)
    }
    QuestionPayload::Identification { answer, .. } => !is_blank(answer),
    QuestionPayload::Enumeration { categories, .. } => {
      categories.iter().any(|c| !c.items.is_empty())
    }
    QuestionPayload::Matching { left, right, .. } => left
      .iter()
      .zip(right.iter())
      .any(|(l, r)| !is_blank(l) && !is_blank(r)),
    QuestionPayload::Syllable { target, parts } => {
      !is_blank(target) && parts.iter().any(|p| !is_blank(p))
    }
  }
}

/// (filled, fillable) slots for one question. Fillable counts every text
/// slot an author is expected to populate for the kind.
pub fn question_item_stats(q: &Question) -> (usize, usize) {
  let filled_str = |s: &str| usize::from(!is_blank(s));
  match &q.payload {
    QuestionPayload::MultipleChoice { options, .. } => {
      let filled = filled_str(&q.prompt) + options.iter().map(|o| filled_str(o)).sum::<usize>();
      (filled, 1 + options.len())
    }
    QuestionPayload::Identification { answer, .. } => {
      (filled_str(&q.prompt) + filled_str(answer), 2)
    }
    QuestionPayload::Enumeration { categories, bank } => {
      let assigned: usize = categories.iter().map(|c| c.items.len()).sum();
      let labels = categories.len();
      // Bank items still count as fillable work: they are written but
      // not yet categorized.
      (labels + assigned, labels + assigned + bank.len())
    }
    QuestionPayload::Matching { left, right, .. } => {
      let filled = left.iter().map(|s| filled_str(s)).sum::<usize>()
        + right.iter().map(|s| filled_str(s)).sum::<usize>();
      (filled, left.len() + right.len())
    }
    QuestionPayload::Syllable { target, parts } => {
      let filled = filled_str(target) + parts.iter().map(|p| filled_str(p)).sum::<usize>();
      (filled, 1 + parts.len().max(1))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn form() -> AuthoringForm {
    AuthoringForm::new(Limits::default())
  }

  fn first_ids(f: &AuthoringForm) -> (String, String) {
    let g = &f.groups()[0];
    (g.id.clone(), g.questions[0].id.clone())
  }

  #[test]
  fn new_form_has_one_group_with_one_question() {
    let f = form();
    assert_eq!(f.groups().len(), 1);
    assert_eq!(f.groups()[0].questions.len(), 1);
    assert_eq!(f.selected_group(), f.groups()[0].id);
  }

  #[test]
  fn add_group_beyond_three_is_rejected() {
    let mut f = form();
    f.add_group().unwrap();
    f.add_group().unwrap();
    assert_eq!(
      f.add_group(),
      Err(FormError::CapacityExceeded { what: "groups" })
    );
    assert_eq!(f.groups().len(), 3);
  }

  #[test]
  fn last_group_cannot_be_removed() {
    let mut f = form();
    let gid = f.groups()[0].id.clone();
    assert!(matches!(f.remove_group(&gid), Err(FormError::IllegalRemoval { .. })));
    assert_eq!(f.groups().len(), 1);
  }

  #[test]
  fn removing_selected_group_moves_the_selection() {
    let mut f = form();
    let second = f.add_group().unwrap();
    assert_eq!(f.selected_group(), second);
    f.remove_group(&second).unwrap();
    assert_eq!(f.selected_group(), f.groups()[0].id);
  }

  #[test]
  fn group_numbers_keep_growing_after_removal() {
    let mut f = form();
    let second = f.add_group().unwrap();
    f.remove_group(&second).unwrap();
    f.add_group().unwrap();
    assert_eq!(f.groups()[1].number, 2);
  }

  #[test]
  fn add_question_respects_group_capacity() {
    let mut f = AuthoringForm::new(Limits { max_groups: 3, max_questions: 2 });
    let (gid, _) = first_ids(&f);
    f.add_question(&gid).unwrap();
    assert_eq!(
      f.add_question(&gid),
      Err(FormError::CapacityExceeded { what: "questions" })
    );
    assert_eq!(f.groups()[0].questions.len(), 2);
  }

  #[test]
  fn last_question_cannot_be_removed() {
    let mut f = form();
    let (gid, qid) = first_ids(&f);
    assert!(matches!(
      f.remove_question(&gid, &qid),
      Err(FormError::IllegalRemoval { .. })
    ));
    assert_eq!(f.groups()[0].questions.len(), 1);
  }

  #[test]
  fn new_questions_use_the_selected_kind() {
    let mut f = form();
    let (gid, _) = first_ids(&f);
    f.select_new_question_kind(QuestionKind::Matching);
    let qid = f.add_question(&gid).unwrap();
    let q = f.groups()[0].questions.iter().find(|q| q.id == qid).unwrap();
    assert_eq!(q.kind(), QuestionKind::Matching);
  }

  #[test]
  fn option_edit_touches_only_the_addressed_slot() {
    let mut f = form();
    let (gid, qid) = first_ids(&f);
    f.set_option_text(&gid, &qid, 2, "Manila".into()).unwrap();
    match &f.groups()[0].questions[0].payload {
      QuestionPayload::MultipleChoice { options, correct, .. } => {
        assert_eq!(options[2], "Manila");
        assert_eq!(options[0], "");
        assert_eq!(options[1], "");
        assert_eq!(options[3], "");
        assert_eq!(*correct, 0);
      }
      other => panic!("wrong payload: {other:?}"),
    }
  }

  #[test]
  fn removing_an_option_renumbers_the_correct_index() {
    let mut f = form();
    let (gid, qid) = first_ids(&f);
    f.set_correct_option(&gid, &qid, 3).unwrap();
    f.remove_option(&gid, &qid, 1).unwrap();
    match &f.groups()[0].questions[0].payload {
      QuestionPayload::MultipleChoice { options, correct, .. } => {
        assert_eq!(options.len(), 3);
        assert_eq!(*correct, 2);
      }
      other => panic!("wrong payload: {other:?}"),
    }
  }

  #[test]
  fn options_never_drop_below_two() {
    let mut f = form();
    let (gid, qid) = first_ids(&f);
    f.remove_option(&gid, &qid, 0).unwrap();
    f.remove_option(&gid, &qid, 0).unwrap();
    assert!(matches!(
      f.remove_option(&gid, &qid, 0),
      Err(FormError::IllegalRemoval { .. })
    ));
  }

  #[test]
  fn out_of_range_correct_option_is_rejected() {
    let mut f = form();
    let (gid, qid) = first_ids(&f);
    assert_eq!(
      f.set_correct_option(&gid, &qid, 4),
      Err(violation("correct_option_out_of_range"))
    );
  }

  #[test]
  fn answer_is_uppercased_and_letter_bank_is_a_permutation() {
    let mut f = form();
    let (gid, _) = first_ids(&f);
    f.select_new_question_kind(QuestionKind::Identification);
    let qid = f.add_question(&gid).unwrap();
    f.set_answer(&gid, &qid, "kalabaw").unwrap();
    let mut bank = f
      .generate_letter_bank_with(&gid, &qid, &mut StdRng::seed_from_u64(3))
      .unwrap();
    bank.sort_unstable();
    let mut expected: Vec<char> = "KALABAW".chars().collect();
    expected.sort_unstable();
    assert_eq!(bank, expected);
  }

  #[test]
  fn changing_the_answer_drops_the_stale_letter_bank() {
    let mut f = form();
    let (gid, _) = first_ids(&f);
    f.select_new_question_kind(QuestionKind::Identification);
    let qid = f.add_question(&gid).unwrap();
    f.set_answer(&gid, &qid, "aso").unwrap();
    f.generate_letter_bank_with(&gid, &qid, &mut StdRng::seed_from_u64(1)).unwrap();
    f.set_answer(&gid, &qid, "pusa").unwrap();
    match &f.groups()[0].questions.last().unwrap().payload {
      QuestionPayload::Identification { answer, letter_bank } => {
        assert_eq!(answer, "PUSA");
        assert!(letter_bank.is_empty());
      }
      other => panic!("wrong payload: {other:?}"),
    }
  }

  fn enumeration_question(f: &mut AuthoringForm) -> (String, String) {
    let (gid, _) = first_ids(f);
    f.select_new_question_kind(QuestionKind::Enumeration);
    let qid = f.add_question(&gid).unwrap();
    (gid, qid)
  }

  #[test]
  fn bank_and_categories_never_share_an_item() {
    let mut f = form();
    let (gid, qid) = enumeration_question(&mut f);
    f.add_category(&gid, &qid, "Hayop").unwrap();
    f.add_bank_item(&gid, &qid, "Aso").unwrap();
    f.move_item_to_category(&gid, &qid, "Aso", "Hayop").unwrap();

    // The item left the bank when it entered the category.
    assert_eq!(
      f.move_item_to_category(&gid, &qid, "Aso", "Hayop"),
      Err(violation("item_not_in_bank"))
    );
    // And it cannot be re-added while assigned.
    assert_eq!(f.add_bank_item(&gid, &qid, "Aso"), Err(violation("duplicate_item")));
  }

  #[test]
  fn bank_category_round_trip_restores_membership() {
    let mut f = form();
    let (gid, qid) = enumeration_question(&mut f);
    f.add_category(&gid, &qid, "Hayop").unwrap();
    f.add_bank_item(&gid, &qid, "Aso").unwrap();
    f.move_item_to_category(&gid, &qid, "Aso", "Hayop").unwrap();
    f.return_item_to_bank(&gid, &qid, "Hayop", "Aso").unwrap();
    match &f.groups()[0].questions.last().unwrap().payload {
      QuestionPayload::Enumeration { categories, bank } => {
        assert_eq!(bank, &vec!["Aso".to_string()]);
        assert!(categories[0].items.is_empty());
      }
      other => panic!("wrong payload: {other:?}"),
    }
  }

  #[test]
  fn removing_a_category_returns_its_items_to_the_bank() {
    let mut f = form();
    let (gid, qid) = enumeration_question(&mut f);
    f.add_category(&gid, &qid, "Hayop").unwrap();
    f.add_bank_item(&gid, &qid, "Aso").unwrap();
    f.add_bank_item(&gid, &qid, "Pusa").unwrap();
    f.move_item_to_category(&gid, &qid, "Aso", "Hayop").unwrap();
    f.remove_category(&gid, &qid, "Hayop").unwrap();
    match &f.groups()[0].questions.last().unwrap().payload {
      QuestionPayload::Enumeration { categories, bank } => {
        assert!(categories.is_empty());
        assert_eq!(bank.len(), 2);
        assert!(bank.contains(&"Aso".to_string()));
      }
      other => panic!("wrong payload: {other:?}"),
    }
  }

  fn matching_question(f: &mut AuthoringForm) -> (String, String) {
    let (gid, _) = first_ids(f);
    f.select_new_question_kind(QuestionKind::Matching);
    let qid = f.add_question(&gid).unwrap();
    (gid, qid)
  }

  fn matching_payload(f: &AuthoringForm) -> (Vec<String>, Vec<String>, Vec<usize>, Option<Vec<usize>>) {
    match &f.groups()[0].questions.last().unwrap().payload {
      QuestionPayload::Matching { left, right, matches, display_order } => {
        (left.clone(), right.clone(), matches.clone(), display_order.clone())
      }
      other => panic!("wrong payload: {other:?}"),
    }
  }

  #[test]
  fn pair_lists_stay_parallel_through_adds_and_removes() {
    let mut f = form();
    let (gid, qid) = matching_question(&mut f);
    f.add_pair(&gid, &qid).unwrap();
    f.add_pair(&gid, &qid).unwrap();
    f.remove_pair(&gid, &qid, 1).unwrap();
    f.add_pair(&gid, &qid).unwrap();
    let (left, right, matches, _) = matching_payload(&f);
    assert_eq!(left.len(), right.len());
    assert_eq!(left.len(), matches.len());
    for m in &matches {
      assert!(*m < right.len());
    }
  }

  #[test]
  fn removing_a_pair_renumbers_dangling_matches() {
    let mut f = form();
    let (gid, qid) = matching_question(&mut f);
    f.add_pair(&gid, &qid).unwrap(); // 3 pairs, matches [0, 1, 2]
    f.set_match(&gid, &qid, 0, 1).unwrap();
    f.set_match(&gid, &qid, 2, 1).unwrap();
    f.remove_pair(&gid, &qid, 1).unwrap();
    let (_, right, matches, _) = matching_payload(&f);
    assert_eq!(matches.len(), 2);
    for (j, m) in matches.iter().enumerate() {
      assert!(*m < right.len(), "matches[{j}] out of range");
    }
  }

  #[test]
  fn out_of_range_match_target_is_rejected() {
    let mut f = form();
    let (gid, qid) = matching_question(&mut f);
    assert_eq!(
      f.set_match(&gid, &qid, 0, 5),
      Err(violation("match_index_out_of_range"))
    );
  }

  #[test]
  fn shuffle_changes_display_order_not_the_mapping() {
    let mut f = form();
    let (gid, qid) = matching_question(&mut f);
    f.set_left_text(&gid, &qid, 0, "Aso".into()).unwrap();
    f.set_left_text(&gid, &qid, 1, "Pusa".into()).unwrap();
    f.set_right_text(&gid, &qid, 0, "Dog".into()).unwrap();
    f.set_right_text(&gid, &qid, 1, "Cat".into()).unwrap();

    let order = f
      .shuffle_with(&gid, &qid, ShuffleTarget::RightItems, &mut StdRng::seed_from_u64(11))
      .unwrap();
    let (_, right, matches, display_order) = matching_payload(&f);

    let mut sorted_order = order.clone();
    sorted_order.sort_unstable();
    assert_eq!(sorted_order, vec![0, 1]);
    assert_eq!(display_order, Some(order));
    // The mapping still resolves through unshuffled indices.
    assert_eq!(right[matches[0]], "Dog");
    assert_eq!(right[matches[1]], "Cat");
  }

  #[test]
  fn shuffle_target_must_match_the_kind() {
    let mut f = form();
    let (gid, qid) = first_ids(&f); // multiple choice
    assert_eq!(
      f.shuffle_with(&gid, &qid, ShuffleTarget::RightItems, &mut StdRng::seed_from_u64(0)),
      Err(FormError::KindMismatch)
    );
    assert!(f
      .shuffle_with(&gid, &qid, ShuffleTarget::Options, &mut StdRng::seed_from_u64(0))
      .is_ok());
  }

  #[test]
  fn invalid_target_words_are_rejected_at_input() {
    let mut f = form();
    let (gid, _) = first_ids(&f);
    f.select_new_question_kind(QuestionKind::Syllable);
    let qid = f.add_question(&gid).unwrap();
    assert_eq!(f.set_target_word(&gid, &qid, "bahay1"), Err(violation("invalid_target_word")));
    assert_eq!(f.set_target_word(&gid, &qid, "ba hay"), Err(violation("invalid_target_word")));
    f.set_target_word(&gid, &qid, "anak-araw").unwrap();
  }

  #[test]
  fn auto_syllables_rebuild_the_target() {
    let mut f = form();
    let (gid, _) = first_ids(&f);
    f.select_new_question_kind(QuestionKind::Syllable);
    let qid = f.add_question(&gid).unwrap();
    f.set_target_word(&gid, &qid, "bahay").unwrap();
    let parts = f.auto_generate_syllables(&gid, &qid).unwrap();
    assert!(!parts.is_empty());
    assert_eq!(parts.concat(), "bahay");
  }

  #[test]
  fn changing_the_target_word_drops_stale_parts() {
    let mut f = form();
    let (gid, _) = first_ids(&f);
    f.select_new_question_kind(QuestionKind::Syllable);
    let qid = f.add_question(&gid).unwrap();
    f.set_target_word(&gid, &qid, "bahay").unwrap();
    f.auto_generate_syllables(&gid, &qid).unwrap();
    f.set_target_word(&gid, &qid, "aso").unwrap();
    match &f.groups()[0].questions.last().unwrap().payload {
      QuestionPayload::Syllable { parts, .. } => assert!(parts.is_empty()),
      other => panic!("wrong payload: {other:?}"),
    }
  }

  #[test]
  fn kind_mismatch_is_reported_for_cross_kind_edits() {
    let mut f = form();
    let (gid, qid) = first_ids(&f); // multiple choice
    assert_eq!(f.set_answer(&gid, &qid, "x"), Err(FormError::KindMismatch));
    assert_eq!(f.add_pair(&gid, &qid), Err(FormError::KindMismatch));
    assert_eq!(f.add_bank_item(&gid, &qid, "x"), Err(FormError::KindMismatch));
  }

  #[test]
  fn locked_form_rejects_every_mutation() {
    let mut f = form();
    let (gid, qid) = first_ids(&f);
    f.set_locked(true);
    assert_eq!(f.add_group(), Err(FormError::Locked));
    assert_eq!(f.set_prompt(&gid, &qid, "x".into()), Err(FormError::Locked));
    assert_eq!(f.set_option_text(&gid, &qid, 0, "x".into()), Err(FormError::Locked));
    f.set_locked(false);
    f.set_prompt(&gid, &qid, "x".into()).unwrap();
  }

  #[test]
  fn completeness_and_submittability_track_content() {
    let mut f = form();
    let (gid, qid) = first_ids(&f);
    assert_eq!(f.non_empty_count(&gid).unwrap(), 0);
    assert!(!f.is_submittable());

    f.set_prompt(&gid, &qid, "Ano ang kabisera ng Pilipinas?".into()).unwrap();
    f.set_option_text(&gid, &qid, 0, "Manila".into()).unwrap();
    assert!(!f.is_submittable(), "needs two filled options");
    f.set_option_text(&gid, &qid, 1, "Cebu".into()).unwrap();
    assert_eq!(f.non_empty_count(&gid).unwrap(), 1);
    assert!(f.is_submittable());

    // A fresh empty group makes the whole form unsubmittable again.
    f.add_group().unwrap();
    assert!(!f.is_submittable());
  }

  #[test]
  fn progress_reflects_filled_slots() {
    let mut f = form();
    let (gid, qid) = first_ids(&f);
    assert_eq!(f.progress_percent(&gid).unwrap(), 0);
    f.set_prompt(&gid, &qid, "Tanong".into()).unwrap();
    for (i, text) in ["a", "b", "c", "d"].iter().enumerate() {
      f.set_option_text(&gid, &qid, i, text.to_string()).unwrap();
    }
    assert_eq!(f.progress_percent(&gid).unwrap(), 100);
  }

  #[test]
  fn rejected_edits_leave_state_untouched() {
    let mut f = form();
    let (gid, qid) = first_ids(&f);
    f.set_option_text(&gid, &qid, 1, "Cebu".into()).unwrap();
    let before = format!("{:?}", f.groups());
    let _ = f.set_option_text(&gid, &qid, 9, "X".into());
    let _ = f.set_correct_option(&gid, &qid, 9);
    let _ = f.remove_question(&gid, &qid);
    assert_eq!(format!("{:?}", f.groups()), before);
  }
}
