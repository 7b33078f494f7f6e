//! The assistant output log.
//!
//! Append-only: entries are added whole and never edited. The only way to
//! remove anything is [`OutputLog::clear`], which drops everything.

use serde::{
  Deserialize,
  Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
  /// Progress notes such as "Generating code...".
  Status,
  /// Echo of what the user asked.
  User,
  Response,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
  pub seq:  u64,
  pub kind: EntryKind,
  pub text: String,
}

#[derive(Debug, Clone)]
pub struct OutputLog {
  entries:  Vec<OutputEntry>,
  next_seq: u64,
}

impl Default for OutputLog {
  fn default() -> Self {
    Self {
      entries:  Vec::new(),
      next_seq: 1,
    }
  }
}

impl OutputLog {
  pub fn entries(&self) -> &[OutputEntry] {
    &self.entries
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn last(&self) -> Option<&OutputEntry> {
    self.entries.last()
  }

  pub fn push(&mut self, kind: EntryKind, text: impl Into<String>) -> u64 {
    let seq = self.next_seq;
    self.next_seq = self.next_seq.saturating_add(1);
    self.entries.push(OutputEntry {
      seq,
      kind,
      text: text.into(),
    });
    seq
  }

  pub fn status(&mut self, text: impl Into<String>) -> u64 {
    self.push(EntryKind::Status, text)
  }

  pub fn user(&mut self, text: impl Into<String>) -> u64 {
    self.push(EntryKind::User, text)
  }

  pub fn response(&mut self, text: impl Into<String>) -> u64 {
    self.push(EntryKind::Response, text)
  }

  pub fn error(&mut self, text: impl Into<String>) -> u64 {
    self.push(EntryKind::Error, text)
  }

  pub fn count(&self, kind: EntryKind) -> usize {
    self.entries.iter().filter(|entry| entry.kind == kind).count()
  }

  /// Sequence numbers keep counting across a clear.
  pub fn clear(&mut self) {
    self.entries.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn entries_are_appended_in_order() {
    let mut log = OutputLog::default();
    log.status("Analyzing code...");
    log.response("Code Explanation:\n\nok");

    let kinds: Vec<_> = log.entries().iter().map(|entry| entry.kind).collect();
    assert_eq!(kinds, vec![EntryKind::Status, EntryKind::Response]);
    assert_eq!(log.last().unwrap().seq, 2);
    assert_eq!(log.count(EntryKind::Error), 0);
  }

  #[test]
  fn clear_keeps_sequence_moving() {
    let mut log = OutputLog::default();
    log.error("Error: boom");
    log.clear();
    assert!(log.is_empty());
    assert_eq!(log.user("You: hi"), 2);
  }
}
