//! Modal notices.
//!
//! Notices block the shell until dismissed: the front of the queue is shown,
//! everything behind it waits. Every notice is mirrored to the log.

use std::collections::VecDeque;

use serde::{
  Deserialize,
  Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
  Info,
  Warning,
  Error,
}

impl NoticeLevel {
  /// Default dialog title for the level.
  pub fn title(self) -> &'static str {
    match self {
      Self::Info => "Info",
      Self::Warning => "Warning",
      Self::Error => "Error",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
  pub id:    u64,
  pub level: NoticeLevel,
  pub title: String,
  pub text:  String,
}

#[derive(Debug, Clone)]
pub struct NoticeCenter {
  pending: VecDeque<Notice>,
  next_id: u64,
}

impl Default for NoticeCenter {
  fn default() -> Self {
    Self {
      pending: VecDeque::new(),
      next_id: 1,
    }
  }
}

impl NoticeCenter {

  /// The notice currently on screen.
  pub fn active(&self) -> Option<&Notice> {
    self.pending.front()
  }

  pub fn has_active(&self) -> bool {
    !self.pending.is_empty()
  }

  pub fn pending_len(&self) -> usize {
    self.pending.len()
  }

  pub fn publish(
    &mut self,
    level: NoticeLevel,
    title: impl Into<String>,
    text: impl Into<String>,
  ) -> Notice {
    let notice = Notice {
      id: self.next_id,
      level,
      title: title.into(),
      text: text.into(),
    };
    self.next_id = self.next_id.saturating_add(1);
    match level {
      NoticeLevel::Error => log::error!("notice: {}", notice.text),
      NoticeLevel::Warning => log::warn!("notice: {}", notice.text),
      NoticeLevel::Info => log::info!("notice: {}", notice.text),
    }
    self.pending.push_back(notice.clone());
    notice
  }

  pub fn info(&mut self, text: impl Into<String>) -> Notice {
    self.publish(NoticeLevel::Info, NoticeLevel::Info.title(), text)
  }

  pub fn success(&mut self, text: impl Into<String>) -> Notice {
    self.publish(NoticeLevel::Info, "Success", text)
  }

  pub fn warning(&mut self, text: impl Into<String>) -> Notice {
    self.publish(NoticeLevel::Warning, NoticeLevel::Warning.title(), text)
  }

  pub fn error(&mut self, text: impl Into<String>) -> Notice {
    self.publish(NoticeLevel::Error, NoticeLevel::Error.title(), text)
  }

  /// Close the notice on screen and show the next one, if any.
  pub fn dismiss(&mut self) -> Option<Notice> {
    self.pending.pop_front()
  }
}
