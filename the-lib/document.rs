//! The document store: one buffer, its optional file path, and the caret.
//!
//! The buffer is a [`Rope`] addressed in chars. Every mutation bumps
//! [`Document::version`] so derived state (highlight spans, line numbers) can
//! tell when it is stale.
//!
//! File operations write the buffer byte-for-byte, so opening a file and
//! saving it again without edits reproduces it exactly.
//!
//! # Example
//!
//! ```no_run
//! use the_lib::document::Document;
//!
//! let mut doc = Document::default();
//! doc.insert("print(1)");
//! doc.save_as("/tmp/scratch.py").unwrap();
//! assert_eq!(doc.display_name(), "scratch.py");
//! ```

use std::{
  fs,
  io::{
    self,
    BufWriter,
    Write,
  },
  path::{
    Path,
    PathBuf,
  },
};

use ropey::Rope;
use thiserror::Error;

use crate::selection::Range;
pub use crate::line_ending::line_content;

pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Error)]
pub enum DocumentError {
  #[error("failed to read '{}': {source}", .path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("failed to write '{}': {source}", .path.display())]
  Write {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("document has no file path")]
  Untitled,
}

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Default, Clone)]
pub struct Document {
  path:        Option<PathBuf>,
  text:        Rope,
  selection:   Range,
  /// Column the caret wants to return to on vertical moves.
  goal_column: Option<usize>,
  version:     u64,
  modified:    bool,
}

impl Document {
  pub fn from_text(text: &str) -> Self {
    Self {
      text: Rope::from_str(text),
      ..Self::default()
    }
  }

  pub fn text(&self) -> &Rope {
    &self.text
  }

  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  pub fn version(&self) -> u64 {
    self.version
  }

  pub fn is_modified(&self) -> bool {
    self.modified
  }

  pub fn is_empty(&self) -> bool {
    self.text.len_chars() == 0
  }

  pub fn len_chars(&self) -> usize {
    self.text.len_chars()
  }

  /// File name of the current path, or [`UNTITLED`].
  pub fn display_name(&self) -> String {
    self
      .path
      .as_deref()
      .and_then(Path::file_name)
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| UNTITLED.to_string())
  }

  pub fn selection(&self) -> Range {
    self.selection
  }

  pub fn set_selection(&mut self, range: Range) {
    self.selection = range.clamp(self.text.len_chars());
    self.goal_column = None;
  }

  pub fn caret(&self) -> usize {
    self.selection.head
  }

  /// Zero-based (line, column) of the caret, in chars.
  pub fn caret_position(&self) -> (usize, usize) {
    let head = self.caret();
    let line = self.text.char_to_line(head);
    (line, head - self.text.line_to_char(line))
  }

  /// The selected text, or `None` when the selection is a bare caret.
  pub fn selected_text(&self) -> Option<String> {
    if self.selection.is_empty() {
      return None;
    }
    Some(
      self
        .text
        .slice(self.selection.from()..self.selection.to())
        .to_string(),
    )
  }

  // File operations.
  //

  /// Drop the buffer and forget the path.
  pub fn clear(&mut self) {
    self.text = Rope::new();
    self.path = None;
    self.selection = Range::default();
    self.goal_column = None;
    self.modified = false;
    self.bump_version();
  }

  /// Replace the buffer with the contents of `path`. On failure the current
  /// buffer and path are left as they were.
  pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| {
      DocumentError::Read {
        path: path.to_path_buf(),
        source,
      }
    })?;
    log::info!("opened '{}' ({} bytes)", path.display(), content.len());

    self.text = Rope::from_str(&content);
    self.path = Some(path.to_path_buf());
    self.selection = Range::default();
    self.goal_column = None;
    self.modified = false;
    self.bump_version();
    Ok(())
  }

  /// Write the buffer to the recorded path.
  pub fn save(&mut self) -> Result<()> {
    let path = self.path.clone().ok_or(DocumentError::Untitled)?;
    self.write_to(&path)?;
    self.modified = false;
    Ok(())
  }

  /// Write the buffer to `path` and record it as the document's path.
  pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    self.write_to(path)?;
    self.path = Some(path.to_path_buf());
    self.modified = false;
    Ok(())
  }

  fn write_to(&self, path: &Path) -> Result<()> {
    let write = || -> io::Result<()> {
      let mut writer = BufWriter::new(fs::File::create(path)?);
      self.text.write_to(&mut writer)?;
      writer.flush()
    };
    write().map_err(|source| {
      DocumentError::Write {
        path: path.to_path_buf(),
        source,
      }
    })?;
    log::info!(
      "saved '{}' ({} bytes)",
      path.display(),
      self.text.len_bytes()
    );
    Ok(())
  }

  // Editing.
  //

  /// Type `text`: replaces a non-empty selection, leaves the caret after the
  /// inserted text.
  pub fn insert(&mut self, text: &str) {
    let from = self.selection.from();
    if !self.selection.is_empty() {
      self.text.remove(from..self.selection.to());
    }
    self.insert_at(from, text);
  }

  /// Insert `text` at the caret without touching the selected text. Used for
  /// splicing AI output into the buffer.
  pub fn insert_at_caret(&mut self, text: &str) {
    let head = self.selection.head.min(self.text.len_chars());
    self.insert_at(head, text);
  }

  fn insert_at(&mut self, pos: usize, text: &str) {
    self.text.insert(pos, text);
    self.selection = Range::point(pos + text.chars().count());
    self.goal_column = None;
    self.touch();
  }

  /// Delete the selection, or the char before the caret.
  pub fn delete_backward(&mut self) {
    if self.delete_selection() {
      return;
    }
    let head = self.selection.head;
    if head == 0 {
      return;
    }
    let from = self.crlf_aware_prev(head);
    self.text.remove(from..head);
    self.selection = Range::point(from);
    self.goal_column = None;
    self.touch();
  }

  /// Delete the selection, or the char after the caret.
  pub fn delete_forward(&mut self) {
    if self.delete_selection() {
      return;
    }
    let head = self.selection.head;
    if head >= self.text.len_chars() {
      return;
    }
    let to = self.crlf_aware_next(head);
    self.text.remove(head..to);
    self.goal_column = None;
    self.touch();
  }

  fn delete_selection(&mut self) -> bool {
    if self.selection.is_empty() {
      return false;
    }
    let from = self.selection.from();
    self.text.remove(from..self.selection.to());
    self.selection = Range::point(from);
    self.goal_column = None;
    self.touch();
    true
  }

  // Movement.
  //

  pub fn move_left(&mut self, extend: bool) {
    let head = self.selection.head;
    let target = if head == 0 {
      0
    } else {
      self.crlf_aware_prev(head)
    };
    self.move_head(target, extend);
  }

  pub fn move_right(&mut self, extend: bool) {
    let head = self.selection.head;
    let target = if head >= self.text.len_chars() {
      head
    } else {
      self.crlf_aware_next(head)
    };
    self.move_head(target, extend);
  }

  pub fn move_up(&mut self, extend: bool) {
    self.move_lines(-1, extend);
  }

  pub fn move_down(&mut self, extend: bool) {
    self.move_lines(1, extend);
  }

  /// Move the caret `delta` lines, keeping the goal column when the target
  /// line is long enough.
  pub fn move_lines(&mut self, delta: isize, extend: bool) {
    let (line, col) = self.caret_position();
    let goal = self.goal_column.unwrap_or(col);
    let last_line = self.text.len_lines().saturating_sub(1);
    let target_line = line.saturating_add_signed(delta).min(last_line);
    let target_col = goal.min(self.line_content_len(target_line));
    let target = self.text.line_to_char(target_line) + target_col;
    self.selection = self.selection.put_head(target, extend);
    self.goal_column = Some(goal);
  }

  pub fn move_line_start(&mut self, extend: bool) {
    let (line, _) = self.caret_position();
    self.move_head(self.text.line_to_char(line), extend);
  }

  pub fn move_line_end(&mut self, extend: bool) {
    let (line, _) = self.caret_position();
    let end = self.text.line_to_char(line) + self.line_content_len(line);
    self.move_head(end, extend);
  }

  pub fn move_to_start(&mut self, extend: bool) {
    self.move_head(0, extend);
  }

  pub fn move_to_end(&mut self, extend: bool) {
    self.move_head(self.text.len_chars(), extend);
  }

  pub fn select_all(&mut self) {
    self.selection = Range::new(0, self.text.len_chars());
    self.goal_column = None;
  }

  fn move_head(&mut self, head: usize, extend: bool) {
    self.selection = self.selection.put_head(head, extend);
    self.goal_column = None;
  }

  /// Length of `line` in chars, without its line break.
  pub fn line_content_len(&self, line: usize) -> usize {
    if line >= self.text.len_lines() {
      return 0;
    }
    line_content(self.text.line(line)).len_chars()
  }

  fn crlf_aware_prev(&self, pos: usize) -> usize {
    if pos >= 2 && self.text.char(pos - 1) == '\n' && self.text.char(pos - 2) == '\r' {
      pos - 2
    } else {
      pos - 1
    }
  }

  fn crlf_aware_next(&self, pos: usize) -> usize {
    let len = self.text.len_chars();
    if pos + 1 < len && self.text.char(pos) == '\r' && self.text.char(pos + 1) == '\n' {
      pos + 2
    } else {
      pos + 1
    }
  }

  fn touch(&mut self) {
    self.modified = true;
    self.bump_version();
  }

  fn bump_version(&mut self) {
    self.version = self.version.wrapping_add(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn open_then_save_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.py");
    let content = "def add(a, b):\r\n    return a + b\n\n# trailing\n";
    fs::write(&path, content).unwrap();

    let mut doc = Document::default();
    doc.open(&path).unwrap();
    doc.save().unwrap();

    assert_eq!(fs::read(&path).unwrap(), content.as_bytes());
    assert_eq!(doc.display_name(), "sample.py");
    assert!(!doc.is_modified());
  }

  #[test]
  fn failed_open_keeps_buffer_and_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = Document::from_text("keep me");
    let err = doc.open(dir.path().join("missing.py")).unwrap_err();

    assert!(matches!(err, DocumentError::Read { .. }));
    assert_eq!(doc.text().to_string(), "keep me");
    assert!(doc.path().is_none());
  }

  #[test]
  fn save_without_path_is_untitled() {
    let mut doc = Document::from_text("x = 1");
    assert!(matches!(doc.save(), Err(DocumentError::Untitled)));
  }

  #[test]
  fn save_as_records_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.py");
    let mut doc = Document::from_text("x = 1");
    doc.save_as(&path).unwrap();

    assert_eq!(doc.path(), Some(path.as_path()));
    assert_eq!(fs::read_to_string(&path).unwrap(), "x = 1");
  }

  #[test]
  fn clear_resets_everything() {
    let mut doc = Document::from_text("abc");
    doc.select_all();
    let version = doc.version();
    doc.clear();

    assert!(doc.is_empty());
    assert!(doc.path().is_none());
    assert_eq!(doc.selection(), Range::point(0));
    assert!(doc.version() > version);
  }

  #[test]
  fn typing_replaces_selection() {
    let mut doc = Document::from_text("hello world");
    doc.set_selection(Range::new(6, 11));
    doc.insert("there");

    assert_eq!(doc.text().to_string(), "hello there");
    assert_eq!(doc.caret(), 11);
    assert!(doc.is_modified());
  }

  #[test]
  fn insert_at_caret_keeps_selected_text() {
    let mut doc = Document::from_text("ab");
    doc.set_selection(Range::new(0, 1));
    doc.insert_at_caret("X");

    assert_eq!(doc.text().to_string(), "aXb");
    assert_eq!(doc.selection(), Range::point(2));
  }

  #[test]
  fn backspace_and_delete() {
    let mut doc = Document::from_text("abc");
    doc.set_selection(Range::point(0));
    doc.delete_backward();
    assert_eq!(doc.text().to_string(), "abc");

    doc.set_selection(Range::point(2));
    doc.delete_backward();
    assert_eq!(doc.text().to_string(), "ac");
    doc.delete_forward();
    assert_eq!(doc.text().to_string(), "a");
    doc.delete_forward();
    assert_eq!(doc.text().to_string(), "a");
  }

  #[test]
  fn backspace_removes_crlf_as_one() {
    let mut doc = Document::from_text("a\r\nb");
    doc.set_selection(Range::point(3));
    doc.delete_backward();
    assert_eq!(doc.text().to_string(), "ab");
  }

  #[test]
  fn vertical_moves_keep_goal_column() {
    let mut doc = Document::from_text("long line\nab\nanother line");
    doc.set_selection(Range::point(7));
    doc.move_down(false);
    assert_eq!(doc.caret_position(), (1, 2));
    doc.move_down(false);
    assert_eq!(doc.caret_position(), (2, 7));
    doc.move_up(true);
    assert_eq!(doc.caret_position(), (1, 2));
    assert!(!doc.selection().is_empty());
  }

  #[test]
  fn line_end_skips_line_break() {
    let mut doc = Document::from_text("abc\r\ndef");
    doc.move_line_end(false);
    assert_eq!(doc.caret(), 3);
    doc.move_to_end(false);
    assert_eq!(doc.caret_position(), (1, 3));
  }

  #[test]
  fn form_feed_line_end_stays_on_line() {
    let mut doc = Document::from_text("a\u{000C}b\nlonger");
    doc.move_line_end(false);
    assert_eq!(doc.caret_position(), (0, 1));
    doc.insert("X");
    assert_eq!(doc.text().to_string(), "aX\u{000C}b\nlonger");

    doc.set_selection(Range::point(doc.len_chars()));
    doc.move_up(false);
    doc.move_up(false);
    assert_eq!(doc.caret_position(), (0, 2));
  }

  #[test]
  fn selected_text_is_none_for_caret() {
    let mut doc = Document::from_text("abc");
    assert_eq!(doc.selected_text(), None);
    doc.select_all();
    assert_eq!(doc.selected_text().as_deref(), Some("abc"));
  }
}
