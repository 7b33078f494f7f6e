//! Modal dialogs and the single-line input they are built on.

use crate::dispatch::{
  Action,
  MENUS,
};

/// Single-line editable text with a char-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
  text:   String,
  cursor: usize,
  masked: bool,
}

impl LineInput {
  pub fn new(text: impl Into<String>) -> Self {
    let text = text.into();
    let cursor = text.chars().count();
    Self {
      text,
      cursor,
      masked: false,
    }
  }

  pub fn masked(text: impl Into<String>) -> Self {
    Self {
      masked: true,
      ..Self::new(text)
    }
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn is_empty(&self) -> bool {
    self.text.is_empty()
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  /// What to draw: the text, or one `*` per char when masked.
  pub fn display(&self) -> String {
    if self.masked {
      "*".repeat(self.text.chars().count())
    } else {
      self.text.clone()
    }
  }

  fn byte_index(&self, char_idx: usize) -> usize {
    self
      .text
      .char_indices()
      .nth(char_idx)
      .map(|(idx, _)| idx)
      .unwrap_or(self.text.len())
  }

  pub fn insert_char(&mut self, ch: char) {
    let idx = self.byte_index(self.cursor);
    self.text.insert(idx, ch);
    self.cursor += 1;
  }

  pub fn insert_str(&mut self, s: &str) {
    for ch in s.chars().filter(|ch| !ch.is_control()) {
      self.insert_char(ch);
    }
  }

  pub fn backspace(&mut self) {
    if self.cursor == 0 {
      return;
    }
    self.cursor -= 1;
    let idx = self.byte_index(self.cursor);
    self.text.remove(idx);
  }

  pub fn delete(&mut self) {
    if self.cursor < self.text.chars().count() {
      let idx = self.byte_index(self.cursor);
      self.text.remove(idx);
    }
  }

  pub fn move_left(&mut self) {
    self.cursor = self.cursor.saturating_sub(1);
  }

  pub fn move_right(&mut self) {
    self.cursor = (self.cursor + 1).min(self.text.chars().count());
  }

  pub fn move_home(&mut self) {
    self.cursor = 0;
  }

  pub fn move_end(&mut self) {
    self.cursor = self.text.chars().count();
  }

  pub fn clear(&mut self) {
    self.text.clear();
    self.cursor = 0;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuState {
  pub menu: usize,
  pub item: usize,
}

impl MenuState {
  pub fn selected(&self) -> Option<Action> {
    MENUS
      .get(self.menu)
      .and_then(|menu| menu.items.get(self.item))
      .copied()
  }

  pub fn next_menu(&mut self) {
    self.menu = (self.menu + 1) % MENUS.len();
    self.item = 0;
  }

  pub fn prev_menu(&mut self) {
    self.menu = (self.menu + MENUS.len() - 1) % MENUS.len();
    self.item = 0;
  }

  pub fn next_item(&mut self) {
    let len = MENUS[self.menu].items.len();
    self.item = (self.item + 1) % len;
  }

  pub fn prev_item(&mut self) {
    let len = MENUS[self.menu].items.len();
    self.item = (self.item + len - 1) % len;
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
  /// Yes/no question; `on_accept` runs on yes.
  Confirm {
    title:     &'static str,
    prompt:    &'static str,
    on_accept: ConfirmAction,
  },
  ApiKey(LineInput),
  Generate(LineInput),
  OpenPath(LineInput),
  SavePath(LineInput),
  Menu(MenuState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
  ClearDocument,
}

impl Dialog {
  pub fn title(&self) -> &'static str {
    match self {
      Self::Confirm { title, .. } => title,
      Self::ApiKey(_) => "Setup Gemini API Key",
      Self::Generate(_) => "AI Code Generator",
      Self::OpenPath(_) => "Open File",
      Self::SavePath(_) => "Save As",
      Self::Menu(_) => "Menu",
    }
  }

  pub fn prompt(&self) -> &'static str {
    match self {
      Self::Confirm { prompt, .. } => prompt,
      Self::ApiKey(_) => "Enter your Gemini API Key:",
      Self::Generate(_) => "Describe what code you want to generate:",
      Self::OpenPath(_) | Self::SavePath(_) => "Path:",
      Self::Menu(_) => "",
    }
  }

  pub fn input(&self) -> Option<&LineInput> {
    match self {
      Self::ApiKey(input) | Self::Generate(input) | Self::OpenPath(input) | Self::SavePath(input) => {
        Some(input)
      },
      Self::Confirm { .. } | Self::Menu(_) => None,
    }
  }

  pub fn input_mut(&mut self) -> Option<&mut LineInput> {
    match self {
      Self::ApiKey(input) | Self::Generate(input) | Self::OpenPath(input) | Self::SavePath(input) => {
        Some(input)
      },
      Self::Confirm { .. } | Self::Menu(_) => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn line_input_edits_at_cursor() {
    let mut input = LineInput::new("héllo");
    assert_eq!(input.cursor(), 5);
    input.move_left();
    input.move_left();
    input.insert_char('X');
    assert_eq!(input.text(), "hélXlo");
    input.backspace();
    input.backspace();
    assert_eq!(input.text(), "hélo");
    input.move_home();
    input.delete();
    assert_eq!(input.text(), "élo");
    input.move_end();
    input.insert_str("a\nb");
    assert_eq!(input.text(), "éloab");
  }

  #[test]
  fn masked_input_hides_text() {
    let input = LineInput::masked("secret");
    assert_eq!(input.display(), "******");
    assert_eq!(input.text(), "secret");
  }

  #[test]
  fn menu_navigation_wraps() {
    let mut state = MenuState::default();
    state.prev_item();
    assert_eq!(state.item, MENUS[0].items.len() - 1);
    state.prev_menu();
    assert_eq!(state.menu, MENUS.len() - 1);
    assert_eq!(state.item, 0);
    state.next_menu();
    assert_eq!(state.selected(), Some(MENUS[0].items[0]));
  }
}
