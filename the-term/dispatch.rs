//! Static action table: every menu entry, toolbar button and shortcut maps to
//! one [`Action`].

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers {
  bits: u8,
}

impl Modifiers {
  pub const CTRL: u8 = 0b0000_0001;
  pub const ALT: u8 = 0b0000_0010;
  pub const SHIFT: u8 = 0b0000_0100;

  #[must_use]
  pub const fn empty() -> Self {
    Self { bits: 0 }
  }

  #[must_use]
  pub const fn ctrl_only() -> Self {
    Self { bits: Self::CTRL }
  }

  #[must_use]
  pub const fn is_empty(self) -> bool {
    self.bits == 0
  }

  #[must_use]
  pub const fn ctrl(self) -> bool {
    (self.bits & Self::CTRL) != 0
  }

  #[must_use]
  pub const fn alt(self) -> bool {
    (self.bits & Self::ALT) != 0
  }

  #[must_use]
  pub const fn shift(self) -> bool {
    (self.bits & Self::SHIFT) != 0
  }

  pub fn insert(&mut self, bits: u8) {
    self.bits |= bits;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
  Char(char),
  Enter,
  Escape,
  Backspace,
  Tab,
  Delete,
  Home,
  End,
  PageUp,
  PageDown,
  Left,
  Right,
  Up,
  Down,
  F10,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
  pub key:       Key,
  pub modifiers: Modifiers,
}

impl KeyEvent {
  pub const fn plain(key: Key) -> Self {
    Self {
      key,
      modifiers: Modifiers::empty(),
    }
  }

  pub const fn ctrl(ch: char) -> Self {
    Self {
      key:       Key::Char(ch),
      modifiers: Modifiers::ctrl_only(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
  NewFile,
  OpenFile,
  SaveFile,
  SaveFileAs,
  Exit,
  SetupApiKey,
  GenerateCode,
  ExplainCode,
  FixCode,
  OptimizeCode,
  AskAi,
  ClearOutput,
  OpenMenu,
  FocusEditor,
}

impl Action {
  pub fn label(self) -> &'static str {
    match self {
      Self::NewFile => "New",
      Self::OpenFile => "Open",
      Self::SaveFile => "Save",
      Self::SaveFileAs => "Save As",
      Self::Exit => "Exit",
      Self::SetupApiKey => "Setup API Key",
      Self::GenerateCode => "Generate Code",
      Self::ExplainCode => "Explain Code",
      Self::FixCode => "Fix Code",
      Self::OptimizeCode => "Optimize Code",
      Self::AskAi => "Ask AI",
      Self::ClearOutput => "Clear Output",
      Self::OpenMenu => "Menu",
      Self::FocusEditor => "Editor",
    }
  }

  /// Shortcut as shown in menus and the toolbar.
  pub fn shortcut_label(self) -> &'static str {
    match self {
      Self::NewFile => "Ctrl+N",
      Self::OpenFile => "Ctrl+O",
      Self::SaveFile => "Ctrl+S",
      Self::SaveFileAs => "Ctrl+W",
      Self::Exit => "Ctrl+Q",
      Self::SetupApiKey => "Ctrl+K",
      Self::GenerateCode => "Ctrl+G",
      Self::ExplainCode => "Ctrl+E",
      Self::FixCode => "Ctrl+F",
      Self::OptimizeCode => "Ctrl+T",
      Self::AskAi => "Ctrl+L",
      Self::ClearOutput => "Ctrl+D",
      Self::OpenMenu => "F10",
      Self::FocusEditor => "Esc",
    }
  }
}

pub struct Menu {
  pub title: &'static str,
  pub items: &'static [Action],
}

pub const MENUS: &[Menu] = &[
  Menu {
    title: "File",
    items: &[
      Action::NewFile,
      Action::OpenFile,
      Action::SaveFile,
      Action::SaveFileAs,
      Action::Exit,
    ],
  },
  Menu {
    title: "AI",
    items: &[
      Action::SetupApiKey,
      Action::GenerateCode,
      Action::ExplainCode,
      Action::FixCode,
      Action::OptimizeCode,
    ],
  },
  Menu {
    title: "Assistant",
    items: &[Action::AskAi, Action::ClearOutput],
  },
];

pub const TOOLBAR: &[Action] = &[
  Action::GenerateCode,
  Action::ExplainCode,
  Action::FixCode,
  Action::OptimizeCode,
  Action::SetupApiKey,
];

const KEYMAP: &[(KeyEvent, Action)] = &[
  (KeyEvent::ctrl('n'), Action::NewFile),
  (KeyEvent::ctrl('o'), Action::OpenFile),
  (KeyEvent::ctrl('s'), Action::SaveFile),
  (KeyEvent::ctrl('w'), Action::SaveFileAs),
  (KeyEvent::ctrl('q'), Action::Exit),
  (KeyEvent::ctrl('k'), Action::SetupApiKey),
  (KeyEvent::ctrl('g'), Action::GenerateCode),
  (KeyEvent::ctrl('e'), Action::ExplainCode),
  (KeyEvent::ctrl('f'), Action::FixCode),
  (KeyEvent::ctrl('t'), Action::OptimizeCode),
  (KeyEvent::ctrl('l'), Action::AskAi),
  (KeyEvent::ctrl('d'), Action::ClearOutput),
  (KeyEvent::plain(Key::F10), Action::OpenMenu),
  (KeyEvent::plain(Key::Escape), Action::FocusEditor),
];

/// Global shortcut bound to `event`, if any. Letters match case-insensitively.
pub fn lookup(event: KeyEvent) -> Option<Action> {
  let event = match event.key {
    Key::Char(ch) => {
      KeyEvent {
        key:       Key::Char(ch.to_ascii_lowercase()),
        modifiers: event.modifiers,
      }
    },
    _ => event,
  };
  KEYMAP
    .iter()
    .find(|(key, _)| {
      key.key == event.key
        && key.modifiers.ctrl() == event.modifiers.ctrl()
        && !event.modifiers.alt()
    })
    .map(|(_, action)| *action)
}
