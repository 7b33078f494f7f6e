//! Terminal abstraction using ratatui + crossterm backend.

use std::io::{
  self,
  Stdout,
};

use crossterm::{
  event::{
    DisableBracketedPaste,
    EnableBracketedPaste,
  },
  execute,
  terminal::{
    EnterAlternateScreen,
    LeaveAlternateScreen,
    SetTitle,
    disable_raw_mode,
    enable_raw_mode,
  },
};
use eyre::Result;
use ratatui::{
  Terminal as RatatuiTerminal,
  backend::CrosstermBackend,
  prelude::Rect,
};

pub struct Terminal {
  terminal: RatatuiTerminal<CrosstermBackend<Stdout>>,
  title:    String,
  raw:      bool,
}

impl Terminal {
  pub fn new() -> Result<Self> {
    let stdout = io::stdout();
    let backend = CrosstermBackend::new(stdout);
    let terminal = RatatuiTerminal::new(backend)?;
    Ok(Self {
      terminal,
      title: String::new(),
      raw: false,
    })
  }

  pub fn enter_raw_mode(&mut self) -> Result<()> {
    enable_raw_mode()?;
    execute!(
      self.terminal.backend_mut(),
      EnterAlternateScreen,
      EnableBracketedPaste
    )?;
    self.raw = true;
    self.terminal.clear()?;
    Ok(())
  }

  pub fn leave_raw_mode(&mut self) -> Result<()> {
    if !self.raw {
      return Ok(());
    }
    execute!(
      self.terminal.backend_mut(),
      DisableBracketedPaste,
      LeaveAlternateScreen
    )?;
    disable_raw_mode()?;
    self.terminal.show_cursor()?;
    self.raw = false;
    Ok(())
  }

  /// Set the window title, skipping the write when it is unchanged.
  pub fn set_title(&mut self, title: &str) -> Result<()> {
    if self.title != title {
      execute!(self.terminal.backend_mut(), SetTitle(title))?;
      self.title = title.to_string();
    }
    Ok(())
  }

  pub fn draw<F>(&mut self, f: F) -> Result<()>
  where
    F: FnOnce(&mut ratatui::Frame<'_>),
  {
    self.terminal.draw(f)?;
    Ok(())
  }

  pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
    self.terminal.resize(Rect::new(0, 0, width, height))?;
    Ok(())
  }
}

impl Drop for Terminal {
  fn drop(&mut self) {
    let _ = self.leave_raw_mode();
  }
}
