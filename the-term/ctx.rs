//! Application context - owns the document, the AI plumbing and all UI state.

use std::{
  collections::HashMap,
  path::Path,
  time::Duration,
};

use eyre::Result;
use the_ai::{
  AiEvent,
  AiGateway,
  AiRuntime,
  RequestId,
};
use the_lib::{
  command::CommandKind,
  document::Document,
  highlight::Highlighter,
  messages::NoticeCenter,
  output::OutputLog,
};

use crate::{
  commands,
  config::Config,
  dialog::{
    Dialog,
    LineInput,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
  #[default]
  Editor,
  Ask,
}

/// What a request in flight was for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
  pub kind:  CommandKind,
  /// Description (generate) or question (chat); empty otherwise.
  pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scroll {
  pub row: usize,
  pub col: usize,
}

pub struct Ctx {
  pub config:        Config,
  pub document:      Document,
  pub highlighter:   Highlighter,
  pub output:        OutputLog,
  pub notices:       NoticeCenter,
  pub dialog:        Option<Dialog>,
  pub focus:         Focus,
  pub ask_input:     LineInput,
  pub gateway:       AiGateway,
  pub runtime:       AiRuntime,
  pub pending:       HashMap<RequestId, PendingRequest>,
  /// Top-left of the editor viewport, in lines and columns.
  pub scroll:        Scroll,
  /// Editor text area size, updated on every draw.
  pub editor_size:   (usize, usize),
  /// Output pane lines scrolled back from the bottom.
  pub output_scroll: usize,
  pub should_quit:   bool,
  pub needs_render:  bool,
}

impl Ctx {
  pub fn new(config: Config, file_path: Option<&Path>) -> Result<Self> {
    let gateway = AiGateway::gemini(config.ai.clone());
    let mut ctx = Self::with_gateway(config, gateway)?;

    if let Some(path) = file_path
      && let Err(err) = ctx.document.open(path)
    {
      ctx.notices.error(format!("Failed to open file: {err}"));
    }
    ctx.highlighter.refresh(&ctx.document);
    Ok(ctx)
  }

  pub fn with_gateway(config: Config, gateway: AiGateway) -> Result<Self> {
    let highlighter = Highlighter::new(config.editor.highlight_max_bytes);
    let runtime = AiRuntime::new()?;

    Ok(Self {
      config,
      document: Document::default(),
      highlighter,
      output: OutputLog::default(),
      notices: NoticeCenter::default(),
      dialog: None,
      focus: Focus::Editor,
      ask_input: LineInput::default(),
      gateway,
      runtime,
      pending: HashMap::new(),
      scroll: Scroll::default(),
      editor_size: (80, 24),
      output_scroll: 0,
      should_quit: false,
      needs_render: true,
    })
  }

  pub fn title(&self) -> String {
    format!("AI Code Editor - {}", self.document.display_name())
  }

  pub fn status_text(&self) -> String {
    let key = if self.gateway.is_ready() {
      "API key configured"
    } else {
      "No API key configured"
    };
    let mut status = format!("Ready | {key}");
    match self.pending.len() {
      0 => {},
      1 => status.push_str(" | 1 request running"),
      n => status.push_str(&format!(" | {n} requests running")),
    }
    let (line, col) = self.document.caret_position();
    status.push_str(&format!(" | Ln {}, Col {}", line + 1, col + 1));
    if self.document.is_modified() {
      status.push_str(" | modified");
    }
    status
  }

  /// Drain finished AI requests. Returns whether anything changed.
  pub fn poll_ai_events(&mut self) -> bool {
    let mut changed = false;
    while let Some(event) = self.runtime.try_recv_event() {
      self.handle_ai_event(event);
      changed = true;
    }
    changed
  }

  /// Block up to `timeout` for one completion. Used by tests that need to
  /// wait on the worker pool.
  pub fn wait_ai_event(&mut self, timeout: Duration) -> bool {
    match self.runtime.recv_event_timeout(timeout) {
      Some(event) => {
        self.handle_ai_event(event);
        true
      },
      None => false,
    }
  }

  fn handle_ai_event(&mut self, event: AiEvent) {
    match event {
      AiEvent::Completed { id, result } => {
        let Some(request) = self.pending.remove(&id) else {
          log::warn!("dropping completion for unknown request {}", id.0);
          return;
        };
        commands::complete(self, request, result);
      },
    }
  }

  /// Re-highlight if the document changed since the last call.
  pub fn refresh_highlight(&mut self) -> bool {
    self.highlighter.refresh(&self.document)
  }

  pub fn resize(&mut self, _width: u16, _height: u16) {
    self.needs_render = true;
  }

  /// Keep the caret inside the editor viewport.
  pub fn ensure_cursor_visible(&mut self) {
    let (line, col) = self.document.caret_position();
    let (width, height) = self.editor_size;
    let height = height.max(1);
    let width = width.max(1);

    if line < self.scroll.row {
      self.scroll.row = line;
    } else if line >= self.scroll.row + height {
      self.scroll.row = line + 1 - height;
    }

    if col < self.scroll.col {
      self.scroll.col = col;
    } else if col >= self.scroll.col + width {
      self.scroll.col = col + 1 - width;
    }
  }

  pub fn shutdown(&mut self) {
    if !self.pending.is_empty() {
      log::info!("exiting with {} request(s) in flight", self.pending.len());
    }
    self.runtime.shutdown();
  }
}
