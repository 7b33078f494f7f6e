//! Input handling - maps key events to actions and edits.

use crossterm::event::{
  KeyCode,
  KeyEvent as CrosstermKeyEvent,
  KeyEventKind,
  KeyModifiers,
};

use crate::{
  commands,
  ctx::{
    Ctx,
    Focus,
  },
  dialog::{
    Dialog,
    LineInput,
  },
  dispatch::{
    self,
    Key,
    KeyEvent,
    Modifiers,
  },
};

/// Route one terminal key event: notices first, then the open dialog, then
/// global shortcuts, then the focused pane.
pub fn handle_key(ctx: &mut Ctx, event: CrosstermKeyEvent) {
  if event.kind == KeyEventKind::Release {
    return;
  }
  let Some(key) = to_key(event.code) else {
    return;
  };
  let event = KeyEvent {
    key,
    modifiers: to_modifiers(event.modifiers),
  };
  handle_key_event(ctx, event);
  ctx.needs_render = true;
}

pub fn handle_key_event(ctx: &mut Ctx, event: KeyEvent) {
  if ctx.notices.has_active() {
    if matches!(event.key, Key::Enter | Key::Escape | Key::Char(' ')) {
      ctx.notices.dismiss();
    }
    return;
  }

  if let Some(dialog) = ctx.dialog.take() {
    handle_dialog_key(ctx, dialog, event);
    return;
  }

  if let Some(action) = dispatch::lookup(event) {
    commands::execute(ctx, action);
    return;
  }

  match ctx.focus {
    Focus::Ask => handle_ask_key(ctx, event),
    Focus::Editor => handle_editor_key(ctx, event),
  }
}

/// Bracketed paste goes to whatever has the text cursor.
pub fn handle_paste(ctx: &mut Ctx, text: &str) {
  if ctx.notices.has_active() {
    return;
  }
  if let Some(input) = ctx.dialog.as_mut().and_then(Dialog::input_mut) {
    input.insert_str(text);
  } else if ctx.dialog.is_none() {
    match ctx.focus {
      Focus::Ask => ctx.ask_input.insert_str(text),
      Focus::Editor => ctx.document.insert(&text.replace("\r\n", "\n")),
    }
  }
  ctx.needs_render = true;
}

fn handle_dialog_key(ctx: &mut Ctx, mut dialog: Dialog, event: KeyEvent) {
  if event.key == Key::Enter && dialog.input().is_some() {
    if !commands::submit_dialog(ctx, &dialog) && ctx.dialog.is_none() {
      ctx.dialog = Some(dialog);
    }
    return;
  }

  match &mut dialog {
    Dialog::Confirm { on_accept, .. } => {
      match event.key {
        Key::Enter | Key::Char('y') | Key::Char('Y') => {
          commands::confirm(ctx, *on_accept);
          return;
        },
        Key::Escape | Key::Char('n') | Key::Char('N') => return,
        _ => {},
      }
    },
    Dialog::Menu(state) => {
      match event.key {
        Key::Left => state.prev_menu(),
        Key::Right | Key::Tab => state.next_menu(),
        Key::Up => state.prev_item(),
        Key::Down => state.next_item(),
        Key::Enter => {
          if let Some(action) = state.selected() {
            commands::execute(ctx, action);
          }
          return;
        },
        Key::Escape | Key::F10 => return,
        _ => {},
      }
    },
    Dialog::ApiKey(input)
    | Dialog::Generate(input)
    | Dialog::OpenPath(input)
    | Dialog::SavePath(input) => {
      if event.key == Key::Escape {
        return;
      }
      edit_line(input, event);
    },
  }
  if ctx.dialog.is_none() {
    ctx.dialog = Some(dialog);
  }
}

fn handle_ask_key(ctx: &mut Ctx, event: KeyEvent) {
  match event.key {
    Key::Enter => commands::ask(ctx),
    Key::Tab => ctx.focus = Focus::Editor,
    Key::PageUp => scroll_output(ctx, 5),
    Key::PageDown => scroll_output(ctx, -5),
    _ => edit_line(&mut ctx.ask_input, event),
  }
}

fn scroll_output(ctx: &mut Ctx, delta: isize) {
  ctx.output_scroll = ctx.output_scroll.saturating_add_signed(delta);
}

fn edit_line(input: &mut LineInput, event: KeyEvent) {
  if event.modifiers.ctrl() || event.modifiers.alt() {
    return;
  }
  match event.key {
    Key::Char(ch) => input.insert_char(ch),
    Key::Backspace => input.backspace(),
    Key::Delete => input.delete(),
    Key::Left => input.move_left(),
    Key::Right => input.move_right(),
    Key::Home => input.move_home(),
    Key::End => input.move_end(),
    _ => {},
  }
}

fn handle_editor_key(ctx: &mut Ctx, event: KeyEvent) {
  if event.modifiers.alt() {
    match event.key {
      Key::Up => scroll_output(ctx, 1),
      Key::Down => scroll_output(ctx, -1),
      _ => {},
    }
    return;
  }

  let extend = event.modifiers.shift();
  let ctrl = event.modifiers.ctrl();
  let page = ctx.editor_size.1.max(1) as isize;
  let indent = ctx.config.editor.indent();
  let doc = &mut ctx.document;

  match event.key {
    Key::Char('a') if ctrl => doc.select_all(),
    Key::Char(_) if ctrl => {},
    Key::Char(ch) => doc.insert(ch.encode_utf8(&mut [0; 4])),
    Key::Enter => doc.insert("\n"),
    Key::Tab => doc.insert(&indent),
    Key::Backspace => doc.delete_backward(),
    Key::Delete => doc.delete_forward(),
    Key::Left => doc.move_left(extend),
    Key::Right => doc.move_right(extend),
    Key::Up => doc.move_up(extend),
    Key::Down => doc.move_down(extend),
    Key::Home if ctrl => doc.move_to_start(extend),
    Key::End if ctrl => doc.move_to_end(extend),
    Key::Home => doc.move_line_start(extend),
    Key::End => doc.move_line_end(extend),
    Key::PageUp => doc.move_lines(-page, extend),
    Key::PageDown => doc.move_lines(page, extend),
    Key::Escape | Key::F10 => {},
  }
}

fn to_key(code: KeyCode) -> Option<Key> {
  match code {
    KeyCode::Char(c) => Some(Key::Char(c)),
    KeyCode::Enter => Some(Key::Enter),
    KeyCode::Tab | KeyCode::BackTab => Some(Key::Tab),
    KeyCode::Esc => Some(Key::Escape),
    KeyCode::Backspace => Some(Key::Backspace),
    KeyCode::Delete => Some(Key::Delete),
    KeyCode::Home => Some(Key::Home),
    KeyCode::End => Some(Key::End),
    KeyCode::PageUp => Some(Key::PageUp),
    KeyCode::PageDown => Some(Key::PageDown),
    KeyCode::Left => Some(Key::Left),
    KeyCode::Right => Some(Key::Right),
    KeyCode::Up => Some(Key::Up),
    KeyCode::Down => Some(Key::Down),
    KeyCode::F(10) => Some(Key::F10),
    _ => None,
  }
}

fn to_modifiers(modifiers: KeyModifiers) -> Modifiers {
  let mut out = Modifiers::empty();
  if modifiers.contains(KeyModifiers::CONTROL) {
    out.insert(Modifiers::CTRL);
  }
  if modifiers.contains(KeyModifiers::ALT) {
    out.insert(Modifiers::ALT);
  }
  if modifiers.contains(KeyModifiers::SHIFT) {
    out.insert(Modifiers::SHIFT);
  }
  out
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use the_ai::{
    AiError,
    AiGateway,
    GenerativeModel,
    ModelProvider,
    ModelSettings,
    Session,
  };

  use super::*;
  use crate::{
    config::Config,
    dispatch::Action,
  };

  struct NoModel;

  impl ModelProvider for NoModel {
    fn connect(&self, _session: &Session) -> the_ai::Result<Arc<dyn GenerativeModel>> {
      Err(AiError::Auth("offline".into()))
    }
  }

  fn ctx() -> Ctx {
    let gateway = AiGateway::new(Arc::new(NoModel), ModelSettings::default());
    Ctx::with_gateway(Config::default(), gateway).unwrap()
  }

  fn press(ctx: &mut Ctx, key: Key) {
    handle_key_event(ctx, KeyEvent::plain(key));
  }

  fn type_str(ctx: &mut Ctx, text: &str) {
    for ch in text.chars() {
      press(ctx, Key::Char(ch));
    }
  }

  #[test]
  fn typing_edits_the_document() {
    let mut ctx = ctx();
    type_str(&mut ctx, "ab");
    press(&mut ctx, Key::Enter);
    press(&mut ctx, Key::Tab);
    type_str(&mut ctx, "c");
    press(&mut ctx, Key::Backspace);
    assert_eq!(ctx.document.text().to_string(), "ab\n    ");
  }

  #[test]
  fn notices_swallow_keys_until_dismissed() {
    let mut ctx = ctx();
    ctx.notices.info("hello");
    type_str(&mut ctx, "x");
    assert!(ctx.document.is_empty());
    press(&mut ctx, Key::Enter);
    assert!(!ctx.notices.has_active());
    type_str(&mut ctx, "x");
    assert_eq!(ctx.document.text().to_string(), "x");
  }

  #[test]
  fn ask_focus_routes_typing_to_the_input() {
    let mut ctx = ctx();
    handle_key_event(&mut ctx, KeyEvent::ctrl('l'));
    assert_eq!(ctx.focus, Focus::Ask);
    type_str(&mut ctx, "why?");
    assert_eq!(ctx.ask_input.text(), "why?");
    assert!(ctx.document.is_empty());
    press(&mut ctx, Key::Escape);
    assert_eq!(ctx.focus, Focus::Editor);
  }

  #[test]
  fn failed_key_setup_keeps_dialog_open() {
    let mut ctx = ctx();
    handle_key_event(&mut ctx, KeyEvent::ctrl('k'));
    type_str(&mut ctx, "abc");
    press(&mut ctx, Key::Enter);

    assert!(matches!(ctx.dialog, Some(Dialog::ApiKey(ref input)) if input.text() == "abc"));
    assert!(
      ctx
        .notices
        .active()
        .unwrap()
        .text
        .starts_with("Failed to configure API key:")
    );
    press(&mut ctx, Key::Enter);
    press(&mut ctx, Key::Escape);
    assert!(ctx.dialog.is_none());
  }

  #[test]
  fn menu_runs_the_selected_action() {
    let mut ctx = ctx();
    press(&mut ctx, Key::F10);
    press(&mut ctx, Key::Right);
    press(&mut ctx, Key::Right);
    press(&mut ctx, Key::Enter);
    assert_eq!(ctx.focus, Focus::Ask);
    assert!(ctx.dialog.is_none());
  }

  #[test]
  fn confirm_dialog_declines_with_n() {
    let mut ctx = ctx();
    type_str(&mut ctx, "keep");
    commands::execute(&mut ctx, Action::NewFile);
    press(&mut ctx, Key::Char('n'));
    assert!(ctx.dialog.is_none());
    assert_eq!(ctx.document.text().to_string(), "keep");
  }

  #[test]
  fn paste_goes_to_the_document() {
    let mut ctx = ctx();
    handle_paste(&mut ctx, "a\r\nb");
    assert_eq!(ctx.document.text().to_string(), "a\nb");
  }
}
