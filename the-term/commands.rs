//! File and AI command flows.
//!
//! Everything here runs on the interaction thread. AI requests are handed to
//! the runtime and finished later by [`complete`] when the shell drains the
//! completion channel.

use std::path::PathBuf;

use the_ai::AiError;
use the_lib::{
  command::{
    self,
    CommandKind,
    RequestInput,
  },
  document::DocumentError,
};

use crate::{
  ctx::{
    Ctx,
    Focus,
    PendingRequest,
  },
  dialog::{
    ConfirmAction,
    Dialog,
    LineInput,
    MenuState,
  },
  dispatch::Action,
};

const SETUP_KEY_FIRST: &str = "Please setup your API key first!";

pub fn execute(ctx: &mut Ctx, action: Action) {
  log::debug!("action: {action:?}");
  match action {
    Action::NewFile => {
      ctx.dialog = Some(Dialog::Confirm {
        title:     "New File",
        prompt:    "Clear current content?",
        on_accept: ConfirmAction::ClearDocument,
      });
    },
    Action::OpenFile => {
      ctx.dialog = Some(Dialog::OpenPath(LineInput::new(path_prefill(ctx))));
    },
    Action::SaveFile => save_file(ctx),
    Action::SaveFileAs => save_file_as(ctx),
    Action::Exit => ctx.should_quit = true,
    Action::SetupApiKey => setup_api_key(ctx),
    Action::GenerateCode => {
      if require_session(ctx) {
        ctx.dialog = Some(Dialog::Generate(LineInput::default()));
      }
    },
    Action::ExplainCode => run_code_command(ctx, CommandKind::Explain),
    Action::FixCode => run_code_command(ctx, CommandKind::Fix),
    Action::OptimizeCode => run_code_command(ctx, CommandKind::Optimize),
    Action::AskAi => ctx.focus = Focus::Ask,
    Action::ClearOutput => {
      ctx.output.clear();
      ctx.output_scroll = 0;
    },
    Action::OpenMenu => ctx.dialog = Some(Dialog::Menu(MenuState::default())),
    Action::FocusEditor => ctx.focus = Focus::Editor,
  }
  ctx.needs_render = true;
}

/// Directory of the current file, for the path prompts.
fn path_prefill(ctx: &Ctx) -> String {
  ctx
    .document
    .path()
    .and_then(|path| path.parent())
    .filter(|dir| !dir.as_os_str().is_empty())
    .map(|dir| format!("{}{}", dir.display(), std::path::MAIN_SEPARATOR))
    .unwrap_or_default()
}

fn save_file(ctx: &mut Ctx) {
  match ctx.document.save() {
    Ok(()) => {
      ctx.notices.success("File saved successfully!");
    },
    Err(DocumentError::Untitled) => save_file_as(ctx),
    Err(err) => {
      ctx.notices.error(format!("Failed to save file: {err}"));
    },
  }
}

fn save_file_as(ctx: &mut Ctx) {
  let prefill = ctx
    .document
    .path()
    .map(|path| path.display().to_string())
    .unwrap_or_else(|| path_prefill(ctx));
  ctx.dialog = Some(Dialog::SavePath(LineInput::new(prefill)));
}

fn setup_api_key(ctx: &mut Ctx) {
  let current = ctx
    .gateway
    .session()
    .map(|session| session.key().expose().to_string())
    .unwrap_or_default();
  ctx.dialog = Some(Dialog::ApiKey(LineInput::masked(current)));
}

// Dialog results.
//

pub fn confirm(ctx: &mut Ctx, action: ConfirmAction) {
  match action {
    ConfirmAction::ClearDocument => {
      ctx.document.clear();
      ctx.scroll = Default::default();
    },
  }
}

/// Handle Enter in a text dialog. Returns whether the dialog should close.
pub fn submit_dialog(ctx: &mut Ctx, dialog: &Dialog) -> bool {
  let Some(input) = dialog.input() else {
    return true;
  };
  let text = input.text().trim().to_string();

  match dialog {
    Dialog::ApiKey(_) => submit_api_key(ctx, &text),
    Dialog::Generate(_) => {
      if text.is_empty() {
        ctx.notices.warning(CommandKind::Generate.empty_input_text());
        return false;
      }
      dispatch(ctx, CommandKind::Generate, &RequestInput::query(&text));
      true
    },
    Dialog::OpenPath(_) => {
      if text.is_empty() {
        return true;
      }
      match ctx.document.open(PathBuf::from(&text)) {
        Ok(()) => {
          ctx.scroll = Default::default();
          true
        },
        Err(err) => {
          ctx.notices.error(format!("Failed to open file: {err}"));
          false
        },
      }
    },
    Dialog::SavePath(_) => {
      if text.is_empty() {
        return true;
      }
      match ctx.document.save_as(PathBuf::from(&text)) {
        Ok(()) => {
          ctx.notices.success("File saved successfully!");
          true
        },
        Err(err) => {
          ctx.notices.error(format!("Failed to save file: {err}"));
          false
        },
      }
    },
    Dialog::Confirm { .. } | Dialog::Menu(_) => true,
  }
}

fn submit_api_key(ctx: &mut Ctx, key: &str) -> bool {
  match ctx.gateway.configure(key) {
    Ok(()) => {
      ctx.notices.success("API key configured successfully!");
      true
    },
    Err(AiError::MissingKey) => {
      ctx.notices.warning("Please enter a valid API key");
      false
    },
    Err(err) => {
      ctx.notices.error(format!("Failed to configure API key: {err}"));
      false
    },
  }
}

// AI flows.
//

/// Warn and open the key dialog when no session is configured.
fn require_session(ctx: &mut Ctx) -> bool {
  if ctx.gateway.is_ready() {
    return true;
  }
  ctx.notices.warning(SETUP_KEY_FIRST);
  setup_api_key(ctx);
  false
}

/// Explain, fix or optimize the selection (or the whole buffer).
pub fn run_code_command(ctx: &mut Ctx, kind: CommandKind) {
  if !require_session(ctx) {
    return;
  }
  let code = command::code_input(ctx.document.selected_text(), &ctx.document.text().to_string());
  dispatch(ctx, kind, &RequestInput::code(&code));
}

/// Send the ask-input question, with the buffer attached as context.
pub fn ask(ctx: &mut Ctx) {
  if !require_session(ctx) {
    return;
  }
  let question = ctx.ask_input.text().trim().to_string();
  let code = ctx.document.text().to_string();
  let input = RequestInput {
    code:  code.trim(),
    query: &question,
  };
  dispatch(ctx, CommandKind::Chat, &input);
}

/// Build the request for `kind` and hand it to the runtime. Empty input shows
/// a notice instead.
pub fn dispatch(ctx: &mut Ctx, kind: CommandKind, input: &RequestInput<'_>) {
  if input.primary(kind).is_empty() {
    ctx.notices.info(kind.empty_input_text());
    return;
  }

  let model = match ctx.gateway.model() {
    Ok(model) => model,
    Err(err) => {
      ctx.output.error(command::format_error(kind, &err));
      return;
    },
  };

  let prompt = command::build_request(kind, &ctx.config.editor.language, input);
  let prompt_len = prompt.len();
  let id = match ctx.runtime.submit(model, prompt) {
    Ok(id) => id,
    Err(err) => {
      log::error!("failed to submit {kind} request: {err}");
      ctx.output.error(command::format_error(kind, &err));
      return;
    },
  };
  log::info!("request {} ({kind}) sent, {prompt_len} bytes", id.0);

  if kind == CommandKind::Chat {
    ctx.output.user(format!("You: {}", input.query));
  }
  ctx.output.status(kind.pending_text());
  ctx.output_scroll = 0;
  ctx.pending.insert(id, PendingRequest {
    kind,
    query: input.query.to_string(),
  });
}

/// Apply a finished request to the output log and (for generate) the
/// document.
pub fn complete(ctx: &mut Ctx, request: PendingRequest, result: the_ai::Result<String>) {
  let kind = request.kind;
  match result {
    Ok(response) => {
      log::info!("{kind} response received, {} bytes", response.len());
      if kind == CommandKind::Generate {
        let code = command::extract_code(&response);
        if !code.is_empty() {
          ctx.document.insert_at_caret(code);
        }
      }
      if kind == CommandKind::Chat && ctx.ask_input.text().trim() == request.query {
        ctx.ask_input.clear();
      }
      ctx
        .output
        .response(command::format_response(kind, &response, &request.query));
    },
    Err(err) => {
      log::warn!("{kind} request failed: {err}");
      ctx.output.error(command::format_error(kind, &err));
    },
  }
  ctx.output_scroll = 0;
  ctx.needs_render = true;
}

#[cfg(test)]
mod tests {
  use std::{
    collections::VecDeque,
    sync::{
      Arc,
      Mutex,
    },
    time::Duration,
  };

  use async_trait::async_trait;
  use the_ai::{
    AiGateway,
    GenerativeModel,
    ModelProvider,
    ModelSettings,
    Session,
  };
  use the_lib::{
    document::Document,
    output::EntryKind,
    selection::Range,
  };

  use super::*;
  use crate::config::Config;

  /// Replies with scripted results in order and records every prompt.
  #[derive(Clone, Default)]
  struct Script {
    replies: Arc<Mutex<VecDeque<(u64, the_ai::Result<String>)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
  }

  impl Script {
    fn reply(&self, delay_ms: u64, reply: the_ai::Result<String>) {
      self.replies.lock().unwrap().push_back((delay_ms, reply));
    }

    fn prompts(&self) -> Vec<String> {
      self.prompts.lock().unwrap().clone()
    }
  }

  struct ScriptedModel(Script);

  #[async_trait]
  impl GenerativeModel for ScriptedModel {
    fn name(&self) -> &str {
      "scripted"
    }

    async fn generate(&self, prompt: &str) -> the_ai::Result<String> {
      self.0.prompts.lock().unwrap().push(prompt.to_string());
      let next = self.0.replies.lock().unwrap().pop_front();
      let (delay, reply) = next.unwrap_or((0, Err(AiError::Service("no reply scripted".into()))));
      tokio::time::sleep(Duration::from_millis(delay)).await;
      reply
    }
  }

  impl ModelProvider for Script {
    fn connect(&self, _session: &Session) -> the_ai::Result<Arc<dyn GenerativeModel>> {
      Ok(Arc::new(ScriptedModel(self.clone())))
    }
  }

  fn ctx_with(script: &Script, configured: bool) -> Ctx {
    let gateway = AiGateway::new(Arc::new(script.clone()), ModelSettings::default());
    let mut ctx = Ctx::with_gateway(Config::default(), gateway).unwrap();
    if configured {
      ctx.gateway.configure("test-key").unwrap();
    }
    ctx
  }

  fn wait_all(ctx: &mut Ctx) {
    while !ctx.pending.is_empty() {
      assert!(ctx.wait_ai_event(Duration::from_secs(5)), "request timed out");
    }
  }

  fn texts(ctx: &Ctx, kind: EntryKind) -> Vec<String> {
    ctx
      .output
      .entries()
      .iter()
      .filter(|entry| entry.kind == kind)
      .map(|entry| entry.text.clone())
      .collect()
  }

  #[test]
  fn code_commands_need_a_session() {
    let script = Script::default();
    let mut ctx = ctx_with(&script, false);
    ctx.document = Document::from_text("x = 1");

    execute(&mut ctx, Action::ExplainCode);

    assert_eq!(ctx.notices.active().unwrap().text, SETUP_KEY_FIRST);
    assert!(matches!(ctx.dialog, Some(Dialog::ApiKey(_))));
    assert!(ctx.pending.is_empty());
    assert!(ctx.output.is_empty());
  }

  #[test]
  fn generate_and_chat_need_a_session() {
    let script = Script::default();
    let mut ctx = ctx_with(&script, false);

    execute(&mut ctx, Action::GenerateCode);
    assert_eq!(ctx.notices.dismiss().unwrap().text, SETUP_KEY_FIRST);
    assert!(matches!(ctx.dialog, Some(Dialog::ApiKey(_))));

    ctx.dialog = None;
    ctx.ask_input = LineInput::new("what is this?");
    ask(&mut ctx);
    assert_eq!(ctx.notices.dismiss().unwrap().text, SETUP_KEY_FIRST);
    assert!(matches!(ctx.dialog, Some(Dialog::ApiKey(_))));
    assert_eq!(ctx.ask_input.text(), "what is this?");

    assert!(ctx.pending.is_empty());
    assert!(ctx.output.is_empty());
    assert!(script.prompts().is_empty());
  }

  #[test]
  fn empty_buffer_shows_notice_without_request() {
    let script = Script::default();
    let mut ctx = ctx_with(&script, true);

    for (action, text) in [
      (Action::ExplainCode, "No code to explain"),
      (Action::FixCode, "No code to fix"),
      (Action::OptimizeCode, "No code to optimize"),
    ] {
      execute(&mut ctx, action);
      assert_eq!(ctx.notices.dismiss().unwrap().text, text);
    }
    assert!(ctx.pending.is_empty());
    assert!(ctx.output.is_empty());
    assert!(script.prompts().is_empty());
  }

  #[test]
  fn explain_sends_whole_buffer() {
    let script = Script::default();
    script.reply(0, Ok("It adds two numbers.".into()));
    let mut ctx = ctx_with(&script, true);
    let code = "def add(a, b):\n    return a + b";
    ctx.document = Document::from_text(&format!("\n{code}\n\n"));

    execute(&mut ctx, Action::ExplainCode);
    assert_eq!(texts(&ctx, EntryKind::Status), vec!["Analyzing code..."]);
    wait_all(&mut ctx);

    let prompts = script.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(&format!("\n\n{code}\n\n")));
    assert_eq!(texts(&ctx, EntryKind::Response), vec![
      "Code Explanation:\n\nIt adds two numbers."
    ]);
  }

  #[test]
  fn fix_uses_selection_when_present() {
    let script = Script::default();
    script.reply(0, Ok("fixed".into()));
    let mut ctx = ctx_with(&script, true);
    ctx.document = Document::from_text("aaa\nbbb\nccc");
    ctx.document.set_selection(Range::new(4, 7));

    execute(&mut ctx, Action::FixCode);
    wait_all(&mut ctx);

    let prompt = &script.prompts()[0];
    assert!(prompt.contains("\n\nbbb\n\n"));
    assert!(!prompt.contains("aaa"));
    assert_eq!(
      ctx.output.last().unwrap().text,
      "Code Analysis and Fixes:\n\nfixed"
    );
  }

  #[test]
  fn generate_inserts_fenced_code_at_caret() {
    let script = Script::default();
    script.reply(0, Ok("Sure:\n```python\nprint(1)\n```\n".into()));
    let mut ctx = ctx_with(&script, true);
    ctx.document = Document::from_text("ab");
    ctx.document.set_selection(Range::point(1));

    execute(&mut ctx, Action::GenerateCode);
    let dialog = ctx.dialog.take().unwrap();
    assert!(matches!(dialog, Dialog::Generate(_)));
    let dialog = Dialog::Generate(LineInput::new("print one"));
    assert!(submit_dialog(&mut ctx, &dialog));
    wait_all(&mut ctx);

    assert_eq!(ctx.document.text().to_string(), "aprint(1)b");
    assert_eq!(
      ctx.output.last().unwrap().text,
      "Code generated successfully!\n\nPrompt: print one"
    );
  }

  #[test]
  fn empty_fenced_block_leaves_document_untouched() {
    let script = Script::default();
    script.reply(0, Ok("```\n```".into()));
    let mut ctx = ctx_with(&script, true);
    ctx.document = Document::from_text("x = 1");
    let version = ctx.document.version();

    dispatch(&mut ctx, CommandKind::Generate, &RequestInput::query("nothing"));
    wait_all(&mut ctx);

    assert_eq!(ctx.document.text().to_string(), "x = 1");
    assert_eq!(ctx.document.version(), version);
    assert!(!ctx.document.is_modified());
    assert_eq!(ctx.output.count(EntryKind::Response), 1);
  }

  #[test]
  fn generate_requires_a_description() {
    let script = Script::default();
    let mut ctx = ctx_with(&script, true);
    let dialog = Dialog::Generate(LineInput::new("   "));
    assert!(!submit_dialog(&mut ctx, &dialog));
    assert_eq!(
      ctx.notices.active().unwrap().text,
      "Please enter a description"
    );
    assert!(ctx.pending.is_empty());
  }

  #[test]
  fn failure_appends_one_error_and_keeps_document() {
    let script = Script::default();
    script.reply(0, Err(AiError::Network("connection refused".into())));
    let mut ctx = ctx_with(&script, true);
    ctx.document = Document::from_text("x = 1");
    let version = ctx.document.version();

    dispatch(&mut ctx, CommandKind::Generate, &RequestInput::query("anything"));
    wait_all(&mut ctx);

    assert_eq!(texts(&ctx, EntryKind::Error), vec![
      "Error generating code: network error: connection refused"
    ]);
    assert_eq!(ctx.output.count(EntryKind::Response), 0);
    assert_eq!(ctx.document.text().to_string(), "x = 1");
    assert_eq!(ctx.document.version(), version);
  }

  #[test]
  fn concurrent_generates_each_land_once() {
    let script = Script::default();
    script.reply(150, Ok("```\nfirst\n```".into()));
    script.reply(0, Ok("```\nsecond\n```".into()));
    let mut ctx = ctx_with(&script, true);

    dispatch(&mut ctx, CommandKind::Generate, &RequestInput::query("one"));
    dispatch(&mut ctx, CommandKind::Generate, &RequestInput::query("two"));
    assert_eq!(ctx.pending.len(), 2);
    wait_all(&mut ctx);

    let text = ctx.document.text().to_string();
    assert_eq!(text.matches("first").count(), 1);
    assert_eq!(text.matches("second").count(), 1);
    assert_eq!(ctx.output.count(EntryKind::Response), 2);
    assert_eq!(ctx.output.count(EntryKind::Status), 2);
  }

  #[test]
  fn chat_echoes_question_and_clears_input() {
    let script = Script::default();
    script.reply(0, Ok("It prints one.".into()));
    let mut ctx = ctx_with(&script, true);
    ctx.document = Document::from_text("print(1)\n");
    ctx.ask_input = LineInput::new("what does this do?");

    ask(&mut ctx);
    assert_eq!(texts(&ctx, EntryKind::User), vec!["You: what does this do?"]);
    assert_eq!(texts(&ctx, EntryKind::Status), vec!["AI: Thinking..."]);
    wait_all(&mut ctx);

    assert!(script.prompts()[0].contains("Current code in editor:\nprint(1)\n"));
    assert_eq!(ctx.output.last().unwrap().text, "AI: It prints one.");
    assert!(ctx.ask_input.is_empty());
  }

  #[test]
  fn chat_with_empty_question_is_ignored() {
    let script = Script::default();
    let mut ctx = ctx_with(&script, true);
    ask(&mut ctx);
    assert_eq!(ctx.notices.active().unwrap().text, "Please enter a question");
    assert!(ctx.output.is_empty());
  }

  #[test]
  fn api_key_dialog_outcomes() {
    let script = Script::default();
    let mut ctx = ctx_with(&script, false);

    assert!(!submit_dialog(&mut ctx, &Dialog::ApiKey(LineInput::masked("  "))));
    assert_eq!(
      ctx.notices.dismiss().unwrap().text,
      "Please enter a valid API key"
    );
    assert!(!ctx.gateway.is_ready());

    assert!(submit_dialog(&mut ctx, &Dialog::ApiKey(LineInput::masked("key"))));
    assert_eq!(
      ctx.notices.dismiss().unwrap().text,
      "API key configured successfully!"
    );
    assert!(ctx.gateway.is_ready());
    assert!(ctx.status_text().starts_with("Ready | API key configured"));
  }

  #[test]
  fn save_without_path_opens_save_as_and_writes_file() {
    let script = Script::default();
    let mut ctx = ctx_with(&script, false);
    ctx.document = Document::from_text("x = 1\n");

    execute(&mut ctx, Action::SaveFile);
    assert!(matches!(ctx.dialog, Some(Dialog::SavePath(_))));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.py");
    let dialog = Dialog::SavePath(LineInput::new(path.display().to_string()));
    assert!(submit_dialog(&mut ctx, &dialog));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "x = 1\n");
    assert_eq!(ctx.title(), "AI Code Editor - out.py");
  }

  #[test]
  fn open_failure_keeps_buffer() {
    let script = Script::default();
    let mut ctx = ctx_with(&script, false);
    ctx.document = Document::from_text("keep me");

    let dialog = Dialog::OpenPath(LineInput::new("/definitely/not/here.py"));
    assert!(!submit_dialog(&mut ctx, &dialog));
    assert!(
      ctx
        .notices
        .active()
        .unwrap()
        .text
        .starts_with("Failed to open file:")
    );
    assert_eq!(ctx.document.text().to_string(), "keep me");
  }

  #[test]
  fn new_file_clears_after_confirmation() {
    let script = Script::default();
    let mut ctx = ctx_with(&script, false);
    ctx.document = Document::from_text("old");

    execute(&mut ctx, Action::NewFile);
    let Some(Dialog::Confirm { on_accept, .. }) = ctx.dialog.take() else {
      panic!("expected a confirmation dialog");
    };
    confirm(&mut ctx, on_accept);
    assert!(ctx.document.is_empty());
    assert_eq!(ctx.title(), "AI Code Editor - Untitled");
  }
}
