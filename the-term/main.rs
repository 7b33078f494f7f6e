//! Terminal AI code editor.
//!
//! A single-buffer editor with a side pane that talks to a Gemini model:
//! - generate code from a description and insert it at the caret
//! - explain, fix or optimize the selection (or the whole buffer)
//! - free-form questions with the buffer attached as context

mod commands;
mod config;
mod ctx;
mod dialog;
mod dispatch;
mod health;
mod input;
mod logging;
mod render;
mod terminal;
mod theme;

use std::{
  path::PathBuf,
  process::ExitCode,
  time::Duration,
};

use clap::Parser;
use crossterm::event::{
  self,
  Event,
};
use eyre::Result;

use crate::{
  config::Config,
  ctx::Ctx,
};

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Parser)]
#[command(name = "the-ai-editor", version)]
#[command(about = "Terminal code editor with Gemini-powered generate, explain, fix and optimize")]
struct Cli {
  /// Path to file to open
  file: Option<PathBuf>,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  if let Err(issue) = health::check_terminal() {
    eprintln!("the-ai-editor: {}", issue.message());
    return ExitCode::FAILURE;
  }

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      log::error!("fatal: {err:?}");
      eprintln!("the-ai-editor: {err:?}");
      ExitCode::FAILURE
    },
  }
}

fn run(cli: Cli) -> Result<()> {
  the_loader::initialize_log_file(None);
  let log_file = the_loader::log_file();
  if let Err(err) = logging::setup_logging(&log_file, Config::default().log.level_filter()) {
    eprintln!("Warning: logging disabled: {err:?}");
  }
  log::info!("starting the-ai-editor {}", env!("CARGO_PKG_VERSION"));

  let (config, config_error) = match Config::load_default() {
    Ok(config) => (config, None),
    Err(err) => (Config::default(), Some(err)),
  };
  logging::set_level(config.log.level_filter());

  let mut ctx = Ctx::new(config, cli.file.as_deref())?;
  if let Some(err) = config_error {
    log::warn!("using default config: {err}");
    ctx
      .notices
      .warning(format!("Failed to load config, using defaults: {err}"));
  }

  let mut terminal = terminal::Terminal::new()?;
  terminal.enter_raw_mode()?;

  let result = event_loop(&mut ctx, &mut terminal);

  ctx.shutdown();
  terminal.leave_raw_mode()?;
  log::info!("exiting");
  result
}

fn event_loop(ctx: &mut Ctx, terminal: &mut terminal::Terminal) -> Result<()> {
  render::render(ctx, terminal)?;

  loop {
    if ctx.should_quit {
      break;
    }

    if event::poll(TICK)? {
      match event::read()? {
        Event::Key(key) => input::handle_key(ctx, key),
        Event::Paste(text) => input::handle_paste(ctx, &text),
        Event::Resize(width, height) => {
          terminal.resize(width, height)?;
          ctx.resize(width, height);
        },
        _ => {},
      }
    }

    if ctx.poll_ai_events() {
      ctx.needs_render = true;
    }
    if ctx.refresh_highlight() {
      ctx.needs_render = true;
    }

    if ctx.needs_render {
      render::render(ctx, terminal)?;
      ctx.needs_render = false;
    }
  }

  Ok(())
}
