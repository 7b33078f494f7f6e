//! Rendering - lays out the panes and draws them with ratatui.

use eyre::Result;
use ratatui::{
  Frame,
  layout::{
    Constraint,
    Layout,
    Position,
    Rect,
  },
  style::{
    Modifier,
    Style,
  },
  text::{
    Line,
    Span,
  },
  widgets::{
    Block,
    Borders,
    Clear,
    Paragraph,
  },
};
use the_lib::{
  document,
  gutter,
  highlight,
};
use unicode_width::UnicodeWidthChar;

use crate::{
  ctx::{
    Ctx,
    Focus,
  },
  dialog::{
    Dialog,
    LineInput,
    MenuState,
  },
  dispatch::{
    MENUS,
    TOOLBAR,
  },
  terminal::Terminal,
  theme,
};

/// Draw the whole UI and update the terminal title.
pub fn render(ctx: &mut Ctx, terminal: &mut Terminal) -> Result<()> {
  terminal.set_title(&ctx.title())?;
  terminal.draw(|frame| draw(frame, ctx))
}

pub fn draw(frame: &mut Frame<'_>, ctx: &mut Ctx) {
  let [menu_area, toolbar_area, main_area, status_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());
  let [editor_area, assistant_area] =
    Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(main_area);

  draw_editor(frame, ctx, editor_area);
  draw_assistant(frame, ctx, assistant_area);
  draw_toolbar(frame, toolbar_area);
  frame.render_widget(
    Paragraph::new(ctx.status_text()).style(theme::bar()),
    status_area,
  );

  let menu_state = match &ctx.dialog {
    Some(Dialog::Menu(state)) => Some(*state),
    _ => None,
  };
  draw_menu_bar(frame, menu_area, menu_state);

  match &ctx.dialog {
    Some(Dialog::Menu(state)) => draw_menu_dropdown(frame, main_area, *state),
    Some(dialog) => draw_dialog(frame, dialog),
    None => {},
  }
  draw_notice(frame, ctx);
}

fn draw_menu_bar(frame: &mut Frame<'_>, area: Rect, open: Option<MenuState>) {
  let mut spans = Vec::with_capacity(MENUS.len() + 1);
  for (idx, menu) in MENUS.iter().enumerate() {
    let style = if open.is_some_and(|state| state.menu == idx) {
      theme::bar().add_modifier(Modifier::REVERSED)
    } else {
      theme::bar()
    };
    spans.push(Span::styled(format!(" {} ", menu.title), style));
  }
  spans.push(Span::styled("  F10: menu", theme::bar()));
  frame.render_widget(
    Paragraph::new(Line::from(spans)).style(theme::bar()),
    area,
  );
}

fn draw_menu_dropdown(frame: &mut Frame<'_>, below: Rect, state: MenuState) {
  let Some(menu) = MENUS.get(state.menu) else {
    return;
  };
  let offset: usize = MENUS[..state.menu]
    .iter()
    .map(|menu| menu.title.len() + 2)
    .sum();
  let lines: Vec<Line> = menu
    .items
    .iter()
    .enumerate()
    .map(|(idx, action)| {
      let text = format!(" {:<16}{:>7} ", action.label(), action.shortcut_label());
      if idx == state.item {
        Line::styled(text, Style::new().add_modifier(Modifier::REVERSED))
      } else {
        Line::raw(text)
      }
    })
    .collect();

  let width = 27u16;
  let height = lines.len() as u16 + 2;
  let area = Rect::new(below.x + offset as u16, below.y, width, height).intersection(below);
  frame.render_widget(Clear, area);
  frame.render_widget(
    Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
    area,
  );
}

fn draw_toolbar(frame: &mut Frame<'_>, area: Rect) {
  let mut spans = Vec::new();
  for (idx, action) in TOOLBAR.iter().enumerate() {
    if idx > 0 {
      spans.push(Span::styled(" │ ", theme::gutter()));
    }
    spans.push(Span::raw(action.label()));
    spans.push(Span::styled(
      format!(" {}", action.shortcut_label()),
      theme::gutter(),
    ));
  }
  frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_editor(frame: &mut Frame<'_>, ctx: &mut Ctx, area: Rect) {
  let mut title = format!(" {} ", ctx.document.display_name());
  if ctx.document.is_modified() {
    title.push_str("[+] ");
  }
  let block = Block::default().borders(Borders::ALL).title(title);
  let block = if ctx.focus == Focus::Editor {
    block.border_style(theme::focused_border())
  } else {
    block
  };
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let text = ctx.document.text();
  let gutter_width = gutter::width(gutter::line_count(text)) + 1;
  let text_width = (inner.width as usize).saturating_sub(gutter_width);
  let rows = inner.height as usize;
  ctx.editor_size = (text_width, rows);
  ctx.ensure_cursor_visible();

  let tab_width = ctx.config.editor.tab_width();
  let text = ctx.document.text();
  let selection = ctx.document.selection();
  let spans = ctx.highlighter.spans();
  let labels = gutter::labels(text, ctx.scroll.row, rows);

  let mut lines = Vec::with_capacity(labels.len());
  for (offset, label) in labels.into_iter().enumerate() {
    let line_idx = ctx.scroll.row + offset;
    let line = document::line_content(text.line(line_idx));
    let first_char = text.line_to_char(line_idx);
    let first_byte = text.line_to_byte(line_idx);
    let painted = highlight::paint(spans, first_byte..first_byte + line.len_bytes());

    let mut out = vec![Span::styled(format!("{label} "), theme::gutter())];
    let mut run = String::new();
    let mut run_style = Style::new();
    let mut byte = 0;
    let mut used = 0;
    for (char_idx, ch) in line.chars().enumerate() {
      let kind = painted.get(byte).copied().flatten();
      byte += ch.len_utf8();
      if char_idx < ctx.scroll.col {
        continue;
      }
      let width = cell_width(ch, tab_width);
      if used + width > text_width {
        break;
      }
      used += width;

      let mut style = theme::span_style(kind);
      if selection.contains(first_char + char_idx) {
        style = style.patch(theme::selection());
      }
      if style != run_style && !run.is_empty() {
        out.push(Span::styled(std::mem::take(&mut run), run_style));
      }
      run_style = style;
      push_display(&mut run, ch, tab_width);
    }
    if !run.is_empty() {
      out.push(Span::styled(run, run_style));
    }
    lines.push(Line::from(out));
  }
  frame.render_widget(Paragraph::new(lines), inner);

  if ctx.focus == Focus::Editor && ctx.dialog.is_none() && !ctx.notices.has_active() {
    let (line, col) = ctx.document.caret_position();
    let x: usize = document::line_content(text.line(line))
      .chars()
      .skip(ctx.scroll.col)
      .take(col.saturating_sub(ctx.scroll.col))
      .map(|ch| cell_width(ch, tab_width))
      .sum();
    frame.set_cursor_position(Position::new(
      inner.x + (gutter_width + x) as u16,
      inner.y + (line - ctx.scroll.row) as u16,
    ));
  }
}

fn draw_assistant(frame: &mut Frame<'_>, ctx: &mut Ctx, area: Rect) {
  let block = Block::default().borders(Borders::ALL).title(" AI Assistant ");
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let [output_area, ask_area] =
    Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).areas(inner);

  let width = output_area.width as usize;
  let tab_width = ctx.config.editor.tab_width();
  let mut lines = Vec::new();
  for entry in ctx.output.entries() {
    if !lines.is_empty() {
      lines.push(Line::raw(""));
    }
    let style = theme::entry_style(entry.kind);
    lines.extend(
      wrap_text(&entry.text, width, tab_width)
        .into_iter()
        .map(|line| Line::styled(line, style)),
    );
  }
  let height = output_area.height as usize;
  let max_scroll = lines.len().saturating_sub(height);
  ctx.output_scroll = ctx.output_scroll.min(max_scroll);
  let skip = max_scroll - ctx.output_scroll;
  let visible: Vec<Line> = lines.into_iter().skip(skip).take(height).collect();
  frame.render_widget(Paragraph::new(visible), output_area);

  let focused = ctx.focus == Focus::Ask;
  let ask_block = Block::default()
    .borders(Borders::ALL)
    .title(" Ask AI (Ctrl+L, Enter to send) ");
  let ask_block = if focused {
    ask_block.border_style(theme::focused_border())
  } else {
    ask_block
  };
  let ask_inner = ask_block.inner(ask_area);
  frame.render_widget(ask_block, ask_area);
  let show_cursor = focused && ctx.dialog.is_none() && !ctx.notices.has_active();
  draw_line_input(frame, &ctx.ask_input, ask_inner, show_cursor);
}

/// Draw `input` on one row, scrolled so the cursor stays visible.
fn draw_line_input(frame: &mut Frame<'_>, input: &LineInput, area: Rect, show_cursor: bool) {
  let width = (area.width as usize).saturating_sub(1).max(1);
  let shown: Vec<char> = input.display().chars().collect();
  let start = input.cursor().saturating_sub(width - 1);
  let visible: String = shown.iter().skip(start).take(width).collect();
  frame.render_widget(Paragraph::new(visible), area);

  if show_cursor && area.height > 0 {
    let x: usize = shown[start..input.cursor().min(shown.len())]
      .iter()
      .map(|ch| cell_width(*ch, 1))
      .sum();
    frame.set_cursor_position(Position::new(area.x + x as u16, area.y));
  }
}

fn draw_dialog(frame: &mut Frame<'_>, dialog: &Dialog) {
  let area = centered(frame.area(), 64, 7);
  frame.render_widget(Clear, area);
  let block = Block::default()
    .borders(Borders::ALL)
    .title(format!(" {} ", dialog.title()))
    .border_style(theme::focused_border());
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let [prompt_area, input_area, _, hint_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(inner);

  frame.render_widget(Paragraph::new(dialog.prompt()), prompt_area);
  let hint = match dialog {
    Dialog::Confirm { .. } => "[Y]es / [N]o",
    _ => "Enter: OK   Esc: Cancel",
  };
  frame.render_widget(
    Paragraph::new(hint).style(theme::gutter()),
    hint_area,
  );
  if let Some(input) = dialog.input() {
    draw_line_input(frame, input, input_area, true);
  }
}

fn draw_notice(frame: &mut Frame<'_>, ctx: &Ctx) {
  let Some(notice) = ctx.notices.active() else {
    return;
  };
  let width = 60.min(frame.area().width.saturating_sub(4)).max(10);
  let lines = wrap_text(
    &notice.text,
    width.saturating_sub(2) as usize,
    ctx.config.editor.tab_width(),
  );
  let area = centered(frame.area(), width, lines.len() as u16 + 4);
  frame.render_widget(Clear, area);

  let block = Block::default()
    .borders(Borders::ALL)
    .title(format!(" {} ", notice.title))
    .border_style(theme::notice_border(notice.level));
  let mut body: Vec<Line> = lines.into_iter().map(Line::raw).collect();
  body.push(Line::raw(""));
  body.push(Line::styled("Press Enter", theme::gutter()));
  frame.render_widget(Paragraph::new(body).block(block), area);
}

/// A `width` x `height` rect centered in `area`, clipped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect::new(
    area.x + (area.width - width) / 2,
    area.y + (area.height - height) / 2,
    width,
    height,
  )
}

fn cell_width(ch: char, tab_width: usize) -> usize {
  if ch == '\t' {
    return tab_width;
  }
  ch.width().unwrap_or(1).max(1)
}

/// Append what `ch` looks like on screen: tabs become spaces, other control
/// chars a single blank.
fn push_display(out: &mut String, ch: char, tab_width: usize) {
  if ch == '\t' {
    out.extend(std::iter::repeat_n(' ', tab_width));
  } else if ch.is_control() {
    out.push(' ');
  } else {
    out.push(ch);
  }
}

/// Break `text` into display lines of at most `width` cells. Line breaks in
/// the text are kept; long lines wrap at char boundaries.
pub fn wrap_text(text: &str, width: usize, tab_width: usize) -> Vec<String> {
  let width = width.max(1);
  let mut out = Vec::new();
  for raw in text.split('\n') {
    let raw = raw.strip_suffix('\r').unwrap_or(raw);
    let mut line = String::new();
    let mut used = 0;
    for ch in raw.chars() {
      let piece_width = cell_width(ch, tab_width);
      if used + piece_width > width && !line.is_empty() {
        out.push(std::mem::take(&mut line));
        used = 0;
      }
      push_display(&mut line, ch, tab_width);
      used += piece_width;
    }
    out.push(line);
  }
  out
}
