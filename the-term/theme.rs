//! Hardcoded colors using terminal palette entries.

use ratatui::style::{
  Color,
  Modifier,
  Style,
};
use the_lib::{
  highlight::SpanKind,
  messages::NoticeLevel,
  output::EntryKind,
};

/// Map a highlight span kind to a terminal color.
pub fn span_color(kind: SpanKind) -> Color {
  match kind {
    SpanKind::Keyword => Color::Blue,
    SpanKind::String => Color::Green,
    SpanKind::Comment => Color::DarkGray,
    SpanKind::Number => Color::Magenta,
  }
}

pub fn span_style(kind: Option<SpanKind>) -> Style {
  let Some(kind) = kind else {
    return Style::new();
  };
  let style = Style::new().fg(span_color(kind));
  match kind {
    SpanKind::Keyword => style.add_modifier(Modifier::BOLD),
    SpanKind::Comment => style.add_modifier(Modifier::ITALIC),
    SpanKind::String | SpanKind::Number => style,
  }
}

pub fn entry_style(kind: EntryKind) -> Style {
  match kind {
    EntryKind::Status => Style::new().fg(Color::Yellow),
    EntryKind::User => Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    EntryKind::Response => Style::new(),
    EntryKind::Error => Style::new().fg(Color::Red),
  }
}

pub fn gutter() -> Style {
  Style::new().fg(Color::DarkGray)
}

pub fn selection() -> Style {
  Style::new().bg(Color::Indexed(238))
}

pub fn bar() -> Style {
  Style::new().fg(Color::Black).bg(Color::Gray)
}

pub fn focused_border() -> Style {
  Style::new().fg(Color::Cyan)
}

pub fn notice_border(level: NoticeLevel) -> Style {
  match level {
    NoticeLevel::Info => Style::new().fg(Color::Cyan),
    NoticeLevel::Warning => Style::new().fg(Color::Yellow),
    NoticeLevel::Error => Style::new().fg(Color::Red),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_span_kind_has_a_distinct_color() {
    let colors: Vec<_> = SpanKind::ALL.iter().map(|kind| span_color(*kind)).collect();
    for (i, color) in colors.iter().enumerate() {
      assert!(!colors[i + 1..].contains(color));
    }
  }
}
