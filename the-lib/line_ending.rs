//! Line breaks as ropey sees them.
//!
//! Ropey splits lines on CRLF, LF, VT, FF, CR, NEL, U+2028 and U+2029, so
//! anything that strips a line's terminator has to know all of them.

use ropey::RopeSlice;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum LineEnding {
  /// CarriageReturn followed by LineFeed.
  Crlf,
  /// U+000A -- LineFeed
  LF,
  /// U+000B -- VerticalTab
  VT,
  /// U+000C -- FormFeed
  FF,
  /// U+000D -- CarriageReturn
  CR,
  /// U+0085 -- NextLine
  Nel,
  /// U+2028 -- Line Separator
  LS,
  /// U+2029 -- ParagraphSeparator
  PS,
}

impl LineEnding {
  #[inline]
  pub const fn len_chars(&self) -> usize {
    match self {
      Self::Crlf => 2,
      _ => 1,
    }
  }

  #[inline]
  pub const fn from_char(ch: char) -> Option<LineEnding> {
    match ch {
      '\u{000A}' => Some(LineEnding::LF),
      '\u{000B}' => Some(LineEnding::VT),
      '\u{000C}' => Some(LineEnding::FF),
      '\u{000D}' => Some(LineEnding::CR),
      '\u{0085}' => Some(LineEnding::Nel),
      '\u{2028}' => Some(LineEnding::LS),
      '\u{2029}' => Some(LineEnding::PS),
      _ => None,
    }
  }
}

/// Returns the passed line's line ending, if any.
pub fn get_line_ending(line: &RopeSlice) -> Option<LineEnding> {
  let len = line.len_chars();
  let last = line.get_char(len.checked_sub(1)?)?;
  if last == '\n' && len >= 2 && line.get_char(len - 2) == Some('\r') {
    return Some(LineEnding::Crlf);
  }
  LineEnding::from_char(last)
}

/// `line` without its trailing line break.
pub fn line_content(line: RopeSlice<'_>) -> RopeSlice<'_> {
  let end = line.len_chars()
    - get_line_ending(&line)
      .map(|le| le.len_chars())
      .unwrap_or(0);
  line.slice(..end)
}
