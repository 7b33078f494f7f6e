//! Regex syntax highlighting.
//!
//! Four independent passes run over the whole buffer: keywords, strings,
//! line comments, numbers. Spans from different passes may overlap; when they
//! do, the later pass wins (see [`kind_at`] and [`paint`]).
//!
//! There is no tokenizer state, so string escapes and nesting are only as
//! correct as the patterns. Every rescan is O(buffer length), which is why
//! [`Highlighter`] only rescans when the document version changes and gives up
//! entirely above a size limit. Re-tokenizing just the edited range would be
//! the next step if large buffers ever matter.

use std::{
  ops,
  sync::LazyLock,
};

use regex::Regex;
use serde::{
  Deserialize,
  Serialize,
};

use crate::document::Document;

pub const PYTHON_KEYWORDS: &[&str] = &[
  "def", "class", "if", "elif", "else", "for", "while", "try", "except", "finally", "with",
  "import", "from", "as", "return", "yield", "lambda", "and", "or", "not", "in", "is", "True",
  "False", "None", "pass", "break", "continue", "global", "nonlocal", "async", "await",
];

pub const DEFAULT_MAX_BYTES: usize = 1024 * 1024;

static KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
  let alternation = PYTHON_KEYWORDS
    .iter()
    .map(|keyword| regex::escape(keyword))
    .collect::<Vec<_>>()
    .join("|");
  Regex::new(&format!(r"\b(?:{alternation})\b")).expect("keyword pattern is valid")
});

static STRING: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#""(?:\\.|[^"\\\r\n])*"|'(?:\\.|[^'\\\r\n])*'"#).expect("string pattern is valid")
});

static COMMENT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"#[^\r\n]*").expect("comment pattern is valid"));

static NUMBER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\b\d+\.?\d*\b").expect("number pattern is valid"));

/// What a span is colored as. Declaration order is pass order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
  Keyword,
  String,
  Comment,
  Number,
}

impl SpanKind {
  pub const ALL: [SpanKind; 4] = [
    SpanKind::Keyword,
    SpanKind::String,
    SpanKind::Comment,
    SpanKind::Number,
  ];

  fn pattern(self) -> &'static Regex {
    match self {
      Self::Keyword => &*KEYWORD,
      Self::String => &*STRING,
      Self::Comment => &*COMMENT,
      Self::Number => &*NUMBER,
    }
  }
}

/// A tagged byte range of the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HighlightSpan {
  pub kind:  SpanKind,
  pub range: ops::Range<usize>,
}

/// Scan `text` and return every span, grouped by pass in [`SpanKind::ALL`]
/// order.
pub fn highlight(text: &str) -> Vec<HighlightSpan> {
  SpanKind::ALL
    .into_iter()
    .flat_map(|kind| {
      kind.pattern().find_iter(text).map(move |found| {
        HighlightSpan {
          kind,
          range: found.range(),
        }
      })
    })
    .collect()
}

/// The kind that wins at byte `pos`: the last span covering it.
pub fn kind_at(spans: &[HighlightSpan], pos: usize) -> Option<SpanKind> {
  spans
    .iter()
    .rev()
    .find(|span| span.range.contains(&pos))
    .map(|span| span.kind)
}

/// Resolve the winning kind for every byte of `window`. Index `i` of the
/// result is byte `window.start + i`.
pub fn paint(spans: &[HighlightSpan], window: ops::Range<usize>) -> Vec<Option<SpanKind>> {
  let mut painted = vec![None; window.len()];
  for span in spans {
    let start = span.range.start.max(window.start);
    let end = span.range.end.min(window.end);
    if start >= end {
      continue;
    }
    for slot in &mut painted[start - window.start..end - window.start] {
      *slot = Some(span.kind);
    }
  }
  painted
}

/// Highlight spans for one document, rescanned only when its version moves.
#[derive(Debug, Clone)]
pub struct Highlighter {
  max_bytes: usize,
  version:   Option<u64>,
  spans:     Vec<HighlightSpan>,
}

impl Default for Highlighter {
  fn default() -> Self {
    Self::new(DEFAULT_MAX_BYTES)
  }
}

impl Highlighter {
  pub fn new(max_bytes: usize) -> Self {
    Self {
      max_bytes,
      version: None,
      spans: Vec::new(),
    }
  }

  pub fn spans(&self) -> &[HighlightSpan] {
    &self.spans
  }

  /// Rescan `doc` if it changed since the last call. Returns whether the
  /// spans were recomputed.
  pub fn refresh(&mut self, doc: &Document) -> bool {
    if self.version == Some(doc.version()) {
      return false;
    }
    self.version = Some(doc.version());

    let text = doc.text();
    if text.len_bytes() > self.max_bytes {
      log::debug!(
        "skipping highlight: {} bytes exceeds limit of {}",
        text.len_bytes(),
        self.max_bytes
      );
      self.spans.clear();
      return true;
    }

    self.spans = highlight(&text.to_string());
    true
  }
}
