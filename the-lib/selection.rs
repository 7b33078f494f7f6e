//! Caret and selection state.
//!
//! A [`Range`] is a pair of char offsets into the document. The `head` is
//! where the caret sits (between two chars); the `anchor` is where the
//! selection started. An empty range is a bare caret.

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Range {
  pub anchor: usize,
  pub head:   usize,
}

impl Range {
  pub fn new(anchor: usize, head: usize) -> Self {
    Self { anchor, head }
  }

  #[inline]
  pub fn point(head: usize) -> Self {
    Self::new(head, head)
  }

  /// Start of the range
  #[inline]
  #[must_use]
  pub fn from(&self) -> usize {
    std::cmp::min(self.anchor, self.head)
  }

  /// End of the range
  #[inline]
  #[must_use]
  pub fn to(&self) -> usize {
    std::cmp::max(self.anchor, self.head)
  }

  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.to() - self.from()
  }

  /// When the head and anchor are in the same position, we have no range.
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.anchor == self.head
  }

  #[inline]
  pub fn contains(&self, pos: usize) -> bool {
    self.from() <= pos && pos < self.to()
  }

  /// Move the head to `head`. With `extend` the anchor stays put, otherwise
  /// the range collapses to a caret.
  #[must_use]
  pub fn put_head(self, head: usize, extend: bool) -> Self {
    if extend {
      Self::new(self.anchor, head)
    } else {
      Self::point(head)
    }
  }

  /// Clamp both ends to `max` (the document length in chars).
  #[must_use]
  pub fn clamp(self, max: usize) -> Self {
    Self::new(self.anchor.min(max), self.head.min(max))
  }
}
