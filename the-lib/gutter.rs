//! Line-number column.

use ropey::Rope;

/// Smallest width of the number column, in cells.
pub const MIN_WIDTH: usize = 3;

/// Number of lines the buffer displays. A trailing line break opens one more
/// (empty) line, and an empty buffer still shows line 1.
pub fn line_count(text: &Rope) -> usize {
  text.len_lines().max(1)
}

/// Width needed to print the largest line number, never below [`MIN_WIDTH`].
pub fn width(line_count: usize) -> usize {
  let mut digits = 1;
  let mut rest = line_count / 10;
  while rest > 0 {
    digits += 1;
    rest /= 10;
  }
  digits.max(MIN_WIDTH)
}

/// Right-aligned one-based labels for the lines `first..first + rows`,
/// clipped to the document.
pub fn labels(text: &Rope, first: usize, rows: usize) -> Vec<String> {
  let count = line_count(text);
  let width = width(count);
  (first..count.min(first.saturating_add(rows)))
    .map(|line| format!("{:>width$}", line + 1))
    .collect()
}
