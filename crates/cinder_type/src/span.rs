use std::ops::Range;

use crate::{BytePosition, file::FileId};

/// A contiguous byte region of one source file.
///
/// The middle end mostly threads spans through unchanged from lowering;
/// diagnostics anchor to them when a symbol has to be pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Span {
  pub start: BytePosition,
  pub end: BytePosition,
  pub file: FileId,
}

impl Span {
  pub fn new(
    file: FileId,
    range: Range<u32>,
  ) -> Self {
    debug_assert!(range.start <= range.end, "reversed span {}..{}", range.start, range.end);
    Self {
      start: BytePosition(range.start),
      end: BytePosition(range.end),
      file,
    }
  }

  /// Zero-width span, for nodes the compiler synthesizes itself.
  pub fn point(
    file: FileId,
    at: BytePosition,
  ) -> Self {
    Self {
      start: at,
      end: at,
      file,
    }
  }

  /// The smallest span enclosing both `self` and `other`.
  pub fn cover(
    &self,
    other: &Span,
  ) -> Span {
    debug_assert_eq!(self.file, other.file, "spans cover different files");
    Span {
      start: self.start.min(other.start),
      end: self.end.max(other.end),
      file: self.file,
    }
  }

  /// Half-open containment test: `start <= at < end`.
  pub fn contains(
    &self,
    at: BytePosition,
  ) -> bool {
    self.start <= at && at < self.end
  }

  pub fn len(&self) -> u32 {
    self.end.0 - self.start.0
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }

  /// Byte range for indexing into the owning file's text.
  pub fn range(&self) -> Range<usize> {
    self.start.0 as usize..self.end.0 as usize
  }
}

impl std::fmt::Display for Span {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    write!(f, "{}..{} in {}", self.start, self.end, self.file)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::file::SourceMap;

  #[test]
  fn cover_encloses_both_spans() {
    let file = FileId::default();
    let a = Span::new(file, 1..3);
    let b = Span::new(file, 2..5);

    assert_eq!(a.cover(&b), Span::new(file, 1..5));
    assert_eq!(b.cover(&a), a.cover(&b));
  }

  #[test]
  fn point_spans_are_empty() {
    let p = Span::point(FileId::default(), BytePosition(4));
    assert!(p.is_empty());
    assert_eq!(p.len(), 0);
    assert!(!p.contains(BytePosition(4)));
  }

  #[test]
  fn contains_is_half_open() {
    let s = Span::new(FileId::default(), 1..3);
    assert!(s.contains(BytePosition(1)));
    assert!(s.contains(BytePosition(2)));
    assert!(!s.contains(BytePosition(0)));
    assert!(!s.contains(BytePosition(3)));
  }

  #[test]
  fn range_indexes_file_text() {
    let mut sm = SourceMap::new();
    let file = sm.add_virtual("test", "abcdef".to_string());
    let s = Span::new(file, 2..4);

    assert_eq!(s.len(), 2);
    assert_eq!(&sm.get(&file).text[s.range()], "cd");
  }

  #[test]
  fn display_names_the_region_and_file() {
    let s = Span::new(FileId::default(), 1..3);
    assert_eq!(s.to_string(), "1..3 in (file id: 0)");
  }
}
