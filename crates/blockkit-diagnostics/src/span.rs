/*
 * span.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Byte ranges into template source text.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A half-open byte range `[start, end)` into a template source string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// A zero-width span at `offset`.
    pub fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Shift this span by `offset` bytes (for spans computed relative to a substring).
    pub fn offset_by(self, offset: usize) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }

    /// Smallest span covering both `self` and `other`.
    pub fn join(self, other: SourceSpan) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Compute 0-based (row, column) of the span start within `source`.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let prefix = &source[..self.start.min(source.len())];
        let row = prefix.matches('\n').count();
        let col = prefix
            .rfind('\n')
            .map_or(prefix.chars().count(), |nl| prefix[nl + 1..].chars().count());
        (row, col)
    }
}

impl From<Range<usize>> for SourceSpan {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<SourceSpan> for Range<usize> {
    fn from(span: SourceSpan) -> Self {
        span.start..span.end
    }
}
