use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// A rectangular region given by two corner cells.
///
/// `(r1, c1)` is the anchor where a drag started and `(r2, c2)` the cell it
/// currently reaches. The corners are not ordered; every query works on the
/// normalized region spanning both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub r1: usize,
    pub c1: usize,
    pub r2: usize,
    pub c2: usize,
}

impl Rect {
    #[must_use]
    pub const fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self { r1, c1, r2, c2 }
    }

    /// Single-cell rectangle, the shape of a freshly started drag.
    #[must_use]
    pub const fn cell(row: usize, col: usize) -> Self {
        Self::new(row, col, row, col)
    }

    pub fn top(&self) -> usize {
        self.r1.min(self.r2)
    }

    pub fn bottom(&self) -> usize {
        self.r1.max(self.r2)
    }

    pub fn left(&self) -> usize {
        self.c1.min(self.c2)
    }

    pub fn right(&self) -> usize {
        self.c1.max(self.c2)
    }

    pub fn rows(&self) -> RangeInclusive<usize> {
        self.top()..=self.bottom()
    }

    pub fn cols(&self) -> RangeInclusive<usize> {
        self.left()..=self.right()
    }

    /// Number of cells covered, `(|r1-r2|+1) * (|c1-c2|+1)`.
    pub fn area(&self) -> usize {
        (self.r1.abs_diff(self.r2) + 1) * (self.c1.abs_diff(self.c2) + 1)
    }

    /// Same region with the corners ordered top-left to bottom-right.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self::new(self.top(), self.left(), self.bottom(), self.right())
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows().contains(&row) && self.cols().contains(&col)
    }

    /// Whether the whole region lies inside a `rows x cols` grid.
    pub fn fits(&self, rows: usize, cols: usize) -> bool {
        self.bottom() < rows && self.right() < cols
    }
}
