use crate::logic::rect::Rect;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Sum a selected region must reach to be popped.
pub const POP_TARGET: u32 = 10;

/// Upper bound on redeals when looking for a grid with at least one move.
/// Tiny grids (1x1 for instance) can never reach the target.
const MAX_DEAL_ATTEMPTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell ({row}, {col}) holds {value}, expected 0..=9")]
    ValueOutOfRange { row: usize, col: usize, value: u8 },
}

/// The shared playing field.
///
/// Cells hold 1..=9 when dealt and 0 once popped. The shape never changes
/// after construction; a redeal replaces the whole grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<u8>>,
}

#[derive(Deserialize)]
struct RawGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<u8>>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        let grid = Self::from_rows(raw.cells)?;
        if grid.rows != raw.rows {
            return Err(GridError::Ragged {
                row: grid.rows,
                expected: raw.rows,
                found: grid.rows,
            });
        }
        if grid.rows > 0 && grid.cols != raw.cols {
            return Err(GridError::Ragged {
                row: 0,
                expected: raw.cols,
                found: grid.cols,
            });
        }
        Ok(grid)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl Grid {
    /// The 0x0 placeholder a room holds before its first game.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            rows: 0,
            cols: 0,
            cells: Vec::new(),
        }
    }

    /// Fills every cell independently and uniformly from 1..=9.
    pub fn generate<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let cells = (0..rows)
            .map(|_| (0..cols).map(|_| rng.gen_range(1..=9)).collect())
            .collect();
        Self { rows, cols, cells }
    }

    /// Deals grids until one has a poppable area, giving up after a bounded
    /// number of attempts and returning the last deal.
    pub fn generate_playable<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let mut grid = Self::generate(rows, cols, rng);
        for attempt in 1..MAX_DEAL_ATTEMPTS {
            if grid.has_poppable_area() {
                if attempt > 1 {
                    log::debug!("dealt a playable {rows}x{cols} grid after {attempt} attempts");
                }
                return grid;
            }
            grid = Self::generate(rows, cols, rng);
        }
        if !grid.has_poppable_area() {
            log::warn!("no playable {rows}x{cols} grid after {MAX_DEAL_ATTEMPTS} deals");
        }
        grid
    }

    /// Builds a grid from explicit rows.
    ///
    /// # Errors
    /// Fails when rows differ in length or a value exceeds 9.
    pub fn from_rows(cells: Vec<Vec<u8>>) -> Result<Self, GridError> {
        let rows = cells.len();
        let cols = cells.first().map_or(0, Vec::len);
        for (r, row) in cells.iter().enumerate() {
            if row.len() != cols {
                return Err(GridError::Ragged {
                    row: r,
                    expected: cols,
                    found: row.len(),
                });
            }
            if let Some((c, &value)) = row.iter().enumerate().find(|&(_, &v)| v > 9) {
                return Err(GridError::ValueOutOfRange { row: r, col: c, value });
            }
        }
        Ok(Self { rows, cols, cells })
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> &[Vec<u8>] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    pub fn fits(&self, rect: &Rect) -> bool {
        rect.fits(self.rows, self.cols)
    }

    pub fn is_cleared(&self) -> bool {
        self.cells.iter().flatten().all(|&v| v == 0)
    }

    /// Sums the cells of the normalized rectangle.
    ///
    /// # Panics
    /// Panics if the rectangle reaches outside the grid. Callers validate
    /// client coordinates with [`Grid::contains`] before getting here.
    pub fn sum_over(&self, rect: &Rect) -> u32 {
        self.assert_fits(rect);
        rect.rows()
            .map(|r| {
                self.cells[r][rect.cols()]
                    .iter()
                    .map(|&v| u32::from(v))
                    .sum::<u32>()
            })
            .sum()
    }

    /// Zeroes every cell of the normalized rectangle.
    ///
    /// # Panics
    /// Panics if the rectangle reaches outside the grid.
    pub fn clear(&mut self, rect: &Rect) {
        self.assert_fits(rect);
        for r in rect.rows() {
            self.cells[r][rect.cols()].fill(0);
        }
    }

    /// Clears the rectangle if it sums to exactly [`POP_TARGET`], returning
    /// the number of cells it covered. Anything else leaves the grid as is.
    ///
    /// # Panics
    /// Panics if the rectangle reaches outside the grid.
    pub fn try_pop(&mut self, rect: &Rect) -> Option<usize> {
        if self.sum_over(rect) != POP_TARGET {
            return None;
        }
        self.clear(rect);
        Some(rect.area())
    }

    /// Whether any axis-aligned rectangle sums to exactly [`POP_TARGET`].
    ///
    /// Uses a prefix-sum table so each candidate costs O(1). Cells are
    /// non-negative, so widening a rectangle never lowers its sum and the scan
    /// stops extending once it overshoots.
    pub fn has_poppable_area(&self) -> bool {
        let (rows, cols) = (self.rows, self.cols);
        let width = cols + 1;
        // prefix[r * width + c] = sum of cells above and left of (r, c)
        let mut prefix = vec![0u32; (rows + 1) * width];
        for r in 0..rows {
            let mut row_sum = 0u32;
            for c in 0..cols {
                row_sum += u32::from(self.cells[r][c]);
                prefix[(r + 1) * width + c + 1] = prefix[r * width + c + 1] + row_sum;
            }
        }

        let area_sum = |top: usize, left: usize, bottom: usize, right: usize| {
            prefix[(bottom + 1) * width + right + 1] + prefix[top * width + left]
                - prefix[top * width + right + 1]
                - prefix[(bottom + 1) * width + left]
        };

        for top in 0..rows {
            for bottom in top..rows {
                for left in 0..cols {
                    for right in left..cols {
                        let sum = area_sum(top, left, bottom, right);
                        if sum == POP_TARGET {
                            return true;
                        }
                        if sum > POP_TARGET {
                            break;
                        }
                    }
                }
            }
        }
        false
    }

    fn assert_fits(&self, rect: &Rect) {
        assert!(
            self.fits(rect),
            "rectangle {rect:?} outside {}x{} grid",
            self.rows,
            self.cols
        );
    }
}
