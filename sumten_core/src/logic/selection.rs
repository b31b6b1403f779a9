use crate::logic::rect::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no selection in progress")]
    NotSelecting,
}

/// A player's drag over the grid.
///
/// `Selecting` keeps the anchor fixed in `(r1, c1)` while `(r2, c2)` follows
/// the pointer. Popping reads the current rectangle but does not end the drag,
/// so several pops can be attempted before release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Selecting(Rect),
}

impl Selection {
    /// Starts a new drag at `(row, col)`. A drag already in progress is
    /// replaced.
    pub fn begin(&mut self, row: usize, col: usize) -> Rect {
        let rect = Rect::cell(row, col);
        *self = Self::Selecting(rect);
        rect
    }

    /// Moves the free corner of the current drag.
    ///
    /// # Errors
    /// Returns [`SelectionError::NotSelecting`] when no drag is active.
    pub fn update(&mut self, row: usize, col: usize) -> Result<Rect, SelectionError> {
        match self {
            Self::Selecting(rect) => {
                rect.r2 = row;
                rect.c2 = col;
                Ok(*rect)
            }
            Self::Idle => Err(SelectionError::NotSelecting),
        }
    }

    pub fn end(&mut self) {
        *self = Self::Idle;
    }

    pub const fn rect(&self) -> Option<&Rect> {
        match self {
            Self::Selecting(rect) => Some(rect),
            Self::Idle => None,
        }
    }

    pub const fn is_selecting(&self) -> bool {
        matches!(self, Self::Selecting(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_keeps_anchor() {
        let mut sel = Selection::default();
        assert_eq!(sel.begin(2, 3), Rect::cell(2, 3));
        assert_eq!(sel.update(4, 1), Ok(Rect::new(2, 3, 4, 1)));
        assert_eq!(sel.update(0, 0), Ok(Rect::new(2, 3, 0, 0)));
        assert_eq!(sel.rect(), Some(&Rect::new(2, 3, 0, 0)));
    }

    #[test]
    fn update_while_idle_is_rejected() {
        let mut sel = Selection::Idle;
        assert_eq!(sel.update(1, 1), Err(SelectionError::NotSelecting));
        assert_eq!(sel, Selection::Idle);
    }

    #[test]
    fn end_returns_to_idle() {
        let mut sel = Selection::Idle;
        sel.begin(0, 0);
        assert!(sel.is_selecting());
        sel.end();
        assert!(!sel.is_selecting());
        assert_eq!(sel.rect(), None);
        // Ending twice is harmless.
        sel.end();
        assert_eq!(sel, Selection::Idle);
    }

    #[test]
    fn begin_replaces_previous_drag() {
        let mut sel = Selection::Idle;
        sel.begin(0, 0);
        sel.update(5, 5).unwrap();
        sel.begin(7, 7);
        assert_eq!(sel.rect(), Some(&Rect::cell(7, 7)));
    }
}
