pub mod logic;

pub use logic::grid::{Grid, GridError, POP_TARGET};
pub use logic::rect::Rect;
pub use logic::selection::{Selection, SelectionError};
