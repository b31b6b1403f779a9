pub mod grid;
pub mod rect;
pub mod selection;
