//! Contract between a list-rendering surface and the model behind it.

use super::error::RosterError;
use super::identity::Position;
use super::model::WillSelect;

/// What a surface needs to draw one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub label: String,
    pub checked: bool,
}

/// Read side: the surface asks for counts and row contents by position.
pub trait ListDataSource {
    fn section_count(&self) -> usize;
    fn section_title(&self, section: usize) -> Result<&str, RosterError>;
    fn count(&self, section: usize) -> Result<usize, RosterError>;
    fn render(&self, position: Position) -> Result<Cell, RosterError>;
}

/// Write side: selection callbacks, handled synchronously before the surface
/// continues.
pub trait SelectionDelegate {
    fn on_will_select(&mut self, position: Position) -> Result<WillSelect, RosterError>;
    fn on_did_select(&mut self, position: Position) -> Result<(), RosterError>;
    fn on_did_deselect(&mut self, position: Position) -> Result<(), RosterError>;
}
