pub mod batch;
pub mod error;
pub mod identity;
pub mod model;
pub mod source;

pub use batch::BatchUpdate;
pub use error::RosterError;
pub use identity::{MemberId, Position};
pub use model::{Group, ModelEvent, SelectionModel, WillSelect};
pub use source::{Cell, ListDataSource, SelectionDelegate};
