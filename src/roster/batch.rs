use super::identity::Position;

/// Row-level changes a list surface must animate after a model mutation.
///
/// Deletes are expressed against the layout before the mutation. Inserts are
/// expressed against the layout after all deletes. Surfaces must apply them in
/// that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchUpdate {
    pub delete_positions: Vec<Position>,
    pub insert_positions: Vec<Position>,
}

impl BatchUpdate {
    pub fn is_empty(&self) -> bool {
        self.delete_positions.is_empty() && self.insert_positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.delete_positions.len() + self.insert_positions.len()
    }

    /// Sort both lists so surfaces can walk them in index order.
    pub(crate) fn normalize(&mut self) {
        self.delete_positions.sort_unstable();
        self.delete_positions.dedup();
        self.insert_positions.sort_unstable();
        self.insert_positions.dedup();
    }
}
