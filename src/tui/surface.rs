//! Terminal stand-in for a native sectioned list widget.
//!
//! The surface owns only view state: cursor, scroll, which rows it is drawing
//! as selected, and short-lived insert highlights. Everything else is read
//! from a [`ListDataSource`] and every selection goes through a
//! [`SelectionDelegate`].

use std::collections::{BTreeSet, HashMap};

use crate::roster::{
    BatchUpdate, ListDataSource, ModelEvent, Position, RosterError, SelectionDelegate, WillSelect,
};

/// Ticks an inserted row stays highlighted after a batch update.
pub const INSERT_FLASH_TICKS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Selected(Position),
    Deselected(Position),
    Denied,
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct ListSurface {
    cursor: Option<Position>,
    highlighted: BTreeSet<Position>,
    flash: HashMap<Position, u8>,
    /// First visible line, counting section headers.
    pub scroll_offset: usize,
}

impl ListSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Option<Position> {
        self.cursor
    }

    pub fn is_highlighted(&self, position: Position) -> bool {
        self.highlighted.contains(&position)
    }

    pub fn highlighted(&self) -> Vec<Position> {
        self.highlighted.iter().copied().collect()
    }

    pub fn is_flashing(&self, position: Position) -> bool {
        self.flash.contains_key(&position)
    }

    /// All item positions in display order.
    pub fn rows<S: ListDataSource>(source: &S) -> Result<Vec<Position>, RosterError> {
        let mut rows = Vec::new();
        for section in 0..source.section_count() {
            let count = source.count(section)?;
            rows.extend((0..count).map(|row| Position::new(section, row)));
        }
        Ok(rows)
    }

    /// Line index of `position` in the flattened view, where every section
    /// contributes one header line followed by its rows.
    pub fn line_of<S: ListDataSource>(source: &S, position: Position) -> Result<usize, RosterError> {
        let mut line = 0;
        for section in 0..position.section {
            line += 1 + source.count(section)?;
        }
        Ok(line + 1 + position.row)
    }

    pub fn total_lines<S: ListDataSource>(source: &S) -> Result<usize, RosterError> {
        let mut lines = 0;
        for section in 0..source.section_count() {
            lines += 1 + source.count(section)?;
        }
        Ok(lines)
    }

    /// Put the cursor on the first row if it has none, or pull it back inside
    /// the current layout.
    pub fn clamp_cursor<S: ListDataSource>(&mut self, source: &S) -> Result<(), RosterError> {
        let rows = Self::rows(source)?;
        self.cursor = match self.cursor {
            _ if rows.is_empty() => None,
            None => rows.first().copied(),
            Some(cursor) if rows.binary_search(&cursor).is_ok() => Some(cursor),
            Some(cursor) => rows
                .iter()
                .rev()
                .find(|p| **p <= cursor)
                .or_else(|| rows.first())
                .copied(),
        };
        Ok(())
    }

    /// Move the cursor by `delta` rows, stopping at either end.
    pub fn move_by<S: ListDataSource>(&mut self, source: &S, delta: isize) -> Result<(), RosterError> {
        let rows = Self::rows(source)?;
        if rows.is_empty() {
            self.cursor = None;
            return Ok(());
        }
        let current = self
            .cursor
            .and_then(|c| rows.binary_search(&c).ok())
            .unwrap_or(0);
        let target = current.saturating_add_signed(delta).min(rows.len() - 1);
        self.cursor = Some(rows[target]);
        Ok(())
    }

    pub fn move_to_top<S: ListDataSource>(&mut self, source: &S) -> Result<(), RosterError> {
        self.cursor = Self::rows(source)?.first().copied();
        Ok(())
    }

    pub fn move_to_bottom<S: ListDataSource>(&mut self, source: &S) -> Result<(), RosterError> {
        self.cursor = Self::rows(source)?.last().copied();
        Ok(())
    }

    /// Jump to the first row of the next non-empty section, wrapping.
    pub fn next_section<S: ListDataSource>(&mut self, source: &S) -> Result<(), RosterError> {
        let sections = source.section_count();
        let start = self.cursor.map_or(0, |c| c.section + 1);
        for offset in 0..sections {
            let section = (start + offset) % sections;
            if source.count(section)? > 0 {
                self.cursor = Some(Position::new(section, 0));
                return Ok(());
            }
        }
        Ok(())
    }

    /// Keep the cursor line inside a viewport of `height` lines.
    pub fn scroll_to_cursor<S: ListDataSource>(&mut self, source: &S, height: usize) -> Result<(), RosterError> {
        let total = Self::total_lines(source)?;
        let max_offset = total.saturating_sub(height);
        if let Some(cursor) = self.cursor {
            let line = Self::line_of(source, cursor)?;
            // keep the section header in view when on the first row
            let top = if cursor.row == 0 { line - 1 } else { line };
            if top < self.scroll_offset {
                self.scroll_offset = top;
            } else if height > 0 && line >= self.scroll_offset + height {
                self.scroll_offset = line + 1 - height;
            }
        }
        self.scroll_offset = self.scroll_offset.min(max_offset);
        Ok(())
    }

    /// User activated the row under the cursor.
    ///
    /// Mirrors a native list: tapping a selected row deselects it, tapping any
    /// other row asks the delegate first and only then commits.
    pub fn tap<M>(&mut self, model: &mut M) -> Result<TapOutcome, RosterError>
    where
        M: ListDataSource + SelectionDelegate,
    {
        let Some(position) = self.cursor else {
            return Ok(TapOutcome::Empty);
        };
        if self.highlighted.remove(&position) {
            model.on_did_deselect(position)?;
            return Ok(TapOutcome::Deselected(position));
        }
        match model.on_will_select(position)? {
            WillSelect::Confirm(target) => {
                self.highlighted.insert(target);
                model.on_did_select(target)?;
                Ok(TapOutcome::Selected(target))
            }
            WillSelect::Deny => Ok(TapOutcome::Denied),
        }
    }

    /// Re-render the positions the model flagged, syncing row highlights to
    /// the model's checked state.
    pub fn apply_events<S: ListDataSource>(&mut self, events: &[ModelEvent], source: &S) -> Result<(), RosterError> {
        for event in events {
            match event {
                ModelEvent::RenderChanged(position) => {
                    if source.render(*position)?.checked {
                        self.highlighted.insert(*position);
                    } else {
                        self.highlighted.remove(position);
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply a batch update: deletes against the old layout, then inserts
    /// against the layout left by the deletes.
    ///
    /// Inserted rows come in unhighlighted; the model's follow-up events
    /// restore the ones that are still selected.
    pub fn apply_batch<S: ListDataSource>(&mut self, batch: &BatchUpdate, source: &S) -> Result<(), RosterError> {
        let mut rows: Vec<Position> = std::mem::take(&mut self.highlighted).into_iter().collect();

        rows.retain(|p| batch.delete_positions.binary_search(p).is_err());
        for p in &mut rows {
            let removed_above = batch
                .delete_positions
                .iter()
                .filter(|d| d.section == p.section && d.row < p.row)
                .count();
            p.row -= removed_above;
        }

        for insert in &batch.insert_positions {
            for p in &mut rows {
                if p.section == insert.section && p.row >= insert.row {
                    p.row += 1;
                }
            }
        }

        self.highlighted = rows.into_iter().collect();
        self.flash = batch
            .insert_positions
            .iter()
            .map(|p| (*p, INSERT_FLASH_TICKS))
            .collect();
        self.clamp_cursor(source)
    }

    /// Advance insert highlights by one frame.
    pub fn tick(&mut self) {
        self.flash.retain(|_, ticks| {
            *ticks = ticks.saturating_sub(1);
            *ticks > 0
        });
    }
}
