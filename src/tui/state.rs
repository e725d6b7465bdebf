use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use std::time::Instant;

use super::surface::{ListSurface, TapOutcome};
use crate::config::ReorderConfig;
use crate::roster::{BatchUpdate, ListDataSource, RosterError, SelectionModel};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub message: String,
}

#[derive(Debug)]
pub struct AppState {
    pub model: SelectionModel,
    pub surface: ListSurface,
    pub logs: VecDeque<LogEntry>,
    pub reorder: Option<ReorderConfig>,
    /// Set while a delayed reorder is in flight.
    pub reorder_due: Option<Instant>,
    pub reorders_applied: usize,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(model: SelectionModel, reorder: Option<ReorderConfig>) -> Result<Self> {
        let mut surface = ListSurface::new();
        surface.clamp_cursor(&model)?;
        let selected = model.selected_positions();
        let mut state = Self {
            model,
            surface,
            logs: VecDeque::with_capacity(MAX_LOGS),
            reorder,
            reorder_due: None,
            reorders_applied: 0,
            start_time: Instant::now(),
        };
        // preselected members start highlighted
        let events: Vec<_> = selected
            .into_iter()
            .map(crate::roster::ModelEvent::RenderChanged)
            .collect();
        state.surface.apply_events(&events, &state.model)?;
        Ok(state)
    }

    pub fn push_log(&mut self, level: &str, message: String) {
        let time = chrono::Local::now().format("%H:%M:%S%.3f").to_string();
        if self.logs.len() >= MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            time,
            level: level.to_string(),
            message,
        });
    }

    pub fn uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        format!("{}h {:02}m", h, m)
    }

    /// Toggle the row under the cursor and push the resulting render events
    /// back into the surface.
    pub fn toggle_at_cursor(&mut self) -> Result<TapOutcome> {
        let outcome = self.surface.tap(&mut self.model)?;
        let events = self.model.drain_events();
        self.surface.apply_events(&events, &self.model)?;

        match outcome {
            TapOutcome::Selected(position) => {
                let id = self.model.member_identity(position)?;
                tracing::info!(key = %id, %position, "select");
                self.push_log("SELECT", id.to_string());
            }
            TapOutcome::Deselected(position) => {
                let id = self.model.member_identity(position)?;
                tracing::info!(key = %id, %position, "deselect");
                self.push_log("DESELECT", id.to_string());
            }
            TapOutcome::Denied => self.push_log("INFO", "selection refused".to_string()),
            TapOutcome::Empty => {}
        }
        Ok(outcome)
    }

    /// Whether a selection outcome should schedule the configured reorder.
    pub fn wants_reorder(&self, outcome: TapOutcome) -> Option<&ReorderConfig> {
        let TapOutcome::Selected(position) = outcome else {
            return None;
        };
        self.reorder
            .as_ref()
            .filter(|r| r.trigger() == position && self.reorder_due.is_none())
    }

    /// Reorder sections and reconcile the surface in one step: batch first,
    /// then the model's render events for every selected member.
    pub fn apply_reorder(&mut self, order: Vec<String>) -> Result<BatchUpdate> {
        let batch = self.model.reorder_sections(order)?;
        self.surface.apply_batch(&batch, &self.model)?;
        let events = self.model.drain_events();
        self.surface.apply_events(&events, &self.model)?;
        self.reorders_applied += 1;
        tracing::info!(
            order = ?self.model.sections(),
            batch_rows = batch.len(),
            "sections reordered"
        );
        self.push_log(
            "REORDER",
            format!(
                "{} ({} rows moved, {} selected kept)",
                self.model.sections().join(" / "),
                batch.insert_positions.len(),
                self.model.selected_positions().len()
            ),
        );
        Ok(batch)
    }

    /// Random section order through the same reorder path.
    pub fn shuffle_sections<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<BatchUpdate> {
        let mut order = self.model.sections().to_vec();
        order.shuffle(rng);
        self.apply_reorder(order)
    }

    pub fn move_cursor(&mut self, delta: isize) -> Result<()> {
        self.surface.move_by(&self.model, delta)?;
        Ok(())
    }

    pub fn section_summary(&self) -> Result<Vec<(String, usize, usize, bool)>, RosterError> {
        let selected = self.model.selected();
        (0..self.model.section_count())
            .map(|section| {
                let name = self.model.section_title(section)?.to_string();
                let count = self.model.count(section)?;
                let picked = selected.iter().filter(|id| id.group == name).count();
                let multi = self.model.allows_multiple(&name);
                Ok((name, count, picked, multi))
            })
            .collect()
    }
}
