use std::collections::{HashMap, HashSet};

use super::batch::BatchUpdate;
use super::error::RosterError;
use super::identity::{MemberId, Position};
use super::source::{Cell, ListDataSource, SelectionDelegate};

/// A named partition of members, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub members: Vec<String>,
}

impl Group {
    pub fn new(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }
}

/// Answer to a pending selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WillSelect {
    Confirm(Position),
    Deny,
}

/// Signals queued for the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    /// The checked state at this position may have changed; re-render it.
    RenderChanged(Position),
}

/// Selection-tracking list model.
///
/// Pairs an ordered list of groups (sections) with a selection set keyed by
/// [`MemberId`]. Selection survives section reorders because it is never
/// stored by position; every lookup re-derives positions from the current
/// section order.
#[derive(Debug, Clone)]
pub struct SelectionModel {
    groups: HashMap<String, Vec<String>>,
    /// Declaration order of all groups, including ones not currently shown.
    group_names: Vec<String>,
    sections: Vec<String>,
    multi_select: HashSet<String>,
    selected: HashSet<MemberId>,
    events: Vec<ModelEvent>,
}

impl SelectionModel {
    pub fn new<I, S>(groups: Vec<Group>, sections: Vec<String>, multi_select: I) -> Result<Self, RosterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut by_name = HashMap::with_capacity(groups.len());
        let mut group_names = Vec::with_capacity(groups.len());
        for group in groups {
            let mut seen = HashSet::with_capacity(group.members.len());
            for member in &group.members {
                if !seen.insert(member.as_str()) {
                    return Err(RosterError::DuplicateMember {
                        group: group.name.clone(),
                        member: member.clone(),
                    });
                }
            }
            if by_name.contains_key(&group.name) {
                return Err(RosterError::DuplicateGroup(group.name));
            }
            group_names.push(group.name.clone());
            by_name.insert(group.name, group.members);
        }

        let mut seen = HashSet::with_capacity(sections.len());
        for name in &sections {
            if !by_name.contains_key(name) {
                return Err(RosterError::UnknownGroup(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(RosterError::DuplicateGroup(name.clone()));
            }
        }

        let mut multi = HashSet::new();
        for name in multi_select {
            let name = name.into();
            if !by_name.contains_key(&name) {
                return Err(RosterError::UnknownGroup(name));
            }
            multi.insert(name);
        }

        Ok(Self {
            groups: by_name,
            group_names,
            sections,
            multi_select: multi,
            selected: HashSet::new(),
            events: Vec::new(),
        })
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn section_name(&self, section: usize) -> Result<&str, RosterError> {
        self.sections
            .get(section)
            .map(String::as_str)
            .ok_or(RosterError::SectionOutOfRange {
                section,
                count: self.sections.len(),
            })
    }

    pub fn allows_multiple(&self, group: &str) -> bool {
        self.multi_select.contains(group)
    }

    fn members_at(&self, section: usize) -> Result<(&str, &[String]), RosterError> {
        let name = self.section_name(section)?;
        let members = self
            .groups
            .get(name)
            .ok_or_else(|| RosterError::UnknownGroup(name.to_string()))?;
        Ok((name, members.as_slice()))
    }

    pub fn member_count(&self, section: usize) -> Result<usize, RosterError> {
        self.members_at(section).map(|(_, members)| members.len())
    }

    pub fn member_identity(&self, position: Position) -> Result<MemberId, RosterError> {
        let (group, members) = self.members_at(position.section)?;
        let member = members
            .get(position.row)
            .ok_or(RosterError::IndexOutOfRange {
                position,
                count: members.len(),
            })?;
        Ok(MemberId::new(group, member.as_str()))
    }

    /// Where `id` sits under the current section order. `None` when its group
    /// is not shown or the member does not exist.
    pub fn position_of(&self, id: &MemberId) -> Option<Position> {
        let section = self.sections.iter().position(|g| *g == id.group)?;
        let row = self.groups.get(&id.group)?.iter().position(|m| *m == id.member)?;
        Some(Position::new(section, row))
    }

    pub fn is_selected(&self, id: &MemberId) -> bool {
        self.selected.contains(id)
    }

    /// Selected identities, sorted.
    pub fn selected(&self) -> Vec<MemberId> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Positions of every selected identity whose group is currently shown.
    pub fn selected_positions(&self) -> Vec<Position> {
        let mut positions: Vec<_> = self
            .selected
            .iter()
            .filter_map(|id| self.position_of(id))
            .collect();
        positions.sort_unstable();
        positions
    }

    /// Take queued surface events in the order they were raised.
    pub fn drain_events(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.events)
    }

    fn signal(&mut self, id: &MemberId) {
        if let Some(position) = self.position_of(id) {
            self.events.push(ModelEvent::RenderChanged(position));
        }
    }

    /// Drop every selected member of `id`'s group other than `id` itself.
    /// Returns how many were cleared.
    fn clear_group_except(&mut self, id: &MemberId) -> usize {
        let mut others: Vec<MemberId> = self
            .selected
            .iter()
            .filter(|s| s.group == id.group && *s != id)
            .cloned()
            .collect();
        others.sort();
        for other in &others {
            self.selected.remove(other);
            tracing::debug!(key = %other, "auto-deselected (exclusive group)");
            self.signal(other);
        }
        others.len()
    }

    /// Runs before a selection at `position` is committed.
    ///
    /// In exclusive groups every other selected member is cleared first, so
    /// there is never a moment with two checked members in such a group.
    pub fn will_select(&mut self, position: Position) -> Result<WillSelect, RosterError> {
        let id = self.member_identity(position)?;
        if !self.allows_multiple(&id.group) {
            self.clear_group_except(&id);
        }
        Ok(WillSelect::Confirm(position))
    }

    pub fn did_select(&mut self, position: Position) -> Result<(), RosterError> {
        let id = self.member_identity(position)?;
        tracing::debug!(key = %id, %position, "selected");
        self.selected.insert(id);
        self.events.push(ModelEvent::RenderChanged(position));
        Ok(())
    }

    pub fn did_deselect(&mut self, position: Position) -> Result<(), RosterError> {
        let id = self.member_identity(position)?;
        tracing::debug!(key = %id, %position, "deselected");
        self.selected.remove(&id);
        self.events.push(ModelEvent::RenderChanged(position));
        Ok(())
    }

    /// Select by identity rather than position, honouring the group's policy.
    /// Works for groups that are not currently shown.
    pub fn select_identity(&mut self, id: &MemberId) -> Result<(), RosterError> {
        let members = self
            .groups
            .get(&id.group)
            .ok_or_else(|| RosterError::UnknownGroup(id.group.clone()))?;
        if !members.contains(&id.member) {
            return Err(RosterError::MalformedKey(id.to_string()));
        }
        if !self.allows_multiple(&id.group) {
            self.clear_group_except(id);
        }
        if self.selected.insert(id.clone()) {
            self.signal(id);
        }
        Ok(())
    }

    fn validate_order(&self, new_order: &[String]) -> Result<(), RosterError> {
        let mut seen = HashSet::with_capacity(new_order.len());
        for name in new_order {
            if !self.groups.contains_key(name) {
                return Err(RosterError::InvalidReorder(format!("unknown group {:?}", name)));
            }
            if !seen.insert(name.as_str()) {
                return Err(RosterError::InvalidReorder(format!("group {:?} listed twice", name)));
            }
        }
        // Only groups currently shown can be removed; hidden selections stay hidden.
        let mut selected_groups: Vec<&str> = self
            .selected
            .iter()
            .map(|id| id.group.as_str())
            .filter(|g| self.sections.iter().any(|s| s.as_str() == *g))
            .collect();
        selected_groups.sort_unstable();
        selected_groups.dedup();
        if let Some(missing) = selected_groups.into_iter().find(|g| !seen.contains(g)) {
            return Err(RosterError::InvalidReorder(format!(
                "group {:?} holds selected members but would be removed",
                missing
            )));
        }
        Ok(())
    }

    /// Replace the section order and reconcile render state.
    ///
    /// Rows of every group whose section index changes are deleted at their
    /// old positions and inserted at their new ones. After the order is
    /// swapped, every selected identity is resolved again and a
    /// `RenderChanged` is queued for its new position. On error nothing is
    /// modified.
    pub fn reorder_sections(&mut self, new_order: Vec<String>) -> Result<BatchUpdate, RosterError> {
        self.validate_order(&new_order)?;

        let mut batch = BatchUpdate::default();
        for name in &self.group_names {
            let old = self.sections.iter().position(|g| g == name);
            let new = new_order.iter().position(|g| g == name);
            if old == new {
                continue;
            }
            let rows = self.groups.get(name).map_or(0, Vec::len);
            if let Some(section) = old {
                batch
                    .delete_positions
                    .extend((0..rows).map(|row| Position::new(section, row)));
            }
            if let Some(section) = new {
                batch
                    .insert_positions
                    .extend((0..rows).map(|row| Position::new(section, row)));
            }
        }
        batch.normalize();

        tracing::info!(
            from = ?self.sections,
            to = ?new_order,
            deleted = batch.delete_positions.len(),
            inserted = batch.insert_positions.len(),
            "reordering sections"
        );
        self.sections = new_order;

        for id in self.selected() {
            self.signal(&id);
        }
        Ok(batch)
    }
}

impl ListDataSource for SelectionModel {
    fn section_count(&self) -> usize {
        SelectionModel::section_count(self)
    }

    fn section_title(&self, section: usize) -> Result<&str, RosterError> {
        self.section_name(section)
    }

    fn count(&self, section: usize) -> Result<usize, RosterError> {
        self.member_count(section)
    }

    fn render(&self, position: Position) -> Result<Cell, RosterError> {
        let id = self.member_identity(position)?;
        let checked = self.is_selected(&id);
        Ok(Cell {
            label: id.member,
            checked,
        })
    }
}

impl SelectionDelegate for SelectionModel {
    fn on_will_select(&mut self, position: Position) -> Result<WillSelect, RosterError> {
        self.will_select(position)
    }

    fn on_did_select(&mut self, position: Position) -> Result<(), RosterError> {
        self.did_select(position)
    }

    fn on_did_deselect(&mut self, position: Position) -> Result<(), RosterError> {
        self.did_deselect(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{} {}", prefix, i)).collect()
    }

    fn pilots_and_crew() -> SelectionModel {
        SelectionModel::new(
            vec![
                Group::new("Pilots", names("P", 2)),
                Group::new("Crew", names("C", 5)),
            ],
            vec!["Pilots".to_string(), "Crew".to_string()],
            Vec::<String>::new(),
        )
        .unwrap()
    }

    fn select(model: &mut SelectionModel, section: usize, row: usize) {
        let pos = Position::new(section, row);
        match model.will_select(pos).unwrap() {
            WillSelect::Confirm(p) => model.did_select(p).unwrap(),
            WillSelect::Deny => panic!("selection denied at {}", pos),
        }
    }

    #[test]
    fn test_counts_and_identity() {
        let model = pilots_and_crew();
        assert_eq!(model.section_count(), 2);
        assert_eq!(model.member_count(0).unwrap(), 2);
        assert_eq!(model.member_count(1).unwrap(), 5);
        assert_eq!(
            model.member_identity(Position::new(1, 4)).unwrap(),
            MemberId::new("Crew", "C 5")
        );
    }

    #[test]
    fn test_out_of_range_lookups_fail() {
        let model = pilots_and_crew();
        assert_eq!(
            model.member_count(2),
            Err(RosterError::SectionOutOfRange { section: 2, count: 2 })
        );
        assert_eq!(
            model.member_identity(Position::new(0, 2)),
            Err(RosterError::IndexOutOfRange {
                position: Position::new(0, 2),
                count: 2
            })
        );
    }

    #[test]
    fn test_construction_rejects_bad_input() {
        let dup_member = SelectionModel::new(
            vec![Group::new("Pilots", vec!["A".into(), "A".into()])],
            vec!["Pilots".into()],
            Vec::<String>::new(),
        );
        assert!(matches!(dup_member, Err(RosterError::DuplicateMember { .. })));

        let unknown_section = SelectionModel::new(
            vec![Group::new("Pilots", vec!["A".into()])],
            vec!["Crew".into()],
            Vec::<String>::new(),
        );
        assert_eq!(unknown_section.unwrap_err(), RosterError::UnknownGroup("Crew".into()));

        let unknown_multi = SelectionModel::new(
            vec![Group::new("Pilots", vec!["A".into()])],
            vec!["Pilots".into()],
            ["Passengers"],
        );
        assert_eq!(unknown_multi.unwrap_err(), RosterError::UnknownGroup("Passengers".into()));
    }

    #[test]
    fn test_same_name_in_two_groups_is_two_identities() {
        let mut model = SelectionModel::new(
            vec![
                Group::new("A", vec!["Sam".into()]),
                Group::new("B", vec!["Sam".into()]),
            ],
            vec!["A".into(), "B".into()],
            Vec::<String>::new(),
        )
        .unwrap();
        select(&mut model, 0, 0);
        assert!(model.is_selected(&MemberId::new("A", "Sam")));
        assert!(!model.is_selected(&MemberId::new("B", "Sam")));
    }

    #[test]
    fn test_exclusive_group_replaces_selection() {
        let mut model = pilots_and_crew();
        select(&mut model, 0, 0);
        assert_eq!(model.selected(), vec![MemberId::new("Pilots", "P 1")]);
        model.drain_events();

        select(&mut model, 0, 1);
        assert_eq!(model.selected(), vec![MemberId::new("Pilots", "P 2")]);
        // P1 cleared before P2 committed
        assert_eq!(
            model.drain_events(),
            vec![
                ModelEvent::RenderChanged(Position::new(0, 0)),
                ModelEvent::RenderChanged(Position::new(0, 1)),
            ]
        );
    }

    #[test]
    fn test_will_select_clears_before_commit() {
        let mut model = pilots_and_crew();
        select(&mut model, 1, 0);
        model.will_select(Position::new(1, 3)).unwrap();
        assert_eq!(model.selected_count(), 0, "nothing selected between will and did");
    }

    #[test]
    fn test_exclusive_groups_are_independent() {
        let mut model = pilots_and_crew();
        select(&mut model, 0, 1);
        select(&mut model, 1, 2);
        assert_eq!(
            model.selected(),
            vec![MemberId::new("Crew", "C 3"), MemberId::new("Pilots", "P 2")]
        );
    }

    #[test]
    fn test_multi_select_group_keeps_all() {
        let mut model = SelectionModel::new(
            vec![Group::new("Passengers", names("Passenger", 10))],
            vec!["Passengers".into()],
            ["Passengers"],
        )
        .unwrap();
        for row in [0, 3, 7] {
            select(&mut model, 0, row);
        }
        assert_eq!(model.selected_count(), 3);
        assert_eq!(
            model.selected_positions(),
            vec![Position::new(0, 0), Position::new(0, 3), Position::new(0, 7)]
        );
    }

    #[test]
    fn test_select_then_deselect_round_trip() {
        let mut model = pilots_and_crew();
        select(&mut model, 1, 1);
        let before = model.selected();
        select(&mut model, 0, 0);
        model.did_deselect(Position::new(0, 0)).unwrap();
        assert_eq!(model.selected(), before);
    }

    #[test]
    fn test_reorder_keeps_selection_checked() {
        let mut model = pilots_and_crew();
        select(&mut model, 0, 1);
        model.drain_events();

        model
            .reorder_sections(vec!["Crew".into(), "Pilots".into()])
            .unwrap();

        assert!(model.render(Position::new(1, 1)).unwrap().checked);
        assert!(!model.render(Position::new(0, 1)).unwrap().checked);
        assert_eq!(
            model.drain_events(),
            vec![ModelEvent::RenderChanged(Position::new(1, 1))]
        );
    }

    #[test]
    fn test_reorder_batch_positions() {
        let mut model = pilots_and_crew();
        let batch = model
            .reorder_sections(vec!["Crew".into(), "Pilots".into()])
            .unwrap();

        let mut deletes = vec![Position::new(0, 0), Position::new(0, 1)];
        deletes.extend((0..5).map(|r| Position::new(1, r)));
        let mut inserts: Vec<_> = (0..5).map(|r| Position::new(0, r)).collect();
        inserts.extend([Position::new(1, 0), Position::new(1, 1)]);

        assert_eq!(batch.delete_positions, deletes);
        assert_eq!(batch.insert_positions, inserts);
    }

    #[test]
    fn test_reorder_to_same_order_is_empty_batch() {
        let mut model = pilots_and_crew();
        let batch = model
            .reorder_sections(vec!["Pilots".into(), "Crew".into()])
            .unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_reorder_rejects_bad_orders_without_side_effects() {
        let mut model = pilots_and_crew();
        select(&mut model, 0, 0);
        model.drain_events();

        for bad in [
            vec!["Crew".to_string()],
            vec!["Crew".into(), "Crew".into(), "Pilots".into()],
            vec!["Crew".into(), "Pilots".into(), "Cargo".into()],
        ] {
            let err = model.reorder_sections(bad.clone()).unwrap_err();
            assert!(matches!(err, RosterError::InvalidReorder(_)), "{:?} gave {:?}", bad, err);
        }
        assert_eq!(model.sections(), ["Pilots".to_string(), "Crew".to_string()]);
        assert_eq!(model.selected(), vec![MemberId::new("Pilots", "P 1")]);
        assert!(model.drain_events().is_empty());
    }

    #[test]
    fn test_hidden_group_without_selection_may_be_dropped() {
        let mut model = pilots_and_crew();
        select(&mut model, 1, 0);
        let batch = model.reorder_sections(vec!["Crew".into()]).unwrap();
        assert_eq!(batch.delete_positions.len(), 7);
        assert_eq!(batch.insert_positions.len(), 5);
        assert_eq!(model.selected_positions(), vec![Position::new(0, 0)]);
        assert_eq!(model.position_of(&MemberId::new("Pilots", "P 1")), None);
    }

    #[test]
    fn test_reorder_with_selection_in_hidden_group() {
        let mut model = SelectionModel::new(
            vec![
                Group::new("Pilots", names("P", 2)),
                Group::new("Crew", names("C", 5)),
                Group::new("Passengers", names("Passenger", 5)),
            ],
            vec!["Pilots".into(), "Crew".into()],
            ["Passengers"],
        )
        .unwrap();
        let hidden = MemberId::new("Passengers", "Passenger 3");
        model.select_identity(&hidden).unwrap();
        assert_eq!(model.position_of(&hidden), None);

        model
            .reorder_sections(vec!["Crew".into(), "Pilots".into()])
            .unwrap();
        assert!(model.is_selected(&hidden), "hidden selection survives the reorder");
        assert!(model.selected_positions().is_empty());

        let batch = model
            .reorder_sections(vec!["Passengers".into(), "Crew".into(), "Pilots".into()])
            .unwrap();
        assert_eq!(batch.insert_positions.first(), Some(&Position::new(0, 0)));
        assert_eq!(model.selected_positions(), vec![Position::new(0, 2)]);
    }

    #[test]
    fn test_select_identity_applies_policy() {
        let mut model = pilots_and_crew();
        model.select_identity(&MemberId::new("Crew", "C 1")).unwrap();
        model.select_identity(&MemberId::new("Crew", "C 4")).unwrap();
        assert_eq!(model.selected(), vec![MemberId::new("Crew", "C 4")]);
        assert!(model.select_identity(&MemberId::new("Crew", "Nobody")).is_err());
    }
}
