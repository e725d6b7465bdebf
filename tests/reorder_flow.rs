// Key-driven flow through the TUI state: select, delayed reorder, reconcile.

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use roster_select::config::Config;
    use roster_select::roster::{MemberId, Position};
    use roster_select::tui::state::AppState;
    use roster_select::tui::{handle_command, handle_key, Flow, TuiCommand};
    use std::time::Duration;

    fn press(state: &mut AppState, code: KeyCode) -> Flow {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn demo() -> AppState {
        let config = Config::default();
        AppState::new(config.build_model().unwrap(), config.reorder.clone()).unwrap()
    }

    #[test]
    fn test_selecting_first_pilot_schedules_reorder() {
        let mut state = demo();
        let flow = press(&mut state, KeyCode::Char(' '));
        assert_eq!(
            flow,
            Flow::Schedule {
                order: vec!["Crew".into(), "Pilots".into(), "Passengers".into()],
                delay: Duration::from_secs(5),
            }
        );
    }

    #[test]
    fn test_delayed_reorder_keeps_selected_pilot() {
        let mut state = demo();
        press(&mut state, KeyCode::Char(' '));
        press(&mut state, KeyCode::Char('j'));
        assert_eq!(press(&mut state, KeyCode::Enter), Flow::Continue);
        assert_eq!(state.model.selected(), vec![MemberId::new("Pilots", "Pilot 2")]);

        handle_command(
            &mut state,
            TuiCommand::Reorder(vec!["Crew".into(), "Pilots".into(), "Passengers".into()]),
        )
        .unwrap();

        assert_eq!(state.model.sections(), ["Crew", "Pilots", "Passengers"]);
        assert_eq!(state.surface.highlighted(), vec![Position::new(1, 1)]);
        assert!(state.reorder_due.is_none());
    }

    #[test]
    fn test_passengers_toggle_independently() {
        let mut state = demo();
        press(&mut state, KeyCode::Tab);
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.surface.cursor(), Some(Position::new(2, 0)));
        for _ in 0..3 {
            press(&mut state, KeyCode::Char(' '));
            press(&mut state, KeyCode::Down);
        }
        assert_eq!(state.model.selected_count(), 3);

        press(&mut state, KeyCode::Up);
        press(&mut state, KeyCode::Char(' '));
        assert_eq!(state.model.selected_count(), 2);
        assert!(!state.surface.is_highlighted(Position::new(2, 2)));
    }

    #[test]
    fn test_reorder_and_shuffle_keys_keep_highlights_in_sync() {
        let mut state = demo();
        press(&mut state, KeyCode::Char('G'));
        press(&mut state, KeyCode::Char(' '));
        press(&mut state, KeyCode::Char('g'));
        press(&mut state, KeyCode::Tab);
        press(&mut state, KeyCode::Char(' '));

        press(&mut state, KeyCode::Char('r'));
        assert_eq!(state.surface.highlighted(), state.model.selected_positions());
        press(&mut state, KeyCode::Char('s'));
        assert_eq!(state.surface.highlighted(), state.model.selected_positions());
        assert_eq!(state.model.selected_count(), 2);
    }

    #[test]
    fn test_quit_keys() {
        let mut state = demo();
        assert_eq!(press(&mut state, KeyCode::Char('q')), Flow::Quit);
        assert_eq!(press(&mut state, KeyCode::Esc), Flow::Quit);
    }
}
