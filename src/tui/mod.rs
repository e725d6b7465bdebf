pub mod render;
pub mod state;
pub mod surface;

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures_util::StreamExt;
use ratatui::prelude::*;
use state::AppState;
use std::io::stdout;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Frame tick for insert highlights and the reorder countdown.
const TICK: Duration = Duration::from_millis(250);

/// Commands delivered to the event loop from spawned tasks.
#[derive(Debug, Clone)]
pub enum TuiCommand {
    Reorder(Vec<String>),
}

/// What the loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
    /// Send `order` back to the loop once `delay` has passed.
    Schedule { order: Vec<String>, delay: Duration },
}

/// Run the TUI until the user quits. Invariant violations end the loop with
/// an error after the terminal is restored.
pub async fn run_tui(state: &mut AppState) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = tui_loop(&mut terminal, state).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<TuiCommand>(16);
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        let height = terminal.size()?.height;
        state
            .surface
            .scroll_to_cursor(&state.model, render::list_viewport(height))?;
        let mut drawn = Ok(());
        terminal.draw(|f| drawn = render::draw(f, state))?;
        drawn?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    match handle_key(state, key)? {
                        Flow::Continue => {}
                        Flow::Quit => return Ok(()),
                        Flow::Schedule { order, delay } => {
                            state.reorder_due = Some(Instant::now() + delay);
                            schedule_reorder(cmd_tx.clone(), order, delay);
                        }
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
            Some(cmd) = cmd_rx.recv() => handle_command(state, cmd)?,
            _ = tick.tick() => state.surface.tick(),
        }
    }
}

/// Fire-and-forget delayed reorder. Never cancelled; dropped with the runtime
/// if the app exits first.
fn schedule_reorder(tx: mpsc::Sender<TuiCommand>, order: Vec<String>, delay: Duration) {
    tracing::debug!(?order, ?delay, "reorder scheduled");
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(TuiCommand::Reorder(order)).await;
    });
}

pub fn handle_command(state: &mut AppState, cmd: TuiCommand) -> Result<()> {
    match cmd {
        TuiCommand::Reorder(order) => {
            state.reorder_due = None;
            state.apply_reorder(order)?;
        }
    }
    Ok(())
}

pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Result<Flow> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(Flow::Quit),
        KeyCode::Char('j') | KeyCode::Down => state.move_cursor(1)?,
        KeyCode::Char('k') | KeyCode::Up => state.move_cursor(-1)?,
        KeyCode::PageDown => state.move_cursor(10)?,
        KeyCode::PageUp => state.move_cursor(-10)?,
        KeyCode::Char('g') | KeyCode::Home => state.surface.move_to_top(&state.model)?,
        KeyCode::Char('G') | KeyCode::End => state.surface.move_to_bottom(&state.model)?,
        KeyCode::Tab => state.surface.next_section(&state.model)?,
        KeyCode::Char(' ') | KeyCode::Enter => {
            let outcome = state.toggle_at_cursor()?;
            let scheduled = state
                .wants_reorder(outcome)
                .map(|r| (r.order.clone(), r.delay()));
            if let Some((order, delay)) = scheduled {
                state.push_log("INFO", format!("reorder in {} ms", delay.as_millis()));
                return Ok(Flow::Schedule { order, delay });
            }
        }
        KeyCode::Char('r') => {
            if state.reorder_due.is_some() {
                state.push_log("INFO", "reorder already pending".to_string());
            } else if let Some(order) = state.reorder.as_ref().map(|r| r.order.clone()) {
                state.apply_reorder(order)?;
            }
        }
        KeyCode::Char('s') => {
            state.shuffle_sections(&mut rand::thread_rng())?;
        }
        _ => {}
    }
    Ok(Flow::Continue)
}
