use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::DisplayConfig;
use crate::error::Result;
use crate::gate::{Gate, Route};
use crate::manager::{read_stored, TaskListManager};
use crate::store::Store;

use super::view;

const EVENT_POLL_MS: u64 = 120;
const LOADER_WAIT_SECS: u64 = 15;

pub(crate) enum UiMsg {
    Loaded(Result<Option<Vec<u8>>>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Focus {
    Input,
    List,
}

pub struct AppState {
    pub(crate) route: Route,
    pub(crate) focus: Focus,
    pub(crate) selected: Option<String>,
    pub(crate) manager: TaskListManager,
    pub(crate) display: DisplayConfig,
    mounted: bool,
    status: Option<(String, StatusKind)>,
}

impl AppState {
    pub(crate) fn new(manager: TaskListManager, display: DisplayConfig) -> Self {
        Self {
            route: Route::Gate,
            focus: Focus::Input,
            selected: None,
            manager,
            display,
            mounted: false,
            status: None,
        }
    }

    /// Task ids in on-screen order: pending first, then completed
    pub(crate) fn row_ids(&self) -> Vec<String> {
        let view = self.manager.render();
        view.pending
            .iter()
            .chain(view.completed.iter())
            .map(|task| task.id.clone())
            .collect()
    }

    pub(crate) fn selected_position(&self) -> Option<usize> {
        let selected = self.selected.as_deref()?;
        self.row_ids().iter().position(|id| id == selected)
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        self.status.clone()
    }

    fn set_info(&mut self, message: String) {
        self.status = Some((message, StatusKind::Info));
    }

    fn set_error(&mut self, message: String) {
        self.status = Some((message, StatusKind::Error));
    }

    pub(crate) fn footer_hint(&self) -> String {
        match self.route {
            Route::Gate => "enter continue  q quit".to_string(),
            Route::Checklist => match self.focus {
                Focus::Input => {
                    "type task  enter add  ctrl-u clear  tab list  ctrl-c quit".to_string()
                }
                Focus::List => {
                    let mut hint = "j/k move  space toggle".to_string();
                    if self.manager.render().shows_completed() {
                        hint.push_str("  c clear completed");
                    }
                    hint.push_str("  tab input  q quit");
                    hint
                }
            },
        }
    }

    pub(crate) fn task_count_summary(&self) -> String {
        let view = self.manager.render();
        format!(
            "pending: {}  completed: {}",
            view.pending.len(),
            view.completed.len()
        )
    }

    /// Activate the gate and mount the checklist
    fn enter(&mut self, ui_tx: &Sender<UiMsg>) {
        self.route = Gate.enter();
        self.focus = Focus::Input;
        if !self.mounted {
            self.mounted = true;
            spawn_loader(self.manager.store(), self.manager.key().to_string(), ui_tx.clone());
        }
    }

    fn add_task(&mut self) {
        if let Some(task) = self.manager.add_task() {
            let id = task.id.clone();
            self.set_info("added".to_string());
            self.selected = Some(id);
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected.clone() else {
            return;
        };
        if self.manager.toggle_complete(&id) {
            let done = self
                .manager
                .tasks()
                .get(&id)
                .map(|task| task.completed)
                .unwrap_or(false);
            self.set_info(if done { "completed" } else { "reopened" }.to_string());
        }
    }

    fn clear_completed(&mut self) {
        if !self.manager.render().shows_completed() {
            return;
        }
        let previous = self.selected_position();
        let removed = self.manager.clear_completed();
        self.set_info(format!("cleared {removed} completed"));
        self.reconcile_selection(previous);
    }

    /// Keep the selection on its task, or on the row that took its place
    fn reconcile_selection(&mut self, previous_pos: Option<usize>) {
        let rows = self.row_ids();
        if rows.is_empty() {
            self.selected = None;
            return;
        }
        if let Some(id) = self.selected.as_ref() {
            if rows.contains(id) {
                return;
            }
        }
        let pos = previous_pos.unwrap_or(0).min(rows.len() - 1);
        self.selected = Some(rows[pos].clone());
    }

    fn move_selection(&mut self, delta: isize) {
        let rows = self.row_ids();
        if rows.is_empty() {
            self.selected = None;
            return;
        }
        let current = self.selected_position().unwrap_or(0);
        let max = rows.len().saturating_sub(1);
        let next = (current as isize + delta).clamp(0, max as isize) as usize;
        self.selected = Some(rows[next].clone());
    }

    fn focus_list(&mut self) {
        self.focus = Focus::List;
        self.reconcile_selection(None);
    }
}

pub fn run(manager: TaskListManager, display: DisplayConfig) -> Result<()> {
    let (ui_tx, ui_rx) = mpsc::channel();
    let mut app = AppState::new(manager, display);
    let result = run_terminal(&mut app, &ui_tx, &ui_rx);
    await_loader(&mut app, &ui_rx);
    if let Err(err) = app.manager.flush() {
        tracing::warn!(error = %err, "final flush failed");
    }
    result
}

fn run_terminal(app: &mut AppState, ui_tx: &Sender<UiMsg>, ui_rx: &Receiver<UiMsg>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app, ui_tx, ui_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    ui_tx: &Sender<UiMsg>,
    ui_rx: &Receiver<UiMsg>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            handle_ui_msg(app, msg);
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if handle_key(app, key, ui_tx) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => {
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Let a load still in flight land, so tasks typed before it get written
fn await_loader(app: &mut AppState, ui_rx: &Receiver<UiMsg>) {
    if !app.mounted || app.manager.is_loaded() || app.manager.read_error().is_some() {
        return;
    }
    match ui_rx.recv_timeout(Duration::from_secs(LOADER_WAIT_SECS)) {
        Ok(msg) => handle_ui_msg(app, msg),
        Err(_) => tracing::warn!("stored list never loaded; new tasks were not written"),
    }
}

pub(crate) fn handle_ui_msg(app: &mut AppState, msg: UiMsg) {
    match msg {
        UiMsg::Loaded(stored) => {
            app.manager.hydrate(stored);
            if let Some(err) = app.manager.read_error() {
                let message = format!("load error: {err}; changes are not saved");
                app.set_error(message);
            }
            app.reconcile_selection(None);
        }
    }
}

/// Returns true when the app should quit
pub(crate) fn handle_key(app: &mut AppState, key: KeyEvent, ui_tx: &Sender<UiMsg>) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.route {
        Route::Gate => match key.code {
            KeyCode::Enter => {
                app.enter(ui_tx);
                false
            }
            KeyCode::Char('q') | KeyCode::Esc => true,
            _ => false,
        },
        Route::Checklist => match app.focus {
            Focus::Input => {
                handle_input_key(app, key);
                false
            }
            Focus::List => handle_list_key(app, key),
        },
    }
}

fn handle_input_key(app: &mut AppState, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('u') {
            app.manager.clear_draft();
        }
        return;
    }

    match key.code {
        KeyCode::Enter => app.add_task(),
        KeyCode::Tab | KeyCode::Down | KeyCode::Esc => app.focus_list(),
        KeyCode::Backspace => app.manager.pop_draft(),
        KeyCode::Char(ch) if !ch.is_control() => app.manager.push_draft(ch),
        _ => {}
    }
}

fn handle_list_key(app: &mut AppState, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Char('g') | KeyCode::Home => app.move_selection(isize::MIN / 2),
        KeyCode::Char('G') | KeyCode::End => app.move_selection(isize::MAX / 2),
        KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => app.toggle_selected(),
        KeyCode::Char('c') => app.clear_completed(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('i') | KeyCode::Char('a') => {
            app.focus = Focus::Input;
        }
        _ => {}
    }
    false
}

fn spawn_loader(store: Arc<dyn Store>, key: String, ui_tx: Sender<UiMsg>) {
    thread::spawn(move || {
        let stored = read_stored(store.as_ref(), &key);
        let _ = ui_tx.send(UiMsg::Loaded(stored));
    });
}
