// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tagtable_app::engine::{VisiblePage, visible_page};
use tagtable_app::{
    SORT_KEY_COUNT, SORT_KEY_NAME, SortDirection, TableAction, TableState, TableStore, Tag,
    apply_action, select_all_checkbox, toolbar_label,
};

const LOADING_TEXT: &str = "Loading data please wait...";
const STATUS_TTL: Duration = Duration::from_secs(4);
const POLL_INTERVAL: Duration = Duration::from_millis(120);

/// Where the table's rows come from. Called once, off the UI thread.
pub trait TagSource: Send + 'static {
    fn fetch_tags(&self) -> Result<Vec<Tag>>;

    fn describe(&self) -> String {
        "tag source".to_owned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    DatasetLoaded(Vec<Tag>),
    LoadFailed(String),
}

/// Fires the dataset load at most once per view activation.
#[derive(Debug, Default)]
struct InitialLoad {
    started: bool,
}

impl InitialLoad {
    fn start<S: TagSource>(&mut self, source: S, tx: &Sender<InternalEvent>) -> bool {
        if self.started {
            return false;
        }
        self.started = true;

        let sender = tx.clone();
        thread::spawn(move || {
            tracing::info!(source = %source.describe(), "loading tags");
            let event = match source.fetch_tags() {
                Ok(rows) => InternalEvent::DatasetLoaded(rows),
                Err(error) => InternalEvent::LoadFailed(format!("{error:#}")),
            };
            let _ = sender.send(event);
        });
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Column {
    Name,
    #[default]
    Count,
}

impl Column {
    const ALL: [Self; 2] = [Self::Name, Self::Count];

    const fn key(self) -> &'static str {
        match self {
            Self::Name => SORT_KEY_NAME,
            Self::Count => SORT_KEY_COUNT,
        }
    }

    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|column| *column == self)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    cursor_row: usize,
    cursor_col: Column,
    help_visible: bool,
    status: Option<String>,
    status_token: u64,
}

#[derive(Debug, Clone, PartialEq)]
enum ViewCommand {
    Table(TableAction),
    MoveRow(isize),
    MoveColumn(isize),
    SortCursorColumn,
    ToggleCursorRow,
    ToggleHelp,
    Quit,
}

pub fn run_app<S: TagSource>(store: &mut TableStore, source: S) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let dirty = Rc::new(std::cell::Cell::new(true));
    let subscription = {
        let dirty = Rc::clone(&dirty);
        store.subscribe(move |_, _| dirty.set(true))
    };

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    let mut initial_load = InitialLoad::default();
    initial_load.start(source, &internal_tx);

    let mut result = Ok(());
    loop {
        if process_internal_events(store, &mut view_data, &internal_tx, &internal_rx) {
            dirty.set(true);
        }

        if dirty.replace(false) {
            clamp_cursor(store.state(), &mut view_data);
            if let Err(error) = terminal.draw(|frame| render(frame, store.state(), &view_data)) {
                result = Err(error).context("draw frame");
                break;
            }
        }

        let has_event = match event::poll(POLL_INTERVAL).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) => {
                if handle_key_event(store, &mut view_data, &internal_tx, key) {
                    break;
                }
                dirty.set(true);
            }
            Ok(Event::Resize(_, _)) => dirty.set(true),
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    store.unsubscribe(subscription);
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// Drains pending background events. Returns whether anything arrived.
fn process_internal_events(
    store: &mut TableStore,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) -> bool {
    let mut received = false;
    while let Ok(event) = rx.try_recv() {
        received = true;
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::DatasetLoaded(rows) => {
                let outcome = apply_action(store, TableAction::DatasetLoaded(rows));
                tracing::info!(rows = store.state().dataset.len(), "tags loaded");
                clamp_cursor(store.state(), view_data);
                if let Some(message) = outcome.message() {
                    emit_status(view_data, tx, message);
                }
            }
            InternalEvent::LoadFailed(error) => {
                tracing::error!(%error, "tag load failed; table stays in loading state");
            }
        }
    }
    received
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_TTL);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn command_for_key(key: KeyEvent) -> Option<ViewCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(ViewCommand::Quit)
        }
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Some(ViewCommand::Quit),
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(ViewCommand::MoveRow(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(ViewCommand::MoveRow(-1)),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(ViewCommand::MoveColumn(-1)),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(ViewCommand::MoveColumn(1)),
        (KeyCode::Char('s'), _) => Some(ViewCommand::SortCursorColumn),
        (KeyCode::Char('1'), _) => Some(ViewCommand::Table(TableAction::HeaderClicked(
            SORT_KEY_NAME.to_owned(),
        ))),
        (KeyCode::Char('2'), _) => Some(ViewCommand::Table(TableAction::HeaderClicked(
            SORT_KEY_COUNT.to_owned(),
        ))),
        (KeyCode::Char(' '), _) | (KeyCode::Enter, _) => Some(ViewCommand::ToggleCursorRow),
        (KeyCode::Char('a'), _) => Some(ViewCommand::Table(TableAction::SelectAllClicked)),
        (KeyCode::Char(']'), _) | (KeyCode::PageDown, _) => {
            Some(ViewCommand::Table(TableAction::NextPage))
        }
        (KeyCode::Char('['), _) | (KeyCode::PageUp, _) => {
            Some(ViewCommand::Table(TableAction::PrevPage))
        }
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => {
            Some(ViewCommand::Table(TableAction::FirstPage))
        }
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
            Some(ViewCommand::Table(TableAction::LastPage))
        }
        (KeyCode::Char('r'), _) => Some(ViewCommand::Table(TableAction::CyclePageSize)),
        (KeyCode::Char('?'), _) => Some(ViewCommand::ToggleHelp),
        _ => None,
    }
}

/// Returns true when the view should exit.
fn handle_key_event(
    store: &mut TableStore,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if view_data.help_visible {
        if matches!(
            command_for_key(key),
            Some(ViewCommand::ToggleHelp | ViewCommand::Quit)
        ) {
            view_data.help_visible = false;
        }
        return false;
    }

    let Some(command) = command_for_key(key) else {
        return false;
    };

    match command {
        ViewCommand::Quit => return true,
        ViewCommand::ToggleHelp => {
            view_data.help_visible = true;
            return false;
        }
        _ => {}
    }

    // Table body, header and pagination only exist once the dataset loads.
    if !store.state().dataset.is_loaded() {
        return false;
    }

    let action = match command {
        ViewCommand::Table(action) => action,
        ViewCommand::MoveRow(delta) => {
            move_row(store.state(), view_data, delta);
            return false;
        }
        ViewCommand::MoveColumn(delta) => {
            move_col(view_data, delta);
            return false;
        }
        ViewCommand::SortCursorColumn => {
            TableAction::HeaderClicked(view_data.cursor_col.key().to_owned())
        }
        ViewCommand::ToggleCursorRow => {
            let Some(name) = cursor_row_name(store.state(), view_data) else {
                return false;
            };
            TableAction::RowClicked(name)
        }
        ViewCommand::ToggleHelp | ViewCommand::Quit => return false,
    };

    let outcome = apply_action(store, action);
    clamp_cursor(store.state(), view_data);
    if let Some(message) = outcome.message() {
        emit_status(view_data, internal_tx, message);
    }
    false
}

fn visible_row_count(state: &TableState) -> usize {
    visible_page(state).map_or(0, |page| page.rows.len())
}

fn clamp_cursor(state: &TableState, view_data: &mut ViewData) {
    let rows = visible_row_count(state);
    view_data.cursor_row = view_data.cursor_row.min(rows.saturating_sub(1));
}

fn move_row(state: &TableState, view_data: &mut ViewData, delta: isize) {
    let rows = visible_row_count(state);
    if rows == 0 {
        view_data.cursor_row = 0;
        return;
    }
    let max = rows.saturating_sub(1) as isize;
    let next = (view_data.cursor_row as isize + delta).clamp(0, max);
    view_data.cursor_row = next as usize;
}

fn move_col(view_data: &mut ViewData, delta: isize) {
    let max = Column::ALL.len().saturating_sub(1) as isize;
    let next = (view_data.cursor_col.index() as isize + delta).clamp(0, max);
    view_data.cursor_col = Column::ALL[next as usize];
}

fn cursor_row_name(state: &TableState, view_data: &ViewData) -> Option<String> {
    let page = visible_page(state)?;
    page.rows
        .get(view_data.cursor_row)
        .map(|row| row.name.clone())
}

fn header_labels(state: &TableState) -> [String; 3] {
    let label = |column: Column| {
        let mut label = column.key().to_owned();
        if state.sort_key == column.key() {
            label.push_str(match state.sort_direction {
                SortDirection::Asc => " ↑",
                SortDirection::Desc => " ↓",
            });
        }
        label
    };
    [
        select_all_checkbox(state).glyph().to_owned(),
        label(Column::Name),
        label(Column::Count),
    ]
}

fn row_cells(state: &TableState, tag: &Tag) -> [String; 3] {
    let checkbox = if state.is_selected(&tag.name) {
        "[x]"
    } else {
        "[ ]"
    };
    [checkbox.to_owned(), tag.name.clone(), tag.count.to_string()]
}

fn pagination_text(page: &VisiblePage<'_>) -> String {
    let (first, last) = page.range();
    format!(
        "rows per page: {} | {first}-{last} of {} | page {}/{}",
        page.page_size,
        page.total,
        page.page + 1,
        page.page_count.max(1),
    )
}

fn status_text(view_data: &ViewData, loaded: bool) -> String {
    let hints = if loaded {
        "j/k/h/l move | s or 1/2 sort | space select | a all | [/] page | r rows | ? help | q quit"
    } else {
        "? help | q quit"
    };
    match &view_data.status {
        Some(status) => format!("{status} | {hints}"),
        None => hints.to_owned(),
    }
}

fn help_overlay_text() -> &'static str {
    "move: j/k rows | h/l columns\n\
sort: s sort cursor column | 1 name | 2 count (asc -> desc -> asc)\n\
select: space/enter toggle row | a select all / clear\n\
pages: ]/pgdn next | [/pgup prev | g/home first | G/end last | r rows per page\n\
other: ? close help | q/esc/ctrl+c quit"
}

fn render(frame: &mut ratatui::Frame<'_>, state: &TableState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let toolbar_style = if state.selected.is_empty() {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let toolbar = Paragraph::new(toolbar_label(state))
        .style(toolbar_style)
        .block(Block::default().title("tagtable").borders(Borders::ALL));
    frame.render_widget(toolbar, layout[0]);

    match visible_page(state) {
        Some(page) => {
            render_table(frame, layout[1], state, view_data, &page);
            frame.render_widget(Paragraph::new(pagination_text(&page)), layout[2]);
        }
        None => {
            let loading = Paragraph::new(LOADING_TEXT)
                .alignment(ratatui::layout::Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(loading, layout[1]);
        }
    }

    let status = Paragraph::new(status_text(view_data, state.dataset.is_loaded()))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, layout[3]);

    if view_data.help_visible {
        let area = centered_rect(80, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &TableState,
    view_data: &ViewData,
    page: &VisiblePage<'_>,
) {
    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let header = Row::new(
        header_labels(state)
            .into_iter()
            .enumerate()
            .map(|(index, label)| {
                let mut style = header_style;
                if index == view_data.cursor_col.index() + 1 {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                Cell::from(label).style(style)
            }),
    );

    let mut rows = page
        .rows
        .iter()
        .enumerate()
        .map(|(row_index, tag)| {
            let cursor_row = row_index == view_data.cursor_row;
            let checked = state.is_selected(&tag.name);
            let cells = row_cells(state, tag)
                .into_iter()
                .enumerate()
                .map(|(column_index, text)| {
                    let mut style = Style::default();
                    if checked {
                        style = style.fg(Color::Cyan);
                    }
                    if cursor_row {
                        style = style.bg(Color::DarkGray);
                    }
                    if cursor_row && column_index == view_data.cursor_col.index() + 1 {
                        style = Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD);
                    }
                    Cell::from(text).style(style)
                })
                .collect::<Vec<_>>();
            Row::new(cells)
        })
        .collect::<Vec<_>>();
    rows.extend((0..page.padding).map(|_| Row::new(vec![Cell::from(""); 3])));

    let widths = [
        Constraint::Length(3),
        Constraint::Min(12),
        Constraint::Length(12),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
