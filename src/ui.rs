use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::controller::{TaskController, NO_TASKS};
use crate::error::Result as TaskResult;
use crate::form::{AddTaskForm, FormField};
use crate::models::{FetchOutcome, MutationReply, Popup, RemovalTable, TaskRow};

/// Results of background requests, delivered back to the event loop.
#[derive(Debug)]
pub enum NetworkEvent {
    Fetched(TaskResult<FetchOutcome>),
    Added(TaskResult<MutationReply>),
    Removed(TaskResult<MutationReply>),
}

pub struct App {
    pub controller: TaskController,
    pub should_quit: bool,
    /// Set while an add or remove request is in flight.
    pub mutation_pending: bool,
    runtime: Handle,
    results_tx: UnboundedSender<NetworkEvent>,
    results_rx: UnboundedReceiver<NetworkEvent>,
}

impl App {
    pub fn new(controller: TaskController, runtime: Handle) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        App {
            controller,
            should_quit: false,
            mutation_pending: false,
            runtime,
            results_tx,
            results_rx,
        }
    }

    pub fn request_fetch(&mut self) {
        self.controller.begin_fetch();
        let service = self.controller.service();
        let employee_id = self.controller.employee_id().to_string();
        let tx = self.results_tx.clone();
        self.runtime.spawn(async move {
            let result = service.fetch_tasks(&employee_id).await;
            let _ = tx.send(NetworkEvent::Fetched(result));
        });
    }

    pub fn submit_add_form(&mut self) {
        if self.mutation_pending {
            return;
        }
        let Some(task) = self.controller.validate_add_form() else {
            return;
        };
        self.mutation_pending = true;
        let service = self.controller.service();
        let tx = self.results_tx.clone();
        self.runtime.spawn(async move {
            let result = service.add_task(&task).await;
            let _ = tx.send(NetworkEvent::Added(result));
        });
    }

    pub fn remove_selected(&mut self) {
        if self.mutation_pending {
            return;
        }
        let Popup::RemoveTask(table) = &self.controller.popup else {
            return;
        };
        let Some(row) = table.selected_row() else {
            return;
        };
        let employee_name = row.employee_name.clone();
        let task_description = row.task_description.clone();
        self.mutation_pending = true;
        let service = self.controller.service();
        let tx = self.results_tx.clone();
        self.runtime.spawn(async move {
            let result = service.remove_task(&employee_name, &task_description).await;
            let _ = tx.send(NetworkEvent::Removed(result));
        });
    }

    pub fn apply(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::Fetched(result) => self.controller.finish_fetch(result),
            NetworkEvent::Added(result) => {
                self.mutation_pending = false;
                if self.controller.finish_add(result) {
                    self.request_fetch();
                }
            }
            NetworkEvent::Removed(result) => {
                self.mutation_pending = false;
                if self.controller.finish_remove(result) {
                    self.request_fetch();
                }
            }
        }
    }

    /// Applies every result that has arrived since the last frame.
    pub fn drain_results(&mut self) {
        while let Ok(event) = self.results_rx.try_recv() {
            self.apply(event);
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match &mut self.controller.popup {
            Popup::None => match key {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('a') => self.controller.open_add_popup(),
                KeyCode::Char('d') => self.controller.open_remove_popup(),
                KeyCode::Char('r') => self.request_fetch(),
                _ => {}
            },
            Popup::AddTask(form) => match key {
                KeyCode::Esc => self.controller.close_all(),
                KeyCode::Enter => self.submit_add_form(),
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
                KeyCode::Backspace => form.focused_input_mut().delete_char(),
                KeyCode::Delete => form.focused_input_mut().delete_forward(),
                KeyCode::Left => form.focused_input_mut().move_cursor_left(),
                KeyCode::Right => form.focused_input_mut().move_cursor_right(),
                KeyCode::Home => form.focused_input_mut().move_to_start(),
                KeyCode::End => form.focused_input_mut().move_to_end(),
                KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                    form.focused_input_mut().insert_char(c);
                }
                _ => {}
            },
            Popup::RemoveTask(table) => match key {
                KeyCode::Esc | KeyCode::Char('q') => self.controller.close_all(),
                KeyCode::Down => table.next(),
                KeyCode::Up => table.previous(),
                KeyCode::Enter | KeyCode::Char('x') => self.remove_selected(),
                _ => {}
            },
            Popup::Message(_) => match key {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.controller.close_all(),
                _ => {}
            },
        }
    }
}

pub fn run_tui(controller: TaskController, runtime: Handle) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller, runtime);
    app.request_fetch();
    run_session(&mut terminal, &mut app, |terminal| {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()
    })
}

/// Runs the event loop, restores the terminal, then reports any loop error.
fn run_session<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    restore: impl FnOnce(&mut Terminal<B>) -> io::Result<()>,
) -> Result<()> {
    let res = run_app(terminal, app);
    restore(terminal)?;
    res?;
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.drain_results();
        terminal.draw(|f| ui(f, app))?;

        // Poll so finished requests show up without waiting for a key.
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    let title = Paragraph::new(Line::from(vec![
        Span::styled("Employee Task List", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  Employee ID: {}", app.controller.employee_id()),
            Style::default().fg(Color::Cyan),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_tasks(f, app, chunks[1]);

    let help = if app.mutation_pending {
        "Working..."
    } else {
        "a: Add Task | d: Remove Task | r: Refresh | q: Quit"
    };
    let help_paragraph = Paragraph::new(help)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::White));
    f.render_widget(help_paragraph, chunks[2]);

    match &app.controller.popup {
        Popup::None => {}
        Popup::AddTask(form) => render_add_popup(f, form),
        Popup::RemoveTask(table) => render_remove_popup(f, app.controller.employee_id(), table),
        Popup::Message(content) => render_message_popup(f, content),
    }
}

// Helper function to create centered rectangles for popups
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

const TASK_HEADERS: [&str; 6] = ["Employee Name", "Task Description", "Start Date", "End Date", "Rating", "Remarks"];

fn task_cells(row: &TaskRow) -> [String; 6] {
    [
        row.employee_name.clone(),
        row.task_description.clone(),
        row.start_date.clone(),
        row.end_date.clone(),
        row.rating.clone(),
        row.remarks.clone(),
    ]
}

fn header_row<'a>(titles: impl IntoIterator<Item = &'a str>) -> Row<'a> {
    Row::new(titles.into_iter().map(Cell::from))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
}

fn render_tasks(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Tasks");
    let controller = &app.controller;

    if controller.loading {
        let loading = Paragraph::new("Loading tasks...").block(block).style(Style::default().fg(Color::Yellow));
        f.render_widget(loading, area);
        return;
    }
    if controller.no_tasks {
        let empty = Paragraph::new(NO_TASKS).block(block).style(Style::default().fg(Color::White));
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = controller.rows().iter().map(|row| Row::new(task_cells(row))).collect();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(18),
            Constraint::Percentage(30),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(7),
            Constraint::Min(10),
        ],
    )
    .header(header_row(TASK_HEADERS))
    .block(block);
    f.render_widget(table, area);
}

fn render_add_popup(f: &mut Frame, form: &AddTaskForm) {
    let popup_area = centered_rect(60, 50, f.area());
    let block = Block::default()
        .title("Add New Task")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::DarkGray));

    let mut lines: Vec<Line> = Vec::new();
    for field in FormField::ALL {
        let marker = if field.is_required() { "*" } else { " " };
        let label = Span::styled(
            format!("{:<15}{} ", field.label(), marker),
            Style::default().fg(Color::Cyan),
        );
        let input = form.input(field);
        if field == form.focus {
            let (before, at, after) = input.split_at_cursor();
            lines.push(Line::from(vec![
                label,
                Span::styled(before, Style::default().fg(Color::White)),
                Span::styled(
                    at.map(String::from).unwrap_or_else(|| " ".to_string()),
                    Style::default().bg(Color::Cyan).fg(Color::Black),
                ),
                Span::styled(after, Style::default().fg(Color::White)),
            ]));
        } else {
            let value = if input.is_empty() && field.is_date() {
                Span::styled("YYYY-MM-DD", Style::default().fg(Color::Gray))
            } else {
                Span::styled(input.get_content(), Style::default().fg(Color::White))
            };
            lines.push(Line::from(vec![label, value]));
        }
    }
    lines.push(Line::from(""));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    }
    lines.push(Line::from("Tab/↑/↓: Move | Enter: Add | Esc: Cancel"));

    let content = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(Clear, popup_area);
    f.render_widget(content, popup_area);
}

fn render_remove_popup(f: &mut Frame, employee_id: &str, removal: &RemovalTable) {
    let popup_area = centered_rect(90, 60, f.area());
    let block = Block::default()
        .title("Remove Task - ↑/↓: Select | Enter/x: Remove | Esc: Close")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::DarkGray));

    let rows: Vec<Row> = removal
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![employee_id.to_string()];
            cells.extend(task_cells(row));
            Row::new(cells)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Percentage(16),
            Constraint::Percentage(26),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(7),
            Constraint::Min(8),
        ],
    )
    .header(header_row(std::iter::once("Employee ID").chain(TASK_HEADERS)))
    .block(block)
    .highlight_style(
        Style::default()
            .bg(Color::LightRed)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("X ");

    let mut state = TableState::default().with_selected(removal.selected);
    f.render_widget(Clear, popup_area);
    f.render_stateful_widget(table, popup_area, &mut state);
}

fn render_message_popup(f: &mut Frame, content: &str) {
    let popup_area = centered_rect(50, 20, f.area());
    let block = Block::default()
        .title("Message")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::DarkGray));
    let paragraph = Paragraph::new(format!("{content}\n\nPress ENTER to close"))
        .block(block)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White));

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}
