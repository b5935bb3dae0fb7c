use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}};

use todo_api::application::todo_service::{TodoService, TodoServiceImpl};
use todo_api::config::Config;
use todo_api::domain::query::{MAX_LIMIT, Pagination, TodoFilter, TodoListQuery};
use todo_api::domain::todo::{CreateTodo, TodoId, UpdateTodo};
use todo_api::infrastructure::{db::Database, sqlite_category_repo::SqliteCategoryRepository, sqlite_repo::SqliteTodoRepository};

type Service = TodoServiceImpl<SqliteTodoRepository, SqliteCategoryRepository>;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    let db = Database::connect(&config.database_url, config.max_connections).await?;
    db.migrate().await?;
    let service = TodoServiceImpl::new(SqliteTodoRepository::new(db.pool().clone()), SqliteCategoryRepository::new(db.pool().clone()));

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, service, &config.database_url).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    db.close().await;

    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create, Edit }

#[derive(Clone, Copy, PartialEq, Eq)]
enum Filter { All, Pending, Done }

impl Filter {
    fn completed(self) -> Option<bool> {
        match self { Filter::All => None, Filter::Pending => Some(false), Filter::Done => Some(true) }
    }

    fn label(self) -> &'static str {
        match self { Filter::All => "All", Filter::Pending => "Pending", Filter::Done => "Done" }
    }

    fn next(self) -> Self {
        match self { Filter::All => Filter::Pending, Filter::Pending => Filter::Done, Filter::Done => Filter::All }
    }
}

struct ListEntry {
    id: TodoId,
    completed: bool,
    title: String,
    category: Option<String>,
    due: Option<String>,
}

struct App {
    service: Service,
    items: Vec<ListEntry>,
    total: i64,
    selected: usize,
    last_tick: Instant,
    mode: Mode,
    list_state: ListState,
    filter: Filter,
    draft_title: String,
    status: Option<String>,
}

impl App {
    async fn load(&mut self) -> Result<()> {
        let query = TodoListQuery {
            filter: TodoFilter { completed: self.filter.completed(), ..Default::default() },
            pagination: Pagination::new(Some(1), Some(MAX_LIMIT)),
            ..Default::default()
        };
        let page = self.service.list(query).await?;
        self.total = page.total;
        self.items = page
            .items
            .into_iter()
            .map(|t| ListEntry {
                id: t.id,
                completed: t.completed,
                title: t.title,
                category: t.category.map(|c| c.name),
                due: t.due_date.map(|d| d.format("%Y-%m-%d %H:%M").to_string()),
            })
            .collect();
        // Clamp selection within bounds
        let len = self.items.len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
        Ok(())
    }

    fn selected_id(&self) -> Option<TodoId> { self.items.get(self.selected).map(|e| e.id) }

    /// Keeps validation failures on screen instead of dropping them.
    fn report<T>(&mut self, result: todo_api::domain::error::AppResult<T>) {
        self.status = result.err().map(|e| e.to_string());
    }
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, service: Service, database_url: &str) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut app = App { service, items: vec![], total: 0, selected: 0, last_tick: Instant::now(), mode: Mode::View, list_state: ListState::default(), filter: Filter::All, draft_title: String::new(), status: None };
    app.load().await?;

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let header = Paragraph::new("Todos (Enter: toggle, n: new, e: edit title, d: delete, f: filter, q: quit)  |  New/Edit: type title, Enter to save, Esc to cancel")
                .block(Block::default().borders(Borders::ALL).title("todo-tui"));
            f.render_widget(header, chunks[0]);

            let middle = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);

            let list_items: Vec<ListItem> = app.items.iter().map(|e| {
                let mark = if e.completed { "[x]" } else { "[ ]" };
                match &e.category {
                    Some(c) => ListItem::new(format!("{} {}  ({})", mark, e.title, c)),
                    None => ListItem::new(format!("{} {}", mark, e.title)),
                }
            }).collect();
            if app.items.is_empty() { app.list_state.select(None); } else { app.list_state.select(Some(app.selected)); }
            let list = List::new(list_items)
                .block(Block::default().borders(Borders::ALL).title(format!("todos [{}] {} of {}", app.filter.label(), app.items.len(), app.total)))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, middle[0], &mut app.list_state);

            let detail = match app.items.get(app.selected) {
                Some(e) => format!(
                    "Title:\n{}\n\nStatus: {}\n\nCategory: {}\n\nDue: {}",
                    e.title,
                    if e.completed { "Done" } else { "Pending" },
                    e.category.as_deref().unwrap_or("(none)"),
                    e.due.as_deref().unwrap_or("(none)"),
                ),
                None => String::new(),
            };
            let details = Paragraph::new(detail)
                .block(Block::default().borders(Borders::ALL).title("details"));
            f.render_widget(details, middle[1]);

            let footer_text = match (app.mode, &app.status) {
                (Mode::View, Some(err)) => format!("error: {err}"),
                (Mode::View, None) => format!("DATABASE_URL={}  |  Filter=[{}]", database_url, app.filter.label()),
                (Mode::Create | Mode::Edit, _) => format!("Title: {}_  |  (Enter to save, Esc to cancel)", app.draft_title),
            };
            let footer = Paragraph::new(footer_text)
                .block(Block::default().borders(Borders::ALL).title(match app.mode { Mode::View => "info", Mode::Create => "create", Mode::Edit => "edit" }));
            f.render_widget(footer, chunks[2]);
        })?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode {
                    Mode::View => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } }
                        KeyCode::Down => { if app.selected + 1 < app.items.len() { app.selected += 1; } }
                        KeyCode::Enter => {
                            if let Some(id) = app.selected_id() {
                                let result = app.service.toggle(id).await;
                                app.report(result);
                                app.load().await?;
                            }
                        }
                        KeyCode::Char('n') => {
                            app.mode = Mode::Create;
                            app.draft_title.clear();
                        }
                        KeyCode::Char('e') => {
                            if let Some(entry) = app.items.get(app.selected) {
                                app.draft_title = entry.title.clone();
                                app.mode = Mode::Edit;
                            }
                        }
                        KeyCode::Char('d') => {
                            if let Some(id) = app.selected_id() {
                                let result = app.service.delete(id).await;
                                app.report(result);
                                if app.selected > 0 { app.selected -= 1; }
                                app.load().await?;
                            }
                        }
                        KeyCode::Char('f') => {
                            app.filter = app.filter.next();
                            app.selected = 0;
                            app.load().await?;
                        }
                        _ => {}
                    },
                    Mode::Create | Mode::Edit => match key.code {
                        KeyCode::Esc => { app.mode = Mode::View; app.draft_title.clear(); }
                        KeyCode::Enter => {
                            let title = std::mem::take(&mut app.draft_title);
                            let result = match (app.mode, app.selected_id()) {
                                (Mode::Create, _) => app.service.create(CreateTodo { title, ..Default::default() }).await.map(drop),
                                (Mode::Edit, Some(id)) => app.service.update(id, UpdateTodo { title: Some(title), ..Default::default() }).await.map(drop),
                                _ => Ok(()),
                            };
                            app.report(result);
                            app.mode = Mode::View;
                            app.load().await?;
                        }
                        KeyCode::Backspace => { app.draft_title.pop(); }
                        KeyCode::Char(c) => app.draft_title.push(c),
                        _ => {}
                    },
                }
            }
        }
        if app.last_tick.elapsed() >= tick_rate {
            app.last_tick = Instant::now();
        }
    }
    Ok(())
}
