use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::store::Library;

use super::forms::{
    BookField, BookForm, ConfirmBookRemove, LoanField, LoanForm, LoanKind, StudentField,
    StudentForm,
};
use super::helpers::{
    book_detail_lines, centered_rect, figure_or_no_data, is_internal, stat_line,
    student_detail_lines, surface_error,
};
use super::screens::{BookListScreen, StudentListScreen, PAGE_STEP};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the tab bar across the top.
const TABS_HEIGHT: u16 = 3;
/// Tab labels, in the order the number keys select them.
const TAB_TITLES: [&str; 3] = ["[1] Books", "[2] Students", "[3] Statistics"];

/// High-level navigation states.
enum Screen {
    Books(BookListScreen),
    Students(StudentListScreen),
    Statistics,
}

impl Screen {
    fn tab_index(&self) -> usize {
        match self {
            Screen::Books(_) => 0,
            Screen::Students(_) => 1,
            Screen::Statistics => 2,
        }
    }
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
    AddingStudent(StudentForm),
    Lending(LoanForm),
    ConfirmBookRemove(ConfirmBookRemove),
    Searching(SearchState),
}

/// State for an active inline search over the catalog.
struct SearchState {
    query: String,
    /// Filter to restore if the search is cancelled.
    previous: Option<String>,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

impl StatusMessage {
    fn info<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Info,
        }
    }

    fn error<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    library: Library,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(library: Library) -> Self {
        let screen = Screen::Books(BookListScreen::new(library.catalog()));
        Self {
            library,
            screen,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Hand the library back once the event loop is over.
    pub fn into_library(self) -> Library {
        self.library
    }

    /// Feed one key press through the active mode. Returns `true` when the
    /// user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::AddingStudent(form) => self.handle_add_student(code, form)?,
            Mode::Lending(form) => self.handle_lending(code, form)?,
            Mode::ConfirmBookRemove(confirm) => self.handle_confirm_remove(code, confirm)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Char('1') => {
                self.open_books();
                return Ok(Mode::Normal);
            }
            KeyCode::Char('2') => {
                self.open_students();
                return Ok(Mode::Normal);
            }
            KeyCode::Char('3') => {
                self.open_statistics();
                return Ok(Mode::Normal);
            }
            KeyCode::Tab => {
                self.cycle_screen(1);
                return Ok(Mode::Normal);
            }
            KeyCode::BackTab => {
                self.cycle_screen(-1);
                return Ok(Mode::Normal);
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                self.clear_status();
                return Ok(Mode::Lending(self.loan_form(LoanKind::Borrow)));
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.clear_status();
                return Ok(Mode::Lending(self.loan_form(LoanKind::Return)));
            }
            _ => {}
        }

        let mut go_home = false;
        match &mut self.screen {
            Screen::Books(books) => match code {
                KeyCode::Esc => {
                    if books.filter.is_some() {
                        books.set_filter(None, self.library.catalog());
                        self.status = Some(StatusMessage::info("Search cleared."));
                    } else {
                        *exit = true;
                    }
                }
                KeyCode::Up => books.move_selection(-1),
                KeyCode::Down => books.move_selection(1),
                KeyCode::PageUp => books.move_selection(-PAGE_STEP),
                KeyCode::PageDown => books.move_selection(PAGE_STEP),
                KeyCode::Home => books.select_first(),
                KeyCode::End => books.select_last(),
                KeyCode::Char('f') | KeyCode::Char('/') => {
                    return Ok(Mode::Searching(SearchState {
                        query: books.filter.clone().unwrap_or_default(),
                        previous: books.filter.clone(),
                    }));
                }
                KeyCode::Char('+') => {
                    self.status = None;
                    return Ok(Mode::AddingBook(BookForm::default()));
                }
                KeyCode::Char('-') => {
                    let selected = books
                        .current_index()
                        .and_then(|index| self.library.catalog().get(index));
                    // Removal goes through the title lookup, so confirm the
                    // book that lookup resolves to.
                    let target = selected
                        .and_then(|book| self.library.find_book_by_title(&book.title));
                    match target {
                        Some(book) => {
                            self.status = None;
                            return Ok(Mode::ConfirmBookRemove(ConfirmBookRemove::from(book)));
                        }
                        None => {
                            self.status = Some(StatusMessage::error("No book selected to remove."));
                        }
                    }
                }
                _ => {}
            },
            Screen::Students(students) => match code {
                KeyCode::Esc => go_home = true,
                KeyCode::Up => students.move_selection(-1),
                KeyCode::Down => students.move_selection(1),
                KeyCode::PageUp => students.move_selection(-PAGE_STEP),
                KeyCode::PageDown => students.move_selection(PAGE_STEP),
                KeyCode::Home => students.select_first(),
                KeyCode::End => students.select_last(),
                KeyCode::Char('+') => {
                    self.status = None;
                    let form = StudentForm::with_id(self.next_student_id());
                    return Ok(Mode::AddingStudent(form));
                }
                _ => {}
            },
            Screen::Statistics => {
                if code == KeyCode::Esc {
                    go_home = true;
                }
            }
        }

        if go_home {
            self.clear_status();
            self.open_books();
        }
        Ok(Mode::Normal)
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_add_student(&mut self, code: KeyCode, mut form: StudentForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add student cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_student(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingStudent(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_lending(&mut self, code: KeyCode, mut form: LoanForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                let verb = match form.kind {
                    LoanKind::Borrow => "Borrow",
                    LoanKind::Return => "Return",
                };
                self.set_status(format!("{verb} cancelled."), StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.perform_loan(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    if is_internal(&err) {
                        tracing::error!(error = %message, "lending records disagree");
                    }
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::Lending(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_remove(&mut self, code: KeyCode, confirm: ConfirmBookRemove) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_remove(&confirm) {
                    Ok(()) => Ok(Mode::Normal),
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::Normal)
                    }
                }
            }
            _ => Ok(Mode::ConfirmBookRemove(confirm)),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        let books = match &mut self.screen {
            Screen::Books(books) => books,
            _ => return Ok(Mode::Normal),
        };

        match code {
            KeyCode::Esc => {
                books.set_filter(state.previous.take(), self.library.catalog());
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                let query = state.query.trim().to_string();
                if query.is_empty() {
                    books.set_filter(None, self.library.catalog());
                    self.status = None;
                } else {
                    let found = self.library.search_books(&query).len();
                    self.status = Some(StatusMessage::info(format!(
                        "Found {found} matching book(s) for \"{query}\"."
                    )));
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Up => books.move_selection(-1),
            KeyCode::Down => books.move_selection(1),
            KeyCode::PageUp => books.move_selection(-PAGE_STEP),
            KeyCode::PageDown => books.move_selection(PAGE_STEP),
            KeyCode::Backspace => {
                state.query.pop();
                books.set_filter(Some(state.query.clone()), self.library.catalog());
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                state.query.push(ch);
                books.set_filter(Some(state.query.clone()), self.library.catalog());
            }
            _ => {}
        }

        Ok(Mode::Searching(state))
    }

    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let new_book = form.parse_inputs()?;
        let title = self.library.add_book(new_book)?.title.clone();
        let index = self.library.catalog().len().saturating_sub(1);
        self.refresh_screens();
        if let Screen::Books(books) = &mut self.screen {
            books.focus_index(index);
        }
        self.set_status(format!("Added \"{title}\"."), StatusKind::Info);
        Ok(())
    }

    fn save_new_student(&mut self, form: &StudentForm) -> Result<()> {
        let (id, name) = form.parse_inputs()?;
        let name = self.library.add_student(id, &name)?.name.clone();
        let index = self.library.roster().len().saturating_sub(1);
        self.refresh_screens();
        if let Screen::Students(students) = &mut self.screen {
            students.select(index);
        }
        self.set_status(format!("Registered {name} (#{id})."), StatusKind::Info);
        Ok(())
    }

    fn perform_loan(&mut self, form: &LoanForm) -> Result<()> {
        let (student, title) = form.parse_inputs()?;
        let message = match form.kind {
            LoanKind::Borrow => {
                let loan = self.library.borrow_book(&student, &title)?;
                format!(
                    "{} borrowed \"{}\" ({} of {}).",
                    loan.student, loan.title, loan.held, loan.limit
                )
            }
            LoanKind::Return => {
                let loan = self.library.return_book(&student, &title)?;
                format!("{} returned \"{}\".", loan.student, loan.title)
            }
        };
        self.refresh_screens();
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    fn perform_remove(&mut self, confirm: &ConfirmBookRemove) -> Result<()> {
        if self.library.remove_book_by_title(&confirm.title)? {
            self.set_status(format!("Removed \"{}\".", confirm.title), StatusKind::Info);
        } else {
            self.set_status(
                format!("\"{}\" is no longer in the catalog.", confirm.title),
                StatusKind::Error,
            );
        }
        self.refresh_screens();
        Ok(())
    }

    /// Prefill a loan form from whatever is highlighted.
    fn loan_form(&self, kind: LoanKind) -> LoanForm {
        match &self.screen {
            Screen::Books(books) => {
                let book = books
                    .current_index()
                    .and_then(|index| self.library.catalog().get(index));
                let borrower = match kind {
                    LoanKind::Borrow => None,
                    LoanKind::Return => book.and_then(|b| b.borrower()),
                };
                LoanForm::new(kind, borrower, book.map(|b| b.title.as_str()))
            }
            Screen::Students(students) => {
                let student = students
                    .current_index()
                    .and_then(|index| self.library.roster().get(index));
                let title = match kind {
                    LoanKind::Borrow => None,
                    LoanKind::Return => student.and_then(|s| s.borrowed.first()).map(String::as_str),
                };
                LoanForm::new(kind, student.map(|s| s.name.as_str()), title)
            }
            Screen::Statistics => LoanForm::new(kind, None, None),
        }
    }

    fn next_student_id(&self) -> u32 {
        self.library
            .roster()
            .iter()
            .map(|student| student.id)
            .max()
            .map_or(1, |id| id.saturating_add(1))
    }

    /// Re-derive list rows after the library changed.
    fn refresh_screens(&mut self) {
        match &mut self.screen {
            Screen::Books(books) => books.refresh(self.library.catalog()),
            Screen::Students(students) => students.refresh(self.library.roster()),
            Screen::Statistics => {}
        }
    }

    fn open_books(&mut self) {
        if !matches!(self.screen, Screen::Books(_)) {
            self.screen = Screen::Books(BookListScreen::new(self.library.catalog()));
        }
    }

    fn open_students(&mut self) {
        if !matches!(self.screen, Screen::Students(_)) {
            self.screen = Screen::Students(StudentListScreen::new(self.library.roster()));
        }
    }

    fn open_statistics(&mut self) {
        self.screen = Screen::Statistics;
    }

    fn cycle_screen(&mut self, offset: isize) {
        let count = TAB_TITLES.len() as isize;
        let next = (self.screen.tab_index() as isize + offset).rem_euclid(count);
        match next {
            0 => self.open_books(),
            1 => self.open_students(),
            _ => self.open_statistics(),
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TABS_HEIGHT.min(area.height)),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT.min(area.height)),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match &self.screen {
            Screen::Books(books) => self.draw_books(frame, chunks[1], books),
            Screen::Students(students) => self.draw_students(frame, chunks[1], students),
            Screen::Statistics => self.draw_statistics(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::AddingStudent(form) => self.draw_student_form(frame, area, form),
            Mode::Lending(form) => self.draw_loan_form(frame, area, form),
            Mode::ConfirmBookRemove(confirm) => self.draw_confirm_remove(frame, area, confirm),
            Mode::Searching(state) => self.draw_search_bar(frame, chunks[1], state),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let tabs = Tabs::new(TAB_TITLES.to_vec())
            .block(Block::default().borders(Borders::ALL).title("Library Desk"))
            .select(self.screen.tab_index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn split_list_and_details(area: Rect) -> (Rect, Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        (chunks[0], chunks[1])
    }

    fn draw_books(&self, frame: &mut Frame, area: Rect, books: &BookListScreen) {
        let catalog = self.library.catalog();
        if catalog.is_empty() {
            let message = Paragraph::new("No books yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Books"));
            frame.render_widget(message, area);
            return;
        }

        let (list_area, detail_area) = Self::split_list_and_details(area);
        let title = match books.filter.as_deref() {
            Some(term) if !term.trim().is_empty() => {
                format!("Books matching \"{}\" ({})", term.trim(), books.rows.len())
            }
            _ => format!("Books ({})", catalog.len()),
        };

        let items: Vec<ListItem> = books
            .rows
            .iter()
            .filter_map(|&index| catalog.get(index))
            .map(|book| {
                let marker = if book.is_available() {
                    Span::styled("  ", Style::default())
                } else {
                    Span::styled("* ", Style::default().fg(Color::Yellow))
                };
                ListItem::new(Line::from(vec![
                    marker,
                    Span::raw(book.title.clone()),
                    Span::styled(
                        format!("  ({})", book.year),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");
        let mut list_state = ListState::default();
        if !books.rows.is_empty() {
            list_state.select(Some(books.selected));
        }
        frame.render_stateful_widget(list, list_area, &mut list_state);

        let details = match books.current_index().and_then(|index| catalog.get(index)) {
            Some(book) => book_detail_lines(book),
            None => vec![Line::from(Span::styled(
                "No book matches the current search.",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        let paragraph = Paragraph::new(details)
            .block(Block::default().borders(Borders::ALL).title("Details"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, detail_area);
    }

    fn draw_students(&self, frame: &mut Frame, area: Rect, students: &StudentListScreen) {
        let roster = self.library.roster();
        if roster.is_empty() {
            let message = Paragraph::new("No students yet. Press '+' to register one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Students"));
            frame.render_widget(message, area);
            return;
        }

        let (list_area, detail_area) = Self::split_list_and_details(area);
        let items: Vec<ListItem> = roster
            .iter()
            .map(|student| {
                let load_style = if student.at_limit() {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(Line::from(vec![
                    Span::raw(student.to_string()),
                    Span::styled(
                        format!("  [{}/{}]", student.borrowed.len(), student.max_books),
                        load_style,
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Students ({})", roster.len())),
            )
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");
        let mut list_state = ListState::default();
        list_state.select(students.current_index());
        frame.render_stateful_widget(list, list_area, &mut list_state);

        if let Some(student) = students.current_index().and_then(|index| roster.get(index)) {
            let paragraph = Paragraph::new(student_detail_lines(student))
                .block(Block::default().borders(Borders::ALL).title("Loans"))
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, detail_area);
        }
    }

    fn draw_statistics(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let catalog = self.library.catalog();
        let catalog_lines = match self.library.catalog_statistics() {
            Some(stats) => vec![
                stat_line("Books", stats.count.to_string()),
                stat_line("Total authors", stats.total_authors.to_string()),
                stat_line("Average pages", stats.average_pages.to_string()),
                stat_line(
                    "Newest",
                    format!("{} ({})", stats.newest.title, stats.newest.year),
                ),
                stat_line(
                    "Oldest",
                    format!("{} ({})", stats.oldest.title, stats.oldest.year),
                ),
                Line::from(""),
                stat_line(
                    "Shelf slots",
                    format!("{} of {} used", catalog.len(), catalog.capacity()),
                ),
            ],
            None => vec![
                Line::from(Span::styled(
                    "No books in the catalog yet.",
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
                stat_line(
                    "Shelf slots",
                    format!("0 of {} used", catalog.capacity()),
                ),
            ],
        };
        let paragraph = Paragraph::new(catalog_lines)
            .block(Block::default().borders(Borders::ALL).title("Catalog"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, chunks[0]);

        let lending = self.library.enhanced_statistics();
        let roster = self.library.roster();
        let lending_lines = vec![
            stat_line("Students", roster.len().to_string()),
            stat_line("Books on loan", lending.total_borrowed.to_string()),
            stat_line(
                "Average per student",
                format!("{:.2}", lending.average_per_student),
            ),
            stat_line(
                "Most active",
                figure_or_no_data(lending.most_active, |active| {
                    format!("{} ({} book(s))", active.name, active.borrowed)
                }),
            ),
            stat_line(
                "Availability",
                figure_or_no_data(lending.availability_ratio, |ratio| format!("{ratio:.1}%")),
            ),
            Line::from(""),
            stat_line(
                "Roster slots",
                format!("{} of {} used", roster.len(), roster.capacity()),
            ),
        ];
        let paragraph = Paragraph::new(lending_lines)
            .block(Block::default().borders(Borders::ALL).title("Lending"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, chunks[1]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::Searching(_)) => &[
                ("[type]", "Filter"),
                ("[↑↓]", "Select"),
                ("[Enter]", "Keep"),
                ("[Esc]", "Cancel"),
            ],
            (_, Mode::ConfirmBookRemove(_)) => &[("[y]", "Remove"), ("[n]", "Keep")],
            (_, Mode::AddingBook(_) | Mode::AddingStudent(_) | Mode::Lending(_)) => &[
                ("[Tab]", "Next Field"),
                ("[Enter]", "Save"),
                ("[Esc]", "Cancel"),
            ],
            (Screen::Books(_), Mode::Normal) => &[
                ("[↑↓]", "Select"),
                ("[f]", "Search"),
                ("[+]", "Add"),
                ("[-]", "Remove"),
                ("[b]", "Borrow"),
                ("[r]", "Return"),
                ("[Tab]", "Next View"),
                ("[q]", "Quit"),
            ],
            (Screen::Students(_), Mode::Normal) => &[
                ("[↑↓]", "Select"),
                ("[+]", "Register"),
                ("[b]", "Borrow"),
                ("[r]", "Return"),
                ("[Tab]", "Next View"),
                ("[Esc]", "Books"),
                ("[q]", "Quit"),
            ],
            (Screen::Statistics, Mode::Normal) => &[
                ("[b]", "Borrow"),
                ("[r]", "Return"),
                ("[Tab]", "Next View"),
                ("[Esc]", "Books"),
                ("[q]", "Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (key, label) in hints {
            spans.push(Span::styled(key.to_string(), key_style));
            spans.push(Span::raw(format!(" {label}   ")));
        }
        Line::from(spans)
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    /// Shared modal layout: field rows, a blank line, then the error or the
    /// key hint. The cursor goes after the active field's value.
    fn draw_modal(
        frame: &mut Frame,
        area: Rect,
        title: &str,
        mut lines: Vec<Line<'static>>,
        error: Option<&String>,
        cursor: (u16, u16),
    ) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        lines.push(Line::from(""));
        if let Some(error) = error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (column, row) = cursor;
        frame.set_cursor_position((inner.x + column, inner.y + row));
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let lines = BookField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        let row = BookField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or_default();
        let column = format!("{}: ", form.active.label()).len() + form.value_len(form.active);
        Self::draw_modal(
            frame,
            area,
            "Add Book",
            lines,
            form.error.as_ref(),
            (column as u16, row as u16),
        );
    }

    fn draw_student_form(&self, frame: &mut Frame, area: Rect, form: &StudentForm) {
        let lines = vec![
            form.build_line(StudentField::Id),
            form.build_line(StudentField::Name),
        ];
        let cursor = match form.active {
            StudentField::Id => ("Id: ".len() + form.value_len(StudentField::Id), 0),
            StudentField::Name => ("Name: ".len() + form.value_len(StudentField::Name), 1),
        };
        Self::draw_modal(
            frame,
            area,
            "Register Student",
            lines,
            form.error.as_ref(),
            (cursor.0 as u16, cursor.1),
        );
    }

    fn draw_loan_form(&self, frame: &mut Frame, area: Rect, form: &LoanForm) {
        let lines = vec![
            form.build_line(LoanField::Student),
            form.build_line(LoanField::Title),
        ];
        let cursor = match form.active {
            LoanField::Student => ("Student: ".len() + form.value_len(LoanField::Student), 0),
            LoanField::Title => ("Title: ".len() + form.value_len(LoanField::Title), 1),
        };
        Self::draw_modal(
            frame,
            area,
            form.kind.title(),
            lines,
            form.error.as_ref(),
            (cursor.0 as u16, cursor.1),
        );
    }

    fn draw_confirm_remove(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookRemove) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Remove Book")
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Red));
        let text = vec![
            Line::from(Span::styled(
                format!("{} ({})", confirm.title, confirm.year),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::raw(confirm.authors.clone())),
            Line::from(""),
            Line::from("Remove this book from the catalog? (y/n)"),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::config::AppConfig;
    use crate::models::NewBook;

    fn app() -> App {
        let mut library = Library::from_config(&AppConfig::default()).unwrap();
        library
            .add_book(NewBook::new("1984", ["George Orwell"], 1949, 328))
            .unwrap();
        library
            .add_book(NewBook::new("Dune", ["Frank Herbert"], 1965, 412))
            .unwrap();
        library.add_student(1, "Alice").unwrap();
        App::new(library)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn render(app: &App) {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
    }

    #[test]
    fn add_book_through_the_form() {
        let mut app = app();
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "Emma");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "Jane Austen");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "1815");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "474");
        render(&app);
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.library().catalog().len(), 3);
        assert_eq!(app.status.as_ref().unwrap().text, "Added \"Emma\".");
    }

    #[test]
    fn invalid_form_stays_open_with_error() {
        let mut app = app();
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "No Authors");
        app.handle_key(KeyCode::Enter).unwrap();

        match &app.mode {
            Mode::AddingBook(form) => {
                assert_eq!(form.error.as_deref(), Some("At least one author is required."));
            }
            _ => panic!("form should stay open"),
        }
        render(&app);
        assert_eq!(app.library().catalog().len(), 2);
    }

    #[test]
    fn borrow_prefills_selected_book() {
        let mut app = app();
        app.handle_key(KeyCode::Down).unwrap();
        app.handle_key(KeyCode::Char('b')).unwrap();
        match &app.mode {
            Mode::Lending(form) => {
                assert_eq!(form.title, "Dune");
                assert_eq!(form.active, LoanField::Student);
            }
            _ => panic!("expected the borrow form"),
        }
        type_text(&mut app, "alice");
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(
            app.library().find_book_by_title("Dune").unwrap().borrower(),
            Some("Alice")
        );
        assert_eq!(
            app.status.as_ref().unwrap().text,
            "Alice borrowed \"Dune\" (1 of 3)."
        );
    }

    #[test]
    fn refused_return_reports_the_reason() {
        let mut app = app();
        app.handle_key(KeyCode::Char('r')).unwrap();
        match &app.mode {
            Mode::Lending(form) => assert_eq!(form.title, "1984"),
            _ => panic!("expected the return form"),
        }
        type_text(&mut app, "Alice");
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::Lending(_)));
        assert_eq!(
            app.status.as_ref().unwrap().text,
            "\"1984\" is not currently borrowed"
        );
    }

    #[test]
    fn search_filters_and_reports_count() {
        let mut app = app();
        app.handle_key(KeyCode::Char('f')).unwrap();
        type_text(&mut app, "HERB");
        if let Screen::Books(books) = &app.screen {
            assert_eq!(books.rows, vec![1]);
        }
        render(&app);
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(
            app.status.as_ref().unwrap().text,
            "Found 1 matching book(s) for \"HERB\"."
        );

        app.handle_key(KeyCode::Esc).unwrap();
        if let Screen::Books(books) = &app.screen {
            assert_eq!(books.rows, vec![0, 1]);
        }
    }

    #[test]
    fn remove_confirms_then_deletes() {
        let mut app = app();
        app.handle_key(KeyCode::Char('-')).unwrap();
        assert!(matches!(app.mode, Mode::ConfirmBookRemove(_)));
        render(&app);
        app.handle_key(KeyCode::Char('y')).unwrap();

        assert!(app.library().find_book_by_title("1984").is_none());
        assert_eq!(app.library().catalog().len(), 1);
    }

    #[test]
    fn students_and_statistics_views_render() {
        let mut app = app();
        app.handle_key(KeyCode::Char('2')).unwrap();
        app.handle_key(KeyCode::Char('+')).unwrap();
        match &app.mode {
            Mode::AddingStudent(form) => assert_eq!(form.id, "2"),
            _ => panic!("expected the student form"),
        }
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "Bob");
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.library().roster().len(), 2);
        render(&app);

        app.handle_key(KeyCode::Tab).unwrap();
        assert!(matches!(app.screen, Screen::Statistics));
        render(&app);

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(matches!(app.screen, Screen::Books(_)));
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }
}
