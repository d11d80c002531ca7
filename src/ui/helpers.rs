use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::error::LibraryError;
use crate::models::{Book, Student};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error. Bookkeeping
/// bugs get a prefix so they never read like an ordinary refusal.
pub(crate) fn surface_error(err: &Error) -> String {
    let message = err
        .chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string());
    if is_internal(err) {
        format!("Internal error: {message}")
    } else {
        message
    }
}

/// Whether any cause in the chain is a library bookkeeping bug.
pub(crate) fn is_internal(err: &Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<LibraryError>())
        .any(LibraryError::is_internal)
}

/// Render an optional figure, spelling out the empty case.
pub(crate) fn figure_or_no_data<T, F>(value: Option<T>, render: F) -> String
where
    F: FnOnce(T) -> String,
{
    value.map(render).unwrap_or_else(|| "no data".to_string())
}

/// One `label: value` row for the statistics panels.
pub(crate) fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label:<24}"),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
    ])
}

/// Detail lines for the selected book.
pub(crate) fn book_detail_lines(book: &Book) -> Vec<Line<'static>> {
    let status_style = if book.is_available() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let author_label = if book.authors.len() == 1 {
        "Author"
    } else {
        "Authors"
    };

    vec![
        Line::from(Span::styled(
            book.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        stat_line(author_label, book.author_line()),
        stat_line("Year", book.year.to_string()),
        stat_line("Pages", book.pages.to_string()),
        Line::from(vec![
            Span::styled(format!("{:<24}", "Status"), Style::default().fg(Color::Gray)),
            Span::styled(book.status.label(), status_style),
        ]),
    ]
}

/// Detail lines for the selected student, loans included.
pub(crate) fn student_detail_lines(student: &Student) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            student.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        stat_line("Student id", student.id.to_string()),
        stat_line(
            "Loans",
            format!("{} of {}", student.borrowed.len(), student.max_books),
        ),
        Line::from(""),
    ];

    if student.borrowed.is_empty() {
        lines.push(Line::from(Span::styled(
            "No books borrowed.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from("Borrowed books:"));
        for (index, title) in student.borrowed.iter().enumerate() {
            lines.push(Line::from(format!("  {}. {title}", index + 1)));
        }
    }
    lines
}
