//! Styled terminal output helpers shared by every command handler.

use std::fmt;

use colored::Colorize;

const MAX_COLUMN_WIDTH: usize = 40;
const FALLBACK_TERMINAL_WIDTH: usize = 100;

pub fn info(message: impl fmt::Display) {
    println!("INFO: {message}");
}

pub fn success(message: impl fmt::Display) {
    println!("{}", format!("SUCCESS: {message}").bright_green());
}

pub fn warning(message: impl fmt::Display) {
    println!("{}", format!("WARNING: {message}").bright_yellow());
}

pub fn error(message: impl fmt::Display) {
    println!("{}", format!("ERROR: {message}").bright_red());
}

pub fn section(title: impl fmt::Display) {
    println!("{}", format!("=== {} ===", title).bold());
}

/// Full-page style notice for the respondent's not-found and unavailable
/// states.
pub fn page_notice(message: impl fmt::Display) {
    println!();
    println!("{}", format!("  {}  ", message).bold().bright_red());
    println!();
}

/// Renders rows under their headers with padded columns, clipping each cell
/// to fit the terminal.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().take(columns).enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }
    let cap = column_cap(columns);
    for width in widths.iter_mut() {
        *width = (*width).min(cap);
    }

    let mut out = String::new();
    out.push_str(&format_row(headers, &widths));
    out.push('\n');
    let divider: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    out.push_str(&divider.join("-+-"));
    for row in rows {
        out.push('\n');
        out.push_str(&format_row(row, &widths));
    }
    out
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    println!("{}", render_table(headers, rows));
}

fn column_cap(columns: usize) -> usize {
    let terminal = crossterm::terminal::size()
        .map(|(width, _)| width as usize)
        .unwrap_or(FALLBACK_TERMINAL_WIDTH);
    let padding = columns.saturating_sub(1) * 3;
    let available = terminal.saturating_sub(padding).max(columns);
    (available / columns.max(1)).clamp(8, MAX_COLUMN_WIDTH)
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let rendered: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(idx, width)| {
            let cell = cells.get(idx).map(String::as_str).unwrap_or("");
            let mut value: String = cell.chars().take(*width).collect();
            if cell.chars().count() > *width && *width > 1 {
                value.pop();
                value.push('~');
            }
            format!("{value:<width$}", width = width)
        })
        .collect();
    rendered.join(" | ").trim_end().to_string()
}
