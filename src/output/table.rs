//
//  gitlab-client
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Table Output Formatting
//!
//! Builds terminal tables with `comfy_table`.
//!
//! ```rust,ignore
//! use gitlab_client::output::TableBuilder;
//!
//! TableBuilder::new()
//!     .headers(["Name", "Commit"])
//!     .row(["v1.0.0", "2695effb"])
//!     .print();
//! ```

use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Builder for a table with a header row.
pub struct TableBuilder {
    table: Table,
    color: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            table: create_table(),
            color: console::colors_enabled(),
        }
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(|s| s.into()).collect();
        if self.color {
            let cells: Vec<Cell> = headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect();
            self.table.set_header(cells);
        } else {
            self.table.set_header(headers);
        }
        self
    }

    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(|s| s.into()).collect();
        self.table.add_row(row);
        self
    }

    pub fn rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            let row: Vec<String> = row.into_iter().map(|s| s.into()).collect();
            self.table.add_row(row);
        }
        self
    }

    pub fn print(self) {
        println!("{}", self.table);
    }

    pub fn build(self) -> Table {
        self.table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Colors a user or token state.
pub fn format_state(state: &str, color: bool) -> String {
    if !color {
        return state.to_string();
    }

    use console::style;
    match state.to_lowercase().as_str() {
        "active" | "valid" => style(state).green().to_string(),
        "blocked" | "banned" | "expired" => style(state).red().to_string(),
        "deactivated" | "blocked_pending_approval" => style(state).yellow().to_string(),
        _ => state.to_string(),
    }
}

pub fn format_bool(value: bool, color: bool) -> String {
    if color {
        use console::style;
        if value {
            style("Yes").green().to_string()
        } else {
            style("No").dim().to_string()
        }
    } else if value {
        "Yes".to_string()
    } else {
        "No".to_string()
    }
}

/// Formats an optional timestamp as `YYYY-MM-DD HH:MM`, `-` when absent.
pub fn format_time(value: Option<&DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Truncates to `max_len` characters, ending with `...` when shortened.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    } else {
        s.chars().take(max_len).collect()
    }
}

/// First line of a possibly multi-line text.
pub fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long release name", 10), "a long ...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }

    #[test]
    fn test_format_without_color() {
        assert_eq!(format_bool(true, false), "Yes");
        assert_eq!(format_state("blocked", false), "blocked");
        assert_eq!(format_time(None), "-");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("## Changes\n- one"), "## Changes");
        assert_eq!(first_line(""), "");
    }
}
