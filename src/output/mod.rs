//
//  gitlab-client
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Formatting for `glc` command results:
//!
//! - **Table format**: Human-readable output for interactive terminal use
//! - **JSON format**: Machine-readable output for scripting (`--json`)
//!
//! ## Core Components
//!
//! - [`OutputWriter`]: Main entry point for writing formatted output
//! - [`TableOutput`]: Detail view of a single resource
//! - [`TableRow`]: One row of a resource list
//!
//! ## Example
//!
//! ```rust,ignore
//! use gitlab_client::output::{OutputFormat, OutputWriter};
//!
//! let writer = OutputWriter::new(OutputFormat::Json);
//! writer.write_list(&tags)?;
//! writer.write_success("Tag deleted");
//! ```

mod json;
mod resources;
mod table;

pub use json::*;
pub use table::*;

use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Writes command results in the selected format.
///
/// Status messages (`write_success`, `write_warning`, ...) are suppressed in
/// JSON mode on stdout so the output stays parseable; errors and warnings
/// always go to stderr.
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    pub fn from_json_flag(json: bool) -> Self {
        Self::new(if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        })
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Writes a single resource.
    pub fn write<T: Serialize + TableOutput>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(value),
            OutputFormat::Table => {
                value.print_table(self.color);
                Ok(())
            }
        }
    }

    /// Writes a list of resources as one table.
    pub fn write_list<T: Serialize + TableRow>(&self, values: &[T]) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(&values),
            OutputFormat::Table => {
                if values.is_empty() {
                    self.write_info("No results");
                    return Ok(());
                }
                TableBuilder::new()
                    .color(self.color)
                    .headers(T::HEADERS.iter().copied())
                    .rows(values.iter().map(|v| v.row(self.color)))
                    .print();
                Ok(())
            }
        }
    }

    pub fn write_error(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("error:").red().bold(), msg);
        } else {
            eprintln!("error: {}", msg);
        }
    }

    pub fn write_warning(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    pub fn write_info(&self, msg: &str) {
        if !self.is_json() {
            println!("{}", msg);
        }
    }

    pub fn write_success(&self, msg: &str) {
        use console::style;
        if self.is_json() {
            return;
        }
        if self.color {
            println!("{} {}", style("✓").green().bold(), msg);
        } else {
            println!("✓ {}", msg);
        }
    }
}

/// Detail view of a single resource.
pub trait TableOutput {
    fn print_table(&self, color: bool);
}

/// A resource that can appear as one row in a list table.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn row(&self, color: bool) -> Vec<String>;
}

pub fn print_header(text: &str) {
    use console::style;
    println!("{}", style(text).bold());
    println!("{}", "-".repeat(text.chars().count()));
}

pub fn print_field(key: &str, value: &str, color: bool) {
    use console::style;
    if color {
        println!("{}: {}", style(key).dim(), value);
    } else {
        println!("{}: {}", key, value);
    }
}

/// Prints a field only when it has a value.
pub fn print_optional_field(key: &str, value: Option<&str>, color: bool) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        print_field(key, value, color);
    }
}
