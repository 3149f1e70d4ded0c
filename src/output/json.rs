//
//  gitlab-client
//  output/json.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # JSON Output Formatting
//!
//! Pretty-printed JSON for `--json` and `glc api`. Secrets never reach this
//! layer: token types serialize through explicit `serialize_with` helpers
//! and the CLI only writes resource models.

use std::io::{self, Write};

use serde::Serialize;

/// Writes pretty-printed JSON to stdout.
pub fn write_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json_to(&mut handle, value)
}

/// Writes pretty-printed JSON followed by a newline.
pub fn write_json_to<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Pretty-prints a raw response body, passing non-JSON through unchanged.
pub fn pretty_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string()),
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_to_buffer() {
        let mut buffer = Vec::new();
        write_json_to(&mut buffer, &serde_json::json!({"name": "v1.0.0"})).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "{\n  \"name\": \"v1.0.0\"\n}\n");
    }

    #[test]
    fn test_pretty_body() {
        assert_eq!(pretty_body(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
        assert_eq!(pretty_body("plain text"), "plain text");
    }
}
