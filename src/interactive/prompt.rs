//
//  gitlab-client
//  interactive/prompt.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Interactive Prompts Module
//!
//! Wraps `dialoguer` for text input, password entry, confirmations and
//! editing release notes in an external editor.
//!
//! # Example
//!
//! ```no_run
//! use gitlab_client::interactive::{prompt_confirm, prompt_input, prompt_password};
//!
//! let username = prompt_input("Username").unwrap();
//! let password = prompt_password("Password").unwrap();
//! if prompt_confirm("Log in?", true).unwrap() {
//!     println!("Logging in as {}", username);
//! }
//! # drop(password);
//! ```

use anyhow::Result;
use dialoguer::{Confirm, Editor, Input, Password};

use crate::auth::SecretValue;

pub fn prompt_input(message: &str) -> Result<String> {
    let input: String = Input::new().with_prompt(message).interact_text()?;
    Ok(input)
}

pub fn prompt_input_with_default(message: &str, default: &str) -> Result<String> {
    let input: String = Input::new()
        .with_prompt(message)
        .default(default.to_string())
        .interact_text()?;
    Ok(input)
}

/// Prompts for a password or token without echoing it.
///
/// The entered value moves straight into a [`SecretValue`].
pub fn prompt_password(message: &str) -> Result<SecretValue> {
    let password = Password::new().with_prompt(message).interact()?;
    Ok(SecretValue::new(password))
}

pub fn prompt_confirm(message: &str, default: bool) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()?;
    Ok(confirmed)
}

/// Opens the user's editor; `None` if the file was saved unchanged or empty.
pub fn prompt_editor(initial: Option<&str>) -> Result<Option<String>> {
    let mut editor = Editor::new();
    editor.executable(get_editor());
    let result = editor.edit(initial.unwrap_or(""))?;
    Ok(result.filter(|text| !text.trim().is_empty()))
}

/// The editor command: `GLC_EDITOR`, then `VISUAL`, then `EDITOR`.
pub fn get_editor() -> String {
    std::env::var("GLC_EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string())
}
