//
//  gitlab-client
//  interactive/selector.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Selection menus built on `dialoguer::Select`.

use anyhow::Result;
use dialoguer::Select;

/// Prompts the user to pick one item, starting at `default`.
///
/// # Returns
///
/// The zero-based index of the chosen item.
///
/// # Example
///
/// ```no_run
/// use gitlab_client::interactive::select_with_default;
///
/// let methods = ["Personal access token", "Username and password"];
/// let idx = select_with_default("How would you like to log in?", &methods, 0).unwrap();
/// ```
pub fn select_with_default<T: ToString>(message: &str, items: &[T], default: usize) -> Result<usize> {
    let selection = Select::new()
        .with_prompt(message)
        .items(items)
        .default(default)
        .interact()?;
    Ok(selection)
}

/// Whether stdin and stdout are attached to a terminal.
///
/// Commands fall back to flags instead of prompting when this is false.
pub fn is_interactive() -> bool {
    console::user_attended() && console::Term::stdout().is_term()
}
