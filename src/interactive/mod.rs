//
//  gitlab-client
//  interactive/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Interactive Terminal Components
//!
//! - [`prompt`]: Text, password and confirmation prompts, external editor
//! - [`selector`]: Selection menus and terminal detection

pub mod prompt;
pub mod selector;

pub use prompt::*;
pub use selector::*;
