//
//  gitlab-client
//  cli/completion.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Shell completion commands

use std::io::Write;

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use super::{Cli, GlobalOptions};

/// Generate shell completion scripts
#[derive(Args, Debug)]
#[command(after_help = "Examples:\n  \
    glc completion bash > /etc/bash_completion.d/glc\n  \
    glc completion zsh > \"${fpath[1]}/_glc\"\n  \
    glc completion fish > ~/.config/fish/completions/glc.fish")]
pub struct CompletionCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionCommand {
    pub async fn run(&self, _global: &GlobalOptions) -> Result<()> {
        write_completions(self.shell, &mut std::io::stdout());
        Ok(())
    }
}

/// Writes the completion script for `shell` to `out`.
fn write_completions<W: Write>(shell: Shell, out: &mut W) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, crate::APP_NAME, out);
}
