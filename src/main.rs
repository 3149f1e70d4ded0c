//
//  gitlab-client
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use reqwest::StatusCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gitlab_client::api::ApiError;
use gitlab_client::cli::{Cli, Commands};
use gitlab_client::exit_codes;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_code_for(&e));
        }
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let filter = EnvFilter::try_from_env("GLC_DEBUG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Auth(cmd) => cmd.run(&cli.global).await,
        Commands::Tag(cmd) => cmd.run(&cli.global).await,
        Commands::Release(cmd) => cmd.run(&cli.global).await,
        Commands::Project(cmd) => cmd.run(&cli.global).await,
        Commands::User(cmd) => cmd.run(&cli.global).await,
        Commands::Api(cmd) => cmd.run(&cli.global).await,
        Commands::Config(cmd) => cmd.run(&cli.global).await,
        Commands::Completion(cmd) => cmd.run(&cli.global).await,
        Commands::Version => {
            println!("glc version {}", gitlab_client::VERSION);
            Ok(())
        }
    }
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    let Some(api_error) = error.chain().find_map(|e| e.downcast_ref::<ApiError>()) else {
        return exit_codes::ERROR;
    };

    match api_error {
        ApiError::Unauthorized { .. } | ApiError::Auth(_) => exit_codes::AUTH_ERROR,
        e if e.is_not_found() => exit_codes::NOT_FOUND,
        e if e.status() == Some(StatusCode::TOO_MANY_REQUESTS) => exit_codes::RATE_LIMIT,
        _ => exit_codes::ERROR,
    }
}
