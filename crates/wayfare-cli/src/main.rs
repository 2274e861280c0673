// SPDX-License-Identifier: AGPL-3.0
// Wayfare CLI - Main entry point

mod args;
mod commands;
mod state;

use args::{Cli, Command, GalleryCommand};
use clap::Parser;
use state::AppState;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wayfare_cli=info".parse().unwrap())
                .add_directive("wayfare_core=info".parse().unwrap()),
        )
        .init();

    tracing::info!("Starting Wayfare CLI v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    let state = match AppState::new() {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize application state: {}", e);
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Login { email, password } => commands::login(&state, &email, &password).await,
        Command::Logout => commands::logout(&state),
        Command::List => commands::list(&state).await,
        Command::Watch => commands::watch(&state).await,
        Command::Add {
            name,
            description,
            image,
        } => commands::add(&state, name, description, image).await,
        Command::Delete { id } => commands::delete(&state, &id).await,
        Command::DeleteByName { name } => commands::delete_by_name(&state, &name).await,
        Command::Gallery { command } => match command {
            GalleryCommand::List => commands::gallery_list(&state),
            GalleryCommand::Import { path } => commands::gallery_import(&state, path).await,
        },
    };

    state.destinations.shutdown();

    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
