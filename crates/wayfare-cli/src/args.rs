// SPDX-License-Identifier: AGPL-3.0
// Wayfare CLI - Argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wayfare", version, about = "Travel destination journal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in with an email/password pair
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Print the current destination set once
    List,
    /// Stream live destination snapshots until Ctrl-C
    Watch,
    /// Add a destination with a photo
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// Path of the picked image file
        #[arg(long)]
        image: PathBuf,
    },
    /// Delete one destination by its id
    Delete { id: String },
    /// Delete every destination whose name matches (legacy bulk path)
    DeleteByName { name: String },
    /// Local photo gallery
    Gallery {
        #[command(subcommand)]
        command: GalleryCommand,
    },
}

#[derive(Subcommand)]
pub enum GalleryCommand {
    /// List all gallery photos
    List,
    /// Copy an image into the gallery
    Import { path: PathBuf },
}
