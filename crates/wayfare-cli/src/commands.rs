// SPDX-License-Identifier: AGPL-3.0
// Wayfare CLI - Subcommand handlers

use crate::state::AppState;
use std::path::PathBuf;
use wayfare_core::{AppError, Destination, DestinationUpdate, ImageSource, NewDestination};

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<(), AppError> {
    let session = state.auth.sign_in(email, password).await?;
    state.session.store(session.clone())?;
    println!("Signed in as {}", session.email);
    Ok(())
}

pub fn logout(state: &AppState) -> Result<(), AppError> {
    state.session.clear()?;
    println!("Signed out");
    Ok(())
}

pub async fn list(state: &AppState) -> Result<(), AppError> {
    state.require_session()?;

    let mut subscription = state.destinations.subscribe();
    loop {
        match subscription.recv().await {
            Some(DestinationUpdate::Snapshot(destinations)) => {
                print_destinations(&destinations);
                break;
            }
            Some(DestinationUpdate::ListenError(reason)) => {
                return Err(AppError::RemoteListen(reason));
            }
            None => break,
        }
    }
    subscription.cancel();
    Ok(())
}

pub async fn watch(state: &AppState) -> Result<(), AppError> {
    state.require_session()?;
    println!("Watching destinations, Ctrl-C to stop");

    let mut subscription = state.destinations.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = subscription.recv() => match update {
                Some(DestinationUpdate::Snapshot(destinations)) => {
                    println!("--- {} destination(s) ---", destinations.len());
                    print_destinations(&destinations);
                }
                Some(DestinationUpdate::ListenError(reason)) => {
                    eprintln!("warning: listener failed, view may be stale: {}", reason);
                }
                None => break,
            },
        }
    }
    subscription.cancel();
    Ok(())
}

pub async fn add(
    state: &AppState,
    name: String,
    description: String,
    image: PathBuf,
) -> Result<(), AppError> {
    state.require_session()?;

    let stored = state
        .orchestrator
        .add_destination(NewDestination {
            name,
            description,
            source: ImageSource::File(image),
        })
        .await?;

    println!("Added {} ({})", stored.name, stored.id);
    Ok(())
}

pub async fn delete(state: &AppState, id: &str) -> Result<(), AppError> {
    state.require_session()?;
    state.destinations.delete(id).await?;
    println!("Deleted {}", id);
    Ok(())
}

pub async fn delete_by_name(state: &AppState, name: &str) -> Result<(), AppError> {
    state.require_session()?;
    let deleted = state.destinations.delete_by_name(name).await?;
    println!("Deleted {} destination(s) named {:?}", deleted, name);
    Ok(())
}

pub fn gallery_list(state: &AppState) -> Result<(), AppError> {
    let records = state.images.all_images();
    if records.is_empty() {
        println!("Gallery is empty");
        return Ok(());
    }

    for record in records {
        println!(
            "{:>4}  {}  {}",
            record.id,
            record.added_at.format("%Y-%m-%d %H:%M"),
            record.local_path.display()
        );
    }
    Ok(())
}

pub async fn gallery_import(state: &AppState, path: PathBuf) -> Result<(), AppError> {
    let local_path = state.materializer.materialize_from_file(&path).await?;
    let record = state.images.insert(&local_path)?;
    println!("Imported as #{}: {}", record.id, record.local_path.display());
    Ok(())
}

fn print_destinations(destinations: &[Destination]) {
    if destinations.is_empty() {
        println!("No destinations yet");
        return;
    }

    for destination in destinations {
        println!("{} ({})", destination.name, destination.id);
        println!("    {}", destination.description);
        if let Some(image_ref) = &destination.image_ref {
            println!("    photo: {}", image_ref);
        }
    }
}
