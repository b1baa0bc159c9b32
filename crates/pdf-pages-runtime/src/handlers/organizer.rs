use anyhow::Context;
use pdf_pages::{OrganizerStore, assemble, ingest_organizer};
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::view;
use crate::PdfUpdate;
use crate::worker::WorkerState;

fn send_view(store: &OrganizerStore, update_tx: &mpsc::UnboundedSender<PdfUpdate>) {
    let _ = update_tx.send(PdfUpdate::OrganizerChanged {
        view: view(&store.collection, |page| page.page_index),
    });
}

pub async fn handle_add_files(
    paths: Vec<PathBuf>,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) -> anyhow::Result<()> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in &paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        documents.push(bytes);
    }

    let ctx = state.operation_context(update_tx);
    let added = ingest_organizer(&mut state.organizer, documents, &ctx)
        .await
        .context("Failed to load PDF")?;
    log::info!("Loaded {} pages from {} files", added, paths.len());

    send_view(&state.organizer, update_tx);
    Ok(())
}

/// Apply a synchronous edit and publish the new state
pub fn handle_edit(
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
    edit: impl FnOnce(&mut OrganizerStore) -> pdf_pages::Result<()>,
) -> anyhow::Result<()> {
    edit(&mut state.organizer).context("Edit failed")?;
    send_view(&state.organizer, update_tx);
    Ok(())
}

pub async fn handle_save(
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) -> anyhow::Result<()> {
    let ctx = state.operation_context(update_tx);
    match assemble(&state.organizer.collection, &ctx)
        .await
        .context("Failed to save PDF")?
    {
        Some(delivery) => {
            let _ = update_tx.send(PdfUpdate::Deliver { delivery });
        }
        None => log::info!("Nothing to save"),
    }
    Ok(())
}
