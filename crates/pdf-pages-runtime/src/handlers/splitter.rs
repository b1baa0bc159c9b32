use anyhow::Context;
use pdf_pages::{SplitDirection, SplitterStore, ingest_splitter, split_spreads};
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::view;
use crate::PdfUpdate;
use crate::worker::WorkerState;

fn send_view(store: &SplitterStore, update_tx: &mpsc::UnboundedSender<PdfUpdate>) {
    let _ = update_tx.send(PdfUpdate::SplitterChanged {
        view: view(&store.collection, |page| page.page_index),
    });
}

pub async fn handle_load(
    path: PathBuf,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let ctx = state.operation_context(update_tx);
    ingest_splitter(&mut state.splitter, bytes, &ctx)
        .await
        .context("Failed to load PDF")?;

    send_view(&state.splitter, update_tx);
    Ok(())
}

pub fn handle_edit(
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
    edit: impl FnOnce(&mut SplitterStore) -> pdf_pages::Result<()>,
) -> anyhow::Result<()> {
    edit(&mut state.splitter).context("Edit failed")?;
    send_view(&state.splitter, update_tx);
    Ok(())
}

pub async fn handle_split(
    direction: SplitDirection,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) -> anyhow::Result<()> {
    let ctx = state.operation_context(update_tx);
    match split_spreads(&state.splitter, direction, &ctx)
        .await
        .context("Split failed")?
    {
        Some(delivery) => {
            let _ = update_tx.send(PdfUpdate::Deliver { delivery });
        }
        None => log::info!("No pages to split"),
    }
    Ok(())
}
