use anyhow::Context;
use pdf_pages::export_images;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::file_name;
use crate::PdfUpdate;
use crate::worker::WorkerState;

pub async fn handle_export(
    path: PathBuf,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) -> anyhow::Result<()> {
    let bytes: Arc<[u8]> = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?
        .into();

    let ctx = state.operation_context(update_tx);
    match export_images(bytes, &file_name(&path), &ctx)
        .await
        .context("Export failed")?
    {
        Some(delivery) => {
            let _ = update_tx.send(PdfUpdate::Deliver { delivery });
        }
        None => log::info!("{} has no pages to export", path.display()),
    }
    Ok(())
}
