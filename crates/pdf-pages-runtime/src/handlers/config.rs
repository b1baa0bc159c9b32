use anyhow::Context;
use pdf_pages::ToolOptions;
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::PdfUpdate;
use crate::worker::WorkerState;

pub async fn handle_load(
    path: PathBuf,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) -> anyhow::Result<()> {
    let options = ToolOptions::load(&path)
        .await
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    apply(options, state, update_tx);
    Ok(())
}

pub fn handle_set(
    options: ToolOptions,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) -> anyhow::Result<()> {
    options.validate().context("Invalid options")?;
    apply(options, state, update_tx);
    Ok(())
}

fn apply(options: ToolOptions, state: &mut WorkerState, update_tx: &mpsc::UnboundedSender<PdfUpdate>) {
    log::info!("Options updated");
    state.ctx.options = options.clone();
    let _ = update_tx.send(PdfUpdate::ConfigLoaded { options });
}
