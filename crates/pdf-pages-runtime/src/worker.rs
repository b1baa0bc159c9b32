use pdf_pages::{EngineContext, OrganizerStore, SplitterStore, ToolOptions};
use tokio::sync::mpsc;

use crate::{CancelSwitch, PdfCommand, PdfUpdate, handlers};

/// Engine context for a host, with the pdfium renderer when it can be bound.
///
/// Without a renderer previews stay empty and image export reports an error.
pub fn engine_context(options: ToolOptions) -> EngineContext {
    with_renderer(EngineContext::new(options))
}

#[cfg(feature = "pdfium")]
fn with_renderer(ctx: EngineContext) -> EngineContext {
    match pdf_pages::raster::PdfiumRasterizer::new() {
        Ok(rasterizer) => ctx.with_rasterizer(std::sync::Arc::new(rasterizer)),
        Err(e) => {
            log::warn!("PDF renderer unavailable: {}", e);
            ctx
        }
    }
}

#[cfg(not(feature = "pdfium"))]
fn with_renderer(ctx: EngineContext) -> EngineContext {
    log::warn!("Built without a PDF renderer, previews will be empty");
    ctx
}

/// Everything the worker owns between commands
pub(crate) struct WorkerState {
    pub ctx: EngineContext,
    pub organizer: OrganizerStore,
    pub splitter: SplitterStore,
    cancel: CancelSwitch,
}

impl WorkerState {
    /// Context for one long-running command: progress goes to the UI and the
    /// cancel switch is armed with a fresh token.
    pub fn operation_context(&self, update_tx: &mpsc::UnboundedSender<PdfUpdate>) -> EngineContext {
        let progress_tx = update_tx.clone();
        self.ctx
            .clone()
            .with_cancellation(self.cancel.arm())
            .with_progress(move |progress| {
                let _ = progress_tx.send(PdfUpdate::Progress {
                    operation: progress.operation.to_string(),
                    current: progress.current,
                    total: progress.total,
                });
            })
    }
}

/// Async worker task that processes PDF commands and sends updates.
///
/// The organizer and splitter stores live exactly as long as this task.
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<PdfCommand>,
    update_tx: mpsc::UnboundedSender<PdfUpdate>,
    ctx: EngineContext,
    cancel: CancelSwitch,
) {
    let mut state = WorkerState {
        ctx,
        organizer: OrganizerStore::new(),
        splitter: SplitterStore::new(),
        cancel,
    };

    while let Some(cmd) = command_rx.recv().await {
        if let Err(e) = process_command(cmd, &mut state, &update_tx).await {
            log::error!("{:#}", e);
            let _ = update_tx.send(PdfUpdate::Error {
                message: format!("{:#}", e),
            });
        }
    }

    log::debug!("Command channel closed, worker exiting");
}

async fn process_command(
    cmd: PdfCommand,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) -> anyhow::Result<()> {
    use handlers::{config, export, organizer, splitter};

    match cmd {
        PdfCommand::OrganizerAddFiles { paths } => {
            organizer::handle_add_files(paths, state, update_tx).await
        }
        PdfCommand::OrganizerMove { from, to } => {
            organizer::handle_edit(state, update_tx, |store| {
                store.collection.move_page(from, to)
            })
        }
        PdfCommand::OrganizerClick { index, shift } => {
            organizer::handle_edit(state, update_tx, |store| {
                store.collection.click(index, shift)
            })
        }
        PdfCommand::OrganizerSelectAll => organizer::handle_edit(state, update_tx, |store| {
            store.collection.select_all();
            Ok(())
        }),
        PdfCommand::OrganizerDeselectAll => organizer::handle_edit(state, update_tx, |store| {
            store.collection.deselect_all();
            Ok(())
        }),
        PdfCommand::OrganizerDeleteSelected => {
            organizer::handle_edit(state, update_tx, |store| {
                let removed = store.delete_selected();
                log::info!("Deleted {} pages", removed);
                Ok(())
            })
        }
        PdfCommand::OrganizerRemove { index } => {
            organizer::handle_edit(state, update_tx, |store| store.remove_at(index))
        }
        PdfCommand::OrganizerReverse => {
            let clear_selection = state.ctx.options.clear_selection_on_reverse;
            organizer::handle_edit(state, update_tx, |store| {
                store.reverse_all(clear_selection);
                Ok(())
            })
        }
        PdfCommand::OrganizerSave => organizer::handle_save(state, update_tx).await,
        PdfCommand::OrganizerReset => organizer::handle_edit(state, update_tx, |store| {
            store.reset();
            Ok(())
        }),
        PdfCommand::SplitterLoad { path } => splitter::handle_load(path, state, update_tx).await,
        PdfCommand::SplitterToggle { index } => {
            splitter::handle_edit(state, update_tx, |store| store.toggle_split(index))
        }
        PdfCommand::SplitterFlagAll => splitter::handle_edit(state, update_tx, |store| {
            store.flag_all();
            Ok(())
        }),
        PdfCommand::SplitterFlagNone => splitter::handle_edit(state, update_tx, |store| {
            store.flag_none();
            Ok(())
        }),
        PdfCommand::SplitterSplit { direction } => {
            splitter::handle_split(direction, state, update_tx).await
        }
        PdfCommand::SplitterReset => splitter::handle_edit(state, update_tx, |store| {
            store.reset();
            Ok(())
        }),
        PdfCommand::ExportImages { path } => export::handle_export(path, state, update_tx).await,
        PdfCommand::LoadConfig { path } => config::handle_load(path, state, update_tx).await,
        PdfCommand::SetOptions { options } => config::handle_set(options, state, update_tx),
    }
}
