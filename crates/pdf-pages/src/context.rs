use crate::options::ToolOptions;
use crate::raster::Rasterizer;
use crate::types::*;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type ProgressFn = dyn Fn(Progress) + Send + Sync;

/// Collaborators and settings shared by every long-running operation
#[derive(Clone, Default)]
pub struct EngineContext {
    pub options: ToolOptions,
    rasterizer: Option<Arc<dyn Rasterizer>>,
    progress: Option<Arc<ProgressFn>>,
    cancel: CancellationToken,
}

impl EngineContext {
    pub fn new(options: ToolOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn with_progress(mut self, progress: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn rasterizer(&self) -> Option<&Arc<dyn Rasterizer>> {
        self.rasterizer.as_ref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Options are public, so every long operation re-checks them first
    pub(crate) fn begin(&self) -> Result<()> {
        self.options.validate()?;
        self.check_cancelled()
    }

    pub(crate) fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(PagesError::Cancelled);
        }
        Ok(())
    }

    pub(crate) fn report(&self, operation: &'static str, current: usize, total: usize) {
        log::debug!("{}: {}/{}", operation, current, total);
        if let Some(progress) = &self.progress {
            progress(Progress {
                operation,
                current,
                total,
            });
        }
    }

    /// Report only on stride boundaries and at completion
    pub(crate) fn report_stride(&self, operation: &'static str, current: usize, total: usize) {
        if self.options.report_due(current, total) {
            self.report(operation, current, total);
        }
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("options", &self.options)
            .field("rasterizer", &self.rasterizer.is_some())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
