use crate::constants::*;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunables shared by every tool
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ToolOptions {
    // Previews
    pub thumbnail_scale: f32,
    pub thumbnail_quality: u8,

    // Image export
    pub export_scale: f32,
    pub export_quality: u8,
    pub export_batch_size: usize,

    // Progress reporting
    pub progress_stride: usize,

    // Output naming
    pub output_prefix: String,

    // Editing
    pub clear_selection_on_reverse: bool,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            thumbnail_scale: THUMBNAIL_SCALE,
            thumbnail_quality: THUMBNAIL_QUALITY,
            export_scale: EXPORT_SCALE,
            export_quality: EXPORT_QUALITY,
            export_batch_size: EXPORT_BATCH_SIZE,
            progress_stride: PROGRESS_STRIDE,
            output_prefix: OUTPUT_PREFIX.to_string(),
            clear_selection_on_reverse: false,
        }
    }
}

impl ToolOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| PagesError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PagesError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if !(self.thumbnail_scale > 0.0) {
            return Err(PagesError::Config(
                "Thumbnail scale must be positive".to_string(),
            ));
        }
        if !(self.export_scale > 0.0) {
            return Err(PagesError::Config("Export scale must be positive".to_string()));
        }
        for (label, quality) in [
            ("Thumbnail", self.thumbnail_quality),
            ("Export", self.export_quality),
        ] {
            if !(1..=100).contains(&quality) {
                return Err(PagesError::Config(format!(
                    "{} quality must be between 1 and 100, got {}",
                    label, quality
                )));
            }
        }
        if self.export_batch_size == 0 {
            return Err(PagesError::Config(
                "Export batch size must be at least 1".to_string(),
            ));
        }
        if self.progress_stride == 0 {
            return Err(PagesError::Config(
                "Progress stride must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn organized_filename(&self) -> String {
        format!("{}_Organized.pdf", self.output_prefix)
    }

    pub fn split_filename(&self) -> String {
        format!("{}_Split_Result.pdf", self.output_prefix)
    }

    pub fn archive_filename(&self, name: &str) -> String {
        format!("{}_{}.zip", self.output_prefix, name)
    }

    /// Whether a progress report is due after `done` pages
    pub(crate) fn report_due(&self, done: usize, total: usize) -> bool {
        done == total || done % self.progress_stride == 0
    }
}
