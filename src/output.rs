//! Result types returned by the generation entry points.

use crate::error::RecordWarning;
use crate::layout::DrawPlan;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything produced by one batch.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// One entry per record, in input order.
    pub pages: Vec<PageResult>,
    pub stats: GenerationStats,
}

impl GenerationOutput {
    /// All record warnings, in page order.
    pub fn warnings(&self) -> impl Iterator<Item = &RecordWarning> {
        self.pages.iter().flat_map(|p| p.warnings.iter())
    }
}

/// One rendered card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 0-based input position.
    pub index: usize,
    /// 1-based page number in the output document.
    pub page_num: usize,
    /// Primary name as read, for display.
    pub recipient: String,
    pub plan: DrawPlan,
    pub warnings: Vec<RecordWarning>,
    /// Pixel size of the rendered page.
    pub width: u32,
    pub height: u32,
    /// Path of the exported PNG, when page export is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    /// JPEG stream embedded in the PDF.
    #[serde(skip)]
    pub jpeg: Vec<u8>,
}

/// Counters and timings for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub total_records: usize,
    pub rendered_pages: usize,
    /// Records whose postal code was omitted.
    pub zip_omitted: usize,
    pub warning_count: usize,
    pub total_duration_ms: u64,
    pub render_duration_ms: u64,
}

impl GenerationStats {
    pub(crate) fn from_pages(pages: &[PageResult]) -> Self {
        Self {
            total_records: pages.len(),
            rendered_pages: pages.len(),
            zip_omitted: pages.iter().filter(|p| p.plan.zip.is_empty()).count(),
            warning_count: pages.iter().map(|p| p.warnings.len()).sum(),
            ..Default::default()
        }
    }
}
