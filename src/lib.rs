mod assets;
mod block;
mod debug;
mod error;
mod heuristic;
mod measure;
mod metrics;
mod page_label;
mod plan;
mod reconcile;
mod render;
mod split;
mod types;

pub use assets::AssetStore;
pub use block::{
    BlockId, BlockKind, ContentBlock, FIXED_SECTION_NOMINAL_LENGTH, VISUAL_NOMINAL_LENGTH,
    VisualComponentKind,
};
use debug::DebugLogger;
pub use error::{PageBoundError, Result};
pub use heuristic::{HeuristicPolicy, page_count, plan_pages};
pub use measure::{MeasuredBlock, MeasuredDoc};
pub use metrics::{ExportMetrics, PageMetrics};
pub use page_label::{DEFAULT_HEADER_TEMPLATE, substitute_label};
pub use plan::{PageBreakPlan, PageSlot};
pub use reconcile::{ReconcileReport, content_agrees, reconcile};
pub use render::{BlockRenderer, Fragment, RenderedBlock, RenderedDoc};
pub use split::{PageItem, PageRender, PageSet};
pub use types::{PageGeometry, Px, Size};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Export rasterizer seam. The engine hands over the restructured page
/// set; the rasterizer renders each page's item list to one fixed-height
/// bitmap slice and assembles the multi-page output.
pub trait Rasterizer {
    type Output;

    fn rasterize(&mut self, pages: &PageSet) -> Result<Self::Output>;
}

/// Everything one export run produces before rasterization: the
/// restructured pages, the authoritative plan, and run telemetry.
#[derive(Debug, Clone)]
pub struct ExportBuild {
    pub pages: PageSet,
    pub plan: PageBreakPlan,
    pub metrics: ExportMetrics,
}

/// Facade over both pagination passes, configured once per document
/// theme/geometry combination and reused across preview edits and
/// exports.
#[derive(Debug)]
pub struct PageEngine {
    geometry: PageGeometry,
    policy: HeuristicPolicy,
    header_template: String,
    debug: Option<Arc<DebugLogger>>,
}

#[derive(Clone)]
pub struct PageEngineBuilder {
    geometry: PageGeometry,
    policy: HeuristicPolicy,
    header_template: String,
    diagnostics_path: Option<PathBuf>,
}

impl Default for PageEngineBuilder {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            policy: HeuristicPolicy::default(),
            header_template: DEFAULT_HEADER_TEMPLATE.to_string(),
            diagnostics_path: None,
        }
    }
}

impl PageEngineBuilder {
    pub fn geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn policy(mut self, policy: HeuristicPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Repeated-header template; `{title}`, `{page}` and `{pages}` are
    /// substituted per page.
    pub fn header_template(mut self, template: impl Into<String>) -> Self {
        self.header_template = template.into();
        self
    }

    /// Write JSON-lines pagination diagnostics (page-break triggers,
    /// overflow, measurement gaps) to the given file.
    pub fn diagnostics_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.diagnostics_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<PageEngine> {
        let g = self.geometry;
        if !g.page_height_px.is_positive() {
            return Err(PageBoundError::InvalidGeometry(
                "page height must be positive".to_string(),
            ));
        }
        if !g.content_capacity().is_positive() {
            return Err(PageBoundError::InvalidGeometry(format!(
                "header ({}) and footer reserve ({}) leave no room on a {} px page",
                g.header_height_px.to_f32(),
                g.footer_reserve_px.to_f32(),
                g.page_height_px.to_f32()
            )));
        }
        let debug = match self.diagnostics_path {
            Some(path) => Some(Arc::new(DebugLogger::new(path)?)),
            None => None,
        };
        Ok(PageEngine {
            geometry: self.geometry,
            policy: self.policy,
            header_template: self.header_template,
            debug,
        })
    }
}

impl PageEngine {
    pub fn builder() -> PageEngineBuilder {
        PageEngineBuilder::default()
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Heuristic pass: content-derived page assignment for on-screen
    /// preview. Synchronous, deterministic, side-effect-free; cheap
    /// enough to re-run on every content edit.
    pub fn compute_preview_plan(&self, blocks: &[ContentBlock]) -> PageBreakPlan {
        heuristic::plan_pages(blocks, &self.policy)
    }

    /// Page-count estimate backing "page N of M" badges.
    pub fn preview_page_count(&self, blocks: &[ContentBlock]) -> usize {
        heuristic::page_count(blocks, &self.policy)
    }

    /// Precise pass: settle assets, measure the rendered document, split
    /// it into page-shaped render lists, and verify the result against
    /// the content sequence. A plan/content mismatch aborts the export:
    /// integrity of the shipped document outranks availability.
    pub fn compute_export_plan(
        &self,
        rendered: &RenderedDoc,
        assets: &mut AssetStore,
    ) -> Result<ExportBuild> {
        let debug = self.debug.as_deref();

        let started = Instant::now();
        let measured = measure::measure_doc(rendered, assets, &self.geometry, debug);
        let measure_ms = started.elapsed().as_secs_f64() * 1000.0;

        let started = Instant::now();
        let out = split::split_doc(&measured, &self.geometry, &self.header_template, debug);
        let split_ms = started.elapsed().as_secs_f64() * 1000.0;

        let content = rendered.content_blocks();
        if let Err(err) = out.plan.verify(&content) {
            if let Some(logger) = &self.debug {
                logger.log_plan_mismatch(&err.to_string());
                logger.emit_summary("export.aborted");
                logger.flush();
            }
            return Err(err);
        }

        if let Some(logger) = &self.debug {
            logger.emit_summary("export");
            logger.flush();
        }

        Ok(ExportBuild {
            pages: out.pages,
            plan: out.plan,
            metrics: ExportMetrics {
                pages: out.page_metrics,
                measure_ms,
                split_ms,
                measurement_gaps: measured.measurement_gaps,
                overflow_pages: out.overflow_pages,
            },
        })
    }

    /// Compare the live preview plan against an export's plan.
    pub fn reconcile_with_preview(
        &self,
        blocks: &[ContentBlock],
        export: &PageBreakPlan,
    ) -> ReconcileReport {
        reconcile::reconcile(&self.compute_preview_plan(blocks), export)
    }
}
