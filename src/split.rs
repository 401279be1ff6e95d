use crate::block::BlockId;
use crate::debug::DebugLogger;
use crate::measure::MeasuredDoc;
use crate::metrics::PageMetrics;
use crate::page_label::substitute_label;
use crate::plan::PageBreakPlan;
use crate::types::{PageGeometry, Px};

/// One entry of a page's render list. The rasterizer consumes these in
/// order; spacers and repeated headers are real layout participants, not
/// annotations, so fixed-height page slices land exactly on the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    /// Repeated page header (document name + page number), of
    /// `PageGeometry::header_height_px`. Never present on page 1, which
    /// keeps the document's own title block.
    RepeatedHeader { label: String },
    Block(BlockId),
    /// Exact fill up to the page boundary, inserted when a page closes
    /// early.
    Spacer { height_px: Px },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRender {
    pub page_number: usize,
    pub items: Vec<PageItem>,
}

/// The restructured document: per-page render lists plus the geometry
/// they were built against. This is what the rasterizer slices.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSet {
    pub geometry: PageGeometry,
    pub pages: Vec<PageRender>,
}

impl PageSet {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

pub(crate) struct SplitOutput {
    pub pages: PageSet,
    pub plan: PageBreakPlan,
    pub page_metrics: Vec<PageMetrics>,
    pub overflow_pages: usize,
}

/// Walk measured blocks down the fixed page grid, closing pages with
/// exact-fill spacers and opening them with repeated headers.
///
/// Blocks are atomic: one that does not fit moves whole to the next page,
/// and one taller than a page is placed anyway; the page renders tall,
/// a diagnostic is recorded, and the export proceeds.
pub(crate) fn split_doc(
    measured: &MeasuredDoc,
    geometry: &PageGeometry,
    header_template: &str,
    debug: Option<&DebugLogger>,
) -> SplitOutput {
    let mut pages: Vec<PageRender> = Vec::new();
    let mut page_metrics: Vec<PageMetrics> = Vec::new();
    let mut plan = PageBreakPlan::default();

    let mut items: Vec<PageItem> = Vec::new();
    let mut slot: Vec<BlockId> = Vec::new();
    let mut pending_label: Option<String> = None;
    let mut page_number = 1usize;
    let mut cursor_y = measured.content_top_px;
    let mut boundary = geometry.page_height_px;
    let mut content_px = Px::ZERO;
    let mut spacer_px = Px::ZERO;
    let mut page_overflowed = false;
    let mut overflow_pages = 0usize;

    for (index, mb) in measured.blocks.iter().enumerate() {
        let height = mb.rendered_height_px;
        let page_has_content = !slot.is_empty();
        let fit_limit = boundary - geometry.footer_reserve_px;

        let break_reason = if mb.block.must_start_new_page && page_has_content {
            Some("forced_new_page")
        } else if page_has_content && cursor_y + height > fit_limit {
            Some("boundary")
        } else if page_has_content && group_would_orphan(measured, index, cursor_y, fit_limit) {
            Some("group_orphan")
        } else {
            None
        };

        if let Some(reason) = break_reason {
            let fill = boundary - cursor_y;
            if fill.is_positive() {
                items.push(PageItem::Spacer { height_px: fill });
                spacer_px += fill;
            }
            if let Some(logger) = debug {
                logger.log_page_break(page_number, page_number + 1, reason, mb.block.id.as_str());
            }

            let block_count = slot.len();
            plan.push_slot(std::mem::take(&mut slot), pending_label.take());
            pages.push(PageRender {
                page_number,
                items: std::mem::take(&mut items),
            });
            page_metrics.push(PageMetrics {
                page_number,
                block_count,
                content_px,
                spacer_px,
            });
            if page_overflowed {
                overflow_pages += 1;
            }

            page_overflowed = false;
            content_px = Px::ZERO;
            spacer_px = Px::ZERO;
            let page_top = boundary;
            page_number += 1;
            boundary += geometry.page_height_px;
            items.push(PageItem::RepeatedHeader {
                label: header_template.to_string(),
            });
            cursor_y = page_top + geometry.header_height_px;
        }

        if mb.block.must_start_new_page {
            pending_label = mb.block.section_title().map(str::to_string);
        }

        if slot.is_empty() && cursor_y + height > boundary - geometry.footer_reserve_px {
            // Taller than the page it has to itself. Place it anyway.
            log::debug!(
                "block {} ({} px) overflows page {} ({} px high)",
                mb.block.id,
                height.to_f32(),
                page_number,
                geometry.page_height_px.to_f32()
            );
            if let Some(logger) = debug {
                logger.log_overflow(
                    page_number,
                    mb.block.id.as_str(),
                    height,
                    geometry.page_height_px,
                );
            }
            page_overflowed = true;
        }

        items.push(PageItem::Block(mb.block.id.clone()));
        slot.push(mb.block.id.clone());
        cursor_y += height;
        content_px += height;
    }

    if !slot.is_empty() {
        let block_count = slot.len();
        plan.push_slot(std::mem::take(&mut slot), pending_label.take());
        pages.push(PageRender {
            page_number,
            items: std::mem::take(&mut items),
        });
        page_metrics.push(PageMetrics {
            page_number,
            block_count,
            content_px,
            spacer_px,
        });
        if page_overflowed {
            overflow_pages += 1;
        }
    }

    // Page count is only known now; materialize the repeated-header labels.
    let total = pages.len();
    for page in &mut pages {
        for item in &mut page.items {
            if let PageItem::RepeatedHeader { label } = item {
                *label = substitute_label(label, page.page_number, total, &measured.title);
            }
        }
    }

    SplitOutput {
        pages: PageSet {
            geometry: *geometry,
            pages,
        },
        plan,
        page_metrics,
        overflow_pages,
    }
}

/// One-block lookahead for orphan control: the first block of a group,
/// placed with less than the next group member's height of space left,
/// drags the whole group to the next page.
fn group_would_orphan(measured: &MeasuredDoc, index: usize, cursor_y: Px, fit_limit: Px) -> bool {
    let mb = &measured.blocks[index];
    let Some(group) = mb.block.group_key.as_deref() else {
        return false;
    };
    let first_of_group = index == 0
        || measured.blocks[index - 1].block.group_key.as_deref() != Some(group);
    if !first_of_group {
        return false;
    }
    let Some(next) = measured.blocks.get(index + 1) else {
        return false;
    };
    if next.block.group_key.as_deref() != Some(group) {
        return false;
    }
    cursor_y + mb.rendered_height_px + next.rendered_height_px > fit_limit
}
