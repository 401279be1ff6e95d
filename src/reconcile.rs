use crate::plan::PageBreakPlan;

/// Comparison of the preview (heuristic) and export (precise) plans for
/// one document. Page counts may legitimately differ (the preview prices
/// blocks in characters, the export in pixels) and both numbers may be
/// shown to the user; the export count is authoritative wherever the two
/// appear together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub preview_pages: usize,
    pub export_pages: usize,
}

impl ReconcileReport {
    pub fn agree(&self) -> bool {
        self.preview_pages == self.export_pages
    }

    /// The count to display when only one number fits.
    pub fn authoritative_pages(&self) -> usize {
        self.export_pages
    }
}

pub fn reconcile(preview: &PageBreakPlan, export: &PageBreakPlan) -> ReconcileReport {
    ReconcileReport {
        preview_pages: preview.page_count(),
        export_pages: export.page_count(),
    }
}

/// Both passes must assign the same blocks in the same order, whatever
/// their page boundaries. Content disagreement is the fatal condition;
/// count disagreement is routine.
pub fn content_agrees(a: &PageBreakPlan, b: &PageBreakPlan) -> bool {
    let flat_a = a.pages().iter().flat_map(|slot| slot.blocks.iter());
    let flat_b = b.pages().iter().flat_map(|slot| slot.blocks.iter());
    flat_a.eq(flat_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ContentBlock;
    use crate::heuristic::{HeuristicPolicy, plan_pages};

    #[test]
    fn differing_counts_are_reported_not_fatal() {
        let blocks: Vec<_> = (0..5)
            .map(|i| {
                ContentBlock::clause(format!("c{i}").as_str(), format!("Clause {i}"), "x".repeat(200))
            })
            .collect();
        let preview = plan_pages(&blocks, &HeuristicPolicy::default());
        let export = plan_pages(
            &blocks,
            &HeuristicPolicy {
                long_block_threshold: 800,
                max_blocks_per_page: 2,
            },
        );
        let report = reconcile(&preview, &export);
        assert_eq!(report.preview_pages, 2);
        assert_eq!(report.export_pages, 3);
        assert!(!report.agree());
        assert_eq!(report.authoritative_pages(), 3);
        assert!(content_agrees(&preview, &export));
    }
}
