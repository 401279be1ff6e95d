use crate::block::{BlockId, ContentBlock};
use crate::plan::PageBreakPlan;

/// Content-derived pagination policy for the preview pass. The constants
/// are deliberately independent of theme and geometry: the preview never
/// renders, so it prices blocks in characters, not pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicPolicy {
    /// A block longer than this never shares a page with preceding content.
    pub long_block_threshold: u32,
    /// A page of short blocks closes once it holds this many.
    pub max_blocks_per_page: usize,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self {
            long_block_threshold: 800,
            max_blocks_per_page: 3,
        }
    }
}

/// Greedy left-to-right page assignment over content-derived signals only.
/// No rendering, no backtracking, no side effects; called on every content
/// edit to keep "page N of M" badges live.
pub fn plan_pages(blocks: &[ContentBlock], policy: &HeuristicPolicy) -> PageBreakPlan {
    let max_blocks_per_page = policy.max_blocks_per_page.max(1);

    let mut plan = PageBreakPlan::default();
    let mut current: Vec<BlockId> = Vec::new();
    let mut pending_label: Option<String> = None;

    fn flush(plan: &mut PageBreakPlan, current: &mut Vec<BlockId>, label: Option<String>) {
        if current.is_empty() {
            return;
        }
        plan.push_slot(std::mem::take(current), label);
    }

    for block in blocks {
        if block.must_start_new_page && !current.is_empty() {
            flush(&mut plan, &mut current, pending_label.take());
        }
        if block.must_start_new_page {
            pending_label = block.section_title().map(str::to_string);
        }

        let is_long = block.estimated_length > policy.long_block_threshold;
        if is_long && !current.is_empty() {
            flush(&mut plan, &mut current, pending_label.take());
        }

        current.push(block.id.clone());

        if is_long || current.len() >= max_blocks_per_page {
            flush(&mut plan, &mut current, pending_label.take());
        }
    }

    flush(&mut plan, &mut current, pending_label.take());
    plan
}

/// Page-count estimate backing preview badges; same scan as [`plan_pages`].
pub fn page_count(blocks: &[ContentBlock], policy: &HeuristicPolicy) -> usize {
    plan_pages(blocks, policy).page_count()
}
