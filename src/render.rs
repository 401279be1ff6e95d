use crate::block::ContentBlock;
use crate::types::Px;

/// Theme renderer seam. A renderer turns one content block into a visual
/// unit; the pagination engine only needs "a renderable unit with a stable
/// height once its assets settle", never the visual content itself.
pub trait BlockRenderer {
    fn render(&self, block: &ContentBlock) -> RenderedBlock;
}

/// Pre-laid-out piece of a rendered block. Text arrives already wrapped
/// into lines by the theme renderer (reflow is out of scope here); images
/// arrive with their layout width and settle to an intrinsic height later.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    TextLines { lines: u32, line_height_px: Px },
    Image { asset: String, width_px: Px },
    FixedBox { height_px: Px },
}

/// One block's rendered form: the source block snapshot plus its visual
/// fragments, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBlock {
    pub block: ContentBlock,
    pub fragments: Vec<Fragment>,
}

impl RenderedBlock {
    pub fn new(block: ContentBlock, fragments: Vec<Fragment>) -> Self {
        Self { block, fragments }
    }
}

/// A fully rendered document body: the non-repeating title/header material
/// (the preamble) followed by the paginated blocks. This is the detached
/// snapshot one export owns exclusively; both the measurer and the splitter
/// treat it as read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDoc {
    pub title: String,
    pub preamble: Vec<Fragment>,
    pub blocks: Vec<RenderedBlock>,
}

impl RenderedDoc {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            preamble: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn with_preamble(mut self, fragments: Vec<Fragment>) -> Self {
        self.preamble = fragments;
        self
    }

    pub fn push_block(&mut self, rendered: RenderedBlock) {
        self.blocks.push(rendered);
    }

    /// Render every block of a content snapshot through a theme renderer.
    pub fn from_renderer(
        title: impl Into<String>,
        blocks: &[ContentBlock],
        renderer: &dyn BlockRenderer,
    ) -> Self {
        let mut doc = RenderedDoc::new(title);
        for block in blocks {
            doc.push_block(renderer.render(block));
        }
        doc
    }

    /// The content snapshot this rendering was produced from, in order.
    /// The precise plan is verified against exactly this sequence.
    pub fn content_blocks(&self) -> Vec<ContentBlock> {
        self.blocks.iter().map(|r| r.block.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ContentBlock;

    struct FixedHeightRenderer;

    impl BlockRenderer for FixedHeightRenderer {
        fn render(&self, block: &ContentBlock) -> RenderedBlock {
            RenderedBlock::new(
                block.clone(),
                vec![Fragment::FixedBox {
                    height_px: Px::from_i32(100),
                }],
            )
        }
    }

    #[test]
    fn from_renderer_preserves_block_order() {
        let blocks = vec![
            ContentBlock::clause("c1", "One", "body"),
            ContentBlock::clause("c2", "Two", "body"),
        ];
        let doc = RenderedDoc::from_renderer("Agreement", &blocks, &FixedHeightRenderer);
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.content_blocks(), blocks);
    }
}
