use crate::assets::AssetStore;
use crate::block::ContentBlock;
use crate::debug::DebugLogger;
use crate::render::{Fragment, RenderedDoc};
use crate::types::{PageGeometry, Px};

/// Substitute height for a measurement gap with no prior blocks to
/// average over: roughly one short clause at preview scale.
const FALLBACK_BLOCK_PX: i32 = 120;

/// A content block decorated with its rendered pixel height, known only
/// after every image asset has settled.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredBlock {
    pub block: ContentBlock,
    pub rendered_height_px: Px,
}

/// Measurement of a full rendered document: per-block heights plus the
/// absolute top offset of the content area (just below the single,
/// non-repeating title block).
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredDoc {
    pub title: String,
    pub content_top_px: Px,
    pub blocks: Vec<MeasuredBlock>,
    pub measurement_gaps: usize,
}

/// Measure every candidate break unit of a rendered document.
///
/// Settles the asset store first; image intrinsic size affects layout
/// height, so no height is read before every pending decode has finished.
/// The rendered tree itself is never mutated. Measurement is total: a
/// block whose height cannot be determined gets the running average of
/// the blocks measured so far (or a nominal fallback when it is the
/// first), and the pass continues.
pub(crate) fn measure_doc(
    rendered: &RenderedDoc,
    assets: &mut AssetStore,
    geometry: &PageGeometry,
    debug: Option<&DebugLogger>,
) -> MeasuredDoc {
    assets.settle();

    let preamble_height: Px = rendered
        .preamble
        .iter()
        .map(|fragment| fragment_height(fragment, assets))
        .sum();
    let content_top_px = geometry.top_content_offset_px + preamble_height;

    let mut blocks = Vec::with_capacity(rendered.blocks.len());
    let mut measured_total = Px::ZERO;
    let mut measured_count = 0i32;
    let mut measurement_gaps = 0usize;

    for rendered_block in &rendered.blocks {
        let height: Px = rendered_block
            .fragments
            .iter()
            .map(|fragment| fragment_height(fragment, assets))
            .sum();

        let height = if height.is_positive() {
            measured_total += height;
            measured_count += 1;
            height
        } else {
            let substitute = if measured_count > 0 {
                measured_total / measured_count
            } else {
                Px::from_i32(FALLBACK_BLOCK_PX)
            };
            measurement_gaps += 1;
            log::warn!(
                "block {} has no measurable height, substituting {} px",
                rendered_block.block.id,
                substitute.to_f32()
            );
            if let Some(logger) = debug {
                logger.log_measure_gap(rendered_block.block.id.as_str(), substitute);
            }
            substitute
        };

        blocks.push(MeasuredBlock {
            block: rendered_block.block.clone(),
            rendered_height_px: height,
        });
    }

    MeasuredDoc {
        title: rendered.title.clone(),
        content_top_px,
        blocks,
        measurement_gaps,
    }
}

fn fragment_height(fragment: &Fragment, assets: &AssetStore) -> Px {
    match fragment {
        Fragment::TextLines {
            lines,
            line_height_px,
        } => *line_height_px * (*lines as i32),
        Fragment::Image { asset, width_px } => match assets.intrinsic_size(asset) {
            Some((w, h)) if w > 0 => width_px.mul_ratio(h as i32, w as i32),
            _ => {
                log::debug!("image {asset} unsettled at measure time, counting zero height");
                Px::ZERO
            }
        },
        Fragment::FixedBox { height_px } => *height_px,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ContentBlock;
    use crate::render::RenderedBlock;
    use std::io::Cursor;

    fn geometry() -> PageGeometry {
        PageGeometry {
            page_height_px: Px::from_i32(1000),
            header_height_px: Px::from_i32(60),
            footer_reserve_px: Px::from_i32(50),
            top_content_offset_px: Px::ZERO,
        }
    }

    fn text_block(id: &str, lines: u32) -> RenderedBlock {
        RenderedBlock::new(
            ContentBlock::clause(id, format!("Clause {id}"), "body"),
            vec![Fragment::TextLines {
                lines,
                line_height_px: Px::from_i32(20),
            }],
        )
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn sums_fragment_heights_per_block() {
        let mut doc = RenderedDoc::new("Invoice");
        doc.push_block(text_block("c1", 5));
        doc.push_block(text_block("c2", 10));
        let mut assets = AssetStore::new();
        let measured = measure_doc(&doc, &mut assets, &geometry(), None);
        assert_eq!(measured.blocks[0].rendered_height_px, Px::from_i32(100));
        assert_eq!(measured.blocks[1].rendered_height_px, Px::from_i32(200));
        assert_eq!(measured.measurement_gaps, 0);
    }

    #[test]
    fn preamble_sets_content_top() {
        let doc = RenderedDoc::new("Invoice").with_preamble(vec![Fragment::FixedBox {
            height_px: Px::from_i32(180),
        }]);
        let mut assets = AssetStore::new();
        let measured = measure_doc(&doc, &mut assets, &geometry(), None);
        assert_eq!(measured.content_top_px, Px::from_i32(180));
    }

    #[test]
    fn image_height_scales_with_layout_width() {
        let mut assets = AssetStore::new();
        assets.insert_bytes("photo", png_bytes(4, 3));
        let mut doc = RenderedDoc::new("Invoice");
        doc.push_block(RenderedBlock::new(
            ContentBlock::visual("v1", "Photo", crate::block::VisualComponentKind::Timeline),
            vec![Fragment::Image {
                asset: "photo".to_string(),
                width_px: Px::from_i32(400),
            }],
        ));
        let measured = measure_doc(&doc, &mut assets, &geometry(), None);
        // 400 px wide at 4:3 intrinsic -> 300 px tall; settle ran inside.
        assert_eq!(measured.blocks[0].rendered_height_px, Px::from_i32(300));
    }

    #[test]
    fn gap_gets_running_average() {
        let mut doc = RenderedDoc::new("Invoice");
        doc.push_block(text_block("c1", 5)); // 100 px
        doc.push_block(text_block("c2", 10)); // 200 px
        doc.push_block(RenderedBlock::new(
            ContentBlock::clause("c3", "Empty", "body"),
            vec![],
        ));
        let mut assets = AssetStore::new();
        let measured = measure_doc(&doc, &mut assets, &geometry(), None);
        assert_eq!(measured.blocks[2].rendered_height_px, Px::from_i32(150));
        assert_eq!(measured.measurement_gaps, 1);
    }

    #[test]
    fn first_block_gap_gets_nominal_fallback() {
        let mut doc = RenderedDoc::new("Invoice");
        doc.push_block(RenderedBlock::new(
            ContentBlock::clause("c1", "Empty", "body"),
            vec![],
        ));
        let mut assets = AssetStore::new();
        let measured = measure_doc(&doc, &mut assets, &geometry(), None);
        assert_eq!(
            measured.blocks[0].rendered_height_px,
            Px::from_i32(FALLBACK_BLOCK_PX)
        );
    }

    #[test]
    fn failed_image_decode_becomes_gap_not_error() {
        let mut assets = AssetStore::new();
        assets.insert_bytes("broken", vec![1, 2, 3]);
        let mut doc = RenderedDoc::new("Invoice");
        doc.push_block(text_block("c1", 5));
        doc.push_block(RenderedBlock::new(
            ContentBlock::visual("v1", "Chart", crate::block::VisualComponentKind::PieChart),
            vec![Fragment::Image {
                asset: "broken".to_string(),
                width_px: Px::from_i32(400),
            }],
        ));
        let measured = measure_doc(&doc, &mut assets, &geometry(), None);
        assert_eq!(measured.blocks[1].rendered_height_px, Px::from_i32(100));
        assert_eq!(measured.measurement_gaps, 1);
    }
}
