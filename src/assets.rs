use crate::error::{PageBoundError, Result};
use base64::Engine;
use image::GenericImageView;
use rayon::prelude::*;
use std::collections::HashMap;

/// One image referenced by rendered fragments. Intrinsic dimensions are
/// unknown until the store settles; a failed decode stays failed rather
/// than being retried.
#[derive(Debug, Clone)]
struct ImageAsset {
    name: String,
    data: Vec<u8>,
    intrinsic: Option<(u32, u32)>,
    failed: bool,
}

/// Image assets for one export. Settling the store is this subsystem's
/// single wait point: every intrinsic size must be known before any block
/// height is read, because image size affects layout height.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    assets: Vec<ImageAsset>,
    index: HashMap<String, usize>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_bytes(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let name = name.into();
        if let Some(&slot) = self.index.get(&name) {
            self.assets[slot] = ImageAsset {
                name,
                data,
                intrinsic: None,
                failed: false,
            };
            return;
        }
        self.index.insert(name.clone(), self.assets.len());
        self.assets.push(ImageAsset {
            name,
            data,
            intrinsic: None,
            failed: false,
        });
    }

    /// Accepts the `data:image/...;base64,` URIs the authoring canvas
    /// emits for embedded logos and signatures.
    pub fn insert_data_uri(&mut self, name: impl Into<String>, uri: &str) -> Result<()> {
        let name = name.into();
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| PageBoundError::Asset(format!("{name}: not a data URI")))?;
        let (_media_type, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| PageBoundError::Asset(format!("{name}: data URI is not base64")))?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|err| PageBoundError::Asset(format!("{name}: {err}")))?;
        self.insert_bytes(name, data);
        Ok(())
    }

    /// Decode intrinsic dimensions for every unsettled asset, in parallel.
    /// Decode failures are tolerated: the asset is marked failed, a warning
    /// is logged, and measurement later treats its fragments as zero-height
    /// (recovered by the measurer's gap substitution). Returns the number
    /// of failures observed in this pass.
    pub fn settle(&mut self) -> usize {
        let failures: usize = self
            .assets
            .par_iter_mut()
            .map(|asset| {
                if asset.intrinsic.is_some() || asset.failed {
                    return 0;
                }
                match image::load_from_memory(&asset.data) {
                    Ok(img) => {
                        asset.intrinsic = Some(img.dimensions());
                        0
                    }
                    Err(err) => {
                        log::warn!("asset {} failed to decode: {err}", asset.name);
                        asset.failed = true;
                        1
                    }
                }
            })
            .sum();
        failures
    }

    /// Intrinsic (width, height) once settled; `None` for unknown names,
    /// unsettled assets, and failed decodes.
    pub fn intrinsic_size(&self, name: &str) -> Option<(u32, u32)> {
        self.index
            .get(name)
            .and_then(|&slot| self.assets[slot].intrinsic)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
