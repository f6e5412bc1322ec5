use std::sync::Arc;

use anyhow::Context as _;

use crate::error::{NightrailError, NightrailResult};

/// A vector asset rasterized once at setup. Pixels are premultiplied RGBA8.
#[derive(Clone, Debug, serde::Serialize)]
pub struct PreparedRaster {
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> NightrailResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts)
        .context("parse svg tree")
        .map_err(NightrailError::from)
}

/// Rasterize a parsed SVG at a uniform scale.
pub fn rasterize_svg(tree: &usvg::Tree, scale: f64) -> NightrailResult<PreparedRaster> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(NightrailError::scene("svg raster scale must be > 0"));
    }

    let size = tree.size();
    let width = (f64::from(size.width()) * scale).ceil() as u32;
    let height = (f64::from(size.height()) * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| NightrailError::scene("svg raster dimensions are empty"))?;

    resvg::render(
        tree,
        resvg::tiny_skia::Transform::from_scale(scale as f32, scale as f32),
        &mut pixmap.as_mut(),
    );

    // tiny-skia pixmaps are already premultiplied RGBA8.
    Ok(PreparedRaster {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.take()),
    })
}
