//! CPU rasterization of a scene with `vello_cpu`. The renderer owns the
//! pixmap and a paint cache for prepared rasters; rendering never mutates the
//! scene.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    core::Viewport,
    error::{NightrailError, NightrailResult},
    node::Shape,
    scene::Scene,
    svg::PreparedRaster,
};

/// One rendered frame, straight off the pixmap.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

pub struct CpuRenderer {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    raster_cache: HashMap<usize, vello_cpu::Image>,
}

impl CpuRenderer {
    pub fn new(viewport: Viewport) -> NightrailResult<Self> {
        let width: u16 = viewport
            .width
            .try_into()
            .map_err(|_| NightrailError::render("frame width exceeds u16"))?;
        let height: u16 = viewport
            .height
            .try_into()
            .map_err(|_| NightrailError::render("frame height exceeds u16"))?;

        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
            raster_cache: HashMap::new(),
        })
    }

    /// Rasterize the scene's current pose into an RGBA8 frame. Nodes draw in
    /// insertion order; a node's shapes draw in their own listed order.
    #[tracing::instrument(skip(self, scene), level = "debug")]
    pub fn render(&mut self, scene: &Scene) -> NightrailResult<FrameRGBA> {
        if scene.viewport.width != u32::from(self.width)
            || scene.viewport.height != u32::from(self.height)
        {
            return Err(NightrailError::render(
                "scene viewport does not match renderer",
            ));
        }

        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let bg = scene.background;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            scene.viewport.width_f64(),
            scene.viewport.height_f64(),
        ));

        let world = scene.stage.resolve_world();
        for (node, (transform, alpha)) in scene.stage.iter().zip(&world) {
            if *alpha <= 0.0 {
                continue;
            }
            for shape in &node.shapes {
                match shape {
                    Shape::Fill { path, color } => {
                        ctx.set_transform(affine_to_cpu(*transform));
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                            color.r, color.g, color.b, color.a,
                        ));
                        if *alpha < 1.0 {
                            ctx.push_opacity_layer(*alpha as f32);
                        }
                        ctx.fill_path(&bezpath_to_cpu(path));
                        if *alpha < 1.0 {
                            ctx.pop_layer();
                        }
                    }
                    Shape::Raster(raster) => {
                        let paint = self.raster_paint_for(raster)?;
                        ctx.set_transform(affine_to_cpu(*transform));
                        ctx.set_paint(paint);
                        if *alpha < 1.0 {
                            ctx.push_opacity_layer(*alpha as f32);
                        }
                        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                            0.0,
                            0.0,
                            f64::from(raster.width),
                            f64::from(raster.height),
                        ));
                        if *alpha < 1.0 {
                            ctx.pop_layer();
                        }
                    }
                }
            }
        }

        ctx.flush();
        clear_pixmap(&mut self.pixmap);
        ctx.render_to_pixmap(&mut self.pixmap);

        Ok(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn raster_paint_for(&mut self, raster: &PreparedRaster) -> NightrailResult<vello_cpu::Image> {
        // Prepared rasters are immutable, so the allocation address is a
        // stable identity for caching.
        let key = Arc::as_ptr(&raster.rgba8_premul) as usize;
        if let Some(paint) = self.raster_cache.get(&key) {
            return Ok(paint.clone());
        }

        let pixmap = premul_bytes_to_pixmap(&raster.rgba8_premul, raster.width, raster.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.raster_cache.insert(key, paint.clone());
        Ok(paint)
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn affine_to_cpu(a: crate::core::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: crate::core::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &crate::core::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> NightrailResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| NightrailError::render("raster width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| NightrailError::render("raster height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(NightrailError::render("raster byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        animator::Animator,
        core::{Rgba8, Viewport},
        node::{DisplayNode, Shape, Stage},
        shapes,
    };

    fn tiny_scene(background: u32) -> Scene {
        Scene {
            viewport: Viewport::new(8, 8).unwrap(),
            background: Rgba8::from_rgb(background),
            stage: Stage::new(),
            animator: Animator::new(),
        }
    }

    #[test]
    fn background_fills_the_frame() {
        let scene = tiny_scene(0x021F4B);
        let mut renderer = CpuRenderer::new(scene.viewport).unwrap();
        let frame = renderer.render(&scene).unwrap();

        assert_eq!(frame.data.len(), 8 * 8 * 4);
        for px in frame.data.chunks_exact(4) {
            assert_eq!(px, [0x02, 0x1F, 0x4B, 0xFF]);
        }
    }

    #[test]
    fn shape_fill_overrides_background() {
        let mut scene = tiny_scene(0x000000);
        scene.stage.add(DisplayNode::with_shapes(vec![Shape::Fill {
            path: shapes::rect(0.0, 0.0, 8.0, 8.0),
            color: Rgba8::from_rgb(0xFF0000),
        }]));

        let mut renderer = CpuRenderer::new(scene.viewport).unwrap();
        let frame = renderer.render(&scene).unwrap();
        let center = (4 * 8 + 4) * 4;
        assert_eq!(&frame.data[center..center + 4], [0xFF, 0x00, 0x00, 0xFF]);
    }

    #[test]
    fn viewport_mismatch_is_an_error() {
        let scene = tiny_scene(0x000000);
        let mut renderer = CpuRenderer::new(Viewport::new(16, 16).unwrap()).unwrap();
        assert!(renderer.render(&scene).is_err());
    }
}
