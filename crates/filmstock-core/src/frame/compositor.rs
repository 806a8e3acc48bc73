//! Full print render: frame, effects and grading in their fixed order.
//!
//! # Stages
//! 1. Size the frame from the photo ([`FrameGeometry`])
//! 2. Paint the paper gradient, top to bottom
//! 3. Multiply the paper texture over the whole frame
//! 4. Paint the drop shadow, then the inset backing
//! 5. Blit the photo into the inset
//! 6. Halation on the inset (Warm-Stock, when its profile requests it)
//! 7. Stop here for [`FilterKind::None`]
//! 8. Grade the inset
//! 9. Vignette the inset
//!
//! Halation keys its highlights on the ungraded luminance, so it runs before
//! grading. The vignette runs after grading and never touches the paper.

use rand::Rng;
use rayon::prelude::*;

use crate::config::RenderConfig;
use crate::effects::blend::{BlendMode, blit, composite_layer, fill_rect};
use crate::effects::blur::gaussian_blur;
use crate::effects::halation::HalationEffect;
use crate::error::RenderResult;
use crate::frame::geometry::FrameGeometry;
use crate::grading::engine::GradingEngine;
use crate::grading::profile::{FilmProfile, FilterKind};
use crate::image::{CHANNELS, Layer, PixelBuffer, Rect};

/// Renders photos into finished prints.
#[derive(Debug, Clone, Copy)]
pub struct FrameCompositor<'a> {
    config: &'a RenderConfig,
}

impl<'a> FrameCompositor<'a> {
    /// Validate `config` and build a compositor over it.
    pub fn new(config: &'a RenderConfig) -> RenderResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &RenderConfig {
        self.config
    }

    /// Frame layout for a `width` × `height` photo.
    pub fn geometry(&self, width: u32, height: u32) -> RenderResult<FrameGeometry> {
        FrameGeometry::compute(width, height, &self.config.frame)
    }

    /// Render `source` as a framed print with the `filter` look.
    ///
    /// `rng` drives the paper texture and then the grain, in that order, so a
    /// seeded generator reproduces the output exactly. All fallible checks run
    /// before the frame is painted.
    pub fn render<R: Rng + ?Sized>(
        &self,
        source: &PixelBuffer,
        filter: FilterKind,
        rng: &mut R,
    ) -> RenderResult<PixelBuffer> {
        let span = tracing::info_span!(
            "render",
            filter = %filter,
            width = source.width(),
            height = source.height()
        );
        let _enter = span.enter();

        source.ensure_renderable()?;
        let profile = self.config.profile(filter);
        let geometry = self.geometry(source.width(), source.height())?;
        let photo = geometry.photo_rect();
        tracing::debug!(
            "frame {}x{}, margin {}, bottom {}",
            geometry.total_width,
            geometry.total_height,
            geometry.margin,
            geometry.bottom_margin
        );

        let mut frame = PixelBuffer::new(geometry.total_width, geometry.total_height)?;
        let style = &self.config.frame;

        self.paint_paper(&mut frame);
        style.paper_texture.apply(&mut frame, rng)?;
        self.paint_shadow(&mut frame, photo)?;
        let backing = style.backing;
        fill_rect(
            &mut frame,
            photo,
            [
                backing.red as f32 / 255.0,
                backing.green as f32 / 255.0,
                backing.blue as f32 / 255.0,
                1.0,
            ],
            BlendMode::Normal,
        )?;
        blit(&mut frame, source, photo.x, photo.y)?;

        let Some(profile) = profile else {
            tracing::debug!("no film profile; photo left ungraded");
            return Ok(frame);
        };
        tracing::debug!("grading with {}", profile.name);

        match (&profile.halation, filter) {
            (Some(halation), FilterKind::WarmStock) => {
                HalationEffect::new(halation).apply(&mut frame, photo)?;
            }
            (Some(_), _) => tracing::debug!("halation is Warm-Stock only; skipped for {filter}"),
            (None, _) => {}
        }

        self.grade_region(&mut frame, photo, profile, rng)?;
        style.vignette.apply(&mut frame, photo)?;

        Ok(frame)
    }

    fn paint_paper(&self, frame: &mut PixelBuffer) {
        let style = &self.config.frame;
        let height = frame.height() as f32;
        let stride = frame.stride();
        frame
            .as_bytes_mut()
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| {
                let colour = style.paper_at((y as f32 + 0.5) / height);
                for px in row.chunks_exact_mut(CHANNELS) {
                    px.copy_from_slice(&colour);
                }
            });
    }

    fn paint_shadow(&self, frame: &mut PixelBuffer, photo: Rect) -> RenderResult<()> {
        let shadow = &self.config.frame.shadow;
        if shadow.alpha <= 0.0 {
            return Ok(());
        }

        let sigma = shadow.sigma();
        let pad = (sigma * 3.0).ceil() as i64;
        let left = photo.x as i64 + shadow.offset_x as i64;
        let top = photo.y as i64 + shadow.offset_y as i64;
        let right = left + photo.width as i64;
        let bottom = top + photo.height as i64;

        let x0 = left.saturating_sub(pad).max(0);
        let y0 = top.saturating_sub(pad).max(0);
        let x1 = right.saturating_add(pad).min(frame.width() as i64);
        let y1 = bottom.saturating_add(pad).min(frame.height() as i64);
        if x1 <= x0 || y1 <= y0 {
            return Ok(());
        }

        let mut layer = Layer::transparent((x1 - x0) as u32, (y1 - y0) as u32);
        let colour = [
            shadow.color.red as f32 / 255.0,
            shadow.color.green as f32 / 255.0,
            shadow.color.blue as f32 / 255.0,
            shadow.alpha,
        ];
        let lw = layer.width as i64;
        for y in top.max(y0)..bottom.min(y1) {
            for x in left.max(x0)..right.min(x1) {
                layer.pixels[((y - y0) * lw + (x - x0)) as usize] = colour;
            }
        }

        gaussian_blur(&mut layer, sigma);
        composite_layer(frame, &layer, x0 as u32, y0 as u32, BlendMode::Normal, 1.0)
    }

    fn grade_region<R: Rng + ?Sized>(
        &self,
        frame: &mut PixelBuffer,
        photo: Rect,
        profile: &FilmProfile,
        rng: &mut R,
    ) -> RenderResult<()> {
        let mut region = frame.extract_region(photo)?;
        GradingEngine::new(profile).grade(&mut region, rng)?;
        frame.write_region(photo.x, photo.y, &region)
    }
}
