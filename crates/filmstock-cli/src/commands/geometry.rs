//! Geometry command

use anyhow::{Context, Result};
use filmstock_core::FrameGeometry;

use crate::GeometryArgs;
use crate::config::AppConfig;

pub fn run(args: GeometryArgs, app: &AppConfig) -> Result<()> {
    let config = app.load_render_config(args.config.as_ref())?;
    let geometry = FrameGeometry::compute(args.width, args.height, &config.frame)
        .with_context(|| format!("no frame for a {}x{} photo", args.width, args.height))?;
    println!("{}", describe(&geometry));
    Ok(())
}

fn describe(g: &FrameGeometry) -> String {
    let photo = g.photo_rect();
    format!(
        "photo:  {}x{} at +{}+{}\nmargin: {} px (sides, top), {} px (bottom)\nframe:  {}x{}",
        photo.width, photo.height, photo.x, photo.y, g.margin, g.bottom_margin, g.total_width, g.total_height
    )
}
