//! Render command

use anyhow::{Context, Result};
use filmstock_core::{FilterKind, FrameCompositor, PixelBuffer, analyze_or_default};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;

use crate::RenderArgs;
use crate::analyzer::ResponseFileAnalyzer;
use crate::config::AppConfig;
use crate::image_loader::{load_image, save_image};

pub fn run(args: RenderArgs, app: &AppConfig) -> Result<()> {
    let config = app.load_render_config(args.config.as_ref())?;
    let compositor = FrameCompositor::new(&config).context("invalid render config")?;

    let source = load_image(&args.input).with_context(|| format!("Failed to load: {}", args.input.display()))?;
    let filter = choose_filter(&args, &source)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let start = Instant::now();
    let print = compositor
        .render(&source, filter, &mut rng)
        .with_context(|| format!("Failed to render: {}", args.input.display()))?;
    tracing::info!(
        "rendered {} ({}) -> {}x{} in {:.2?}",
        args.input.display(),
        filter,
        print.width(),
        print.height(),
        start.elapsed()
    );

    save_image(&args.output, print).with_context(|| format!("Failed to save: {}", args.output.display()))?;
    tracing::info!("wrote {}", args.output.display());
    Ok(())
}

/// An explicit `--filter` wins; otherwise ask the analyzer.
fn choose_filter(args: &RenderArgs, source: &PixelBuffer) -> Result<FilterKind> {
    if let Some(name) = &args.filter {
        return Ok(name.parse::<FilterKind>()?);
    }
    let analysis = analyze_or_default(&ResponseFileAnalyzer::new(args.analysis.clone()), source);
    tracing::info!("suggested {}: \"{}\"", analysis.suggested_filter, analysis.caption);
    if let Some(reasoning) = &analysis.reasoning {
        tracing::debug!("reasoning: {reasoning}");
    }
    Ok(analysis.suggested_filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn args(dir: &Path, filter: Option<&str>) -> RenderArgs {
        RenderArgs {
            input: dir.join("photo.png"),
            output: dir.join("print.png"),
            filter: filter.map(str::to_string),
            analysis: None,
            seed: Some(1),
            config: None,
        }
    }

    fn app() -> AppConfig {
        AppConfig {
            log_level: "info".to_string(),
            render_config: None,
        }
    }

    fn write_photo(path: &Path) {
        let buffer = PixelBuffer::from_rgba(12, 10, [90u8, 140, 200, 255].repeat(120)).unwrap();
        save_image(path, buffer).unwrap();
    }

    #[test]
    fn test_render_writes_framed_print() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(dir.path(), Some("cool"));
        write_photo(&a.input);
        run(a, &app()).unwrap();

        let print = load_image(&dir.path().join("print.png")).unwrap();
        assert_eq!((print.width(), print.height()), (52, 90));
    }

    #[test]
    fn test_same_seed_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let first = args(dir.path(), Some("warm"));
        write_photo(&first.input);
        run(first, &app()).unwrap();
        let a = load_image(&dir.path().join("print.png")).unwrap();

        run(args(dir.path(), Some("warm")), &app()).unwrap();
        let b = load_image(&dir.path().join("print.png")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_filter_fails() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(dir.path(), Some("sepia"));
        write_photo(&a.input);
        let err = run(a, &app()).unwrap_err();
        assert!(format!("{err:#}").contains("sepia"));
        assert!(!dir.path().join("print.png").exists());
    }

    #[test]
    fn test_without_filter_uses_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let response = dir.path().join("response.json");
        std::fs::write(&response, r#"{"suggestedFilter":"NONE","caption":"As is."}"#).unwrap();

        let mut a = args(dir.path(), None);
        a.analysis = Some(response);
        write_photo(&a.input);
        let source = load_image(&a.input).unwrap();
        assert_eq!(choose_filter(&a, &source).unwrap(), FilterKind::None);

        a.analysis = Some(PathBuf::from("/nonexistent/response.json"));
        assert_eq!(choose_filter(&a, &source).unwrap(), FilterKind::WarmStock);
    }
}
