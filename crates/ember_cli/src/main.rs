//! Render the Cornell box to a PNG.
//!
//! Usage: ember [output.png] [settings.json]

mod cornell;

use anyhow::{Context, Result};
use ember_tracer::{render, RenderProgress, RenderSettings, SceneBuilder};
use std::env;
use std::fs;
use std::path::Path;

const DEFAULT_OUTPUT: &str = "binary.png";

fn load_settings(path: Option<&str>) -> Result<RenderSettings> {
    let settings = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file {}", path))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse settings file {}", path))?
        }
        None => RenderSettings::default(),
    };
    settings.validate()?;
    Ok(settings)
}

/// Log roughly every tenth of the image.
fn report(progress: RenderProgress) {
    let step = (progress.total_rows / 10).max(1);
    if progress.finished_rows % step == 0 || progress.finished_rows == progress.total_rows {
        log::info!("Rendering: {:.0}%", 100.0 * progress.fraction());
    }
}

fn save_png(path: &Path, width: u32, height: u32, rgb: Vec<u8>) -> Result<()> {
    let image = image::RgbImage::from_raw(width, height, rgb)
        .context("Image buffer does not match its dimensions")?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let output = args.get(1).map_or(DEFAULT_OUTPUT, String::as_str);
    let settings = load_settings(args.get(2).map(String::as_str))?;

    log::info!("Starting Ember: {:?}", settings);

    let scene = cornell::populate(SceneBuilder::new().with_settings(&settings)).build()?;
    let image = render(&scene, &cornell::camera(), &settings, report);

    save_png(Path::new(output), image.width, image.height, image.to_rgb8())?;
    log::info!("Wrote {}", output);

    Ok(())
}
