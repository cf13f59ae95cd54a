//! Image rendering driver.
//!
//! Rows are traced in parallel with rayon. Each row owns an RNG seeded from
//! the render seed and the row index, so output is reproducible no matter
//! how rows land on threads.

use crate::{Camera, Color, RenderSettings, Scene};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Exponent applied to clamped linear values when quantizing to 8 bits.
const DISPLAY_GAMMA: f32 = 0.6;

/// Progress notification sent after each finished row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProgress {
    pub finished_rows: usize,
    pub total_rows: usize,
}

impl RenderProgress {
    pub fn fraction(&self) -> f32 {
        if self.total_rows == 0 {
            1.0
        } else {
            self.finished_rows as f32 / self.total_rows as f32
        }
    }
}

/// Quantize a linear color to 8-bit RGB: clamp to [0, 1], then `x^0.6`.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    color
        .to_array()
        .map(|c| (255.0 * c.clamp(0.0, 1.0).powf(DISPLAY_GAMMA)) as u8)
}

/// Average of `samples` radiance estimates through pixel (x, y).
pub fn render_pixel(
    scene: &Scene,
    camera: &Camera,
    x: u32,
    y: u32,
    samples: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += scene.cast_ray(&ray, 0, rng);
    }

    pixel_color / samples.max(1) as f32
}

/// Linear radiance image, row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Packed 8-bit RGB, ready for an image encoder.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&c| color_to_rgb8(c)).collect()
    }
}

/// Render the whole image.
///
/// `camera` is re-initialized for the settings' resolution and field of
/// view. `progress` is called once per finished row, from worker threads.
pub fn render(
    scene: &Scene,
    camera: &Camera,
    settings: &RenderSettings,
    progress: impl Fn(RenderProgress) + Sync,
) -> ImageBuffer {
    let (width, height) = (settings.width, settings.height);
    let mut camera = camera
        .clone()
        .with_resolution(width, height)
        .with_fov(settings.vfov);
    camera.initialize();

    log::info!(
        "Rendering {}x{} at {} spp, max depth {}",
        width,
        height,
        settings.samples_per_pixel,
        scene.max_depth()
    );
    let start = Instant::now();

    let total_rows = height as usize;
    let finished = AtomicUsize::new(0);

    let rows: Vec<Vec<Color>> = (0..height)
        .into_par_iter()
        .map(|y| {
            let mut rng = StdRng::seed_from_u64(row_seed(settings.seed, y));
            let row = (0..width)
                .map(|x| render_pixel(scene, &camera, x, y, settings.samples_per_pixel, &mut rng))
                .collect();

            let finished_rows = finished.fetch_add(1, Ordering::Relaxed) + 1;
            progress(RenderProgress {
                finished_rows,
                total_rows,
            });
            row
        })
        .collect();

    log::info!("Render finished in {:.2?}", start.elapsed());

    ImageBuffer {
        width,
        height,
        pixels: rows.into_iter().flatten().collect(),
    }
}

fn row_seed(seed: u64, row: u32) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ u64::from(row)
}
