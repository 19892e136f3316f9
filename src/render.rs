//! Depth rendering: one closest-hit query per pixel, shaded by hit distance.

use std::f32::consts::FRAC_PI_2;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use log::debug;

use crate::bvh::Bvh;
use crate::camera::Camera;
use crate::ray::Ray;
use crate::Real;

/// A greyscale image, one byte per pixel, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthImage {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// `width * height` grey values.
    pub pixels: Vec<u8>,
}

/// Counters gathered while rendering a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    /// Wall clock time spent tracing.
    pub elapsed: Duration,
    /// Number of primary rays.
    pub rays: usize,
    /// Number of rays that hit a triangle.
    pub hits: usize,
    /// Nodes visited by all rays together.
    pub visited_nodes: usize,
}

impl RenderStats {
    /// Average number of nodes visited per ray.
    pub fn visited_per_ray(&self) -> f64 {
        if self.rays == 0 {
            0.0
        } else {
            self.visited_nodes as f64 / self.rays as f64
        }
    }
}

/// Maps a hit distance from `[0, inf)` to a grey value in `[0, 255)`.
/// Far hits are brighter than near ones.
pub fn depth_to_grey(t: Real) -> u8 {
    let normalized = t.atan() / FRAC_PI_2;
    (normalized * normalized * 255.0) as u8
}

/// Renders the view of `camera` into a `width` x `height` [`DepthImage`].
///
/// Missed pixels are black. Each image row is traced as one batch, in parallel with the
/// `rayon` feature.
pub fn render_depth(bvh: &Bvh, camera: &Camera, width: usize, height: usize) -> (DepthImage, RenderStats) {
    let start = Instant::now();
    let mut pixels = vec![0; width * height];
    let mut rays: Vec<Ray> = Vec::with_capacity(width);
    let mut visited_nodes = 0;
    let mut hits = 0;

    if width > 0 {
        for (y, row) in pixels.chunks_mut(width).enumerate() {
            rays.clear();
            rays.extend((0..width).map(|x| camera.primary_ray(x, y, width, height)));
            visited_nodes += bvh.intersect_batch(&mut rays);

            for (pixel, ray) in row.iter_mut().zip(&rays) {
                if ray.is_hit() {
                    *pixel = depth_to_grey(ray.t);
                    hits += 1;
                }
            }
        }
    }

    let stats = RenderStats {
        elapsed: start.elapsed(),
        rays: width * height,
        hits,
        visited_nodes,
    };
    debug!(
        "Rendered {}x{} in {:?}, {} hits, {:.1} nodes per ray",
        width,
        height,
        stats.elapsed,
        stats.hits,
        stats.visited_per_ray()
    );

    (
        DepthImage {
            width,
            height,
            pixels,
        },
        stats,
    )
}

/// Writes `image` as a binary (`P6`) PPM with equal red, green and blue channels.
pub fn write_ppm<W: Write>(image: &DepthImage, mut writer: W) -> io::Result<()> {
    write!(writer, "P6\n{} {}\n255\n", image.width, image.height)?;
    for &grey in &image.pixels {
        writer.write_all(&[grey, grey, grey])?;
    }
    writer.flush()
}

/// Writes `image` to the file at `path`, see [`write_ppm`].
pub fn save_ppm(image: &DepthImage, path: impl AsRef<Path>) -> io::Result<()> {
    let file = File::create(path)?;
    write_ppm(image, BufWriter::new(file))
}
