use std::hint::black_box;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use flexi_logger::{detailed_format, Logger};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tribvh::bvh::Bvh;
use tribvh::camera::Camera;
use tribvh::mesh::load_mesh;
use tribvh::ray::Ray;
use tribvh::render::{render_depth, save_ppm};
use tribvh::triangle::Triangle;
use tribvh::{Point3, Real, DEFAULT_AABB_EXPANSION};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log with timestamps and source locations
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct MeshArgs {
    /// Mesh file, `.tri` or `.stl`
    mesh: PathBuf,

    /// Factor applied to every coordinate while loading
    #[arg(long, default_value_t = 1.0)]
    scale: Real,

    /// Margin added to every node bounding box
    #[arg(long, default_value_t = DEFAULT_AABB_EXPANSION)]
    expansion: Real,
}

impl MeshArgs {
    fn build(&self) -> Result<Bvh> {
        let triangles = load_mesh(&self.mesh, self.scale)
            .with_context(|| format!("loading {}", self.mesh.display()))?;
        info!("Loaded {} triangles from {}", triangles.len(), self.mesh.display());

        let start = Instant::now();
        let bvh = Bvh::build(triangles, self.expansion);
        info!("Built BVH in {:?}", start.elapsed());
        Ok(bvh)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Build the hierarchy for a mesh and print its statistics
    Stats {
        #[command(flatten)]
        mesh: MeshArgs,

        /// Also print every node
        #[arg(long)]
        print_tree: bool,
    },

    /// Render a depth image of a mesh into a PPM file
    Render {
        #[command(flatten)]
        mesh: MeshArgs,

        #[arg(long, default_value_t = 640)]
        width: usize,

        #[arg(long, default_value_t = 640)]
        height: usize,

        /// Eye position as `x,y,z`
        #[arg(long, value_parser = parse_point, default_value = "0,-2,0")]
        eye: Point3,

        /// Point to look at as `x,y,z`
        #[arg(long, value_parser = parse_point, default_value = "0,0,0")]
        target: Point3,

        /// Field of view in degrees
        #[arg(long, default_value_t = 45.0)]
        fov: Real,

        /// Number of frames to trace, for timing
        #[arg(long, default_value_t = 1)]
        frames: usize,

        #[arg(short, long, default_value = "raytrace.ppm")]
        output: PathBuf,
    },

    /// Compare brute-force and BVH closest-hit times on random triangles
    Bench {
        #[arg(long, default_value_t = 10_000)]
        triangles: usize,

        #[arg(long, default_value_t = 10_000)]
        rays: usize,

        #[arg(long, default_value_t = 5)]
        samples: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn parse_point(s: &str) -> std::result::Result<Point3, String> {
    let coordinates = s
        .split(',')
        .map(|c| c.trim().parse::<Real>().map_err(|e| format!("{:?}: {}", c, e)))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match coordinates[..] {
        [x, y, z] => Ok(Point3::new(x, y, z)),
        _ => Err(format!("expected three comma separated numbers, got {:?}", s)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logger = Logger::try_with_env_or_str("info")?;
    let logger = if cli.verbose {
        logger.format(detailed_format)
    } else {
        logger
    };
    let _logger = logger.start()?;

    match cli.command {
        Command::Stats { mesh, print_tree } => {
            let bvh = mesh.build()?;
            bvh.log_stats();
            if print_tree {
                bvh.pretty_print();
            }
        }
        Command::Render {
            mesh,
            width,
            height,
            eye,
            target,
            fov,
            frames,
            output,
        } => {
            if width == 0 || height == 0 {
                bail!("image size must be positive, got {}x{}", width, height);
            }
            let bvh = mesh.build()?;
            bvh.log_stats();

            let camera = Camera::look_at(eye, target).with_fov(fov.to_radians());
            let mut total = Duration::ZERO;
            let mut image = None;
            for _ in 0..frames.max(1) {
                let (frame, stats) = render_depth(&bvh, &camera, width, height);
                info!(
                    "Rendering took {} ms, {} of {} rays hit, {:.1} nodes per ray",
                    stats.elapsed.as_millis(),
                    stats.hits,
                    stats.rays,
                    stats.visited_per_ray()
                );
                total += stats.elapsed;
                image = Some(frame);
            }
            info!(
                "Average milliseconds per frame: {:.3}",
                total.as_secs_f64() * 1000.0 / frames.max(1) as f64
            );

            if let Some(image) = image {
                save_ppm(&image, &output)
                    .with_context(|| format!("writing {}", output.display()))?;
                info!("Wrote {}", output.display());
            }
        }
        Command::Bench {
            triangles,
            rays,
            samples,
            seed,
        } => {
            if samples == 0 {
                bail!("need at least one sample");
            }
            let speedup = bench(triangles, rays, samples, seed);
            info!("Median BVH speedup over brute force: {:.2}x", speedup);
            println!("{}", speedup);
        }
    }

    Ok(())
}

/// Returns the median over `samples` runs of brute-force time divided by BVH build plus
/// query time.
fn bench(triangle_count: usize, ray_count: usize, samples: usize, seed: u64) -> f64 {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut speedups = Vec::with_capacity(samples);

    for i in 0..samples {
        let rays = (0..ray_count)
            .map(|_| Ray::new(random_point(&mut rng, 1.0), random_point(&mut rng, 1.0).coords))
            .collect::<Vec<_>>();
        let triangles = (0..triangle_count)
            .map(|_| {
                let center = random_point(&mut rng, 1000.0);
                Triangle::new(
                    center + random_point(&mut rng, 1.0).coords,
                    center + random_point(&mut rng, 1.0).coords,
                    center + random_point(&mut rng, 1.0).coords,
                )
            })
            .collect::<Vec<_>>();

        let measure_brute_force = |triangles: &[Triangle]| {
            let start = Instant::now();
            for ray in &rays {
                black_box(
                    black_box(triangles)
                        .iter()
                        .filter_map(|triangle| triangle.intersect(ray))
                        .fold(Real::INFINITY, Real::min),
                );
            }
            start.elapsed().as_secs_f64()
        };

        let measure_bvh = |triangles: Vec<Triangle>| {
            let start = Instant::now();
            let bvh = Bvh::build(black_box(triangles), DEFAULT_AABB_EXPANSION);
            for ray in &rays {
                let mut ray = *ray;
                black_box(bvh.traverse(&mut ray));
            }
            start.elapsed().as_secs_f64()
        };

        // Flip order to minimize bias due to caching.
        let (brute_force_duration, bvh_duration) = if i % 2 == 0 {
            let bvh_duration = measure_bvh(triangles.clone());
            (measure_brute_force(&triangles), bvh_duration)
        } else {
            let brute_force_duration = measure_brute_force(&triangles);
            (brute_force_duration, measure_bvh(triangles))
        };

        info!(
            "Sample {}: brute force {:.3} s, BVH {:.3} s",
            i, brute_force_duration, bvh_duration
        );
        speedups.push(brute_force_duration / bvh_duration);
    }

    speedups.sort_by(|a, b| a.total_cmp(b));
    speedups[samples / 2]
}

fn random_point(rng: &mut StdRng, extent: Real) -> Point3 {
    Point3::new(
        rng.random_range(-extent..=extent),
        rng.random_range(-extent..=extent),
        rng.random_range(-extent..=extent),
    )
}
