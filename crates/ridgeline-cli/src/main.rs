//! Ridgeline CLI - Inspect, generate and render GeoMip terrain

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{generate, info, lod_map, render};
use ridgeline_terrain::RenderMode;

#[derive(Parser)]
#[command(name = "ridgeline")]
#[command(about = "GeoMip terrain level-of-detail toolkit", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the patch layout, LOD bands and buffer sizes of a terrain
    Info {
        /// Path to terrain config (TOML)
        #[arg(long, default_value = "terrain.toml")]
        config: String,
    },

    /// Print the per-patch LOD map for a camera position
    LodMap {
        /// Path to terrain config (TOML)
        #[arg(long, default_value = "terrain.toml")]
        config: String,

        /// Camera position (comma-separated x,y,z)
        #[arg(long, value_parser = parse_vec3, default_value = "0,0,0")]
        camera: [f32; 3],

        /// Also print each patch's coarser-neighbour flags
        #[arg(long)]
        flags: bool,
    },

    /// Generate a fractal height field with midpoint displacement
    Generate {
        /// Samples per side (a power of two plus one)
        #[arg(long, default_value = "513")]
        size: u32,

        /// Detail falloff; higher values give smoother terrain
        #[arg(long, default_value = "1.0")]
        roughness: f32,

        #[arg(long, default_value = "0.0")]
        min_height: f32,

        #[arg(long, default_value = "256.0")]
        max_height: f32,

        /// Random seed
        #[arg(long, default_value = "7")]
        seed: u64,

        /// Output raw height field path
        #[arg(short, long, default_value = "terrain.raw")]
        output: String,

        /// Also write a 16-bit grayscale PNG preview
        #[arg(long)]
        preview: Option<String>,
    },

    /// Render a terrain to a PNG image (headless)
    Render {
        /// Path to terrain config (TOML)
        #[arg(long, default_value = "terrain.toml")]
        config: String,

        /// Output image path
        #[arg(short, long, default_value = "render.png")]
        output: String,

        /// Image width in pixels
        #[arg(long, default_value = "1280")]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value = "720")]
        height: u32,

        /// Camera position (comma-separated x,y,z)
        #[arg(long, value_parser = parse_vec3)]
        camera: Option<[f32; 3]>,

        /// Camera look-at point (comma-separated x,y,z)
        #[arg(long, value_parser = parse_vec3)]
        target: Option<[f32; 3]>,

        /// Camera horizontal angle in degrees
        #[arg(long)]
        yaw: Option<f32>,

        /// Camera vertical angle in degrees
        #[arg(long)]
        pitch: Option<f32>,

        /// Field of view in degrees
        #[arg(long)]
        fov: Option<f32>,

        /// What to draw: triangles, points, points-only
        #[arg(long, value_parser = parse_render_mode, default_value = "triangles")]
        mode: RenderMode,

        /// Draw every patch, even outside the view frustum
        #[arg(long)]
        no_cull: bool,
    },
}

fn parse_render_mode(s: &str) -> Result<RenderMode, String> {
    match s {
        "triangles" => Ok(RenderMode::Triangles),
        "points" => Ok(RenderMode::PointsOverlay),
        "points-only" => Ok(RenderMode::PointsOnly),
        _ => Err(format!(
            "unknown render mode '{}'; valid values: triangles, points, points-only",
            s
        )),
    }
}

fn parse_vec3(s: &str) -> Result<[f32; 3], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected 3 comma-separated values, got {}", parts.len()));
    }
    let x: f32 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: f32 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    let z: f32 = parts[2].trim().parse().map_err(|e| format!("invalid z: {}", e))?;
    Ok([x, y, z])
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Info { config } => info::run(&config),
        Commands::LodMap {
            config,
            camera,
            flags,
        } => lod_map::run(&config, camera, flags),
        Commands::Generate {
            size,
            roughness,
            min_height,
            max_height,
            seed,
            output,
            preview,
        } => generate::run(generate::GenerateArgs {
            size,
            roughness,
            min_height,
            max_height,
            seed,
            output,
            preview,
        }),
        Commands::Render {
            config,
            output,
            width,
            height,
            camera,
            target,
            yaw,
            pitch,
            fov,
            mode,
            no_cull,
        } => render::run(render::RenderArgs {
            config,
            output,
            width,
            height,
            camera,
            target,
            yaw,
            pitch,
            fov,
            mode,
            no_cull,
        }),
    };

    if let Err(err) = result {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}
