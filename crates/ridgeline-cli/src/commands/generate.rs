//! Fractal heightfield generation command

use std::path::Path;

use anyhow::{Context, Result};
use ridgeline_terrain::{midpoint_displacement, HeightField, MidpointParams};

pub struct GenerateArgs {
    pub size: u32,
    pub roughness: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub seed: u64,
    pub output: String,
    pub preview: Option<String>,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let params = MidpointParams {
        size: args.size,
        roughness: args.roughness,
        min_height: args.min_height,
        max_height: args.max_height,
        seed: args.seed,
    };

    let field = midpoint_displacement(&params).context("Failed to generate height field")?;
    field
        .save_raw(Path::new(&args.output))
        .with_context(|| format!("Failed to save height field to {}", args.output))?;

    println!(
        "Generated {}x{} height field (seed {}) to {}",
        args.size, args.size, args.seed, args.output
    );

    if let Some(preview) = &args.preview {
        preview_image(&field)
            .save(preview)
            .with_context(|| format!("Failed to save preview to {}", preview))?;
        println!("Preview written to {}", preview);
    }

    Ok(())
}

/// 16-bit grayscale image spanning the field's height range
fn preview_image(field: &HeightField) -> image::ImageBuffer<image::Luma<u16>, Vec<u16>> {
    let (min, max) = field.height_range().unwrap_or((0.0, 0.0));
    let span = (max - min).max(f32::EPSILON);
    let size = field.size();

    image::ImageBuffer::from_fn(size, size, |x, z| {
        let t = ((field.get(x, z) - min) / span).clamp(0.0, 1.0);
        image::Luma([(t * 65535.0).round() as u16])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::temp_dir;

    #[test]
    fn writes_loadable_raw_file_and_preview() {
        let dir = temp_dir();
        let output = dir.join("hills.raw");
        let preview = dir.join("hills.png");

        run(GenerateArgs {
            size: 33,
            roughness: 1.0,
            min_height: 0.0,
            max_height: 50.0,
            seed: 5,
            output: output.to_string_lossy().into_owned(),
            preview: Some(preview.to_string_lossy().into_owned()),
        })
        .unwrap();

        let field = HeightField::load_raw(&output).unwrap();
        assert_eq!(field.size(), 33);
        let (min, max) = field.height_range().unwrap();
        assert!(min >= -1e-3 && max <= 50.0 + 1e-3);

        let png = HeightField::from_png(&preview).unwrap();
        assert_eq!(png.size(), 33);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_inverted_range() {
        let dir = temp_dir();
        let err = run(GenerateArgs {
            size: 17,
            roughness: 1.0,
            min_height: 10.0,
            max_height: 0.0,
            seed: 1,
            output: dir.join("x.raw").to_string_lossy().into_owned(),
            preview: None,
        })
        .err()
        .unwrap();
        assert!(format!("{:#}", err).contains("Invalid range"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
