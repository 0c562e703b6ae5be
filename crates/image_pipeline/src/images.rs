//! Image-backed capabilities and the directory-to-directory entry point.
//!
//! These are the concrete collaborators the pipeline core treats as opaque:
//! [`LoadImageFile`] decodes a file into a [`DynamicImage`],
//! [`InvertColors`] is the per-image transform, and [`SaveImage`] persists a
//! result under the output directory keyed by the source file name.
//!
//! [`process_directory`] wires the three together over an enumerated input
//! directory; [`invert_directory`] fixes the transform to colour inversion.

use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, ImageReader};
use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use crate::capability::{Load, Persist};
use crate::pipeline::{Pipeline, PipelineConfig, PipelineReport};
use crate::source::ImageDirSource;
use crate::transform::Transform;

// ============================================================================
// LoadImageFile
// ============================================================================

/// Loads and decodes images from file paths.
///
/// Reads the whole file through a buffered reader, then decodes with the
/// format guessed from the content. An unreadable or undecodable file is a
/// returned error, which the pipeline counts as a load failure and skips.
#[derive(Debug, Clone)]
pub struct LoadImageFile {
    buffer_size: usize,
}

impl LoadImageFile {
    /// Creates a new image loader with an 8KB read buffer.
    pub fn new() -> Self {
        Self { buffer_size: 8192 }
    }
}

impl Default for LoadImageFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Load<PathBuf, DynamicImage> for LoadImageFile {
    fn load(&self, path: &PathBuf) -> Result<DynamicImage> {
        let file =
            File::open(path).with_context(|| format!("Failed to open image: {}", path.display()))?;

        let file_size = file.metadata()?.len() as usize;
        let mut reader = BufReader::with_capacity(self.buffer_size, file);
        let mut buffer = Vec::with_capacity(file_size);
        reader
            .read_to_end(&mut buffer)
            .with_context(|| format!("Failed to read image: {}", path.display()))?;

        let image = ImageReader::new(Cursor::new(buffer))
            .with_guessed_format()?
            .decode()
            .with_context(|| format!("Failed to decode image: {}", path.display()))?;

        Ok(image)
    }
}

// ============================================================================
// InvertColors
// ============================================================================

/// Inverts every colour channel of the image.
#[derive(Debug, Clone, Copy)]
pub struct InvertColors;

impl Transform<DynamicImage, DynamicImage> for InvertColors {
    fn apply(&self, mut image: DynamicImage) -> Result<DynamicImage> {
        image.invert();
        Ok(image)
    }
}

// ============================================================================
// SaveImage
// ============================================================================

/// Persists images under an output directory, keyed by the source file name.
///
/// `photos/cat.jpg` ends up as `<out_dir>/cat.jpg`; the encoder is chosen
/// from the extension.
#[derive(Debug, Clone)]
pub struct SaveImage {
    out_dir: PathBuf,
}

impl SaveImage {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

impl Persist<PathBuf, DynamicImage> for SaveImage {
    fn persist(&self, path: &PathBuf, image: DynamicImage) -> Result<()> {
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow!("Source path has no file name: {}", path.display()))?;
        let out_path = self.out_dir.join(file_name);
        image
            .save(&out_path)
            .with_context(|| format!("Failed to save image: {}", out_path.display()))?;
        Ok(())
    }
}

// ============================================================================
// Directory entry points
// ============================================================================

/// Runs `transform` over every image in `input_dir`, writing results to
/// `output_dir` under the same file names.
///
/// The output directory is created if missing; failure to create or access
/// it is fatal and the pipeline does not start. Per-image failures are
/// counted in the returned report.
pub fn process_directory<T>(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    num_workers: usize,
    transform: T,
) -> Result<PipelineReport>
where
    T: Transform<DynamicImage, DynamicImage> + 'static,
{
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();

    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let ids = ImageDirSource::with_default_extensions(input_dir).paths()?;

    let config = PipelineConfig::builder().num_workers(num_workers).build();
    let pipeline = Pipeline::new(
        LoadImageFile::new(),
        transform,
        SaveImage::new(output_dir),
        config,
    )?;
    pipeline.run(ids)
}

/// Inverts the colours of every image in `input_dir` into `output_dir`.
pub fn invert_directory(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    num_workers: usize,
) -> Result<PipelineReport> {
    process_directory(input_dir, output_dir, num_workers, InvertColors)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::{tempdir, NamedTempFile};

    fn create_test_image() -> Result<NamedTempFile> {
        // 3x3 RGB with one primary-colour pixel per diagonal cell
        let mut test_img = RgbImage::new(3, 3);
        test_img.put_pixel(0, 0, Rgb([255, 0, 0]));
        test_img.put_pixel(1, 1, Rgb([0, 255, 0]));
        test_img.put_pixel(2, 2, Rgb([0, 0, 255]));

        let temp_file = NamedTempFile::with_suffix(".png")?;
        test_img.save(temp_file.path())?;
        Ok(temp_file)
    }

    #[test]
    fn test_load_image_file() -> Result<()> {
        let temp_file = create_test_image()?;

        let loader = LoadImageFile::new();
        let loaded = loader.load(&temp_file.path().to_path_buf())?;

        let rgb = loaded.to_rgb8();
        assert_eq!(rgb.dimensions(), (3, 3));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(rgb.get_pixel(1, 1), &Rgb([0, 255, 0]));
        assert_eq!(rgb.get_pixel(2, 2), &Rgb([0, 0, 255]));
        Ok(())
    }

    #[test]
    fn test_load_failures_are_returned_not_thrown() {
        let loader = LoadImageFile::new();
        assert!(loader.load(&PathBuf::from("nonexistent.jpg")).is_err());
    }

    #[test]
    fn test_invert_colors() -> Result<()> {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 10]));
        img.put_pixel(1, 0, Rgb([1, 2, 3]));

        let inverted = InvertColors.apply(DynamicImage::ImageRgb8(img))?;
        let rgb = inverted.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([0, 255, 245]));
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([254, 253, 252]));
        Ok(())
    }

    #[test]
    fn test_double_inversion_is_identity() -> Result<()> {
        let temp_file = create_test_image()?;
        let loader = LoadImageFile::new();
        let original = loader.load(&temp_file.path().to_path_buf())?.to_rgb8();

        let round_trip = InvertColors.then(InvertColors);
        let result = round_trip
            .apply(DynamicImage::ImageRgb8(original.clone()))?
            .to_rgb8();
        assert_eq!(original, result);
        Ok(())
    }

    #[test]
    fn test_save_image_keyed_by_file_name() -> Result<()> {
        let out = tempdir()?;
        let sink = SaveImage::new(out.path());

        let img = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        sink.persist(&PathBuf::from("some/source/dir/pic.png"), img)?;

        assert!(out.path().join("pic.png").is_file());
        Ok(())
    }
}
