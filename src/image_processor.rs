//! # Image Processing Module
//!
//! Questo modulo incapsula il codec: ricompressione PNG lossless con
//! `oxipng` e conversione in WebP lossless con libwebp (crate `webp`), tutto
//! in-process.
//!
//! ## Operazioni
//!
//! | Operazione        | Input | Output              | Scrittura            |
//! |-------------------|-------|---------------------|----------------------|
//! | `recompress_png`  | PNG   | PNG (stesso path)   | sempre, anche se più grande |
//! | `convert_to_webp` | PNG   | WebP (path sibling) | PNG originale intatto |
//!
//! ## Lossless
//!
//! - La ricompressione lavora sui byte PNG, senza decodificare in un buffer
//!   RGB: palette, bit depth ridotti e canali restano come sono (o vengono
//!   ridotti da oxipng quando non si perde nulla).
//! - WebP lossless supporta solo RGB8/RGBA8: le immagini a 8 bit vengono
//!   espanse senza perdita, quelle a 16 bit vengono ridotte a 8 bit.
//! - L'encoder WebP usa `lossless = 1`, `quality = 100`, `method = 6` e
//!   `exact = 1` (RGB preservato anche sotto alpha zero).
//!
//! ## Concorrenza
//!
//! Le funzioni sono sincrone e CPU-bound: i chiamanti async le eseguono con
//! `tokio::task::spawn_blocking`.
//!
//! ## Esempio
//!
//! ```rust,ignore
//! let processor = ImageProcessor::new(&config);
//! let processed = processor.convert_to_webp(Path::new("assets/logo.png"))?;
//! println!("{} -> {}", processed.original_size, processed.new_size);
//! ```

use crate::config::{Config, PngCompression};
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::outcome::ProcessedFile;
use image::{ColorType, DynamicImage};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

pub const WEBP_EXTENSION: &str = "webp";
pub const PNG_EXTENSION: &str = "png";

/// libwebp "method": 0 is fastest, 6 is the slowest and smallest
const WEBP_METHOD: i32 = 6;

/// Stateless codec front-end; cheap to clone into worker tasks
#[derive(Debug, Clone, Copy)]
pub struct ImageProcessor {
    compression: PngCompression,
    dry_run: bool,
}

impl ImageProcessor {
    pub fn new(config: &Config) -> Self {
        Self {
            compression: config.png_compression,
            dry_run: config.dry_run,
        }
    }

    /// Optimizes a PNG losslessly and writes the result back to the same path.
    ///
    /// The file is overwritten whenever optimization succeeds, whatever the
    /// resulting size. In dry-run mode nothing is written and `new_size` is
    /// the size the optimizer produced.
    pub fn recompress_png(&self, path: &Path) -> Result<ProcessedFile, OptimizeError> {
        let original = std::fs::read(path)?;
        let original_size = original.len() as u64;
        let optimized = Self::optimize_png(&original, self.compression)?;

        let new_size = if self.dry_run {
            optimized.len() as u64
        } else {
            std::fs::write(path, &optimized)?;
            FileManager::file_size(path)?
        };

        debug!(
            "Recompressed {}: {} -> {} bytes",
            path.display(),
            original_size,
            new_size
        );

        Ok(ProcessedFile::new(
            path.to_path_buf(),
            path.to_path_buf(),
            original_size,
            new_size,
        ))
    }

    /// Decodes a PNG and writes a lossless WebP next to it. The PNG is left untouched.
    pub fn convert_to_webp(&self, path: &Path) -> Result<ProcessedFile, OptimizeError> {
        let original_size = FileManager::file_size(path)?;
        let output = FileManager::sibling_path(path, WEBP_EXTENSION);
        let img = Self::decode(path)?;
        let encoded = Self::encode_webp_lossless(&img)?;

        let new_size = if self.dry_run {
            encoded.len() as u64
        } else {
            std::fs::write(&output, &encoded)?;
            FileManager::file_size(&output)?
        };

        debug!(
            "Converted {} -> {}: {} -> {} bytes",
            path.display(),
            output.display(),
            original_size,
            new_size
        );

        Ok(ProcessedFile::new(
            path.to_path_buf(),
            output,
            original_size,
            new_size,
        ))
    }

    /// Decode by content rather than by extension, so `.PNG` and misnamed files work
    pub fn decode(path: &Path) -> Result<DynamicImage, OptimizeError> {
        let img = image::io::Reader::open(path)?
            .with_guessed_format()?
            .decode()?;
        Ok(img)
    }

    pub(crate) fn optimize_png(
        data: &[u8],
        compression: PngCompression,
    ) -> Result<Vec<u8>, OptimizeError> {
        let options = oxipng::Options::from_preset(compression.oxipng_preset());
        Ok(oxipng::optimize_from_memory(data, &options)?)
    }

    pub(crate) fn encode_webp_lossless(img: &DynamicImage) -> Result<Vec<u8>, OptimizeError> {
        // WebP only carries 8-bit RGB(A)
        let img: Cow<'_, DynamicImage> = match img.color() {
            ColorType::Rgb8 | ColorType::Rgba8 => Cow::Borrowed(img),
            other if other.has_alpha() => Cow::Owned(DynamicImage::ImageRgba8(img.to_rgba8())),
            _ => Cow::Owned(DynamicImage::ImageRgb8(img.to_rgb8())),
        };

        let encoder = if img.color() == ColorType::Rgba8 {
            webp::Encoder::from_rgba(img.as_bytes(), img.width(), img.height())
        } else {
            webp::Encoder::from_rgb(img.as_bytes(), img.width(), img.height())
        };

        let mut config = webp::WebPConfig::new()
            .map_err(|_| OptimizeError::Encoding("libwebp rejected the default configuration".to_string()))?;
        config.lossless = 1;
        config.quality = 100.0;
        config.method = WEBP_METHOD;
        config.exact = 1;

        let encoded = encoder
            .encode_advanced(&config)
            .map_err(|e| OptimizeError::Encoding(format!("{:?}", e)))?;
        Ok(encoded.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{gradient_rgb, gradient_rgba, noise_rgba, write_indexed_png, write_png};
    use image::{GrayAlphaImage, GrayImage, ImageFormat, LumaA, Luma};
    use tempfile::TempDir;

    fn processor(compression: PngCompression, dry_run: bool) -> ImageProcessor {
        ImageProcessor::new(&Config {
            png_compression: compression,
            dry_run,
            ..Default::default()
        })
    }

    #[test]
    fn test_recompress_preserves_pixels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gradient.png");
        let source = gradient_rgba(64, 48);
        write_png(&path, &source);

        let processed = processor(PngCompression::Best, false)
            .recompress_png(&path)
            .unwrap();

        assert_eq!(processed.output, path);
        assert_eq!(processed.new_size, std::fs::metadata(&path).unwrap().len());
        let after = ImageProcessor::decode(&path).unwrap();
        assert_eq!(after.to_rgba8(), source);
    }

    #[test]
    fn test_recompress_preserves_16_bit_pixels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep.png");
        let source = DynamicImage::ImageRgb16(image::ImageBuffer::from_fn(16, 16, |x, y| {
            image::Rgb([(x * 4000 + 7) as u16, (y * 3000 + 3) as u16, 65_000])
        }));
        source.save_with_format(&path, ImageFormat::Png).unwrap();

        processor(PngCompression::Best, false)
            .recompress_png(&path)
            .unwrap();

        let after = ImageProcessor::decode(&path).unwrap();
        assert_eq!(after.to_rgb16(), source.to_rgb16());
    }

    #[test]
    fn test_recompress_writes_optimizer_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("noise.png");
        write_png(&path, &noise_rgba(32, 32));

        let original = std::fs::read(&path).unwrap();
        let expected = ImageProcessor::optimize_png(&original, PngCompression::Fast).unwrap();

        let processed = processor(PngCompression::Fast, false)
            .recompress_png(&path)
            .unwrap();

        // No size gate on our side: whatever the optimizer returned is on disk
        assert_eq!(std::fs::read(&path).unwrap(), expected);
        assert_eq!(processed.original_size, original.len() as u64);
        assert_eq!(processed.new_size, expected.len() as u64);
        assert_eq!(
            processed.saved(),
            original.len() as i64 - expected.len() as i64
        );
    }

    #[test]
    fn test_recompress_keeps_indexed_png_compact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sprites.png");
        write_indexed_png(&path, 256, 256, png::BitDepth::Eight);
        let before = ImageProcessor::decode(&path).unwrap().to_rgba8();

        let processed = processor(PngCompression::Best, false)
            .recompress_png(&path)
            .unwrap();

        // Expanding the palette to RGB would roughly triple the raw data
        assert!(processed.new_size <= processed.original_size);
        assert_eq!(ImageProcessor::decode(&path).unwrap().to_rgba8(), before);
    }

    #[test]
    fn test_recompress_low_bit_depth_palettes() {
        let dir = TempDir::new().unwrap();
        let processor = processor(PngCompression::Best, false);

        for depth in [png::BitDepth::One, png::BitDepth::Two, png::BitDepth::Four] {
            let path = dir.path().join(format!("icons_{}bit.png", depth as u8));
            write_indexed_png(&path, 61, 37, depth);
            let before = ImageProcessor::decode(&path).unwrap().to_rgba8();

            let processed = processor.recompress_png(&path).unwrap();

            assert!(processed.new_size <= processed.original_size, "{:?}", depth);
            assert_eq!(ImageProcessor::decode(&path).unwrap().to_rgba8(), before);
        }
    }

    #[test]
    fn test_recompress_gray_alpha() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shadow.png");
        let source = GrayAlphaImage::from_fn(40, 24, |x, y| LumaA([(x * 6) as u8, (40 + y * 9) as u8]));
        source.save_with_format(&path, ImageFormat::Png).unwrap();

        let processed = processor(PngCompression::Best, false)
            .recompress_png(&path)
            .unwrap();

        assert!(processed.new_size <= processed.original_size);
        let after = ImageProcessor::decode(&path).unwrap();
        assert_eq!(after.to_luma_alpha8(), source);
    }

    #[test]
    fn test_convert_to_webp_is_lossless() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sprite.png");
        let source = gradient_rgba(40, 30);
        write_png(&path, &source);
        let png_bytes = std::fs::read(&path).unwrap();

        let processed = processor(PngCompression::Best, false)
            .convert_to_webp(&path)
            .unwrap();

        assert_eq!(processed.output, dir.path().join("sprite.webp"));
        assert_eq!(std::fs::read(&path).unwrap(), png_bytes);

        let webp = image::open(&processed.output).unwrap();
        assert_eq!(webp.to_rgba8(), source);
    }

    #[test]
    fn test_convert_keeps_color_under_transparent_pixels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cutout.png");
        let mut source = gradient_rgba(24, 24);
        for (x, _, pixel) in source.enumerate_pixels_mut() {
            if x < 8 {
                pixel.0[3] = 0;
            }
        }
        write_png(&path, &source);

        let processed = processor(PngCompression::Best, false)
            .convert_to_webp(&path)
            .unwrap();

        assert_eq!(image::open(&processed.output).unwrap().to_rgba8(), source);
    }

    #[test]
    fn test_convert_opaque_gray_and_indexed_images() {
        let dir = TempDir::new().unwrap();

        let rgb_path = dir.path().join("opaque.png");
        let rgb = gradient_rgb(20, 20);
        rgb.save_with_format(&rgb_path, ImageFormat::Png).unwrap();

        let gray_path = dir.path().join("gray.png");
        let gray = GrayImage::from_fn(20, 10, |x, y| Luma([(x * 10 + y) as u8]));
        gray.save_with_format(&gray_path, ImageFormat::Png).unwrap();

        let indexed_path = dir.path().join("indexed.png");
        write_indexed_png(&indexed_path, 33, 17, png::BitDepth::Four);

        let processor = processor(PngCompression::Best, false);
        for path in [&rgb_path, &gray_path, &indexed_path] {
            let processed = processor.convert_to_webp(path).unwrap();
            let original = ImageProcessor::decode(path).unwrap();
            let webp = image::open(&processed.output).unwrap();
            assert_eq!(webp.to_rgba8(), original.to_rgba8());
        }
    }

    #[test]
    fn test_convert_narrows_16_bit_to_8_bit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hdr.png");
        let source = DynamicImage::ImageRgba16(image::ImageBuffer::from_fn(12, 12, |x, y| {
            image::Rgba([
                (x * 5000 + 123) as u16,
                (y * 4000 + 77) as u16,
                ((x + y) * 2500) as u16,
                40_000 + (x * 100) as u16,
            ])
        }));
        source.save_with_format(&path, ImageFormat::Png).unwrap();

        let processed = processor(PngCompression::Best, false)
            .convert_to_webp(&path)
            .unwrap();

        let webp = image::open(&processed.output).unwrap();
        assert_eq!(webp.color(), ColorType::Rgba8);
        assert_eq!(webp.to_rgba8(), source.to_rgba8());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.png");
        write_png(&path, &gradient_rgba(16, 16));
        let before = std::fs::read(&path).unwrap();

        let processor = processor(PngCompression::Fast, true);
        let converted = processor.convert_to_webp(&path).unwrap();
        let recompressed = processor.recompress_png(&path).unwrap();

        assert!(!converted.output.exists());
        assert!(converted.new_size > 0);
        assert!(recompressed.new_size > 0);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_corrupt_png_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        let garbage = b"\x89PNG\r\n\x1a\nthis is not a png";
        std::fs::write(&path, garbage).unwrap();

        let processor = processor(PngCompression::Best, false);
        assert!(processor.convert_to_webp(&path).is_err());
        assert!(matches!(
            processor.recompress_png(&path),
            Err(OptimizeError::Png(_))
        ));
        assert!(!dir.path().join("broken.webp").exists());
        assert_eq!(std::fs::read(&path).unwrap(), garbage);
    }
}
