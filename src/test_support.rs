//! Fixture helpers shared by the unit tests.

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

/// Smooth gradient with partial (never zero) alpha; compresses well
pub fn gradient_rgba(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 7) as u8,
            (y * 5) as u8,
            ((x + y) * 3) as u8,
            128 + ((x * y) % 128) as u8,
        ])
    })
}

pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 11) as u8, (y * 13) as u8, ((x ^ y) * 9) as u8])
    })
}

/// Deterministic pseudo-random pixels; barely compressible
pub fn noise_rgba(width: u32, height: u32) -> RgbaImage {
    let mut state: u32 = 0x1234_5678;
    RgbaImage::from_fn(width, height, |_, _| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let [a, b, c, d] = state.to_le_bytes();
        Rgba([a, b, c, d | 1])
    })
}

pub fn write_png(path: &Path, img: &RgbaImage) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    img.save_with_format(path, ImageFormat::Png).unwrap();
}

/// Paletted PNG written with the `png` crate; `image` itself never writes indexed files.
///
/// The palette has `2^depth` non-gray entries and every index is used.
pub fn write_indexed_png(path: &Path, width: u32, height: u32, depth: png::BitDepth) {
    let bits = depth as usize;
    let colors = 1usize << bits;
    let palette: Vec<u8> = (0..colors)
        .flat_map(|i| [(i * 37 % 256) as u8, (i * 91 % 256) as u8, (255 - i % 256) as u8])
        .collect();

    let (width_px, height_px) = (width as usize, height as usize);
    let row_bytes = (width_px * bits + 7) / 8;
    let mut data = vec![0u8; row_bytes * height_px];
    for y in 0..height_px {
        for x in 0..width_px {
            let index = ((x + 3 * y) % colors) as u8;
            let bit = x * bits;
            let shift = 8 - bits - bit % 8;
            data[y * row_bytes + bit / 8] |= index << shift;
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(depth);
    encoder.set_palette(palette);
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(&data).unwrap();
}

