// PNG output for rendered pixel buffers.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::Result;
use crate::render::PixelBuffer;

#[inline]
fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl PixelBuffer {
    // Quantizes every channel to 8 bits.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| p.map(to_u8))
            .collect()
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut img = RgbaImage::new(self.width as u32, self.height as u32);
        for (i, p) in self.pixels.iter().enumerate() {
            let (x, y) = (i % self.width, i / self.width);
            img.put_pixel(x as u32, y as u32, Rgba(p.map(to_u8)));
        }
        img
    }
}

// Writes `buffer` as a PNG, creating missing parent directories.
pub fn save_png(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    buffer
        .to_rgba_image()
        .save_with_format(path, ImageFormat::Png)?;
    log::info!("Image saved to {}", path.display());
    Ok(())
}

// Encodes `buffer` as PNG bytes in memory.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    buffer
        .to_rgba_image()
        .write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
