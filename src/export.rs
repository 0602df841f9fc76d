use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::rasterizer::ColorBuffer;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode png: {0}")]
    Png(#[from] png::EncodingError),
}

/// Binary PPM (P6), 8-bit RGB, alpha dropped.
pub fn write_ppm(path: impl AsRef<Path>, buffer: &ColorBuffer) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    let mut out = BufWriter::new(file);

    write!(out, "P6\n{} {}\n255\n", buffer.width(), buffer.height())?;
    for color in buffer.data() {
        out.write_all(&[color.r, color.g, color.b])?;
    }
    out.flush()?;

    log::info!("wrote {}", path.as_ref().display());
    Ok(())
}

/// 8-bit RGBA PNG.
pub fn write_png(path: impl AsRef<Path>, buffer: &ColorBuffer) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        buffer.width() as u32,
        buffer.height() as u32,
    );
    encoder.set_color(png::ColorType::RGBA);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let mut data = Vec::with_capacity(buffer.data().len() * 4);
    for color in buffer.data() {
        data.extend_from_slice(&[color.r, color.g, color.b, color.a]);
    }
    writer.write_image_data(&data)?;

    log::info!("wrote {}", path.as_ref().display());
    Ok(())
}
