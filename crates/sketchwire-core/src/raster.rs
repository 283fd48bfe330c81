//! Addressable RGBA8 raster surface for freehand ink.
//!
//! The surface is owned by the embedding shell; the engine draws into it
//! during strokes and reads it back for history snapshots. Snapshot strings
//! are opaque `data:image/png;base64,...` values suitable for re-decoding.

use crate::component::SerializableColor;
use crate::error::RasterError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use kurbo::Point;

/// Compositing mode for stamping ink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Standard ink compositing.
    SourceOver,
    /// Reverse compositing for the eraser: removes destination alpha.
    DestinationOut,
}

/// In-memory copy of a surface's pixels, held during a stroke so the
/// preview can be rolled back without accumulating rendering error.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSnapshot {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterSnapshot {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Prefix of an encoded snapshot string.
const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// The raster surface contract between the engine and the embedding shell.
///
/// Implementations store unpremultiplied RGBA8 pixels in row-major order.
/// Everything else (snapshotting, compositing, encoding) is provided.
pub trait RasterSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn pixels(&self) -> &[u8];
    fn pixels_mut(&mut self) -> &mut [u8];

    /// True when the surface has no addressable pixels.
    fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Capture the current pixels for later rollback.
    fn snapshot(&self) -> Result<RasterSnapshot, RasterError> {
        if self.is_empty() {
            return Err(RasterError::Unavailable);
        }
        Ok(RasterSnapshot {
            width: self.width(),
            height: self.height(),
            pixels: self.pixels().to_vec(),
        })
    }

    /// Restore pixels captured by [`RasterSurface::snapshot`].
    fn restore(&mut self, snapshot: &RasterSnapshot) -> Result<(), RasterError> {
        if snapshot.width != self.width() || snapshot.height != self.height() {
            return Err(RasterError::BadSnapshot(format!(
                "snapshot is {}x{}, surface is {}x{}",
                snapshot.width,
                snapshot.height,
                self.width(),
                self.height()
            )));
        }
        self.pixels_mut().copy_from_slice(&snapshot.pixels);
        Ok(())
    }

    /// Clear the surface to fully transparent.
    fn clear(&mut self) {
        self.pixels_mut().fill(0);
    }

    /// Stamp a filled disc, compositing with the given mode.
    fn stamp_disc(&mut self, center: Point, radius: f64, color: SerializableColor, mode: BlendMode) {
        if self.is_empty() || radius <= 0.0 {
            return;
        }
        let width = self.width() as i64;
        let height = self.height() as i64;
        let x0 = ((center.x - radius).floor() as i64).max(0);
        let x1 = ((center.x + radius).ceil() as i64).min(width - 1);
        let y0 = ((center.y - radius).floor() as i64).max(0);
        let y1 = ((center.y + radius).ceil() as i64).min(height - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }
        let r_sq = radius * radius;
        let pixels = self.pixels_mut();
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f64 + 0.5 - center.x;
                let dy = py as f64 + 0.5 - center.y;
                if dx * dx + dy * dy > r_sq {
                    continue;
                }
                let idx = ((py * width + px) * 4) as usize;
                blend_pixel(&mut pixels[idx..idx + 4], color, mode);
            }
        }
    }

    /// Encode the surface as an opaque `data:image/png;base64,...` string.
    fn encode(&self) -> Result<String, RasterError> {
        if self.is_empty() {
            return Err(RasterError::Unavailable);
        }
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.width(), self.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| RasterError::Encode(e.to_string()))?;
            writer
                .write_image_data(self.pixels())
                .map_err(|e| RasterError::Encode(e.to_string()))?;
        }
        Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(&buf)))
    }

    /// Decode a snapshot string produced by [`RasterSurface::encode`] back
    /// into the surface. The decoded image must match the surface size.
    fn apply_encoded(&mut self, encoded: &str) -> Result<(), RasterError> {
        if self.is_empty() {
            return Err(RasterError::Unavailable);
        }
        let base64_part = encoded.strip_prefix(DATA_URI_PREFIX).unwrap_or(encoded);
        let bytes = STANDARD
            .decode(base64_part)
            .map_err(|e| RasterError::BadSnapshot(e.to_string()))?;
        let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
        let mut reader = decoder
            .read_info()
            .map_err(|e| RasterError::BadSnapshot(e.to_string()))?;
        let mut data = vec![0u8; reader.output_buffer_size()];
        let info = reader
            .next_frame(&mut data)
            .map_err(|e| RasterError::BadSnapshot(e.to_string()))?;
        if info.color_type != png::ColorType::Rgba || info.bit_depth != png::BitDepth::Eight {
            return Err(RasterError::BadSnapshot(format!(
                "unexpected pixel format {:?}/{:?}",
                info.color_type, info.bit_depth
            )));
        }
        if info.width != self.width() || info.height != self.height() {
            return Err(RasterError::BadSnapshot(format!(
                "image is {}x{}, surface is {}x{}",
                info.width,
                info.height,
                self.width(),
                self.height()
            )));
        }
        data.truncate(info.buffer_size());
        self.pixels_mut().copy_from_slice(&data);
        Ok(())
    }
}

/// Composite one source color onto a destination pixel.
fn blend_pixel(dst: &mut [u8], src: SerializableColor, mode: BlendMode) {
    let sa = src.a as f64 / 255.0;
    match mode {
        BlendMode::SourceOver => {
            let da = dst[3] as f64 / 255.0;
            let out_a = sa + da * (1.0 - sa);
            if out_a <= 0.0 {
                dst.fill(0);
                return;
            }
            let blend = |s: u8, d: u8| -> u8 {
                let s = s as f64 / 255.0;
                let d = d as f64 / 255.0;
                (((s * sa + d * da * (1.0 - sa)) / out_a) * 255.0).round() as u8
            };
            dst[0] = blend(src.r, dst[0]);
            dst[1] = blend(src.g, dst[1]);
            dst[2] = blend(src.b, dst[2]);
            dst[3] = (out_a * 255.0).round() as u8;
        }
        BlendMode::DestinationOut => {
            let da = dst[3] as f64 / 255.0;
            dst[3] = ((da * (1.0 - sa)) * 255.0).round() as u8;
        }
    }
}

/// Heap-backed surface implementation used by tests and headless embedders.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelSurface {
    /// Create a transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Resize the surface, discarding existing pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width as usize) * (height as usize) * 4];
    }

    /// Read one pixel as RGBA, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        Some([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }
}

impl RasterSurface for PixelSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}
