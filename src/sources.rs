//! Collaborator seams: image frames, ADC channels, GPIO lines
//!
//! The core only ever sees these traits; camera negotiation, SPI transfers
//! and GPIO line requests live behind them.

use std::path::Path;

use tracing::info;

use crate::raster::RgbRaster;

/// Supplies RGB frames on demand (camera, file, test fixture).
pub trait FrameSource {
    fn grab_frame(&mut self) -> Option<RgbRaster>;
}

/// Raw ADC access. Returns 0..1023, or -1 when the channel could not be
/// read.
pub trait RawAdc {
    fn read_channel(&mut self, channel: u8) -> i32;
}

/// Raw GPIO access. `None` when the line could not be read.
pub trait RawGpio {
    fn read_line(&mut self, line: u32) -> Option<bool>;
}

/// Frame source that serves one still image loaded from disk.
pub struct ImageFileSource {
    frame: RgbRaster,
}

impl ImageFileSource {
    pub fn load(path: &Path) -> Result<Self, String> {
        let decoded = image::open(path)
            .map_err(|e| format!("Failed to load image {}: {}", path.display(), e))?
            .to_rgb8();
        let (width, height) = decoded.dimensions();
        let frame = RgbRaster::from_raw(width as usize, height as usize, decoded.into_raw())?;
        info!(
            path = %path.display(),
            width,
            height,
            "loaded still image"
        );
        Ok(Self { frame })
    }
}

impl FrameSource for ImageFileSource {
    fn grab_frame(&mut self) -> Option<RgbRaster> {
        Some(self.frame.clone())
    }
}

/// ADC stub reporting every channel as unread; knobs stay at their defaults.
pub struct NullAdc;

impl RawAdc for NullAdc {
    fn read_channel(&mut self, _channel: u8) -> i32 {
        -1
    }
}

/// GPIO stub reporting every line as unreadable.
pub struct NullGpio;

impl RawGpio for NullGpio {
    fn read_line(&mut self, _line: u32) -> Option<bool> {
        None
    }
}
