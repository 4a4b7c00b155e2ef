//! Frame geometry for sprite sheets.
//!
//! Resolves which region of the sheet holds a given frame and how large the
//! drawing surface is once the display scale is applied. Everything here is
//! pure arithmetic.

use serde::{Deserialize, Serialize};

use crate::error::{SpriteError, SpriteResult};

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Resolution {
    pub w: f32,
    pub h: f32,
}

/// Source frame size plus display scale.
///
/// `source` is the size of one frame in the sheet; `scaled` is that size
/// multiplied by the scale factor and doubles as the surface size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGeometry {
    source: Resolution,
    scaled: Resolution,
    scale: f32,
}

impl FrameGeometry {
    /// Create geometry for frames of `width` x `height`, drawn at `scale`.
    pub fn new(width: f32, height: f32, scale: f32) -> SpriteResult<Self> {
        // NaN fails every comparison, so `!(x > 0.0)` rejects it too.
        if !(width > 0.0 && height > 0.0 && scale > 0.0) {
            return Err(SpriteError::InvalidDimensions {
                width,
                height,
                scale,
            });
        }
        Ok(Self {
            source: Resolution {
                w: width,
                h: height,
            },
            scaled: Resolution {
                w: width * scale,
                h: height * scale,
            },
            scale,
        })
    }

    /// Geometry with the default scale of 1.
    pub fn unscaled(width: f32, height: f32) -> SpriteResult<Self> {
        Self::new(width, height, 1.0)
    }

    /// Sheet region of frame `frame` in row `row`.
    pub fn source_rect(&self, frame: u32, row: u32) -> Rect {
        Rect {
            x: frame as f32 * self.source.w,
            y: row as f32 * self.source.h,
            width: self.source.w,
            height: self.source.h,
        }
    }

    /// Fixed destination region on the surface.
    pub fn dest_rect(&self) -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            width: self.scaled.w,
            height: self.scaled.h,
        }
    }

    pub fn frame_size(&self) -> Resolution {
        self.source
    }

    /// Size the drawing surface must have.
    pub fn surface_size(&self) -> Resolution {
        self.scaled
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}
