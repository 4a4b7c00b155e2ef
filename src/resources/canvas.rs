//! Drawing surfaces.
//!
//! [`Canvas`] is the 2D context the animator draws into: it can be sized,
//! cleared by region and blitted from a sheet image. [`RetainedCanvas`] is
//! the implementation shipped with the crate. It keeps the last blit so a
//! presenter (the raylib viewer, the headless printer, tests) can show or
//! inspect it after the fact.

use std::collections::VecDeque;

use serde::Serialize;

use crate::components::resolution::{Rect, Resolution};
use crate::resources::sheetimage::SheetImage;

/// 2D drawing context owned by one animator.
pub trait Canvas {
    /// Set the pixel size of the surface.
    fn resize(&mut self, size: Resolution);

    /// Clear `rect` to transparent.
    fn clear_rect(&mut self, rect: Rect);

    /// Copy `src` from `image` into `dst`, scaling as needed.
    fn draw_image(&mut self, image: &dyn SheetImage, src: Rect, dst: Rect);
}

/// Presentation properties of the surface inside its display tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceStyle {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub visible: bool,
}

impl SurfaceStyle {
    pub fn sized(size: Resolution) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: size.w,
            height: size.h,
            visible: true,
        }
    }
}

/// One blit, as recorded by [`RetainedCanvas`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawCall {
    /// Sequence number, counting every draw since creation.
    pub seq: u64,
    pub sheet: String,
    pub src: Rect,
    pub dst: Rect,
}

/// Canvas that remembers what is currently on it.
#[derive(Debug, Clone, Default)]
pub struct RetainedCanvas {
    size: Resolution,
    current: Option<DrawCall>,
    draws: u64,
    clears: u64,
    history: VecDeque<DrawCall>,
    history_limit: usize,
}

impl RetainedCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep up to `limit` past draw calls for inspection.
    pub fn with_history(limit: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(limit),
            history_limit: limit,
            ..Self::default()
        }
    }

    pub fn size(&self) -> Resolution {
        self.size
    }

    /// The blit currently visible, if the surface has not been cleared since.
    pub fn current(&self) -> Option<&DrawCall> {
        self.current.as_ref()
    }

    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    pub fn clear_count(&self) -> u64 {
        self.clears
    }

    pub fn history(&self) -> impl Iterator<Item = &DrawCall> {
        self.history.iter()
    }

    /// Remove and return the recorded history.
    pub fn drain_history(&mut self) -> Vec<DrawCall> {
        self.history.drain(..).collect()
    }
}

fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width && b.x < a.x + a.width && a.y < b.y + b.height && b.y < a.y + a.height
}

impl Canvas for RetainedCanvas {
    fn resize(&mut self, size: Resolution) {
        self.size = size;
        self.current = None;
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.clears += 1;
        if self.current.as_ref().is_some_and(|c| overlaps(&c.dst, &rect)) {
            self.current = None;
        }
    }

    fn draw_image(&mut self, image: &dyn SheetImage, src: Rect, dst: Rect) {
        self.draws += 1;
        let call = DrawCall {
            seq: self.draws,
            sheet: image.locator().to_string(),
            src,
            dst,
        };
        if self.history_limit > 0 {
            if self.history.len() == self.history_limit {
                self.history.pop_front();
            }
            self.history.push_back(call.clone());
        }
        self.current = Some(call);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::sheetimage::SheetHandle;

    fn full() -> Rect {
        Rect::new(0.0, 0.0, 32.0, 32.0)
    }

    #[test]
    fn test_draw_replaces_current() {
        let sheet = SheetHandle::loaded("hero.png");
        let mut canvas = RetainedCanvas::new();
        canvas.draw_image(&sheet, Rect::new(0.0, 0.0, 16.0, 16.0), full());
        canvas.draw_image(&sheet, Rect::new(16.0, 0.0, 16.0, 16.0), full());
        let current = canvas.current().unwrap();
        assert_eq!(current.seq, 2);
        assert_eq!(current.src.x, 16.0);
        assert_eq!(current.sheet, "hero.png");
        assert_eq!(canvas.draw_count(), 2);
    }

    #[test]
    fn test_clear_overlapping_blit() {
        let sheet = SheetHandle::loaded("hero.png");
        let mut canvas = RetainedCanvas::new();
        canvas.draw_image(&sheet, full(), full());
        canvas.clear_rect(Rect::new(100.0, 100.0, 4.0, 4.0));
        assert!(canvas.current().is_some());
        canvas.clear_rect(full());
        assert!(canvas.current().is_none());
        assert_eq!(canvas.clear_count(), 2);
    }

    #[test]
    fn test_history_is_bounded() {
        let sheet = SheetHandle::loaded("hero.png");
        let mut canvas = RetainedCanvas::with_history(2);
        for i in 0..3 {
            canvas.draw_image(&sheet, Rect::new(i as f32 * 16.0, 0.0, 16.0, 16.0), full());
        }
        let seqs: Vec<u64> = canvas.history().map(|c| c.seq).collect();
        assert_eq!(seqs, vec![2, 3]);
        assert_eq!(canvas.drain_history().len(), 2);
        assert_eq!(canvas.history().count(), 0);
    }

    #[test]
    fn test_no_history_by_default() {
        let sheet = SheetHandle::loaded("hero.png");
        let mut canvas = RetainedCanvas::new();
        canvas.draw_image(&sheet, full(), full());
        assert_eq!(canvas.history().count(), 0);
    }

    #[test]
    fn test_resize_clears_surface() {
        let sheet = SheetHandle::loaded("hero.png");
        let mut canvas = RetainedCanvas::new();
        canvas.draw_image(&sheet, full(), full());
        canvas.resize(Resolution { w: 64.0, h: 64.0 });
        assert!(canvas.current().is_none());
        assert_eq!(canvas.size(), Resolution { w: 64.0, h: 64.0 });
    }
}
