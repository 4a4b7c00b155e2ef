//! Sprite sheet image handles.
//!
//! The animator never decodes pixels itself. It holds something that can say
//! whether the backing raster is usable yet and hands it to the canvas when
//! drawing. Loading may finish at any time after construction.

use std::cell::Cell;
use std::rc::Rc;

/// A raster image that may still be loading.
pub trait SheetImage {
    /// Where the image was requested from.
    fn locator(&self) -> &str;

    /// Whether the pixel data is available for drawing.
    fn is_ready(&self) -> bool;
}

/// Image handle whose readiness is flipped by a loader through a [`ReadySignal`].
#[derive(Debug, Clone)]
pub struct SheetHandle {
    locator: String,
    ready: Rc<Cell<bool>>,
}

impl SheetHandle {
    /// Handle for an image whose load is still in flight.
    pub fn pending(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            ready: Rc::new(Cell::new(false)),
        }
    }

    /// Handle for an image that is already usable.
    pub fn loaded(locator: impl Into<String>) -> Self {
        let handle = Self::pending(locator);
        handle.ready.set(true);
        handle
    }

    /// Signal the loader uses to report completion.
    pub fn signal(&self) -> ReadySignal {
        ReadySignal(Rc::clone(&self.ready))
    }
}

impl SheetImage for SheetHandle {
    fn locator(&self) -> &str {
        &self.locator
    }

    fn is_ready(&self) -> bool {
        self.ready.get()
    }
}

/// Loader side of a [`SheetHandle`].
#[derive(Debug, Clone)]
pub struct ReadySignal(Rc<Cell<bool>>);

impl ReadySignal {
    pub fn mark_ready(&self) {
        self.0.set(true);
    }

    /// Revert to not-ready, e.g. when the image is being reloaded.
    pub fn mark_unloaded(&self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_until_signalled() {
        let handle = SheetHandle::pending("hero.png");
        let signal = handle.signal();
        assert!(!handle.is_ready());
        signal.mark_ready();
        assert!(handle.is_ready());
        signal.mark_unloaded();
        assert!(!handle.is_ready());
    }

    #[test]
    fn test_loaded_is_ready() {
        let handle = SheetHandle::loaded("hero.png");
        assert!(handle.is_ready());
        assert_eq!(handle.locator(), "hero.png");
    }
}
