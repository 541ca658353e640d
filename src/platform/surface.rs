//=========================================================================
// Window Surface
//=========================================================================
//
// `DisplaySurface` for the platform window. The event loop records
// resizes; the renderer hands each finished frame to `present`, and the
// context copies the latest one back during its update.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;
use parking_lot::Mutex;

//=== Internal Dependencies ===============================================

use crate::core::context::{DisplaySurface, FrameImage};

//=== WindowSurface =======================================================

/// Framebuffer size and most recently presented frame of the window.
pub struct WindowSurface {
    size: Mutex<(u32, u32)>,
    presented: Mutex<Option<FrameImage>>,
}

impl WindowSurface {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            size: Mutex::new((width, height)),
            presented: Mutex::new(None),
        }
    }

    pub(crate) fn set_size(&self, width: u32, height: u32) {
        trace!(target: "platform", "Surface size {}x{}", width, height);
        *self.size.lock() = (width, height);
    }

    /// Records `frame` as the most recently presented image.
    pub fn present(&self, frame: FrameImage) {
        *self.presented.lock() = Some(frame);
    }
}

impl DisplaySurface for WindowSurface {
    fn framebuffer_size(&self) -> (u32, u32) {
        *self.size.lock()
    }

    /// Copies the overlapping top-left region when the presented frame
    /// and `target` differ in size.
    fn read_back(&self, target: &mut FrameImage) {
        let presented = self.presented.lock();
        let Some(source) = presented.as_ref() else {
            return;
        };

        let width = source.width().min(target.width()) as usize;
        let height = source.height().min(target.height()) as usize;
        let row_bytes = width * FrameImage::CHANNELS;
        let source_stride = source.width() as usize * FrameImage::CHANNELS;
        let target_stride = target.width() as usize * FrameImage::CHANNELS;

        for row in 0..height {
            let from = row * source_stride;
            let to = row * target_stride;
            target.pixels_mut()[to..to + row_bytes]
                .copy_from_slice(&source.pixels()[from..from + row_bytes]);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
