//=========================================================================
// Display Surface
//=========================================================================
//
// What the context needs from the output surface: its framebuffer size,
// and a copy of the most recently presented frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use parking_lot::RwLock;

//=== FrameImage ==========================================================

/// RGBA8 image, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameImage {
    pub const CHANNELS: usize = 4;

    /// Transparent black image of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * Self::CHANNELS],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// RGBA value at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + Self::CHANNELS]);
        Some(rgba)
    }
}

/// Handle to a context's last-frame capture.
pub type SharedFrame = Arc<RwLock<FrameImage>>;

//=== DisplaySurface ======================================================

/// Output surface a context renders to.
pub trait DisplaySurface: Send + Sync {
    /// Current framebuffer size in pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Copies the most recently presented frame into `target`.
    ///
    /// `target` already has the size last reported by
    /// [`DisplaySurface::framebuffer_size`]. Surfaces with nothing presented
    /// yet leave it untouched.
    fn read_back(&self, target: &mut FrameImage);
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Surface with a settable size that fills reads with one colour.
    pub(crate) struct FakeSurface {
        pub size: Mutex<(u32, u32)>,
        pub fill: Mutex<[u8; 4]>,
        pub reads: AtomicUsize,
    }

    impl FakeSurface {
        pub fn new(width: u32, height: u32) -> Arc<Self> {
            Arc::new(Self {
                size: Mutex::new((width, height)),
                fill: Mutex::new([0, 0, 0, 255]),
                reads: AtomicUsize::new(0),
            })
        }

        pub fn resize(&self, width: u32, height: u32) {
            *self.size.lock() = (width, height);
        }
    }

    impl DisplaySurface for FakeSurface {
        fn framebuffer_size(&self) -> (u32, u32) {
            *self.size.lock()
        }

        fn read_back(&self, target: &mut FrameImage) {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let fill = *self.fill.lock();
            for pixel in target.pixels_mut().chunks_exact_mut(FrameImage::CHANNELS) {
                pixel.copy_from_slice(&fill);
            }
        }
    }

    #[test]
    fn new_image_is_zeroed_and_sized() {
        let image = FrameImage::new(3, 2);
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.pixels().len(), 24);
        assert_eq!(image.pixel(2, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn pixel_outside_is_none() {
        let image = FrameImage::new(3, 2);
        assert_eq!(image.pixel(3, 0), None);
        assert_eq!(image.pixel(0, 2), None);
    }

    #[test]
    fn zero_sized_image_is_empty() {
        assert!(FrameImage::new(0, 480).is_empty());
    }
}
