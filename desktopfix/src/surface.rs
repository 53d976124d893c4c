//! Surface info cache and direct frame buffer access
//!
//! The main device's pixel map is queried once, on first use, and kept
//! for the lifetime of the patch. Only 32bpp screens qualify; anything
//! else leaves the cache unready and the fix inactive.
//!
//! Pixels are written straight into the frame buffer as big-endian
//! `0x00RRGGBB` words, bypassing QuickDraw.

use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::Mutex;

use crate::config::{ROW_BYTES_MASK, SCREEN_PIXEL_SIZE};
use crate::error::SurfaceError;
use crate::geometry::Rect;
use crate::host::Host;

/// Bytes per destination pixel
const BYTES_PER_PIXEL: usize = 4;

/// Frame buffer memory owned by the display hardware.
///
/// Cloning shares the same memory.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    mem: Arc<Mutex<Vec<u8>>>,
}

impl FrameBuffer {
    /// Zero-filled memory of `len` bytes
    pub fn new(len: usize) -> Self {
        Self {
            mem: Arc::new(Mutex::new(alloc::vec![0u8; len])),
        }
    }

    pub fn len(&self) -> usize {
        self.mem.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the 32-bit word at a byte offset
    pub fn read_u32(&self, offset: usize) -> Option<u32> {
        let mem = self.mem.lock();
        let bytes = mem.get(offset..offset + BYTES_PER_PIXEL)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Write a 32-bit word at a byte offset. Returns false if out of range.
    pub fn write_u32(&self, offset: usize, value: u32) -> bool {
        let mut mem = self.mem.lock();
        match mem.get_mut(offset..offset + BYTES_PER_PIXEL) {
            Some(bytes) => {
                bytes.copy_from_slice(&value.to_be_bytes());
                true
            }
            None => false,
        }
    }

    /// Copy of the whole memory
    pub fn snapshot(&self) -> Vec<u8> {
        self.mem.lock().clone()
    }

    /// Run `f` with the memory locked
    pub fn with_bytes_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        let mut mem = self.mem.lock();
        f(&mut mem)
    }
}

/// Pixel map of a graphics device.
#[derive(Debug, Clone)]
pub struct DevicePixMap {
    pub base_addr: FrameBuffer,
    /// Raw `rowBytes`, flag bits included
    pub row_bytes: u16,
    pub pixel_size: u16,
    pub bounds: Rect,
}

/// A graphics device as returned by `GetMainDevice`.
#[derive(Debug, Clone)]
pub struct DeviceDescriptor {
    /// `None` when the device has no pixel map or it was purged
    pub pix_map: Option<DevicePixMap>,
}

/// Bounds-checked view of a 32bpp frame buffer.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    mem: FrameBuffer,
    row_bytes: usize,
    width: i32,
    height: i32,
}

impl PixelBuffer {
    /// Build the view from a device, rejecting anything but 32bpp
    pub fn from_device(device: &DeviceDescriptor) -> Result<Self, SurfaceError> {
        let pm = device.pix_map.as_ref().ok_or(SurfaceError::NoPixMap)?;
        if pm.pixel_size != SCREEN_PIXEL_SIZE {
            return Err(SurfaceError::UnsupportedDepth(pm.pixel_size));
        }

        let width = pm.bounds.width();
        let height = pm.bounds.height();
        if width <= 0 || height <= 0 {
            return Err(SurfaceError::EmptyBounds);
        }

        Ok(Self {
            mem: pm.base_addr.clone(),
            row_bytes: (pm.row_bytes & ROW_BYTES_MASK) as usize,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Row stride in bytes, flag bits stripped
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    /// Surface rectangle, anchored at the origin
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Clip a rectangle to the surface. `None` if nothing is left.
    pub fn clip(&self, rect: &Rect) -> Option<Rect> {
        let clipped = rect.clamp_to(self.width, self.height);
        if clipped.is_empty() {
            None
        } else {
            Some(clipped)
        }
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.row_bytes + x as usize * BYTES_PER_PIXEL)
    }

    /// Read a pixel
    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.mem.read_u32(self.offset(x, y)?)
    }

    /// Write a single pixel. Returns false if out of range.
    pub fn set_pixel(&self, x: i32, y: i32, value: u32) -> bool {
        match self.offset(x, y) {
            Some(offset) => self.mem.write_u32(offset, value),
            None => false,
        }
    }

    /// Call `f` once per row of `area` (already clipped by the caller or
    /// not), with the frame buffer locked for the whole span.
    pub fn for_each_row<F>(&self, area: &Rect, mut f: F)
    where
        F: FnMut(i32, &mut Row<'_>),
    {
        let Some(area) = self.clip(area) else {
            return;
        };

        let row_bytes = self.row_bytes;
        let width = self.width;
        self.mem.with_bytes_mut(|mem| {
            for y in area.top..area.bottom {
                let start = y as usize * row_bytes;
                if start >= mem.len() {
                    break;
                }
                let end = (start + row_bytes).min(mem.len());
                let mut row = Row {
                    bytes: &mut mem[start..end],
                    width,
                };
                f(y, &mut row);
            }
        });
    }
}

/// One scanline of a [`PixelBuffer`].
pub struct Row<'a> {
    bytes: &'a mut [u8],
    width: i32,
}

impl<'a> Row<'a> {
    /// Store a pixel. Returns false if `x` is outside the row.
    #[inline]
    pub fn put(&mut self, x: i32, value: u32) -> bool {
        if x < 0 || x >= self.width {
            return false;
        }
        let start = x as usize * BYTES_PER_PIXEL;
        match self.bytes.get_mut(start..start + BYTES_PER_PIXEL) {
            Some(px) => {
                px.copy_from_slice(&value.to_be_bytes());
                true
            }
            None => false,
        }
    }
}

/// Lazily populated screen description.
#[derive(Debug, Default)]
pub struct SurfaceCache {
    buffer: Option<PixelBuffer>,
}

impl SurfaceCache {
    pub const fn new() -> Self {
        Self { buffer: None }
    }

    /// Make sure the screen is known. Queries the host only until the
    /// first success.
    pub fn ensure(&mut self, host: &dyn Host) -> bool {
        if self.buffer.is_some() {
            return true;
        }

        match Self::query(host) {
            Ok(buffer) => {
                log::debug!(
                    "screen cached: {}x{}, rowBytes={}",
                    buffer.width(),
                    buffer.height(),
                    buffer.row_bytes()
                );
                self.buffer = Some(buffer);
                true
            }
            Err(err) => {
                log::debug!("screen unavailable: {}", err);
                false
            }
        }
    }

    fn query(host: &dyn Host) -> Result<PixelBuffer, SurfaceError> {
        let device = host.main_device().ok_or(SurfaceError::NoDevice)?;
        PixelBuffer::from_device(&device)
    }

    pub fn is_ready(&self) -> bool {
        self.buffer.is_some()
    }

    /// The cached screen, once ready
    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.buffer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{screen_device, MockHost};

    #[test]
    fn test_row_bytes_flag_bits_masked() {
        let mut device = screen_device(20, 20);
        if let Some(pm) = device.pix_map.as_mut() {
            pm.row_bytes |= 0x8000;
        }
        let buffer = PixelBuffer::from_device(&device).unwrap();
        assert_eq!(buffer.row_bytes(), 80);
        assert_eq!(buffer.bounds(), Rect::new(0, 0, 20, 20));
    }

    #[test]
    fn test_non_32bpp_rejected() {
        let mut device = screen_device(20, 20);
        if let Some(pm) = device.pix_map.as_mut() {
            pm.pixel_size = 16;
        }
        assert_eq!(
            PixelBuffer::from_device(&device).unwrap_err(),
            SurfaceError::UnsupportedDepth(16)
        );
    }

    #[test]
    fn test_missing_pix_map_rejected() {
        let device = DeviceDescriptor { pix_map: None };
        assert_eq!(
            PixelBuffer::from_device(&device).unwrap_err(),
            SurfaceError::NoPixMap
        );
    }

    #[test]
    fn test_pixel_access_is_bounds_checked() {
        let buffer = PixelBuffer::from_device(&screen_device(4, 4)).unwrap();
        assert!(buffer.set_pixel(3, 3, 0x00AB_CDEF));
        assert_eq!(buffer.pixel(3, 3), Some(0x00AB_CDEF));
        assert!(!buffer.set_pixel(4, 0, 1));
        assert!(!buffer.set_pixel(-1, 0, 1));
        assert_eq!(buffer.pixel(0, 4), None);
    }

    #[test]
    fn test_for_each_row_clips_to_surface() {
        let buffer = PixelBuffer::from_device(&screen_device(4, 4)).unwrap();
        let mut rows = alloc::vec::Vec::new();
        buffer.for_each_row(&Rect::new(-2, -2, 10, 2), |y, row| {
            rows.push(y);
            assert!(row.put(3, 1));
            assert!(!row.put(4, 1));
        });
        assert_eq!(rows, alloc::vec![0, 1]);
    }

    #[test]
    fn test_cache_queries_until_first_success() {
        let host = MockHost::new(8, 8);
        host.set_device(None);

        let mut cache = SurfaceCache::new();
        assert!(!cache.ensure(&host));
        assert!(!cache.is_ready());
        assert_eq!(host.device_queries(), 1);

        host.set_device(Some(screen_device(8, 8)));
        assert!(cache.ensure(&host));
        assert!(cache.ensure(&host));
        assert_eq!(host.device_queries(), 2);
        assert_eq!(cache.buffer().unwrap().width(), 8);
    }
}
