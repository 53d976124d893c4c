//! Test fixtures: an in-memory host and pattern builders.

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use spin::Mutex;

use crate::geometry::Rect;
use crate::handle::Handle;
use crate::host::{GrafPort, Host, PortId, WindowRecord};
use crate::pattern::{ColorTable, PixMap, PixPat, RgbColor};
use crate::surface::{DeviceDescriptor, DevicePixMap, FrameBuffer, PixelBuffer};

pub const WMGR_PORT: PortId = PortId(0xD2C);
pub const OTHER_PORT: PortId = PortId(0x1000);
pub const MENU_BAR_HEIGHT: i32 = 20;

pub const RED: RgbColor = RgbColor::new(0xFFFF, 0, 0);
pub const BLUE: RgbColor = RgbColor::new(0, 0, 0xFFFF);

/// A 32bpp device with its own zeroed frame buffer
pub fn screen_device(width: i32, height: i32) -> DeviceDescriptor {
    let row_bytes = width as usize * 4;
    DeviceDescriptor {
        pix_map: Some(DevicePixMap {
            base_addr: FrameBuffer::new(row_bytes * height as usize),
            row_bytes: row_bytes as u16,
            pixel_size: 32,
            bounds: Rect::new(0, 0, width, height),
        }),
    }
}

/// A zeroed 32bpp screen
pub fn screen_buffer(width: i32, height: i32) -> PixelBuffer {
    match PixelBuffer::from_device(&screen_device(width, height)) {
        Ok(buffer) => buffer,
        Err(err) => panic!("test screen rejected: {}", err),
    }
}

/// An 8bpp pixel pattern
pub fn tile_pattern<I>(
    width: i32,
    height: i32,
    row_bytes: u16,
    data: Vec<u8>,
    colors: I,
) -> Handle<PixPat>
where
    I: IntoIterator<Item = RgbColor>,
{
    let map = PixMap {
        bounds: Rect::new(0, 0, width, height),
        row_bytes: 0x8000 | row_bytes,
        pixel_size: 8,
        pm_table: Some(Handle::new(ColorTable::from_colors(colors))),
    };
    Handle::new(PixPat::pixel(Handle::new(map), Handle::new(data)))
}

/// A 1x1 pattern of one color
pub fn solid_pattern(color: RgbColor) -> Handle<PixPat> {
    tile_pattern(1, 1, 1, alloc::vec![0], [color])
}

/// 2x2 red/blue checkerboard
pub fn checker_pattern() -> Handle<PixPat> {
    tile_pattern(2, 2, 2, alloc::vec![0, 1, 1, 0], [RED, BLUE])
}

/// In-memory host. The current port starts out as `WMgrCPort`.
pub struct MockHost {
    device: Mutex<Option<DeviceDescriptor>>,
    device_queries: AtomicU32,
    current_port: Mutex<PortId>,
    wmgr_port: Option<GrafPort>,
    menu_bar_height: i32,
    windows: Vec<WindowRecord>,
    quickdraw_version: Option<u32>,
}

impl MockHost {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            device: Mutex::new(Some(screen_device(width, height))),
            device_queries: AtomicU32::new(0),
            current_port: Mutex::new(WMGR_PORT),
            wmgr_port: Some(GrafPort::new(WMGR_PORT)),
            menu_bar_height: MENU_BAR_HEIGHT,
            windows: Vec::new(),
            quickdraw_version: Some(0x0230),
        }
    }

    pub fn with_windows(mut self, windows: Vec<WindowRecord>) -> Self {
        self.windows = windows;
        self
    }

    pub fn with_menu_bar_height(mut self, height: i32) -> Self {
        self.menu_bar_height = height;
        self
    }

    pub fn with_background(mut self, pattern: Handle<PixPat>) -> Self {
        self.wmgr_port = Some(GrafPort::with_background(WMGR_PORT, pattern));
        self
    }

    pub fn without_window_manager_port(mut self) -> Self {
        self.wmgr_port = None;
        self
    }

    pub fn with_quickdraw_version(mut self, version: Option<u32>) -> Self {
        self.quickdraw_version = version;
        self
    }

    pub fn set_device(&self, device: Option<DeviceDescriptor>) {
        *self.device.lock() = device;
    }

    pub fn set_screen_depth(&self, depth: u16) {
        if let Some(pm) = self.device.lock().as_mut().and_then(|d| d.pix_map.as_mut()) {
            pm.pixel_size = depth;
        }
    }

    pub fn set_current_port(&self, port: PortId) {
        *self.current_port.lock() = port;
    }

    pub fn device_queries(&self) -> u32 {
        self.device_queries.load(Ordering::Relaxed)
    }

    /// `WMgrCPort`'s background pattern
    pub fn background(&self) -> Option<&Handle<PixPat>> {
        self.wmgr_port.as_ref().and_then(|p| p.bk_pix_pat.as_ref())
    }

    fn frame_buffer(&self) -> DevicePixMap {
        match self.device.lock().as_ref().and_then(|d| d.pix_map.clone()) {
            Some(pm) => pm,
            None => panic!("mock host has no screen"),
        }
    }

    /// View of the screen as 32bpp, whatever the device claims
    pub fn pixels(&self) -> PixelBuffer {
        let mut pm = self.frame_buffer();
        pm.pixel_size = 32;
        match PixelBuffer::from_device(&DeviceDescriptor { pix_map: Some(pm) }) {
            Ok(buffer) => buffer,
            Err(err) => panic!("mock screen rejected: {}", err),
        }
    }

    pub fn pixels_snapshot(&self) -> Vec<u8> {
        self.frame_buffer().base_addr.snapshot()
    }

    /// Fill the on-screen part of `rect`, the way a primitive would
    pub fn paint(&self, rect: &Rect, value: u32) {
        let screen = self.pixels();
        screen.for_each_row(rect, |_, row| {
            for x in rect.left.max(0)..rect.right.min(screen.width()) {
                row.put(x, value);
            }
        });
    }
}

impl Host for MockHost {
    fn main_device(&self) -> Option<DeviceDescriptor> {
        self.device_queries.fetch_add(1, Ordering::Relaxed);
        self.device.lock().clone()
    }

    fn current_port(&self) -> PortId {
        *self.current_port.lock()
    }

    fn window_manager_port(&self) -> Option<&GrafPort> {
        self.wmgr_port.as_ref()
    }

    fn menu_bar_height(&self) -> i32 {
        self.menu_bar_height
    }

    fn window_list(&self) -> &[WindowRecord] {
        &self.windows
    }

    fn quickdraw_version(&self) -> Option<u32> {
        self.quickdraw_version
    }
}
