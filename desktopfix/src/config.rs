//! DesktopFix configuration constants.
//!
//! Compile-time values that describe the host's data layouts and the
//! default size window the repair guard accepts. Runtime tuning of the
//! guard goes through [`RepairLimits`].

/// Trap word of `FillCRgn`.
pub const FILL_C_RGN_TRAP: u16 = 0xAA12;

/// Trap word of `EraseRect`.
pub const ERASE_RECT_TRAP: u16 = 0xA8A3;

/// Valid bits of a pixel map's `rowBytes`. The top two bits are flags.
pub const ROW_BYTES_MASK: u16 = 0x3FFF;

/// The only destination depth the fix writes to.
pub const SCREEN_PIXEL_SIZE: u16 = 32;

/// The only pattern tile depth the renderer reads.
pub const TILE_PIXEL_SIZE: u16 = 8;

/// Gestalt value of the first QuickDraw with direct-color support.
pub const GESTALT_32BIT_QD: u32 = 0x0200;

/// Smallest region extent (both axes) the guard accepts.
pub const MIN_REGION_EXTENT: i32 = 4;

/// Smallest rectangle extent (both axes) the guard accepts.
pub const MIN_RECT_EXTENT: i32 = 2;

/// Largest extent (both axes) the guard accepts.
pub const MAX_EXTENT: i32 = 250;

/// Size window used by the repair guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairLimits {
    /// Minimum width and height of a region fill
    pub min_region_extent: i32,
    /// Minimum width and height of a rectangle erase
    pub min_rect_extent: i32,
    /// Maximum width and height of either form
    pub max_extent: i32,
}

impl Default for RepairLimits {
    fn default() -> Self {
        Self {
            min_region_extent: MIN_REGION_EXTENT,
            min_rect_extent: MIN_RECT_EXTENT,
            max_extent: MAX_EXTENT,
        }
    }
}
