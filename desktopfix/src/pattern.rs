//! Pixel pattern resources
//!
//! A `PixPat` points at a pixel map describing the tile (bounds, row
//! bytes, depth, color table) and at the raw tile bytes. All three live in
//! relocatable blocks owned by the Resource Manager.

use alloc::vec::Vec;

use crate::config::ROW_BYTES_MASK;
use crate::geometry::Rect;
use crate::handle::Handle;

/// `patType` of a `PixPat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternType {
    /// Old-style 8x8 one-bit pattern
    Mono,
    /// Indexed pixel tile with a color table
    Pixel,
    /// Single RGB color
    Rgb,
    /// Any other value
    Unknown(i16),
}

impl PatternType {
    pub fn from_raw(raw: i16) -> Self {
        match raw {
            0 => PatternType::Mono,
            1 => PatternType::Pixel,
            2 => PatternType::Rgb,
            other => PatternType::Unknown(other),
        }
    }

    pub fn raw(self) -> i16 {
        match self {
            PatternType::Mono => 0,
            PatternType::Pixel => 1,
            PatternType::Rgb => 2,
            PatternType::Unknown(other) => other,
        }
    }
}

/// 48-bit color, 16 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RgbColor {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl RgbColor {
    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }

    /// Pack the high byte of each channel as `0x00RRGGBB`.
    #[inline]
    pub fn to_xrgb32(self) -> u32 {
        ((self.red >> 8) as u32) << 16 | ((self.green >> 8) as u32) << 8 | (self.blue >> 8) as u32
    }
}

/// One color table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorSpec {
    /// Index value stored in the entry (not used for lookup)
    pub value: i16,
    pub rgb: RgbColor,
}

/// A color lookup table. Pixels index `entries` by position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorTable {
    pub seed: i32,
    pub flags: u16,
    pub entries: Vec<ColorSpec>,
}

impl ColorTable {
    /// A table whose entry values equal their positions
    pub fn from_colors<I: IntoIterator<Item = RgbColor>>(colors: I) -> Self {
        let entries = colors
            .into_iter()
            .enumerate()
            .map(|(i, rgb)| ColorSpec {
                value: i as i16,
                rgb,
            })
            .collect();
        Self {
            seed: 0,
            flags: 0,
            entries,
        }
    }

    /// Entry at a pixel index
    #[inline]
    pub fn get(&self, index: u8) -> Option<&ColorSpec> {
        self.entries.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pixel map header of a pattern tile.
#[derive(Debug)]
pub struct PixMap {
    pub bounds: Rect,
    /// Raw `rowBytes`, flag bits included
    pub row_bytes: u16,
    pub pixel_size: u16,
    pub pm_table: Option<Handle<ColorTable>>,
}

impl PixMap {
    /// Row stride in bytes, flag bits stripped
    #[inline]
    pub fn stride(&self) -> usize {
        (self.row_bytes & ROW_BYTES_MASK) as usize
    }

    pub fn tile_width(&self) -> i32 {
        self.bounds.width()
    }

    pub fn tile_height(&self) -> i32 {
        self.bounds.height()
    }
}

/// A color pattern.
#[derive(Debug)]
pub struct PixPat {
    pub pat_type: PatternType,
    pub pat_map: Option<Handle<PixMap>>,
    pub pat_data: Option<Handle<Vec<u8>>>,
}

impl PixPat {
    /// An indexed pixel tile
    pub fn pixel(pat_map: Handle<PixMap>, pat_data: Handle<Vec<u8>>) -> Self {
        Self {
            pat_type: PatternType::Pixel,
            pat_map: Some(pat_map),
            pat_data: Some(pat_data),
        }
    }
}
