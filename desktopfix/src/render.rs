//! Pattern tile renderer
//!
//! Repaints an area with a pixel pattern by reading the pattern's raw
//! 8-bit tile and color table and writing 32-bit pixels straight into the
//! screen. The tile repeats across the whole screen anchored at (0, 0),
//! so the pixel chosen for `(x, y)` never depends on where the area starts.
//!
//! Two clipping disciplines share one loop:
//!
//! - region form: only pixels inside the region are written;
//! - rect form: every pixel of the rectangle is written.
//!
//! In both, the iteration bounds are the area's bounding box clamped to
//! the screen.

use crate::config::TILE_PIXEL_SIZE;
use crate::error::PatternError;
use crate::geometry::{Point, Rect};
use crate::handle::Handle;
use crate::pattern::{ColorTable, PatternType, PixPat};
use crate::region::Region;
use crate::surface::PixelBuffer;

/// Work done by one render call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Rows visited
    pub rows: u32,
    /// Pixels stored into the frame buffer
    pub pixels_written: u64,
    /// Pixels whose tile index had no color table entry
    pub pixels_skipped: u64,
}

/// Locked view of a validated 8bpp tile.
pub struct TileSampler<'a> {
    data: &'a [u8],
    stride: usize,
    width: i32,
    height: i32,
    table: &'a ColorTable,
}

impl<'a> TileSampler<'a> {
    /// Tile coordinate for a screen coordinate (non-negative modulo)
    #[inline]
    pub fn tile_coord(&self, x: i32, y: i32) -> (usize, usize) {
        (
            x.rem_euclid(self.width) as usize,
            y.rem_euclid(self.height) as usize,
        )
    }

    /// Color index at a screen coordinate
    #[inline]
    pub fn index_at(&self, x: i32, y: i32) -> u8 {
        let (tx, ty) = self.tile_coord(x, y);
        self.data[ty * self.stride + tx]
    }

    /// 32-bit pixel at a screen coordinate, `None` if the index is past
    /// the end of the color table
    #[inline]
    pub fn pixel_at(&self, x: i32, y: i32) -> Option<u32> {
        self.table
            .get(self.index_at(x, y))
            .map(|spec| spec.rgb.to_xrgb32())
    }
}

/// Validate `pattern`, lock its blocks and hand the tile to `f`.
///
/// Every block locked here is back in its prior state when this returns,
/// whichever way it returns.
pub fn with_tile<R>(
    pattern: Option<&Handle<PixPat>>,
    f: impl FnOnce(&TileSampler<'_>) -> R,
) -> Result<R, PatternError> {
    let pp = pattern
        .and_then(Handle::peek)
        .ok_or(PatternError::MissingPattern)?;

    if pp.pat_type != PatternType::Pixel {
        return Err(PatternError::UnsupportedType(pp.pat_type));
    }

    let map_h = pp
        .pat_map
        .as_ref()
        .filter(|h| !h.is_purged())
        .ok_or(PatternError::MissingPixMap)?;
    let data_h = pp
        .pat_data
        .as_ref()
        .filter(|h| !h.is_purged())
        .ok_or(PatternError::MissingPixData)?;

    let map = map_h.lock().ok_or(PatternError::MissingPixMap)?;
    let data = data_h.lock().ok_or(PatternError::MissingPixData)?;

    let width = map.tile_width();
    let height = map.tile_height();
    if width <= 0 || height <= 0 {
        return Err(PatternError::EmptyTile { width, height });
    }
    if map.pixel_size != TILE_PIXEL_SIZE {
        return Err(PatternError::UnsupportedDepth(map.pixel_size));
    }

    let table = map
        .pm_table
        .as_ref()
        .and_then(Handle::lock)
        .ok_or(PatternError::MissingColorTable)?;

    let stride = map.stride();
    let needed = (height as usize - 1) * stride + width as usize;
    if data.len() < needed {
        return Err(PatternError::TruncatedData {
            needed,
            available: data.len(),
        });
    }

    let sampler = TileSampler {
        data: data.as_slice(),
        stride,
        width,
        height,
        table: &*table,
    };
    Ok(f(&sampler))
}

/// Repaint the pixels of `rgn` that lie on screen.
pub fn render_pattern_in_region(
    surface: &PixelBuffer,
    rgn: &Region,
    pattern: Option<&Handle<PixPat>>,
) -> Result<RenderStats, PatternError> {
    render_clipped(surface, &rgn.bounding_box(), pattern, |pt| rgn.contains(pt))
}

/// Repaint every on-screen pixel of `rect`.
pub fn render_pattern_in_rect(
    surface: &PixelBuffer,
    rect: &Rect,
    pattern: Option<&Handle<PixPat>>,
) -> Result<RenderStats, PatternError> {
    render_clipped(surface, rect, pattern, |_| true)
}

fn render_clipped<F>(
    surface: &PixelBuffer,
    area: &Rect,
    pattern: Option<&Handle<PixPat>>,
    include: F,
) -> Result<RenderStats, PatternError>
where
    F: Fn(Point) -> bool,
{
    with_tile(pattern, |tile| {
        let mut stats = RenderStats::default();
        let Some(clip) = surface.clip(area) else {
            return stats;
        };

        surface.for_each_row(&clip, |y, row| {
            stats.rows += 1;
            for x in clip.left..clip.right {
                if !include(Point::new(x, y)) {
                    continue;
                }
                match tile.pixel_at(x, y) {
                    Some(pixel) => {
                        if row.put(x, pixel) {
                            stats.pixels_written += 1;
                        }
                    }
                    None => stats.pixels_skipped += 1,
                }
            }
        });
        stats
    })
}
