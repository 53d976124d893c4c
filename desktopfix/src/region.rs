//! Regions
//!
//! A region is an arbitrary set of pixels, stored as a union of
//! rectangles with a cached bounding box (`rgnBBox`). Membership is exact
//! at pixel granularity, which is what the region-form renderer relies on.

use alloc::vec::Vec;

use crate::geometry::{Point, Rect};

/// Arbitrary pixel shape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    /// Bounding box of all parts
    bbox: Rect,
    /// Non-empty parts, possibly overlapping
    parts: Vec<Rect>,
}

impl Region {
    /// The empty region
    pub fn new() -> Self {
        Self::default()
    }

    /// A rectangular region
    pub fn from_rect(rect: Rect) -> Self {
        let mut rgn = Self::new();
        rgn.add_rect(rect);
        rgn
    }

    /// Union of the given rectangles
    pub fn from_rects<I: IntoIterator<Item = Rect>>(rects: I) -> Self {
        let mut rgn = Self::new();
        for rect in rects {
            rgn.add_rect(rect);
        }
        rgn
    }

    /// Add a rectangle to the region. Empty rectangles are ignored.
    pub fn add_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        self.bbox = self.bbox.union(&rect);
        self.parts.push(rect);
    }

    /// Bounding box (`rgnBBox`)
    #[inline]
    pub fn bounding_box(&self) -> Rect {
        self.bbox
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Exact pixel membership (`PtInRgn`)
    pub fn contains(&self, pt: Point) -> bool {
        self.bbox.contains(pt) && self.parts.iter().any(|r| r.contains(pt))
    }

    /// Check if any pixel of `rect` lies in the region (`RectInRgn`)
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.bbox.intersects(rect) && self.parts.iter().any(|r| r.intersects(rect))
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Region::from_rect(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An L shape: a 10x2 bar on top of a 2x8 stem
    fn l_shape() -> Region {
        Region::from_rects([Rect::new(0, 0, 10, 2), Rect::new(0, 2, 2, 10)])
    }

    #[test]
    fn test_bounding_box_covers_all_parts() {
        assert_eq!(l_shape().bounding_box(), Rect::new(0, 0, 10, 10));
    }

    #[test]
    fn test_membership_is_exact() {
        let rgn = l_shape();
        assert!(rgn.contains(Point::new(9, 0)));
        assert!(rgn.contains(Point::new(1, 9)));
        // Inside the bbox but outside the shape
        assert!(!rgn.contains(Point::new(5, 5)));
        assert!(!rgn.contains(Point::new(10, 0)));
    }

    #[test]
    fn test_rect_in_region() {
        let rgn = l_shape();
        assert!(rgn.intersects_rect(&Rect::new(1, 5, 4, 6)));
        assert!(!rgn.intersects_rect(&Rect::new(4, 4, 8, 8)));
    }

    #[test]
    fn test_empty_region() {
        let rgn = Region::from_rect(Rect::new(5, 5, 5, 9));
        assert!(rgn.is_empty());
        assert!(rgn.bounding_box().is_empty());
        assert!(!rgn.contains(Point::new(5, 5)));
    }
}
