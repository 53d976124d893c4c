//! Points and rectangles
//!
//! QuickDraw coordinates: `left`/`top` are inclusive, `right`/`bottom`
//! exclusive. A rectangle with `right <= left` or `bottom <= top` is empty.

/// A pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Horizontal coordinate
    pub h: i32,
    /// Vertical coordinate
    pub v: i32,
}

impl Point {
    pub const fn new(h: i32, v: i32) -> Self {
        Self { h, v }
    }
}

/// An axis-aligned rectangle given by its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a rectangle from its edges
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from an origin and a size
    pub const fn from_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self::new(left, top, left.saturating_add(width), top.saturating_add(height))
    }

    /// The empty rectangle at the origin
    pub const EMPTY: Rect = Rect::new(0, 0, 0, 0);

    /// Horizontal extent, saturating at `i32::MAX`/`i32::MIN`
    #[inline]
    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    /// Vertical extent, saturating at `i32::MAX`/`i32::MIN`
    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Check if the rectangle encloses no pixels
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Check if rectangle contains a point
    pub fn contains(&self, pt: Point) -> bool {
        pt.h >= self.left && pt.h < self.right && pt.v >= self.top && pt.v < self.bottom
    }

    /// Check if this rectangle shares at least one pixel with another
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.is_empty()
            || other.is_empty()
            || self.right <= other.left
            || other.right <= self.left
            || self.bottom <= other.top
            || other.bottom <= self.top)
    }

    /// Get intersection with another rectangle
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }

        Some(Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        })
    }

    /// Smallest rectangle enclosing both
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }

        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Clamp each edge into `0..=width` / `0..=height`.
    ///
    /// Edges are clipped, never wrapped. The result may be empty.
    pub fn clamp_to(&self, width: i32, height: i32) -> Rect {
        Rect {
            left: self.left.max(0),
            top: self.top.max(0),
            right: self.right.min(width),
            bottom: self.bottom.min(height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersection() {
        let r1 = Rect::new(0, 0, 100, 100);
        let r2 = Rect::new(50, 50, 150, 150);

        assert!(r1.intersects(&r2));
        assert_eq!(r1.intersection(&r2), Some(Rect::new(50, 50, 100, 100)));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let r1 = Rect::new(0, 0, 10, 10);
        let r2 = Rect::new(10, 0, 20, 10);

        assert!(!r1.intersects(&r2));
        assert_eq!(r1.intersection(&r2), None);
    }

    #[test]
    fn test_rect_union_ignores_empty() {
        let r1 = Rect::new(5, 5, 10, 10);
        assert_eq!(Rect::EMPTY.union(&r1), r1);
        assert_eq!(r1.union(&Rect::new(0, 0, 2, 2)), Rect::new(0, 0, 10, 10));
    }

    #[test]
    fn test_extent_saturates_on_far_edges() {
        let r = Rect::new(-2_000_000_000, i32::MIN, 2_000_000_000, i32::MAX);
        assert_eq!(r.width(), i32::MAX);
        assert_eq!(r.height(), i32::MAX);
        assert_eq!(Rect::new(i32::MAX, 0, i32::MIN, 1).width(), i32::MIN);
        assert_eq!(Rect::from_size(i32::MAX - 1, 0, 10, 1).right, i32::MAX);
    }

    #[test]
    fn test_clamp_clips_instead_of_wrapping() {
        let r = Rect::new(-5, -3, 30, 25);
        assert_eq!(r.clamp_to(20, 20), Rect::new(0, 0, 20, 20));

        let outside = Rect::new(25, 25, 40, 40).clamp_to(20, 20);
        assert!(outside.is_empty());
    }

    #[test]
    fn test_contains_excludes_far_edges() {
        let r = Rect::from_size(2, 2, 3, 3);
        assert!(r.contains(Point::new(2, 2)));
        assert!(r.contains(Point::new(4, 4)));
        assert!(!r.contains(Point::new(5, 4)));
        assert!(!r.contains(Point::new(4, 5)));
    }
}
