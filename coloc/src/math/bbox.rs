//! Axis-aligned bounding box for pixel regions.

/// Axis-aligned bounding box with `usize` coordinates.
///
/// Uses inclusive bounds: a pixel at (x, y) is inside if
/// `x_min <= x <= x_max` and `y_min <= y <= y_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    pub x_min: usize,
    pub x_max: usize,
    pub y_min: usize,
    pub y_max: usize,
}

impl Aabb {
    #[inline]
    pub const fn new(x_min: usize, x_max: usize, y_min: usize, y_max: usize) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Inverted box that any `include()` call will overwrite.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            x_min: usize::MAX,
            x_max: 0,
            y_min: usize::MAX,
            y_max: 0,
        }
    }

    /// True while no point has been included.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }

    #[inline]
    pub fn include(&mut self, x: usize, y: usize) {
        self.x_min = self.x_min.min(x);
        self.x_max = self.x_max.max(x);
        self.y_min = self.y_min.min(y);
        self.y_max = self.y_max.max(y);
    }

    /// Number of columns.
    #[inline]
    pub const fn width(&self) -> usize {
        self.x_max.saturating_sub(self.x_min) + 1
    }

    /// Number of rows.
    #[inline]
    pub const fn height(&self) -> usize {
        self.y_max.saturating_sub(self.y_min) + 1
    }

    #[inline]
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    #[inline]
    pub const fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Window with the same center and twice the extent, clipped to the image.
    ///
    /// An extent `w` grows by `w / 2` on the low side and `w - w / 2` on the
    /// high side, so the unclipped window spans exactly `2w` pixels.
    pub fn doubled_within(&self, image_width: usize, image_height: usize) -> Self {
        debug_assert!(!self.is_empty());
        debug_assert!(self.x_max < image_width && self.y_max < image_height);
        let (x_min, x_max) = double_span(self.x_min, self.x_max, image_width);
        let (y_min, y_max) = double_span(self.y_min, self.y_max, image_height);
        Self::new(x_min, x_max, y_min, y_max)
    }
}

#[inline]
fn double_span(lo: usize, hi: usize, limit: usize) -> (usize, usize) {
    let extent = hi - lo + 1;
    let before = extent / 2;
    let after = extent - before;
    (lo.saturating_sub(before), (hi + after).min(limit - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include() {
        let mut bbox = Aabb::empty();
        assert!(bbox.is_empty());
        bbox.include(5, 3);
        assert_eq!(bbox, Aabb::new(5, 5, 3, 3));
        assert!(!bbox.is_empty());

        bbox.include(2, 7);
        bbox.include(8, 1);
        assert_eq!(bbox, Aabb::new(2, 8, 1, 7));
    }

    #[test]
    fn test_width_height_area() {
        let bbox = Aabb::new(2, 5, 3, 8);
        assert_eq!(bbox.width(), 4);
        assert_eq!(bbox.height(), 6);
        assert_eq!(bbox.area(), 24);
    }

    #[test]
    fn test_contains() {
        let bbox = Aabb::new(2, 5, 3, 8);
        assert!(bbox.contains(2, 3));
        assert!(bbox.contains(5, 8));
        assert!(!bbox.contains(1, 5));
        assert!(!bbox.contains(3, 9));
    }

    #[test]
    fn test_doubled_interior() {
        // 3x3 box at (10..=12) grows by 1 before and 2 after.
        let bbox = Aabb::new(10, 12, 10, 12);
        let window = bbox.doubled_within(100, 100);
        assert_eq!(window, Aabb::new(9, 14, 9, 14));
        assert_eq!(window.width(), 6);
        assert_eq!(window.height(), 6);
    }

    #[test]
    fn test_doubled_even_extent() {
        let bbox = Aabb::new(10, 13, 20, 21);
        let window = bbox.doubled_within(100, 100);
        assert_eq!(window, Aabb::new(8, 15, 19, 22));
        assert_eq!(window.width(), 8);
        assert_eq!(window.height(), 4);
    }

    #[test]
    fn test_doubled_clipped_to_image() {
        let bbox = Aabb::new(0, 3, 7, 9);
        let window = bbox.doubled_within(10, 10);
        assert_eq!(window, Aabb::new(0, 5, 6, 9));
    }

    #[test]
    fn test_doubled_single_pixel() {
        let bbox = Aabb::new(4, 4, 4, 4);
        let window = bbox.doubled_within(10, 10);
        assert_eq!(window, Aabb::new(4, 5, 4, 5));
    }
}
