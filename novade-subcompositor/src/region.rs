//! Rectangles and rectangle-set regions used for input and opaque regions.

/// An axis-aligned rectangle in integer surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Exclusive right edge, widened so that surfaces near the `i32` limit
    /// cannot overflow.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge, widened like [`right`](Self::right).
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn intersects(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && (self.x as i64) < other.right()
            && (other.x as i64) < self.right()
            && (self.y as i64) < other.bottom()
            && (other.y as i64) < self.bottom()
    }

    /// Returns `true` if the point lies inside the rectangle.
    ///
    /// The left and top edges are inclusive, the right and bottom edges are not.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x as f64
            && y >= self.y as f64
            && x < self.right() as f64
            && y < self.bottom() as f64
    }

    /// Moves the rectangle, saturating at the `i32` range.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Splits `self - other` into at most four disjoint rectangles.
    pub fn subtract(&self, other: &Self) -> Vec<Rectangle> {
        if !self.intersects(other) {
            return vec![*self];
        }

        // Every piece lies inside `self`, so its extents fit back into i32.
        let piece = |x: i64, y: i64, w: i64, h: i64| {
            Rectangle::new(clamp_i32(x), clamp_i32(y), clamp_i32(w), clamp_i32(h))
        };

        let mut parts = Vec::with_capacity(4);
        let (left, right) = (self.x as i64, self.right());
        let (top, bottom) = (self.y as i64, self.bottom());
        let (o_left, o_right) = (other.x as i64, other.right());
        let (o_top, o_bottom) = (other.y as i64, other.bottom());

        if top < o_top {
            parts.push(piece(left, top, right - left, o_top - top));
        }
        if bottom > o_bottom {
            parts.push(piece(left, o_bottom, right - left, bottom - o_bottom));
        }

        // Left and right slivers cover only the vertical overlap.
        let band_top = top.max(o_top);
        let band_bottom = bottom.min(o_bottom);
        if left < o_left {
            parts.push(piece(left, band_top, o_left - left, band_bottom - band_top));
        }
        if right > o_right {
            parts.push(piece(o_right, band_top, right - o_right, band_bottom - band_top));
        }
        parts
    }
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// A set of disjoint rectangles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    rectangles: Vec<Rectangle>,
}

impl Region {
    /// Creates an empty region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a region covering a single rectangle.
    pub fn from_rect(rect: Rectangle) -> Self {
        let mut region = Self::new();
        region.add(rect);
        region
    }

    pub fn is_empty(&self) -> bool {
        self.rectangles.is_empty()
    }

    pub fn rectangles(&self) -> &[Rectangle] {
        &self.rectangles
    }

    /// Adds `rect`, keeping the stored rectangles disjoint.
    pub fn add(&mut self, rect: Rectangle) {
        if rect.is_empty() {
            return;
        }
        let mut pieces = vec![rect];
        for existing in &self.rectangles {
            pieces = pieces
                .iter()
                .flat_map(|piece| piece.subtract(existing))
                .collect();
            if pieces.is_empty() {
                return;
            }
        }
        self.rectangles.extend(pieces);
    }

    /// Removes `rect` from the region, fragmenting rectangles it overlaps.
    pub fn subtract(&mut self, rect: Rectangle) {
        if rect.is_empty() || self.rectangles.is_empty() {
            return;
        }
        self.rectangles = self
            .rectangles
            .iter()
            .flat_map(|existing| existing.subtract(&rect))
            .collect();
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.rectangles.iter().any(|r| r.contains_point(x, y))
    }

    /// Total covered area.
    pub fn area(&self) -> i64 {
        self.rectangles
            .iter()
            .map(|r| r.width as i64 * r.height as i64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_contains_point_edges() {
        let rect = Rectangle::new(10, 10, 20, 20);
        assert!(rect.contains_point(10.0, 10.0));
        assert!(rect.contains_point(29.5, 29.5));
        assert!(!rect.contains_point(30.0, 15.0));
        assert!(!rect.contains_point(9.9, 15.0));
    }

    #[test]
    fn test_rectangle_subtract_center_hole() {
        let outer = Rectangle::new(0, 0, 30, 30);
        let hole = Rectangle::new(10, 10, 10, 10);
        let parts = outer.subtract(&hole);
        assert_eq!(parts.len(), 4);
        let area: i32 = parts.iter().map(|r| r.width * r.height).sum();
        assert_eq!(area, 900 - 100);
        assert!(parts.iter().all(|p| !p.intersects(&hole)));
    }

    #[test]
    fn test_region_add_overlapping_keeps_area_exact() {
        let mut region = Region::new();
        region.add(Rectangle::new(0, 0, 10, 10));
        region.add(Rectangle::new(5, 5, 10, 10));
        assert_eq!(region.area(), 100 + 100 - 25);
        assert!(region.contains_point(12.0, 12.0));
        assert!(!region.contains_point(12.0, 2.0));
    }

    #[test]
    fn test_region_add_contained_rect_is_noop() {
        let mut region = Region::from_rect(Rectangle::new(0, 0, 10, 10));
        region.add(Rectangle::new(2, 2, 3, 3));
        assert_eq!(region.rectangles().len(), 1);
        assert_eq!(region.area(), 100);
    }

    #[test]
    fn test_region_subtract() {
        let mut region = Region::from_rect(Rectangle::new(0, 0, 10, 10));
        region.subtract(Rectangle::new(0, 0, 5, 10));
        assert_eq!(region.area(), 50);
        assert!(!region.contains_point(1.0, 1.0));
        assert!(region.contains_point(6.0, 1.0));

        region.subtract(Rectangle::new(0, 0, 10, 10));
        assert!(region.is_empty());
    }

    #[test]
    fn test_rectangle_near_i32_limit() {
        let rect = Rectangle::new(i32::MAX - 4, i32::MAX - 4, 16, 16);
        assert_eq!(rect.right(), i32::MAX as i64 + 12);
        assert!(rect.contains_point((i32::MAX - 2) as f64, (i32::MAX - 2) as f64));
        assert!(!rect.contains_point(0.0, 0.0));

        let neighbour = Rectangle::new(i32::MAX - 1, i32::MAX - 1, 16, 16);
        assert!(rect.intersects(&neighbour));
        let parts = rect.subtract(&neighbour);
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| !p.intersects(&neighbour)));

        assert_eq!(rect.translate(10, i32::MIN).x, i32::MAX);
        assert_eq!(rect.translate(10, i32::MIN).y, -5);
    }

    #[test]
    fn test_region_near_i32_limit() {
        let mut region = Region::from_rect(Rectangle::new(i32::MAX - 4, 0, 16, 16));
        region.add(Rectangle::new(i32::MAX - 8, 0, 16, 16));
        assert_eq!(region.area(), 20 * 16);
        assert!(region.contains_point(i32::MAX as f64 + 5.0, 1.0));
    }

    #[test]
    fn test_empty_rect_is_ignored() {
        let mut region = Region::new();
        region.add(Rectangle::new(0, 0, 0, 10));
        assert!(region.is_empty());
    }
}
