//! Axis-aligned rectangles in world space.

use glam::Vec2;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Create bounds from a center and a half-extent.
    #[inline]
    pub fn from_center(center: Vec2, half_extent: f32) -> Self {
        Self {
            min_x: center.x - half_extent,
            min_y: center.y - half_extent,
            max_x: center.x + half_extent,
            max_y: center.y + half_extent,
        }
    }

    /// Swap reversed axes so that min <= max on both.
    #[inline]
    pub fn normalized(self) -> Self {
        Self {
            min_x: self.min_x.min(self.max_x),
            min_y: self.min_y.min(self.max_y),
            max_x: self.min_x.max(self.max_x),
            max_y: self.min_y.max(self.max_y),
        }
    }

    /// Closed-interval containment.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }

    /// Check if two bounds overlap (touching edges count).
    #[inline]
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(other.min_x > self.max_x
            || other.max_x < self.min_x
            || other.min_y > self.max_y
            || other.max_y < self.min_y)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_intersects() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, 5.0, 15.0, 15.0);
        let c = Bounds::new(20.0, 20.0, 30.0, 30.0);
        let edge = Bounds::new(10.0, 0.0, 20.0, 10.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(!c.intersects(&a));
        assert!(a.intersects(&edge));
    }

    #[test]
    fn test_from_center_and_normalize() {
        let b = Bounds::from_center(Vec2::new(100.0, 50.0), 25.0);
        assert_eq!(b, Bounds::new(75.0, 25.0, 125.0, 75.0));
        assert_eq!(b.width(), 50.0);

        let reversed = Bounds::new(10.0, 20.0, 0.0, 5.0).normalized();
        assert_eq!(reversed, Bounds::new(0.0, 5.0, 10.0, 20.0));
        assert!(reversed.contains(Vec2::new(10.0, 20.0)));
        assert!(!reversed.contains(Vec2::new(10.1, 20.0)));
    }
}
