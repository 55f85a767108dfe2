use crate::math::Vec2;

/// Axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Vec2::ZERO,
        size: Vec2::ZERO,
    };

    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Rect { origin, size }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect::new(Vec2::new(x, y), Vec2::new(width, height))
    }

    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    /// Inclusive on every edge.
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.origin.x && point.x <= max.x && point.y >= self.origin.y && point.y <= max.y
    }

    pub fn translate(&self, offset: Vec2) -> Self {
        Rect::new(self.origin + offset, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub fn new(width: T, height: T) -> Self {
        Size { width, height }
    }
}

impl Size<u32> {
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

impl Size<f32> {
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::from_xywh(10.0, 10.0, 20.0, 20.0);
        assert!(rect.contains(Vec2::new(10.0, 10.0)));
        assert!(rect.contains(Vec2::new(30.0, 30.0)));
        assert!(!rect.contains(Vec2::new(30.1, 15.0)));
        assert!(!rect.contains(Vec2::new(9.9, 15.0)));
    }

    #[test]
    fn test_rect_translate() {
        let rect = Rect::from_xywh(0.0, 0.0, 5.0, 5.0).translate(Vec2::new(3.0, 4.0));
        assert_eq!(rect.origin, Vec2::new(3.0, 4.0));
        assert_eq!(rect.size, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_size_to_vec2() {
        assert_eq!(Size::new(800u32, 600u32).to_vec2(), Vec2::new(800.0, 600.0));
    }
}
