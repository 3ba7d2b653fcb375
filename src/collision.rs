/// Collision rectangle relative to an entity's position.
///
/// The box is fixed when the entity is built and is free to differ from the
/// visual size, e.g. a ball hit box that is narrower than the sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub offset_x: f32,
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(offset_x: f32, offset_y: f32, width: f32, height: f32) -> Self {
        Self {
            offset_x,
            offset_y,
            width,
            height,
        }
    }

    /// Box covering exactly the visual rectangle of a `width` x `height` entity.
    pub fn matching(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    pub fn at(&self, x: f32, y: f32) -> Aabb {
        Aabb {
            x: x + self.offset_x,
            y: y + self.offset_y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Axis-aligned box in absolute field coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True only when the overlap has a non-empty area; shared edges don't count.
    pub fn intersects(&self, other: &Aabb) -> bool {
        if self.width <= 0.0 || self.height <= 0.0 || other.width <= 0.0 || other.height <= 0.0 {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separate_boxes_do_not_intersect() {
        let a = BoundingBox::matching(10, 10).at(0.0, 0.0);
        let b = BoundingBox::matching(10, 10).at(20.0, 0.0);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn shared_edge_is_not_a_collision_until_area_overlaps() {
        let a = BoundingBox::matching(10, 10).at(0.0, 0.0);

        let touching = BoundingBox::matching(10, 10).at(10.0, 0.0);
        assert!(!a.intersects(&touching));

        let overlapping = BoundingBox::matching(10, 10).at(9.0, 0.0);
        assert!(a.intersects(&overlapping));
        assert!(overlapping.intersects(&a));
    }

    #[test]
    fn offsets_shift_the_absolute_box() {
        let boxed = BoundingBox::new(2.0, -2.0, 20.0, 28.0);
        let aabb = boxed.at(100.0, 50.0);
        assert_eq!(aabb, Aabb { x: 102.0, y: 48.0, width: 20.0, height: 28.0 });
        assert_eq!(aabb.right(), 122.0);
        assert_eq!(aabb.bottom(), 76.0);
    }

    #[test]
    fn zero_area_box_never_intersects() {
        let empty = BoundingBox::new(0.0, 0.0, 0.0, 0.0).at(5.0, 5.0);
        let field = BoundingBox::matching(100, 100).at(0.0, 0.0);
        assert!(!empty.intersects(&field));
    }
}
