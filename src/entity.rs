use std::any::Any;

use ratatui::style::Color;

use crate::{
    collision::{Aabb, BoundingBox},
    render::Painter,
};

/// Position, visual size and collision box shared by every entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub width: u32,
    pub height: u32,
    bounding_box: BoundingBox,
}

impl Body {
    pub fn new(x: f32, y: f32, width: u32, height: u32) -> Self {
        Self::with_bounding_box(x, y, width, height, BoundingBox::matching(width, height))
    }

    pub fn with_bounding_box(x: f32, y: f32, width: u32, height: u32, bounding_box: BoundingBox) -> Self {
        Self {
            x,
            y,
            width,
            height,
            bounding_box,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn aabb(&self) -> Aabb {
        self.bounding_box.at(self.x, self.y)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width as f32 / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height as f32 / 2.0
    }
}

/// Lets the registry hand back concrete entity types from boxed trait objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Anything that lives on the field: drawn by the render thread, advanced by
/// the update thread.
pub trait Entity: AsAny + Send {
    fn body(&self) -> &Body;

    /// Draw at the current position. Must not change any state.
    fn render(&self, painter: &mut dyn Painter);

    fn update(&mut self, delta_time: f32);

    fn collides_with(&self, other: &dyn Entity) -> bool {
        self.body().aabb().intersects(&other.body().aabb())
    }

    fn render_bounding_box(&self, painter: &mut dyn Painter, color: Color) {
        let aabb = self.body().aabb();
        painter.stroke_rect(aabb.x, aabb.y, aabb.width, aabb.height, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker {
        body: Body,
    }

    impl Entity for Marker {
        fn body(&self) -> &Body {
            &self.body
        }

        fn render(&self, _painter: &mut dyn Painter) {}

        fn update(&mut self, _delta_time: f32) {}
    }

    fn marker(x: f32, y: f32, bounding_box: BoundingBox) -> Marker {
        Marker {
            body: Body::with_bounding_box(x, y, 10, 10, bounding_box),
        }
    }

    #[test]
    fn collides_with_uses_bounding_boxes_not_visual_size() {
        // Visually 2px apart, but the second box reaches 3px to the left.
        let a = marker(0.0, 0.0, BoundingBox::matching(10, 10));
        let b = marker(12.0, 0.0, BoundingBox::new(-3.0, 0.0, 10.0, 10.0));
        assert!(a.collides_with(&b));
        assert!(b.collides_with(&a));

        let c = marker(12.0, 0.0, BoundingBox::matching(10, 10));
        assert!(!a.collides_with(&c));
    }

    #[test]
    fn moving_an_entity_keeps_its_box_offsets() {
        let mut m = marker(0.0, 0.0, BoundingBox::new(1.0, -5.0, 8.0, 20.0));
        m.body.x = 40.0;
        m.body.y = 60.0;
        let aabb = m.body().aabb();
        assert_eq!((aabb.x, aabb.y, aabb.width, aabb.height), (41.0, 55.0, 8.0, 20.0));
        assert_eq!(m.body().bounding_box(), BoundingBox::new(1.0, -5.0, 8.0, 20.0));
    }
}
