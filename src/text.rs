use ratatui::style::Color;

use crate::{
    collision::BoundingBox,
    entity::{Body, Entity},
    render::Painter,
};

/// A line of text centred horizontally on its position, e.g. a score.
pub struct TextEntity {
    body: Body,
    color: Color,
    text: String,
}

impl TextEntity {
    pub fn new(x: f32, y: f32, color: Color) -> Self {
        // Size depends on the painter's font, so the entity itself has no extent.
        let body = Body::with_bounding_box(x, y, 0, 0, BoundingBox::new(0.0, 0.0, 0.0, 0.0));
        Self {
            body,
            color,
            text: String::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Entity for TextEntity {
    fn body(&self) -> &Body {
        &self.body
    }

    fn render(&self, painter: &mut dyn Painter) {
        if self.text.is_empty() {
            return;
        }
        let width = painter.text_width(&self.text);
        painter.draw_text(self.body.x - width / 2.0, self.body.y, &self.text, self.color);
    }

    fn update(&mut self, _delta_time: f32) {}
}
