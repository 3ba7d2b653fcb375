use ratatui::style::Color;

use crate::{
    config::{Field, Params},
    entity::{Body, Entity},
    render::Painter,
};

/// The centre line. Purely decorative, never moves.
pub struct NetEntity {
    body: Body,
    color: Color,
}

impl NetEntity {
    pub fn new(field: Field, color: Color) -> Self {
        let width = Params::NET_WIDTH;
        let x = field.center_x() - width as f32 / 2.0;
        Self {
            body: Body::new(x, 0.0, width, field.height as u32),
            color,
        }
    }
}

impl Entity for NetEntity {
    fn body(&self) -> &Body {
        &self.body
    }

    fn render(&self, painter: &mut dyn Painter) {
        painter.fill_rect(
            self.body.x,
            self.body.y,
            self.body.width as f32,
            self.body.height as f32,
            self.color,
        );
    }

    fn update(&mut self, _delta_time: f32) {}
}
