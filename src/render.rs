use std::sync::atomic::{AtomicBool, Ordering};

use ratatui::style::Color;

use crate::{config::Field, error::PongResult, registry::Registry, theme::ThemeColors};

/// Drawing primitives the rendering collaborator provides.
///
/// All coordinates are field coordinates: origin top-left, y downwards.
pub trait Painter {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    fn fill_round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, arc: f32, color: Color);

    fn fill_ellipse(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    /// Draw `text` with its top-left corner at (x, y).
    fn draw_text(&mut self, x: f32, y: f32, text: &str, color: Color);

    fn text_width(&self, text: &str) -> f32;
}

/// A drawing target that can show one complete frame at a time.
pub trait Surface: Send + 'static {
    fn present(&mut self, scene: &dyn Fn(&mut dyn Painter)) -> PongResult<()>;
}

/// Debug overlay settings shared between the input thread and the render loop.
#[derive(Debug)]
pub struct Overlay {
    show_bounding_boxes: AtomicBool,
    bounding_box_color: Color,
    fps_color: Color,
}

impl Overlay {
    pub fn new(show_bounding_boxes: bool, colors: &ThemeColors) -> Self {
        Self {
            show_bounding_boxes: AtomicBool::new(show_bounding_boxes),
            bounding_box_color: colors.bounding_box,
            fps_color: colors.text,
        }
    }

    pub fn show_bounding_boxes(&self) -> bool {
        self.show_bounding_boxes.load(Ordering::Relaxed)
    }

    pub fn set_show_bounding_boxes(&self, show: bool) {
        self.show_bounding_boxes.store(show, Ordering::Relaxed);
    }

    /// Flip the bounding box overlay, returning the new setting.
    pub fn toggle_bounding_boxes(&self) -> bool {
        !self.show_bounding_boxes.fetch_xor(true, Ordering::Relaxed)
    }
}

pub const FPS_MARGIN: f32 = 10.0;
pub const FPS_BASELINE: f32 = 20.0;

/// Paint one frame: every registered entity in registration order, the
/// bounding box overlay when enabled and the FPS counter in the top-right corner.
pub fn draw_scene(painter: &mut dyn Painter, registry: &Registry, overlay: &Overlay, fps: u32, field: Field) {
    let show_boxes = overlay.show_bounding_boxes();
    registry.for_each(|entity| {
        entity.render(painter);
        if show_boxes {
            entity.render_bounding_box(painter, overlay.bounding_box_color);
        }
    });

    let fps_text = format!("fps: {fps}");
    let text_width = painter.text_width(&fps_text);
    painter.draw_text(
        field.width - text_width - FPS_MARGIN,
        FPS_BASELINE,
        &fps_text,
        overlay.fps_color,
    );
}
