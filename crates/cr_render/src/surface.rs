use bevy::math::Affine2;
use cr_core::Rgba8;

/// A 2D immediate-mode drawing context.
///
/// Mirrors the subset of the HTML canvas API the runner draws with. Path
/// coordinates are mapped through the transform current at the time they are
/// added, not at `fill`/`stroke` time.
pub trait DrawSurface {
    /// Push the current transform and styles.
    fn save(&mut self);
    /// Pop the last saved state. No-op on an empty stack.
    fn restore(&mut self);

    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine2);
    fn set_fill_style(&mut self, color: Rgba8);
    fn set_stroke_style(&mut self, color: Rgba8);
    fn set_line_width(&mut self, width: f32);

    /// Reset the rectangle to transparent black.
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Discard the current path.
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn close_path(&mut self);
    /// Add a closed rounded-rectangle subpath.
    fn round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32);
    /// Add an elliptical arc as a new subpath. Angles are in radians.
    #[allow(clippy::too_many_arguments)]
    fn ellipse(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius_x: f32,
        radius_y: f32,
        rotation: f32,
        start_angle: f32,
        end_angle: f32,
    );

    fn fill(&mut self);
    fn stroke(&mut self);
}
