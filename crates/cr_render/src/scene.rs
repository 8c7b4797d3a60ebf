use std::f32::consts::TAU;

use bevy::math::{Affine2, Vec2};
use cr_core::{RenderStyle, RunnerState, Viewport};

use crate::surface::DrawSurface;

/// Corner radius as a fraction of the sprite size.
const CORNER_RATIO: f32 = 0.25;
/// Outline width in logical pixels.
const OUTLINE_WIDTH: f32 = 2.0;

/// Edge of the square a sprite of `size` occupies, outline included.
pub fn sprite_extent(size: f32) -> f32 {
    size + OUTLINE_WIDTH
}

/// Draw one frame: background, grid, then the sprite.
///
/// Reads state only. Everything is drawn inside a single save/restore pair so
/// no transform or style leaks to whoever uses the surface next.
pub fn render<S: DrawSurface + ?Sized>(state: &RunnerState, style: &RenderStyle, surface: &mut S) {
    let viewport = state.viewport;
    let base = Affine2::from_scale(Vec2::splat(viewport.pixel_ratio));
    let sprite = &state.sprite;
    let origin = Vec2::new(sprite.position.x, sprite.position.y + sprite.bob());

    surface.save();
    surface.set_transform(base);
    draw_backdrop(surface, &viewport, style);

    surface.set_transform(base * Affine2::from_translation(origin));
    draw_sprite(surface, sprite.size, style);
    surface.restore();
}

/// Draw the static layer only: background and grid.
///
/// Depends on nothing but the viewport and style, so hosts redraw it on
/// resize instead of every frame.
pub fn render_backdrop<S: DrawSurface + ?Sized>(viewport: &Viewport, style: &RenderStyle, surface: &mut S) {
    surface.save();
    surface.set_transform(Affine2::from_scale(Vec2::splat(viewport.pixel_ratio)));
    draw_backdrop(surface, viewport, style);
    surface.restore();
}

/// Draw the sprite centered on a square surface of [`sprite_extent`] logical
/// pixels per side. Everything outside the body is left transparent.
pub fn render_sprite<S: DrawSurface + ?Sized>(
    size: f32,
    pixel_ratio: f32,
    style: &RenderStyle,
    surface: &mut S,
) {
    let extent = sprite_extent(size);
    let center = Vec2::splat(extent / 2.0);

    surface.save();
    surface.set_transform(Affine2::from_scale(Vec2::splat(pixel_ratio)) * Affine2::from_translation(center));
    surface.clear_rect(-center.x, -center.y, extent, extent);
    draw_sprite(surface, size, style);
    surface.restore();
}

fn draw_backdrop<S: DrawSurface + ?Sized>(surface: &mut S, viewport: &Viewport, style: &RenderStyle) {
    surface.clear_rect(0.0, 0.0, viewport.width, viewport.height);
    surface.set_fill_style(style.background);
    surface.fill_rect(0.0, 0.0, viewport.width, viewport.height);

    draw_grid(surface, viewport.width, viewport.height, style);
}

fn draw_grid<S: DrawSurface + ?Sized>(surface: &mut S, width: f32, height: f32, style: &RenderStyle) {
    let tile = style.grid_size;
    if !(tile.is_finite() && tile > 0.0) {
        return;
    }

    surface.set_stroke_style(style.grid_line);
    surface.set_line_width(1.0);
    surface.begin_path();

    // Half-pixel offset keeps 1px lines on a single pixel column.
    let mut x = 0.0;
    while x <= width {
        surface.move_to(x + 0.5, 0.0);
        surface.line_to(x + 0.5, height);
        x += tile;
    }
    let mut y = 0.0;
    while y <= height {
        surface.move_to(0.0, y + 0.5);
        surface.line_to(width, y + 0.5);
        y += tile;
    }

    surface.stroke();
}

/// Sprite body, outline and eyes around the current origin.
fn draw_sprite<S: DrawSurface + ?Sized>(surface: &mut S, size: f32, style: &RenderStyle) {
    let half = size / 2.0;

    surface.begin_path();
    surface.round_rect(-half, -half, size, size, size * CORNER_RATIO);
    surface.set_fill_style(style.sprite_body);
    surface.fill();
    surface.set_stroke_style(style.sprite_outline);
    surface.set_line_width(OUTLINE_WIDTH);
    surface.stroke();

    let eye_x = size * 0.18;
    let eye_y = -size * 0.1;
    surface.set_fill_style(style.sprite_eye);
    surface.begin_path();
    surface.ellipse(-eye_x, eye_y, size * 0.07, size * 0.11, 0.0, 0.0, TAU);
    surface.ellipse(eye_x, eye_y, size * 0.07, size * 0.11, 0.0, 0.0, TAU);
    surface.fill();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_canvas::PixelCanvas;
    use crate::recording::{DrawCommand, RecordingSurface};
    use cr_core::{RunnerConfig, Viewport};

    fn style() -> RenderStyle {
        RenderStyle {
            background: [10, 10, 10, 255],
            grid_line: [50, 50, 50, 255],
            grid_size: 40.0,
            sprite_body: [200, 0, 0, 255],
            sprite_outline: [0, 200, 0, 255],
            sprite_eye: [0, 0, 200, 255],
        }
    }

    fn state(width: f32, height: f32, ratio: f32) -> RunnerState {
        RunnerState::new(&RunnerConfig::default(), Viewport::new(width, height, ratio))
    }

    #[test]
    fn render_is_bracketed_by_save_restore() {
        let state = state(200.0, 200.0, 1.0);
        let mut surface = RecordingSurface::new();

        render(&state, &style(), &mut surface);

        assert_eq!(surface.commands.first(), Some(&DrawCommand::Save));
        assert_eq!(surface.commands.last(), Some(&DrawCommand::Restore));
        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.max_depth(), 1);
    }

    #[test]
    fn render_draws_grid_and_sprite() {
        let state = state(200.0, 120.0, 1.0);
        let mut surface = RecordingSurface::new();

        render(&state, &style(), &mut surface);

        // 0..=200 step 40 vertical, 0..=120 step 40 horizontal.
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::MoveTo { .. })), 6 + 4);
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::RoundRect { .. })), 1);
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::Ellipse { .. })), 2);
    }

    #[test]
    fn bob_offsets_sprite_transform() {
        let mut state = state(200.0, 200.0, 1.0);
        state.sprite.pulse = std::f32::consts::FRAC_PI_2;
        let mut surface = RecordingSurface::new();

        render(&state, &style(), &mut surface);

        let transforms: Vec<_> = surface
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::SetTransform(t) => Some(*t),
                _ => None,
            })
            .collect();
        let sprite_transform = transforms[1];
        assert!((sprite_transform.translation - Vec2::new(100.0, 102.0)).length() < 1e-4);
    }

    #[test]
    fn pixels_land_where_expected() {
        let state = state(200.0, 200.0, 1.0);
        let mut canvas = PixelCanvas::new(200, 200);

        render(&state, &style(), &mut canvas);

        let style = style();
        assert_eq!(canvas.pixel(5, 5), Some(style.background));
        assert_eq!(canvas.pixel(40, 5), Some(style.grid_line));
        assert_eq!(canvas.pixel(100, 100), Some(style.sprite_body));
        assert_eq!(canvas.pixel(75, 100), Some(style.sprite_outline));
        assert_eq!(canvas.pixel(91, 95), Some(style.sprite_eye));
        assert_eq!(canvas.save_depth(), 0);
    }

    #[test]
    fn backdrop_has_no_sprite() {
        let state = state(200.0, 200.0, 1.0);
        let mut surface = RecordingSurface::new();

        render_backdrop(&state.viewport, &style(), &mut surface);

        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::RoundRect { .. })), 0);
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::Ellipse { .. })), 0);

        let mut canvas = PixelCanvas::new(200, 200);
        render_backdrop(&state.viewport, &style(), &mut canvas);
        assert_eq!(canvas.pixel(100, 100), Some(style().background));
        assert_eq!(canvas.pixel(40, 5), Some(style().grid_line));
    }

    #[test]
    fn sprite_layer_is_centered_and_transparent_outside() {
        let style = style();
        let side = sprite_extent(48.0) as u32;
        let mut canvas = PixelCanvas::new(side, side);

        render_sprite(48.0, 1.0, &style, &mut canvas);

        assert_eq!(side, 50);
        assert_eq!(canvas.pixel(25, 25), Some(style.sprite_body));
        assert_eq!(canvas.pixel(0, 25), Some(style.sprite_outline));
        assert_eq!(canvas.pixel(16, 20), Some(style.sprite_eye));
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(canvas.save_depth(), 0);
    }

    #[test]
    fn sprite_layer_cost_ignores_viewport_size() {
        let style = style();
        let side = (sprite_extent(48.0) * 2.0).ceil() as u32;
        let mut canvas = PixelCanvas::new(side, side);

        render_sprite(48.0, 2.0, &style, &mut canvas);

        // Clear plus body, outline and eyes; far below a 3840x2160 backing store.
        assert!(canvas.painted() <= 4 * u64::from(side * side));
    }

    #[test]
    fn pixel_ratio_scales_output() {
        let state = state(100.0, 100.0, 2.0);
        let mut canvas = PixelCanvas::new(200, 200);

        render(&state, &style(), &mut canvas);

        let style = style();
        assert_eq!(canvas.pixel(100, 100), Some(style.sprite_body));
        assert_eq!(canvas.pixel(10, 10), Some(style.background));
        // Grid lines are two device pixels wide at ratio 2.
        assert_eq!(canvas.pixel(80, 10), Some(style.grid_line));
        assert_eq!(canvas.pixel(81, 10), Some(style.grid_line));
        assert_eq!(canvas.pixel(82, 10), Some(style.background));
    }
}
