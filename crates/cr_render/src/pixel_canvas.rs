use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use bevy::math::{Affine2, Vec2};
use cr_core::Rgba8;

use crate::surface::DrawSurface;

/// Segments used to flatten a quarter of a rounded-rect corner.
const CORNER_SEGMENTS: usize = 6;

/// Angular step used to flatten ellipses.
const ELLIPSE_STEP: f32 = TAU / 48.0;

const TRANSPARENT: Rgba8 = [0, 0, 0, 0];

#[derive(Clone, Copy, Debug, PartialEq)]
struct DrawState {
    transform: Affine2,
    fill: Rgba8,
    stroke: Rgba8,
    line_width: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            fill: [0, 0, 0, 255],
            stroke: [0, 0, 0, 255],
            line_width: 1.0,
        }
    }
}

/// Points in device space.
#[derive(Clone, Debug, Default)]
struct SubPath {
    points: Vec<Vec2>,
    closed: bool,
}

/// Covered half-open pixel spans, keyed by row.
type Spans = BTreeMap<u32, Vec<(u32, u32)>>;

/// Software RGBA8 canvas implementing [`DrawSurface`].
///
/// Rasterization samples pixel centers without antialiasing. Fills use the
/// nonzero winding rule and strokes cover the union of one quad per segment,
/// so overlapping segments never double-blend.
#[derive(Clone, Debug)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    state: DrawState,
    stack: Vec<DrawState>,
    path: Vec<SubPath>,
    painted: u64,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            state: DrawState::default(),
            stack: Vec::new(),
            path: Vec::new(),
            painted: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Pixels written since creation, counting overdraw.
    pub fn painted(&self) -> u64 {
        self.painted
    }

    /// Number of outstanding `save` calls.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Reallocate the backing store. Contents are cleared, drawing state kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize * 4];
    }

    fn map(&self, x: f32, y: f32) -> Vec2 {
        self.state.transform.transform_point2(Vec2::new(x, y))
    }

    /// Uniform scale of the current transform, used for line widths.
    fn line_scale(&self) -> f32 {
        self.state.transform.matrix2.determinant().abs().sqrt()
    }

    fn open_subpath(&mut self) -> Option<&mut SubPath> {
        self.path.last_mut().filter(|sub| !sub.closed && !sub.points.is_empty())
    }

    fn rect_polygon(&self, x: f32, y: f32, width: f32, height: f32) -> Vec<Vec2> {
        vec![
            self.map(x, y),
            self.map(x + width, y),
            self.map(x + width, y + height),
            self.map(x, y + height),
        ]
    }

    /// Collect the pixel spans covered by `polygons` under nonzero winding.
    fn scan(&self, polygons: &[&[Vec2]], spans: &mut Spans) {
        let mut edges = Vec::new();
        for polygon in polygons {
            if polygon.len() < 2 || polygon.iter().any(|p| !p.is_finite()) {
                continue;
            }
            for (i, &a) in polygon.iter().enumerate() {
                let b = polygon[(i + 1) % polygon.len()];
                if a.y != b.y {
                    edges.push((a, b));
                }
            }
        }
        if edges.is_empty() || self.width == 0 || self.height == 0 {
            return;
        }

        let (min_y, max_y) = edges.iter().fold((f32::MAX, f32::MIN), |(lo, hi), (a, b)| {
            (lo.min(a.y).min(b.y), hi.max(a.y).max(b.y))
        });
        let row_start = (min_y - 0.5).ceil().max(0.0) as u32;
        let row_end = ((max_y - 0.5).ceil().max(0.0) as u32).min(self.height);

        let mut crossings: Vec<(f32, i32)> = Vec::new();
        for row in row_start..row_end {
            let sample_y = row as f32 + 0.5;
            crossings.clear();
            for &(a, b) in &edges {
                let (top, bottom, winding) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
                if sample_y >= top.y && sample_y < bottom.y {
                    let t = (sample_y - top.y) / (bottom.y - top.y);
                    crossings.push((top.x + t * (bottom.x - top.x), winding));
                }
            }
            crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding == 0 {
                    continue;
                }
                let start = (pair[0].0 - 0.5).ceil().max(0.0) as u32;
                let end = ((pair[1].0 - 0.5).ceil().max(0.0) as u32).min(self.width);
                if start < end {
                    spans.entry(row).or_default().push((start, end));
                }
            }
        }
    }

    /// Write `color` over the spans, merging overlaps first.
    fn paint(&mut self, spans: Spans, color: Rgba8, replace: bool) {
        let stride = self.width as usize * 4;
        for (row, mut runs) in spans {
            runs.sort_unstable();
            let mut merged: Vec<(u32, u32)> = Vec::with_capacity(runs.len());
            for (start, end) in runs {
                match merged.last_mut() {
                    Some(last) if start <= last.1 => last.1 = last.1.max(end),
                    _ => merged.push((start, end)),
                }
            }

            let row_offset = row as usize * stride;
            for (start, end) in merged {
                self.painted += u64::from(end - start);
                for x in start..end {
                    let i = row_offset + x as usize * 4;
                    let dst = &mut self.pixels[i..i + 4];
                    if replace {
                        dst.copy_from_slice(&color);
                    } else {
                        blend(dst, color);
                    }
                }
            }
        }
    }

    fn stroke_spans(&self, spans: &mut Spans) {
        let half_width = self.state.line_width.max(0.0) * self.line_scale() / 2.0;
        if half_width <= 0.0 {
            return;
        }

        for sub in &self.path {
            let points = &sub.points;
            if points.len() < 2 {
                continue;
            }
            let mut segments: Vec<(Vec2, Vec2)> = points.windows(2).map(|w| (w[0], w[1])).collect();
            if sub.closed {
                segments.push((points[points.len() - 1], points[0]));
            }

            let last = segments.len() - 1;
            for (i, &(a, b)) in segments.iter().enumerate() {
                let Some(along) = (b - a).try_normalize() else {
                    continue;
                };
                // Interior joints get a square extension so corners have no gaps.
                let start = if sub.closed || i > 0 { a - along * half_width } else { a };
                let end = if sub.closed || i < last { b + along * half_width } else { b };
                let normal = along.perp() * half_width;
                let quad = [start + normal, end + normal, end - normal, start - normal];
                self.scan(&[quad.as_slice()], spans);
            }
        }
    }
}

/// Source-over blend of a straight-alpha color.
fn blend(dst: &mut [u8], src: Rgba8) {
    let alpha = src[3] as u32;
    if alpha == 255 {
        dst.copy_from_slice(&src);
        return;
    }
    if alpha == 0 {
        return;
    }
    let inverse = 255 - alpha;
    for c in 0..3 {
        dst[c] = ((src[c] as u32 * alpha + dst[c] as u32 * inverse + 127) / 255) as u8;
    }
    dst[3] = (alpha + (dst[3] as u32 * inverse + 127) / 255) as u8;
}

impl DrawSurface for PixelCanvas {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn set_transform(&mut self, transform: Affine2) {
        self.state.transform = transform;
    }

    fn set_fill_style(&mut self, color: Rgba8) {
        self.state.fill = color;
    }

    fn set_stroke_style(&mut self, color: Rgba8) {
        self.state.stroke = color;
    }

    fn set_line_width(&mut self, width: f32) {
        // Canvas ignores non-positive and non-finite widths.
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let polygon = self.rect_polygon(x, y, width, height);
        let mut spans = Spans::new();
        self.scan(&[polygon.as_slice()], &mut spans);
        self.paint(spans, TRANSPARENT, true);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let polygon = self.rect_polygon(x, y, width, height);
        let mut spans = Spans::new();
        self.scan(&[polygon.as_slice()], &mut spans);
        self.paint(spans, self.state.fill, false);
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        let point = self.map(x, y);
        self.path.push(SubPath {
            points: vec![point],
            closed: false,
        });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let point = self.map(x, y);
        match self.open_subpath() {
            Some(sub) => sub.points.push(point),
            None => self.path.push(SubPath {
                points: vec![point],
                closed: false,
            }),
        }
    }

    fn close_path(&mut self) {
        let Some(sub) = self.open_subpath() else {
            return;
        };
        sub.closed = true;
        let first = sub.points[0];
        self.path.push(SubPath {
            points: vec![first],
            closed: false,
        });
    }

    fn round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        let (x, width) = if width < 0.0 { (x + width, -width) } else { (x, width) };
        let (y, height) = if height < 0.0 { (y + height, -height) } else { (y, height) };
        let r = radius.max(0.0).min(width / 2.0).min(height / 2.0);

        let corners = [
            (Vec2::new(x + width - r, y + r), -FRAC_PI_2),
            (Vec2::new(x + width - r, y + height - r), 0.0),
            (Vec2::new(x + r, y + height - r), FRAC_PI_2),
            (Vec2::new(x + r, y + r), PI),
        ];

        let mut points = Vec::with_capacity(4 * (CORNER_SEGMENTS + 1));
        for (center, start) in corners {
            if r == 0.0 {
                points.push(self.map(center.x, center.y));
                continue;
            }
            for i in 0..=CORNER_SEGMENTS {
                let angle = start + FRAC_PI_2 * i as f32 / CORNER_SEGMENTS as f32;
                points.push(self.map(center.x + r * angle.cos(), center.y + r * angle.sin()));
            }
        }

        self.path.push(SubPath {
            points,
            closed: true,
        });
    }

    fn ellipse(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius_x: f32,
        radius_y: f32,
        rotation: f32,
        start_angle: f32,
        end_angle: f32,
    ) {
        let sweep = (end_angle - start_angle).clamp(-TAU, TAU);
        let full = sweep.abs() >= TAU - f32::EPSILON;
        let steps = ((sweep.abs() / ELLIPSE_STEP).ceil() as usize).max(1);
        let (sin_rot, cos_rot) = rotation.sin_cos();

        let points = (0..=steps)
            .map(|i| {
                let angle = start_angle + sweep * i as f32 / steps as f32;
                let local = Vec2::new(radius_x.abs() * angle.cos(), radius_y.abs() * angle.sin());
                let rotated = Vec2::new(
                    local.x * cos_rot - local.y * sin_rot,
                    local.x * sin_rot + local.y * cos_rot,
                );
                self.map(center_x + rotated.x, center_y + rotated.y)
            })
            .collect();

        self.path.push(SubPath {
            points,
            closed: full,
        });
    }

    fn fill(&mut self) {
        let polygons: Vec<&[Vec2]> = self.path.iter().map(|sub| sub.points.as_slice()).collect();
        let mut spans = Spans::new();
        self.scan(&polygons, &mut spans);
        self.paint(spans, self.state.fill, false);
    }

    fn stroke(&mut self) {
        let mut spans = Spans::new();
        self.stroke_spans(&mut spans);
        self.paint(spans, self.state.stroke, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba8 = [255, 0, 0, 255];
    const BLUE: Rgba8 = [0, 0, 255, 255];

    #[test]
    fn fill_rect_covers_exact_pixels() {
        let mut canvas = PixelCanvas::new(10, 10);
        canvas.set_fill_style(RED);
        canvas.fill_rect(2.0, 3.0, 4.0, 2.0);

        assert_eq!(canvas.pixel(2, 3), Some(RED));
        assert_eq!(canvas.pixel(5, 4), Some(RED));
        assert_eq!(canvas.pixel(6, 4), Some(TRANSPARENT));
        assert_eq!(canvas.pixel(2, 5), Some(TRANSPARENT));
        assert_eq!(canvas.pixel(1, 3), Some(TRANSPARENT));
    }

    #[test]
    fn transform_scales_geometry() {
        let mut canvas = PixelCanvas::new(10, 10);
        canvas.set_transform(Affine2::from_scale(Vec2::splat(2.0)));
        canvas.set_fill_style(RED);
        canvas.fill_rect(1.0, 1.0, 2.0, 2.0);

        assert_eq!(canvas.pixel(2, 2), Some(RED));
        assert_eq!(canvas.pixel(5, 5), Some(RED));
        assert_eq!(canvas.pixel(6, 6), Some(TRANSPARENT));
    }

    #[test]
    fn clear_rect_resets_to_transparent() {
        let mut canvas = PixelCanvas::new(4, 4);
        canvas.set_fill_style(RED);
        canvas.fill_rect(0.0, 0.0, 4.0, 4.0);
        canvas.clear_rect(0.0, 0.0, 2.0, 4.0);

        assert_eq!(canvas.pixel(1, 1), Some(TRANSPARENT));
        assert_eq!(canvas.pixel(2, 1), Some(RED));
    }

    #[test]
    fn save_restore_brackets_state() {
        let mut canvas = PixelCanvas::new(4, 4);
        canvas.set_fill_style(RED);
        canvas.save();
        canvas.set_fill_style(BLUE);
        canvas.set_transform(Affine2::from_translation(Vec2::new(2.0, 0.0)));
        assert_eq!(canvas.save_depth(), 1);
        canvas.restore();
        canvas.restore();

        canvas.fill_rect(0.0, 0.0, 1.0, 1.0);
        assert_eq!(canvas.pixel(0, 0), Some(RED));
        assert_eq!(canvas.save_depth(), 0);
    }

    #[test]
    fn one_pixel_stroke_is_one_column_wide() {
        let mut canvas = PixelCanvas::new(8, 8);
        canvas.set_stroke_style(BLUE);
        canvas.begin_path();
        canvas.move_to(4.0, 0.0);
        canvas.line_to(4.0, 8.0);
        canvas.stroke();

        for y in 0..8 {
            assert_eq!(canvas.pixel(3, y), Some(BLUE));
            assert_eq!(canvas.pixel(4, y), Some(TRANSPARENT));
            assert_eq!(canvas.pixel(2, y), Some(TRANSPARENT));
        }
    }

    #[test]
    fn ellipse_fill_is_round() {
        let mut canvas = PixelCanvas::new(21, 21);
        canvas.set_fill_style(RED);
        canvas.begin_path();
        canvas.ellipse(10.5, 10.5, 8.0, 8.0, 0.0, 0.0, TAU);
        canvas.fill();

        assert_eq!(canvas.pixel(10, 10), Some(RED));
        assert_eq!(canvas.pixel(10, 3), Some(RED));
        assert_eq!(canvas.pixel(1, 1), Some(TRANSPARENT));
        assert_eq!(canvas.pixel(19, 19), Some(TRANSPARENT));
    }

    #[test]
    fn round_rect_cuts_corners() {
        let mut canvas = PixelCanvas::new(20, 20);
        canvas.set_fill_style(RED);
        canvas.begin_path();
        canvas.round_rect(0.0, 0.0, 20.0, 20.0, 8.0);
        canvas.fill();

        assert_eq!(canvas.pixel(0, 0), Some(TRANSPARENT));
        assert_eq!(canvas.pixel(10, 0), Some(RED));
        assert_eq!(canvas.pixel(0, 10), Some(RED));
        assert_eq!(canvas.pixel(10, 10), Some(RED));
    }

    #[test]
    fn separate_subpaths_fill_independently() {
        let mut canvas = PixelCanvas::new(20, 10);
        canvas.set_fill_style(RED);
        canvas.begin_path();
        canvas.ellipse(4.5, 4.5, 3.0, 3.0, 0.0, 0.0, TAU);
        canvas.ellipse(14.5, 4.5, 3.0, 3.0, 0.0, 0.0, TAU);
        canvas.fill();

        assert_eq!(canvas.pixel(4, 4), Some(RED));
        assert_eq!(canvas.pixel(14, 4), Some(RED));
        assert_eq!(canvas.pixel(9, 4), Some(TRANSPARENT));
    }

    #[test]
    fn translucent_fill_blends() {
        let mut canvas = PixelCanvas::new(2, 2);
        canvas.set_fill_style([0, 0, 0, 255]);
        canvas.fill_rect(0.0, 0.0, 2.0, 2.0);
        canvas.set_fill_style([255, 255, 255, 128]);
        canvas.fill_rect(0.0, 0.0, 2.0, 2.0);

        let [r, g, b, a] = canvas.pixel(0, 0).unwrap();
        assert_eq!((r, g, b), (128, 128, 128));
        assert_eq!(a, 255);
    }

    #[test]
    fn painted_counts_covered_pixels() {
        let mut canvas = PixelCanvas::new(10, 10);
        canvas.set_fill_style(RED);
        canvas.fill_rect(0.0, 0.0, 4.0, 2.0);
        assert_eq!(canvas.painted(), 8);

        // Overlapping subpaths in one fill are painted once.
        canvas.begin_path();
        canvas.round_rect(0.0, 0.0, 2.0, 2.0, 0.0);
        canvas.round_rect(0.0, 0.0, 2.0, 2.0, 0.0);
        canvas.fill();
        assert_eq!(canvas.painted(), 12);
    }

    #[test]
    fn resize_clears_pixels() {
        let mut canvas = PixelCanvas::new(2, 2);
        canvas.set_fill_style(RED);
        canvas.fill_rect(0.0, 0.0, 2.0, 2.0);
        canvas.resize(3, 1);

        assert_eq!(canvas.pixels().len(), 12);
        assert!(canvas.pixels().iter().all(|b| *b == 0));
    }

    #[test]
    fn offscreen_geometry_is_clipped() {
        let mut canvas = PixelCanvas::new(4, 4);
        canvas.set_fill_style(RED);
        canvas.fill_rect(-10.0, -10.0, 100.0, 100.0);
        assert!(canvas.pixels().chunks(4).all(|p| p == RED));
    }
}
