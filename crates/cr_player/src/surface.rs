use bevy::image::{ImageFilterMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use cr_core::{RenderStyle, RunnerError, RunnerState, Viewport};
use cr_render::{render_backdrop, render_sprite, sprite_extent, PixelCanvas};

/// Marker component for the sprite showing the backdrop layer.
#[derive(Component)]
pub struct RunnerCanvas;

/// Marker component for the sprite showing the runner itself.
#[derive(Component)]
pub struct RunnerSprite;

/// A software canvas and the GPU image it is uploaded into.
pub struct CanvasLayer {
    pub handle: Handle<Image>,
    pub canvas: PixelCanvas,
}

impl CanvasLayer {
    fn new(images: &mut Assets<Image>) -> Self {
        let canvas = PixelCanvas::new(1, 1);
        let handle = images.add(canvas_image(&canvas));
        Self { handle, canvas }
    }

    fn upload(&self, images: &mut Assets<Image>) {
        if let Some(image) = images.get_mut(&self.handle) {
            *image = canvas_image(&self.canvas);
        }
    }
}

/// Both rasterized layers.
///
/// The backdrop depends on the viewport and the sprite on the pixel ratio, so
/// neither is redrawn while those stay put. Per-frame motion is carried by
/// the sprite entity's `Transform`.
#[derive(Resource)]
pub struct CanvasTexture {
    pub backdrop: CanvasLayer,
    pub sprite: CanvasLayer,
    drawn_for: Option<Viewport>,
}

impl CanvasTexture {
    pub fn new(images: &mut Assets<Image>) -> Self {
        Self {
            backdrop: CanvasLayer::new(images),
            sprite: CanvasLayer::new(images),
            drawn_for: None,
        }
    }

    /// Viewport the layers were last drawn for.
    pub fn drawn_for(&self) -> Option<Viewport> {
        self.drawn_for
    }

    /// Re-rasterize whatever the current viewport invalidated.
    ///
    /// Returns whether anything was drawn.
    pub fn redraw(&mut self, state: &RunnerState, style: &RenderStyle, images: &mut Assets<Image>) -> bool {
        let viewport = state.viewport;
        if self.drawn_for == Some(viewport) {
            return false;
        }

        let size = texture_size(&viewport);
        self.backdrop.canvas.resize(size.x, size.y);
        render_backdrop(&viewport, style, &mut self.backdrop.canvas);
        self.backdrop.upload(images);

        if self.drawn_for.map(|last| last.pixel_ratio) != Some(viewport.pixel_ratio) {
            let side = sprite_texture_side(state.sprite.size, viewport.pixel_ratio);
            self.sprite.canvas.resize(side, side);
            render_sprite(state.sprite.size, viewport.pixel_ratio, style, &mut self.sprite.canvas);
            self.sprite.upload(images);
        }

        self.drawn_for = Some(viewport);
        true
    }
}

/// Read the viewport of the window hosting the canvas.
///
/// The runner cannot start without one, so a missing window is fatal.
pub fn viewport_from_window(window: Option<&Window>, selector: &str) -> Result<Viewport, RunnerError> {
    let window = window.ok_or_else(|| RunnerError::MissingSurface {
        selector: selector.to_string(),
    })?;
    Ok(Viewport::new(window.width(), window.height(), window.scale_factor()))
}

/// Backing-store dimensions, never zero so the GPU texture stays valid.
pub fn texture_size(viewport: &Viewport) -> UVec2 {
    viewport.backing_size().max(UVec2::ONE)
}

/// Device pixels per side of the sprite texture.
pub fn sprite_texture_side(size: f32, pixel_ratio: f32) -> u32 {
    ((sprite_extent(size) * pixel_ratio).ceil() as u32).max(1)
}

/// Canvas coordinates (origin top-left, y down) to 2D world coordinates
/// (origin at the window center, y up).
pub fn canvas_to_world(point: Vec2, viewport: &Viewport) -> Vec2 {
    Vec2::new(point.x - viewport.width / 2.0, viewport.height / 2.0 - point.y)
}

/// World position of the runner, bob included.
pub fn sprite_world_position(state: &RunnerState) -> Vec2 {
    let sprite = &state.sprite;
    canvas_to_world(
        Vec2::new(sprite.position.x, sprite.position.y + sprite.bob()),
        &state.viewport,
    )
}

/// Build an image matching the canvas contents.
pub fn canvas_image(canvas: &PixelCanvas) -> Image {
    let mut image = Image::new(
        Extent3d {
            width: canvas.width(),
            height: canvas.height(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        canvas.pixels().to_vec(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    );

    // Layers are already at device resolution.
    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        mag_filter: ImageFilterMode::Nearest,
        min_filter: ImageFilterMode::Nearest,
        ..default()
    });

    image
}
